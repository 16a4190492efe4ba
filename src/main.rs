use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use reqgen::analysis::ScanOptions;
use reqgen::app::{self, Outcome};
use reqgen::config::{Config, RegistryConfig, PYTHON_ENV, REGISTRY_URL_ENV};
use reqgen::logging::init_logging;
use reqgen::manifest::ManifestFormat;
use reqgen::registry::{DEFAULT_PYPI_REGISTRY, DEFAULT_TIMEOUT_SECS};
use reqgen::stdlib::{StandardLibrary, DEFAULT_PYTHON};

#[derive(Parser)]
#[command(name = "reqgen")]
#[command(version)]
#[command(about = "Generate requirements.txt, Pipfile or pyproject.toml from a Python project's imports", long_about = None)]
struct Cli {
    /// Project directory to scan
    #[arg(short, long)]
    dir: PathBuf,

    /// Output format: requirements, pipfile or pyproject
    #[arg(short, long, default_value_t = ManifestFormat::Requirements)]
    format: ManifestFormat,

    /// Output file (defaults to requirements.txt, Pipfile or pyproject.toml)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Python interpreter used to list standard-library modules
    #[arg(long, env = PYTHON_ENV, default_value = DEFAULT_PYTHON)]
    python: String,

    /// Package registry base URL
    #[arg(long, env = REGISTRY_URL_ENV, default_value = DEFAULT_PYPI_REGISTRY)]
    registry_url: String,

    /// Registry request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Skip version lookup and write every dependency unpinned
    #[arg(long)]
    no_versions: bool,

    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_links: bool,

    /// Maximum directory depth to scan
    #[arg(long)]
    max_depth: Option<usize>,

    /// Additional directory name to skip (repeatable). Added to the default
    /// excludes: .git, __pycache__, .venv, venv, .tox, .mypy_cache,
    /// site-packages and node_modules
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,

    /// Scan every directory, including the default excludes
    #[arg(long)]
    no_default_excludes: bool,

    /// Print the manifest to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Log filter, e.g. "info" or "reqgen=debug" (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let base = if self.no_default_excludes {
            ScanOptions::unfiltered()
        } else {
            ScanOptions::default()
        };
        let mut scan = ScanOptions {
            follow_links: self.follow_links,
            max_depth: self.max_depth,
            ..base
        };
        scan.excluded_dirs.extend(self.exclude);

        Config {
            root: self.dir,
            format: self.format,
            output: self.output,
            python: self.python,
            registry: RegistryConfig {
                url: self.registry_url,
                timeout: Duration::from_secs(self.timeout),
                enabled: !self.no_versions,
            },
            scan,
            dry_run: self.dry_run,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.verbose);

    let verbose = cli.verbose;
    let config = cli.into_config();

    let stdlib = StandardLibrary::detect(&config.python);

    println!("🔍 Scanning project for dependencies...");
    let source = app::version_source(&config.registry)?;
    let outcome = app::run(&config, &stdlib, source.as_ref())
        .with_context(|| format!("Failed to generate manifest for {}", config.root.display()))?;

    if verbose {
        let report = outcome.report();
        println!(
            "   {} files scanned, {} skipped, {} standard-library modules filtered",
            report.files_scanned, report.files_skipped, report.stdlib_filtered
        );
    }

    match outcome {
        Outcome::NoDependencies(_) => println!("🚫 No dependencies found."),
        Outcome::Written { path, resolved, .. } => {
            let unpinned = resolved.iter().filter(|d| !d.is_pinned()).count();
            if unpinned > 0 && config.registry.enabled {
                println!("⚠️  {} dependencies have no known version", unpinned);
            }
            println!("📦 Generated {} file", config.format);
            println!("✅ Manifest saved as {}", path.display());
        }
        Outcome::Rendered { content, .. } => print!("{}", content),
    }

    Ok(())
}
