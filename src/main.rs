use anyhow::{Context, Result, anyhow};
use dirsession::cli::{Args, ConfigDiscovery, ExecutionMode, PathConfig, Shell, ShellConfig};
use dirsession::session::list_sessions;
use dirsession::{LayoutHost, Runtime, env};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let mode = args.mode().map_err(|e| anyhow!(e))?;

    let verbose = matches!(&mode, ExecutionMode::Shell(config) if config.verbose);
    init_logging(verbose);

    info!("Starting dirsession");

    match mode {
        ExecutionMode::Shell(config) => run_shell_mode(config),
        ExecutionMode::Path(config) => run_path_mode(config),
        ExecutionMode::List { config_override } => run_list_mode(config_override.as_deref()),
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "dirsession=info" } else { "dirsession=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Stdout belongs to the shell prompt.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_shell_mode(config: ShellConfig) -> Result<()> {
    let mut session_config = ConfigDiscovery::load(config.config_override.as_deref())?;
    if let Some(session_dir) = config.session_dir {
        session_config = session_config.with_session_dir(session_dir);
    }

    let cwd = absolute(config.directory.as_deref().unwrap_or(Path::new(".")))?;
    info!("Running shell in {}", cwd.display());

    let runtime = Runtime::new(LayoutHost::new(cwd), session_config);
    let mut shell = Shell::new(runtime, config.verbose);

    if config.no_bootstrap {
        info!("Startup session policy disabled");
    } else if let Err(e) = shell.runtime_mut().start_up(!config.files.is_empty()) {
        // The host already carries the notice; keep the shell usable.
        warn!("Startup session policy failed: {}", e);
    }

    shell.open_all(&config.files);

    let stdin = io::stdin();
    let stdout = io::stdout();
    shell.run(stdin.lock(), stdout.lock())
}

fn run_path_mode(config: PathConfig) -> Result<()> {
    let session_config = ConfigDiscovery::load(config.config_override.as_deref())?;

    let path = match &config.view {
        Some(document) => env::resolve_view_path(&session_config.session_dir, &absolute(document)?),
        None => {
            let directory = absolute(config.directory.as_deref().unwrap_or(Path::new(".")))?;
            env::resolve_session_path(&session_config.session_dir, None, &directory)
        }
    };

    println!("{}", path.display());
    Ok(())
}

fn run_list_mode(config_override: Option<&Path>) -> Result<()> {
    let session_config = ConfigDiscovery::load(config_override)?;
    let entries = list_sessions(&session_config.session_dir)?;

    if entries.is_empty() {
        println!("No sessions in {}", session_config.session_dir.display());
        return Ok(());
    }

    for entry in entries {
        let directory = entry
            .directory
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "?".to_string());
        let modified = entry
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".repeat(16));
        println!(
            "{}  {}  {}",
            modified,
            directory,
            entry.path.display()
        );
    }
    Ok(())
}

/// Resolve `path` against the process working directory without touching the filesystem
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(if path == Path::new(".") { cwd } else { cwd.join(path) })
}
