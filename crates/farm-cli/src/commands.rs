use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use farm_server::{FarmServer, ServerConfig, StorageConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigArgs, OutputFormat, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.verbose),
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

/// File (or defaults), then `FARM_BIND`.
fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    let config = match path {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    };
    Ok(config.apply_env())
}

fn init_tracing(level: &str, verbose: bool) {
    let default = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_serve(args: ServeArgs, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.data_dir {
        config.storage = StorageConfig::Json { dir };
    }
    init_tracing(&config.log_level, verbose);

    let storage = match &config.storage {
        StorageConfig::Memory => "memory".to_string(),
        StorageConfig::Json { dir } => dir.display().to_string(),
    };
    println!(
        "{} Farm server on {} (storage: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        storage
    );

    let server = FarmServer::new(config).context("failed to open storage")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
