//! wikiproxy - read-through cache for MediaWiki page lookups
//!
//! Serves `GET /api/search?query=<title>` from Redis when it can and from the
//! MediaWiki parse API when it must, tagging every response with where it
//! came from.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use wikiproxy_core::{CacheBackend, ProxyConfig};
use wikiproxy_infra::{create_store, init_logger, LoggerConfig};
use wikiproxy_serve::ProxyServer;

#[derive(Parser)]
#[command(name = "wikiproxy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read-through Redis cache in front of the MediaWiki parse API")]
#[command(long_about = r#"
wikiproxy answers page lookups from a Redis cache and falls back to the
MediaWiki `action=parse` API on a miss, caching the result for an hour.

Configuration is read from ./wikiproxy.{yaml,toml,json}, an optional --config
file and WIKIPROXY_* environment variables, e.g. WIKIPROXY_CACHE__URL.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve(ServeArgs),

    /// Validate configuration and print the effective settings
    Validate,

    /// Show version information
    Version,

    /// Check that the configured cache store answers
    Health,
}

#[derive(clap::Args, Debug, Default)]
struct ServeArgs {
    /// Server host address
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Redis connection URL
    #[arg(long)]
    redis_url: Option<String>,

    /// Use the in-process cache instead of Redis
    #[arg(long)]
    memory_cache: bool,

    /// Cache entry lifetime in seconds
    #[arg(long)]
    ttl: Option<u64>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

impl ServeArgs {
    /// Command-line flags win over file and environment settings
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.redis_url {
            config.cache.url = url.clone();
        }
        if self.memory_cache {
            config.cache.backend = CacheBackend::Memory;
        }
        if let Some(ttl) = self.ttl {
            config.cache.ttl_seconds = ttl;
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Serve(ServeArgs::default()));

    let mut config =
        ProxyConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Commands::Serve(args) = &command {
        args.apply(&mut config);
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate().context("Invalid configuration")?;
    init_logger(LoggerConfig::from(&config.logging))
        .context("Failed to initialize logging")?;

    match command {
        Commands::Serve(_) => handle_serve(config).await,
        Commands::Validate => handle_validate(&config),
        Commands::Version => handle_version(),
        Commands::Health => handle_health(&config).await,
    }
}

async fn handle_serve(config: ProxyConfig) -> anyhow::Result<()> {
    info!("Starting {}", wikiproxy_core::version_info());

    let server = ProxyServer::new(config).context("Failed to build server")?;
    server.start().await.context("Server terminated with an error")?;

    Ok(())
}

fn handle_validate(config: &ProxyConfig) -> anyhow::Result<()> {
    let yaml = config.to_yaml()?;
    println!("# Configuration is valid");
    print!("{}", yaml);
    Ok(())
}

fn handle_version() -> anyhow::Result<()> {
    println!("{}", wikiproxy_core::version_info());
    Ok(())
}

async fn handle_health(config: &ProxyConfig) -> anyhow::Result<()> {
    let store = create_store(&config.cache).context("Failed to create cache store")?;

    match store.ping().await {
        Ok(true) => {
            println!("cache ({}): reachable", store.backend());
            Ok(())
        }
        Ok(false) => bail!("cache ({}) answered PING unexpectedly", store.backend()),
        Err(e) => bail!("cache ({}) unreachable: {}", store.backend(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "wikiproxy",
            "serve",
            "--port",
            "8080",
            "--memory-cache",
            "--ttl",
            "60",
        ])
        .unwrap();

        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve command");
        };

        let mut config = ProxyConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_cli_no_subcommand() {
        let cli = Cli::try_parse_from(["wikiproxy", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli =
            Cli::try_parse_from(["wikiproxy", "validate", "--config", "proxy.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("proxy.yaml")));
        assert!(matches!(cli.command, Some(Commands::Validate)));
    }

    #[test]
    fn test_redis_url_override() {
        let args = ServeArgs {
            redis_url: Some("redis://cache:6379/2".to_string()),
            ..Default::default()
        };
        let mut config = ProxyConfig::default();
        args.apply(&mut config);
        assert_eq!(config.cache.url, "redis://cache:6379/2");
        assert_eq!(config.cache.backend, CacheBackend::Redis);
    }
}
