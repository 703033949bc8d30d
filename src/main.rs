use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use mock_http_server::config::{read_config, validate_config, ConfigError, ServerConfig, TlsConfig};
use mock_http_server::lifecycle::{load_handlers, signals, Shutdown};
use mock_http_server::observability::{init_logging, metrics};
use mock_http_server::{net, CallbackRegistry, HttpServer};

/// Serve mock HTTP handlers declared in descriptor files.
#[derive(Debug, Parser)]
#[command(name = "mock-http-server", version, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve on a multi-threaded runtime
    #[arg(short, long)]
    threaded: bool,

    /// TLS certificate (PEM)
    #[arg(long, requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// TLS private key (PEM)
    #[arg(long, requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Directory scanned for descriptor files
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Index file listing descriptor files
    #[arg(short, long)]
    index: Option<PathBuf>,
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.threaded {
            config.listener.threaded = true;
        }
        if let (Some(cert_path), Some(key_path)) = (self.tls_cert, self.tls_key) {
            config.listener.tls = Some(TlsConfig {
                cert_path,
                key_path,
            });
        }
        if let Some(dir) = self.dir {
            config.descriptors.directory = dir;
        }
        if let Some(index) = self.index {
            config.descriptors.index = Some(index);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability)?;

    let runtime = if config.listener.threaded {
        tokio::runtime::Builder::new_multi_thread()
    } else {
        tokio::runtime::Builder::new_current_thread()
    }
    .enable_all()
    .build()?;

    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        threaded = config.listener.threaded,
        request_timeout_secs = config.timeouts.request_secs,
        "mock-http-server starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let dispatcher = load_handlers(&config.descriptors, &CallbackRegistry::default())?;
    let server = HttpServer::new(Arc::new(dispatcher), &config.timeouts);

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    match &config.listener.tls {
        Some(tls) => {
            let rustls = net::load_tls_config(tls).await?;
            let address = net::resolve(&config.listener)?;
            server.run_tls(address, rustls, &shutdown).await?;
        }
        None => {
            let listener = net::bind(&config.listener).await?;
            server.run(listener, &shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
