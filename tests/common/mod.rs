//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

use mock_http_server::config::{DescriptorConfig, ListenerConfig, TimeoutConfig};
use mock_http_server::lifecycle::{load_handlers, StartupError};
use mock_http_server::{net, CallbackRegistry, HttpServer, Shutdown};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Load `descriptors` (file name, content) from a fresh directory.
pub fn load(
    descriptors: &[(&str, &str)],
) -> Result<(mock_http_server::Dispatcher, TempDir), StartupError> {
    let dir = TempDir::new().expect("create descriptor dir");
    for (name, content) in descriptors {
        std::fs::write(dir.path().join(name), content).expect("write descriptor");
    }
    let config = DescriptorConfig {
        directory: dir.path().to_path_buf(),
        index: None,
    };
    let dispatcher = load_handlers(&config, &CallbackRegistry::default())?;
    Ok((dispatcher, dir))
}

/// Start a server for `descriptors` and wait until it accepts connections.
pub async fn start_server(descriptors: &[(&str, &str)]) -> TestServer {
    let (dispatcher, dir) = load(descriptors).unwrap();
    let listener = net::bind(&ListenerConfig {
        port: 0,
        ..ListenerConfig::default()
    })
    .await
    .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(dispatcher), &TimeoutConfig::default());
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        _dir: dir,
    }
}
