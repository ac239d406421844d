//! Rewrite server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::routes::create_router;
use crate::upstream::UpstreamClient;

/// The rewrite service.
pub struct RewriteServer {
    config: ServerConfig,
}

impl RewriteServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Start the server.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let upstream = Arc::new(UpstreamClient::new(self.config.upstream.clone()));
        let app = create_router(upstream);

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Rewrite server listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_from_defaults() {
        let server = RewriteServer::new(ServerConfig::default());
        assert_eq!(server.addr(), "127.0.0.1:3001");
    }

    #[test]
    fn test_addr_custom() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8443,
            ..ServerConfig::default()
        };
        let server = RewriteServer::new(config);
        assert_eq!(server.addr(), "0.0.0.0:8443");
    }
}
