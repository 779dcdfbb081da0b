use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::client::{ConnectionRegistry, handle_client};
use crate::config::ServerConfig;
use crate::error::ServerError;

pub struct Server {
    registry: Arc<ConnectionRegistry>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener. A bind failure is returned to the caller as fatal.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let address = config.listen_address();

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => {
                info!("Server bound to {}", address);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", address, e);
                return Err(ServerError::Bind(address, e));
            }
        };

        Ok(Self {
            registry: Arc::new(ConnectionRegistry::new()),
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accepts connections forever, one task per client.
    pub async fn start(&self) {
        info!(
            "Starting chat server on {} (max {} clients)",
            self.config.listen_address(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let config = Arc::clone(&self.config);

                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
                    }

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(handle_client(stream, addr, registry, config));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}
