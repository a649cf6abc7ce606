//! `ParlorServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → engine. Each
//! accepted connection gets its own handler task; all session state
//! lives behind the engine's registry.

use std::sync::Arc;

use parlor_engine::{ActionRouter, SessionConfig, SessionRegistry, TurnGame};
use parlor_protocol::JsonCodec;
use parlor_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::ParlorError;

/// Builder for configuring and starting a parlor server.
pub struct ParlorServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
}

impl ParlorServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration (time budget, AI delay, ...).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the transport and builds a server for game `G`.
    pub async fn build<G: TurnGame>(self) -> Result<ParlorServer<G>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let registry = Arc::new(SessionRegistry::<G>::new(self.session_config));
        Ok(ParlorServer {
            transport,
            router: ActionRouter::new(registry),
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running parlor game server.
pub struct ParlorServer<G: TurnGame> {
    transport: WebSocketTransport,
    router: ActionRouter<G>,
}

impl<G: TurnGame> ParlorServer<G> {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// The local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The action router (handy for ops endpoints and tests).
    pub fn router(&self) -> &ActionRouter<G> {
        &self.router
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each connection runs in its own task; a handler error ends that
    /// connection only, never the server.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let router = self.router.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, router, JsonCodec).await
                        {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
