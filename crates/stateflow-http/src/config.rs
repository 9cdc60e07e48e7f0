//! Server configuration.

use std::net::SocketAddr;

use clap::Parser;

/// Command-line and environment configuration for the HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "stateflowd", about = "Stateflow workflow engine HTTP server")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "STATEFLOW_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,
}
