//! TCP connect classifier.
//!
//! Completes a full handshake through the operating system's socket API and
//! closes the connection right away. No payload is ever exchanged.

use crate::error::DialError;
use crate::scanner::traits::{Classification, Classifier};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error};

/// Classifier backed by real `connect()` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpClassifier;

impl TcpClassifier {
    pub fn new() -> Self {
        Self
    }
}

/// Map a failed connect to closed, filtered or error.
fn classify_io_error(err: &io::Error) -> Classification {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => Classification::Closed,
        io::ErrorKind::TimedOut => Classification::Filtered,
        _ => Classification::Error(DialError::new(err.to_string())),
    }
}

#[async_trait]
impl Classifier for TcpClassifier {
    async fn classify(&self, addr: IpAddr, port: Port, dial_timeout: Duration) -> Classification {
        let sock = SocketAddr::new(addr, port.as_u16());

        let outcome = match timeout(dial_timeout, TcpStream::connect(sock)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Classification::Open
            }
            Ok(Err(e)) => classify_io_error(&e),
            Err(_) => Classification::Filtered,
        };

        match &outcome {
            Classification::Open => debug!("{}: port {} open", addr, port),
            Classification::Closed => debug!("{}: port {} closed", addr, port),
            Classification::Filtered => {
                debug!("{}: port {} timed out (probably filtered by firewall)", addr, port)
            }
            Classification::Error(e) => error!("{}: port {}: {}", addr, port, e),
        }

        outcome
    }
}
