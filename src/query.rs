//! The `Query` data model: the bundle a listener builds on read and
//! destroys once its outcome has been logged.

use std::net::SocketAddr;

/// Transport a query arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Udp => "udp",
            Transport::Tcp => "tcp",
        }
    }
}

/// Tri-state classification result: unknown until the classifier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unknown,
    Domestic,
    Foreign,
}

impl Classification {
    /// As the source's `CN=1`/`CN=0`/unset encoding, not a Rust `Option` debug dump.
    fn as_log_value(self) -> &'static str {
        match self {
            Classification::Unknown => "unset",
            Classification::Domestic => "1",
            Classification::Foreign => "0",
        }
    }
}

/// A single in-flight DNS query, from the moment a listener reads bytes
/// until its outcome is logged and any reply has been sent.
pub struct Query {
    pub payload: Vec<u8>,
    pub src: SocketAddr,
    pub transport: Transport,
    pub domain: String,
    pub classification: Classification,
    pub truncated: bool,
}

impl Query {
    pub fn new(payload: Vec<u8>, src: SocketAddr, transport: Transport) -> Self {
        Self {
            payload,
            src,
            transport,
            domain: String::new(),
            classification: Classification::Unknown,
            truncated: false,
        }
    }

    /// Log the single completion line for this query (source, transport,
    /// size, domain, classification, and error if any).
    pub fn log_outcome(&self, err: Option<&crate::error::Error>) {
        let size = self.payload.len();
        match err {
            None => tracing::info!(
                src = %self.src,
                proto = self.transport.as_str(),
                size,
                domain = %self.domain,
                cn = %self.classification.as_log_value(),
                truncated = self.truncated,
                "query completed"
            ),
            Some(e) => tracing::warn!(
                src = %self.src,
                proto = self.transport.as_str(),
                size,
                domain = %self.domain,
                cn = %self.classification.as_log_value(),
                error = %e,
                "query failed"
            ),
        }
    }
}
