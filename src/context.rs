//! The process-wide, `Arc`-shared application context built once at
//! startup and cloned into every listener task in place of global state.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::dot::{self, DotBroker};

/// Owns the resolved addresses and the DoT broker handle every listener
/// needs to route a query.
pub struct AppContext {
    pub forward_local: SocketAddr,
    pub query_cn: SocketAddr,
    pub dot: DotBroker,
}

impl AppContext {
    /// Build the context and spawn the DoT broker's dispatcher task.
    pub fn new(config: &AppConfig) -> Arc<Self> {
        let connector = dot::make_connector(
            config.forward_proxy,
            config.dot_host.clone(),
            config.dot_port,
        );
        let dot = DotBroker::spawn(connector);

        Arc::new(Self {
            forward_local: config.forward_local,
            query_cn: config.query_cn,
            dot,
        })
    }
}
