//! horizon-dns - a split-horizon DNS forwarder.
//!
//! Forwards DNS queries to a local recursive resolver or, for queries
//! classified as foreign, over DNS-over-TLS through a SOCKS5 proxy.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use horizon_dns::config::{AppConfig, Cli};
use horizon_dns::context::AppContext;
use horizon_dns::listener::{tcp, udp};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match AppConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let ctx = AppContext::new(&config);

    let mut listeners = Vec::new();

    if let Some(addr) = config.listen_udp {
        let ctx = ctx.clone();
        listeners.push(tokio::spawn(async move {
            if let Err(e) = udp::run(ctx, addr).await {
                tracing::error!(error = %e, "UDP listener terminated");
                std::process::exit(1);
            }
        }));
    }

    if let Some(addr) = config.listen_tcp {
        let ctx = ctx.clone();
        listeners.push(tokio::spawn(async move {
            if let Err(e) = tcp::run(ctx, addr).await {
                tracing::error!(error = %e, "TCP listener terminated");
                std::process::exit(1);
            }
        }));
    }

    for listener in listeners {
        let _ = listener.await;
    }
}
