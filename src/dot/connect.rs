//! Production connector: dial the SOCKS5 proxy, CONNECT to the DoT target,
//! then perform a TLS handshake with SNI set to the target host, validated
//! against the platform/webpki root store. Ported from the source's
//! `newDoTClient`.

use std::net::SocketAddr;
use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::wire::socks5;

use super::dispatcher::{AsyncDuplex, Connector};

fn tls_connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Build a [`Connector`] that dials `proxy_addr`, issues a SOCKS5 CONNECT
/// to `target_host:target_port`, and wraps the result in TLS with SNI set
/// to `target_host`.
pub fn make_connector(proxy_addr: SocketAddr, target_host: String, target_port: u16) -> Connector {
    let connector = tls_connector();

    Arc::new(move || {
        let target_host = target_host.clone();
        let connector = connector.clone();
        Box::pin(async move {
            let mut raw = TcpStream::connect(proxy_addr).await?;

            socks5::connect(&mut raw, &target_host, target_port)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;

            let server_name = ServerName::try_from(target_host.clone())
                .map_err(|_| std::io::Error::other(format!("invalid SNI host: {target_host}")))?;

            let tls = connector.connect(server_name, raw).await?;
            Ok(Box::new(tls) as Box<dyn AsyncDuplex>)
        }) as futures::future::BoxFuture<'static, std::io::Result<Box<dyn AsyncDuplex>>>
    })
}
