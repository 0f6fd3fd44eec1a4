//! Domestic/foreign classification via a SOCKS5 probe.
//!
//! Ported from the source's `queryCN`: the classification endpoint is a
//! SOCKS5-speaking black box that closes the connection after exactly 12
//! reply bytes for domestic targets, and keeps the tunnel open (so a 13th
//! byte is available) for foreign ones. Any failure defaults conservatively
//! to domestic, per the source and the design's error-propagation policy.

use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::wire::socks5;

const CLASSIFY_PORT: u16 = 80;

enum Probe {
    /// Full 13-byte read succeeded: not domestic.
    Foreign,
    /// Exactly 12 bytes then EOF: domestic.
    Domestic,
    /// Anything else: dial failure, write failure, unexpected short read.
    Ambiguous,
}

async fn probe(endpoint: SocketAddr, domain: &str) -> std::io::Result<Probe> {
    let mut stream = TcpStream::connect(endpoint).await?;

    let req = socks5::encode_connect_request(domain, CLASSIFY_PORT)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    tokio::io::AsyncWriteExt::write_all(&mut stream, &req).await?;

    let mut buf = [0u8; 13];
    let mut total = 0;
    loop {
        match stream.read(&mut buf[total..]).await {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                if total == buf.len() {
                    break;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(match total {
        13 => Probe::Foreign,
        12 => Probe::Domestic,
        _ => Probe::Ambiguous,
    })
}

/// Decide whether `domain` should be resolved domestically.
///
/// An empty domain (failed parse upstream) is treated as domestic without
/// any network call.
pub async fn is_domestic(endpoint: SocketAddr, domain: &str) -> bool {
    if domain.is_empty() {
        return true;
    }

    match probe(endpoint, domain).await {
        Ok(Probe::Foreign) => false,
        Ok(Probe::Domestic) => true,
        Ok(Probe::Ambiguous) => true,
        Err(e) => {
            tracing::debug!(%domain, error = %e, "classification probe failed, defaulting to domestic");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    async fn fake_endpoint(reply_len: usize) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut conn, _)) = listener.accept().await {
                let mut buf = vec![0u8; 256];
                let _ = conn.read(&mut buf).await;
                let reply = vec![0u8; reply_len];
                let _ = conn.write_all(&reply).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn twelve_bytes_then_eof_is_domestic() {
        let addr = fake_endpoint(12).await;
        assert!(is_domestic(addr, "example.cn").await);
    }

    #[tokio::test]
    async fn thirteen_bytes_is_foreign() {
        let addr = fake_endpoint(13).await;
        assert!(!is_domestic(addr, "example.com").await);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_domestic() {
        // Port 0 never accepts connections once dropped; use a closed listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(is_domestic(addr, "example.com").await);
    }

    #[tokio::test]
    async fn empty_domain_is_domestic_without_network_call() {
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        assert!(is_domestic(addr, "").await);
    }

    #[tokio::test]
    async fn unexpected_short_read_is_domestic() {
        let addr = fake_endpoint(5).await;
        assert!(is_domestic(addr, "example.com").await);
    }
}
