//! SOCKS5 CONNECT handshake with a domain-name address type, no
//! authentication. Ported from the source's `socks5Handshake`.
//!
//! Request encoding is split out from reply validation because the
//! classifier (§4.3) reuses only the former — it inspects raw byte counts
//! on the reply rather than validating the standard reply prefix.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Error;

const SUCCESS_PREFIX: [u8; 5] = [0x05, 0x00, 0x05, 0x00, 0x00];

/// Build the greeting + CONNECT request for a domain-name target.
///
/// `05 01 00` declares one method (no-auth); `05 01 00 03 <len><domain><port>`
/// is the CONNECT request with address type 0x03 (domain name).
pub fn encode_connect_request(domain: &str, port: u16) -> Result<Vec<u8>, Error> {
    if domain.len() > 255 {
        return Err(Error::Protocol(format!(
            "domain name too long for SOCKS5: {} bytes",
            domain.len()
        )));
    }

    let mut req = Vec::with_capacity(10 + domain.len());
    req.extend_from_slice(&[0x05, 0x01, 0x00, 0x05, 0x01, 0x00, 0x03]);
    req.push(domain.len() as u8);
    req.extend_from_slice(domain.as_bytes());
    req.extend_from_slice(&port.to_be_bytes());
    Ok(req)
}

/// Perform the full CONNECT handshake: send the request, read the 12-byte
/// reply, and require it to start with `05 00 05 00 00`.
pub async fn connect<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    domain: &str,
    port: u16,
) -> Result<(), Error> {
    let req = encode_connect_request(domain, port)?;
    stream
        .write_all(&req)
        .await
        .map_err(|e| Error::Connect(format!("SOCKS5 write failed: {e}")))?;

    let mut reply = [0u8; 12];
    stream
        .read_exact(&mut reply)
        .await
        .map_err(|e| Error::Connect(format!("SOCKS5 reply read failed: {e}")))?;

    if reply[..SUCCESS_PREFIX.len()] != SUCCESS_PREFIX {
        return Err(Error::Protocol(format!(
            "unexpected SOCKS5 reply: {reply:02x?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_greeting_and_connect_request() {
        let req = encode_connect_request("dns.google", 853).unwrap();
        assert_eq!(&req[..7], &[0x05, 0x01, 0x00, 0x05, 0x01, 0x00, 0x03]);
        assert_eq!(req[7], b"dns.google".len() as u8);
        assert_eq!(&req[8..8 + 10], b"dns.google");
        assert_eq!(&req[18..20], &853u16.to_be_bytes());
    }

    #[test]
    fn rejects_overlong_domain() {
        let domain = "a".repeat(256);
        assert!(encode_connect_request(&domain, 80).is_err());
    }

    #[tokio::test]
    async fn connect_succeeds_on_valid_reply() {
        let (mut client, mut server) = tokio::io::duplex(256);
        let handshake = tokio::spawn(async move { connect(&mut client, "example.com", 80).await });

        // Drain the request, then answer with a valid reply prefix.
        let mut buf = [0u8; 256];
        let _ = tokio::io::AsyncReadExt::read(&mut server, &mut buf).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut server, &[0x05, 0x00, 0x05, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0])
            .await
            .unwrap();

        handshake.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn connect_fails_on_bad_reply() {
        let (mut client, mut server) = tokio::io::duplex(256);
        let handshake = tokio::spawn(async move { connect(&mut client, "example.com", 80).await });

        let mut buf = [0u8; 256];
        let _ = tokio::io::AsyncReadExt::read(&mut server, &mut buf).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut server, &[0u8; 12])
            .await
            .unwrap();

        assert!(handshake.await.unwrap().is_err());
    }
}
