//! Length-prefixed TCP-DNS framing: a 16-bit big-endian length followed by
//! the payload. Used for DNS-over-TCP, DNS-over-TLS, and between listeners
//! and the domestic TCP forwarder.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read one length-prefixed message, failing if the stream ends early.
pub async fn read_message<S: AsyncRead + Unpin>(stream: &mut S) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let len = u16::from_be_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Write one length-prefixed message in a single `write_all` call.
///
/// Per RFC 7766 §8, the length and payload SHOULD be sent together to
/// avoid adversarial partial-read stalls.
pub async fn write_message<S: AsyncWrite + Unpin>(
    stream: &mut S,
    payload: &[u8],
) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(2 + payload.len());
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_arbitrary_payloads() {
        for payload in [
            Vec::new(),
            vec![0u8; 1],
            vec![0xAB; 512],
            vec![0x42; 65535],
        ] {
            let mut buf = Vec::new();
            write_message(&mut buf, &payload).await.unwrap();
            let mut cursor = std::io::Cursor::new(buf);
            let out = read_message(&mut cursor).await.unwrap();
            assert_eq!(out, payload);
        }
    }

    #[tokio::test]
    async fn early_eof_is_an_error() {
        let mut cursor = std::io::Cursor::new(vec![0x00, 0x05, 0x01, 0x02]); // says len=5, has 2
        let err = read_message(&mut cursor).await;
        assert!(err.is_err());
    }
}
