//! Domestic forwarder: one-shot UDP or TCP round trip to the local
//! recursive resolver. No retry at this layer; failures surface directly.

use std::net::SocketAddr;

use tokio::net::{TcpStream, UdpSocket};

use crate::error::Error;
use crate::wire::framing;

/// Forward a raw query over UDP and return the single reply datagram
/// (capped at 512 bytes, matching unextended DNS/UDP).
pub async fn forward_udp(payload: &[u8], upstream: SocketAddr) -> Result<Vec<u8>, Error> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(upstream).await?;
    socket.send(payload).await?;

    let mut buf = [0u8; 512];
    let n = socket.recv(&mut buf).await?;
    Ok(buf[..n].to_vec())
}

/// Forward a raw query over TCP using length-prefixed DNS-over-TCP framing
/// and return the single reply payload (without the length prefix).
pub async fn forward_tcp(payload: &[u8], upstream: SocketAddr) -> Result<Vec<u8>, Error> {
    let mut stream = TcpStream::connect(upstream).await?;
    framing::write_message(&mut stream, payload).await?;
    let reply = framing::read_message(&mut stream).await?;
    Ok(reply)
}
