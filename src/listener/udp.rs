//! UDP listener: one read loop, one handler task per datagram, and a single
//! serialising reply-writer task that owns the socket's write side so
//! concurrent handlers never race each other onto the wire.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::context::AppContext;
use crate::error::Error;
use crate::query::{Classification, Query, Transport};

use super::dispatch;

const MAX_DATAGRAM: usize = 512;
const REPLY_QUEUE_CAPACITY: usize = 64;

/// Truncate a foreign reply to 512 bytes and set the TC flag, matching the
/// source's `payload[2] |= 0x02`. The TCP path never truncates.
fn truncate_with_tc_flag(mut reply: Vec<u8>) -> Vec<u8> {
    reply.truncate(MAX_DATAGRAM);
    if reply.len() > 2 {
        reply[2] |= 0x02;
    }
    reply
}

async fn run_reply_writer(socket: Arc<UdpSocket>, mut rx: mpsc::Receiver<(Vec<u8>, SocketAddr)>) {
    while let Some((payload, dst)) = rx.recv().await {
        if let Err(e) = socket.send_to(&payload, dst).await {
            tracing::warn!(error = %e, %dst, "failed to send UDP reply");
        }
    }
}

async fn handle_datagram(
    ctx: Arc<AppContext>,
    payload: Vec<u8>,
    src: SocketAddr,
    reply_tx: mpsc::Sender<(Vec<u8>, SocketAddr)>,
) {
    let mut query = Query::new(payload, src, Transport::Udp);

    match dispatch::resolve(&ctx, &mut query).await {
        Ok(reply) => {
            let reply = if query.classification == Classification::Foreign
                && reply.len() > MAX_DATAGRAM
            {
                query.truncated = true;
                truncate_with_tc_flag(reply)
            } else {
                reply
            };
            query.log_outcome(None);
            let _ = reply_tx.send((reply, src)).await;
        }
        Err(e) => query.log_outcome(Some(&e)),
    }
}

/// Run the UDP listener on `addr` until a fatal socket error occurs.
pub async fn run(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<(), Error> {
    let socket = Arc::new(UdpSocket::bind(addr).await?);
    tracing::info!(%addr, "UDP listener bound");

    let (reply_tx, reply_rx) = mpsc::channel(REPLY_QUEUE_CAPACITY);
    tokio::spawn(run_reply_writer(socket.clone(), reply_rx));

    let mut buf = [0u8; MAX_DATAGRAM];
    loop {
        let (n, src) = socket.recv_from(&mut buf).await?;
        let payload = buf[..n].to_vec();
        let ctx = ctx.clone();
        let reply_tx = reply_tx.clone();
        tokio::spawn(handle_datagram(ctx, payload, src, reply_tx));
    }
}
