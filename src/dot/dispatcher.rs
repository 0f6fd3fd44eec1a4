//! The dispatcher/reader pair that drives a single DoT connection's FIFO
//! pipeline, generic over any duplex stream so the reconnect/retry state
//! machine can be exercised against an in-memory fake instead of live TLS.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::wire::framing;

use super::WorkItem;

const INFLIGHT_CAPACITY: usize = 8;

/// Any duplex, ownable, `Send` async byte stream — production wires this to
/// a SOCKS5+TLS connection; tests substitute an in-memory duplex pipe
/// standing in for the "deterministic fake TLS stream".
pub trait AsyncDuplex: AsyncRead + AsyncWrite + Unpin + Send + 'static {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> AsyncDuplex for T {}

/// Opens a fresh connection on demand.
pub type Connector =
    Arc<dyn Fn() -> BoxFuture<'static, io::Result<Box<dyn AsyncDuplex>>> + Send + Sync>;

struct ConnectionHandle {
    write_half: WriteHalf<Box<dyn AsyncDuplex>>,
    inflight_tx: mpsc::Sender<WorkItem>,
    closed: Arc<AtomicBool>,
}

/// Decrement the retry counter; exhaust the item or reinsert it at the tail
/// of the intake queue with a non-blocking send.
fn retry_item(intake_tx: &mpsc::Sender<WorkItem>, mut item: WorkItem) {
    item.retries -= 1;
    if item.retries == 0 {
        let _ = item.reply_tx.send(Err(Error::Exhausted));
        return;
    }
    if let Err(err) = intake_tx.try_send(item) {
        let item = match err {
            mpsc::error::TrySendError::Full(item) => item,
            mpsc::error::TrySendError::Closed(item) => item,
        };
        let _ = item.reply_tx.send(Err(Error::Saturated));
    }
}

/// Single-shot close: only the first caller logs.
fn mark_closed(closed: &AtomicBool, role: &'static str) {
    if !closed.swap(true, Ordering::AcqRel) {
        tracing::info!(role, "DoT connection closed");
    }
}

async fn establish(
    connector: &Connector,
    intake_tx: mpsc::Sender<WorkItem>,
) -> io::Result<ConnectionHandle> {
    let stream = (connector)().await?;
    let (read_half, write_half) = tokio::io::split(stream);
    let (inflight_tx, inflight_rx) = mpsc::channel(INFLIGHT_CAPACITY);
    let closed = Arc::new(AtomicBool::new(false));

    tokio::spawn(run_reader(read_half, inflight_rx, closed.clone(), intake_tx));

    Ok(ConnectionHandle {
        write_half,
        inflight_tx,
        closed,
    })
}

/// Repeatedly read one framed reply, then block waiting for the in-flight
/// queue's head and resolve its completion. Mirrors the source's blocking
/// channel read: a reply that outruns its query's registration simply waits
/// rather than being treated as a violation. On failure (I/O error, or the
/// queue returning empty because the dispatcher already closed and drained
/// it) close the connection and drain+retry whatever is left.
async fn run_reader(
    mut read_half: ReadHalf<Box<dyn AsyncDuplex>>,
    mut inflight_rx: mpsc::Receiver<WorkItem>,
    closed: Arc<AtomicBool>,
    intake_tx: mpsc::Sender<WorkItem>,
) {
    loop {
        match framing::read_message(&mut read_half).await {
            Ok(payload) => match inflight_rx.recv().await {
                Some(item) => {
                    let _ = item.reply_tx.send(Ok(payload));
                }
                None => {
                    // The dispatcher has dropped inflight_tx and the buffer is
                    // drained: a reply arrived with nothing ever outstanding.
                    mark_closed(&closed, "reader");
                    tracing::warn!("DoT reply has no matching query");
                    break;
                }
            },
            Err(e) => {
                mark_closed(&closed, "reader");
                tracing::info!(error = %e, "DoT reader closed");
                break;
            }
        }
    }

    inflight_rx.close();
    while let Some(item) = inflight_rx.recv().await {
        retry_item(&intake_tx, item);
    }
}

/// The single dispatcher task: owns the intake queue, opens connections on
/// demand, writes items to the wire in order, and hands each written item
/// to its connection's reader for FIFO reply matching.
pub async fn run_dispatcher(
    mut intake_rx: mpsc::Receiver<WorkItem>,
    intake_tx: mpsc::Sender<WorkItem>,
    connector: Connector,
) {
    let mut current: Option<ConnectionHandle> = None;

    while let Some(item) = intake_rx.recv().await {
        let need_new = match &current {
            Some(conn) => conn.closed.load(Ordering::Acquire),
            None => true,
        };

        if need_new {
            if let Some(old) = current.take() {
                // Dropping the sender unblocks the reader's drain loop once
                // it has finished emptying whatever was already queued.
                drop(old.inflight_tx);
                let mut write_half = old.write_half;
                let _ = write_half.shutdown().await;
            }
            match establish(&connector, intake_tx.clone()).await {
                Ok(conn) => {
                    tracing::info!("new DoT connection");
                    current = Some(conn);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "DoT connect failed");
                    retry_item(&intake_tx, item);
                    continue;
                }
            }
        }

        let conn = current.as_mut().expect("connection just established");
        match framing::write_message(&mut conn.write_half, &item.payload).await {
            Ok(()) => {
                if let Err(mpsc::error::SendError(item)) = conn.inflight_tx.send(item).await {
                    // Reader closed the in-flight queue between our closed-check
                    // and this send; the item never reached a reader, so treat
                    // it as unresolved rather than silently dropping it.
                    retry_item(&intake_tx, item);
                }
            }
            Err(e) => {
                mark_closed(&conn.closed, "dispatcher");
                tracing::warn!(error = %e, "DoT write failed");
                retry_item(&intake_tx, item);
            }
        }
    }
}
