//! The DoT broker: the one long-lived, multiplexed, pipelined TLS
//! connection shared by every concurrent query-handling task.
//!
//! [`DotBroker::submit`] is the only entry point. Connection lifecycle,
//! FIFO reply matching, reconnection, and bounded retries are fully
//! internalised — callers only ever see the final outcome.

mod connect;
mod dispatcher;

pub use connect::make_connector;
pub use dispatcher::Connector;

use tokio::sync::{mpsc, oneshot};

use crate::error::Error;

const INTAKE_CAPACITY: usize = 16;
const INITIAL_RETRIES: u8 = 3;

/// An immutable {payload, completion} pair plus a mutable retry counter.
/// Exclusive to the broker once submitted, except the completion sink,
/// which the broker resolves exactly once.
pub(crate) struct WorkItem {
    payload: Vec<u8>,
    reply_tx: oneshot::Sender<Result<Vec<u8>, Error>>,
    retries: u8,
}

/// Cheap, clonable handle to the DoT broker's intake queue.
#[derive(Clone)]
pub struct DotBroker {
    intake_tx: mpsc::Sender<WorkItem>,
}

impl DotBroker {
    /// Spawn the dispatcher task and return a handle to it.
    pub fn spawn(connector: Connector) -> Self {
        let (intake_tx, intake_rx) = mpsc::channel(INTAKE_CAPACITY);
        let retry_tx = intake_tx.clone();
        tokio::spawn(dispatcher::run_dispatcher(intake_rx, retry_tx, connector));
        Self { intake_tx }
    }

    /// Submit a raw DNS payload and await the eventual reply or terminal
    /// error. Multiple submissions may be outstanding concurrently.
    pub async fn submit(&self, payload: Vec<u8>) -> Result<Vec<u8>, Error> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let item = WorkItem {
            payload,
            reply_tx,
            retries: INITIAL_RETRIES,
        };

        self.intake_tx
            .send(item)
            .await
            .map_err(|_| Error::Protocol("DoT dispatcher is gone".into()))?;

        reply_rx
            .await
            .map_err(|_| Error::Protocol("DoT completion was dropped".into()))?
    }
}
