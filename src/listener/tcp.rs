//! TCP listener: accept loop spawns one handler per connection, which reads
//! exactly one framed query, dispatches it, writes one framed reply, and
//! closes.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::context::AppContext;
use crate::error::Error;
use crate::query::{Query, Transport};
use crate::wire::framing;

use super::dispatch;

async fn handle_connection(ctx: Arc<AppContext>, mut conn: TcpStream, src: SocketAddr) {
    let payload = match framing::read_message(&mut conn).await {
        Ok(payload) => payload,
        Err(e) => {
            let query = Query::new(Vec::new(), src, Transport::Tcp);
            query.log_outcome(Some(&Error::from(e)));
            return;
        }
    };
    let mut query = Query::new(payload, src, Transport::Tcp);

    match dispatch::resolve(&ctx, &mut query).await {
        Ok(reply) => {
            query.log_outcome(None);
            if let Err(e) = framing::write_message(&mut conn, &reply).await {
                tracing::debug!(error = %e, %src, "failed to write TCP reply");
            }
        }
        Err(e) => query.log_outcome(Some(&e)),
    }
}

/// Run the TCP listener on `addr` until a fatal accept error occurs.
pub async fn run(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<(), Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "TCP listener bound");

    loop {
        let (conn, src) = listener.accept().await?;
        let ctx = ctx.clone();
        tokio::spawn(handle_connection(ctx, conn, src));
    }
}
