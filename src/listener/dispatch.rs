//! Shared routing logic: parse, classify, forward. Used identically by the
//! UDP and TCP listener loops; only framing and truncation differ per
//! transport.

use crate::classifier;
use crate::context::AppContext;
use crate::dns;
use crate::error::Error;
use crate::forwarder;
use crate::query::{Classification, Query, Transport};

/// Parse the query's domain, classify it, and forward it to the domestic
/// resolver or the DoT broker, returning the raw reply payload.
pub async fn resolve(ctx: &AppContext, query: &mut Query) -> Result<Vec<u8>, Error> {
    query.domain = dns::extract_domain(&query.payload)?;

    let domestic = classifier::is_domestic(ctx.query_cn, &query.domain).await;
    query.classification = if domestic {
        Classification::Domestic
    } else {
        Classification::Foreign
    };

    if domestic {
        match query.transport {
            Transport::Udp => forwarder::forward_udp(&query.payload, ctx.forward_local).await,
            Transport::Tcp => forwarder::forward_tcp(&query.payload, ctx.forward_local).await,
        }
    } else {
        ctx.dot.submit(query.payload.clone()).await
    }
}
