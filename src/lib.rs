//! horizon-dns - a split-horizon DNS forwarder.
//!
//! Domestic queries are forwarded in the clear to a nearby recursive
//! resolver; foreign queries are tunneled over DNS-over-TLS through a
//! SOCKS5 proxy, decided per-domain by a SOCKS5-based classifier probe.
//!
//! # Architecture
//!
//! - [`wire`] - TCP-DNS length-prefixed framing and the SOCKS5 handshake
//! - [`dns`] - DNS message parsing (first-question domain extraction)
//! - [`classifier`] - domestic/foreign decision via a SOCKS5 probe
//! - [`forwarder`] - one-shot domestic UDP/TCP round trips
//! - [`dot`] - the DoT broker: the multiplexed, pipelined TLS connection
//! - [`listener`] - UDP and TCP listener adapters
//! - [`config`] / [`context`] - CLI parsing and the shared application context

pub mod classifier;
pub mod config;
pub mod context;
pub mod dns;
pub mod dot;
pub mod error;
pub mod forwarder;
pub mod listener;
pub mod query;
pub mod wire;
