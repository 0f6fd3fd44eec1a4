//! Listener adapters: the UDP and TCP entry points that turn raw bytes
//! into a [`crate::query::Query`] and drive it through [`dispatch::resolve`].

mod dispatch;
pub mod tcp;
pub mod udp;
