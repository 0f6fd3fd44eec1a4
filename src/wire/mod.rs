//! Wire-format codecs shared by every transport: TCP-DNS length-prefixed
//! framing and the SOCKS5 CONNECT handshake.

pub mod framing;
pub mod socks5;
