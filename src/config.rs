//! CLI surface and typed startup configuration, parsed once in `main` and
//! validated into resolved `SocketAddr`s before anything else runs.

use std::net::SocketAddr;

use clap::Parser;

use crate::error::Error;

const DEFAULT_DOT_HOST: &str = "dns.google";
const DEFAULT_DOT_PORT: u16 = 853;

/// Split-horizon DNS forwarder: domestic queries in the clear, foreign
/// queries over DNS-over-TLS through a SOCKS5 proxy.
#[derive(Parser, Debug)]
#[command(name = "horizon-dns", version, about)]
pub struct Cli {
    /// Bind address for both UDP and TCP listeners, unless overridden.
    #[arg(long)]
    pub listen: Option<String>,

    /// UDP-specific bind address; overrides `--listen` for UDP.
    #[arg(long = "listen-udp")]
    pub listen_udp: Option<String>,

    /// TCP-specific bind address; overrides `--listen` for TCP.
    #[arg(long = "listen-tcp")]
    pub listen_tcp: Option<String>,

    /// Address of the domestic recursive resolver.
    #[arg(long = "forward-local")]
    pub forward_local: String,

    /// Address of the SOCKS5 proxy used to reach the DoT resolver.
    #[arg(long = "forward-proxy")]
    pub forward_proxy: String,

    /// Address of the SOCKS5 classification endpoint.
    #[arg(long = "query-cn")]
    pub query_cn: String,

    /// DoT target host and TLS SNI.
    #[arg(long = "dot-host", default_value = DEFAULT_DOT_HOST)]
    pub dot_host: String,

    /// DoT target port.
    #[arg(long = "dot-port", default_value_t = DEFAULT_DOT_PORT)]
    pub dot_port: u16,

    /// Raise the default log filter to debug.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Fully resolved, validated configuration ready to build an
/// [`crate::context::AppContext`] from.
pub struct AppConfig {
    pub listen_udp: Option<SocketAddr>,
    pub listen_tcp: Option<SocketAddr>,
    pub forward_local: SocketAddr,
    pub forward_proxy: SocketAddr,
    pub query_cn: SocketAddr,
    pub dot_host: String,
    pub dot_port: u16,
    pub verbose: bool,
}

impl AppConfig {
    /// Resolve and validate a parsed [`Cli`] into an [`AppConfig`].
    ///
    /// Fails if any address fails to parse, or if neither a UDP nor a TCP
    /// listen address was derivable from `--listen`/`--listen-udp`/`--listen-tcp`.
    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        let parse = |label: &'static str, s: &str| -> Result<SocketAddr, Error> {
            s.parse()
                .map_err(|_| Error::Parse(format!("invalid {label} address: {s}")))
        };

        let listen_udp = cli
            .listen_udp
            .as_deref()
            .or(cli.listen.as_deref())
            .map(|s| parse("listen-udp", s))
            .transpose()?;
        let listen_tcp = cli
            .listen_tcp
            .as_deref()
            .or(cli.listen.as_deref())
            .map(|s| parse("listen-tcp", s))
            .transpose()?;

        if listen_udp.is_none() && listen_tcp.is_none() {
            return Err(Error::Parse(
                "at least one of --listen, --listen-udp, --listen-tcp must be set".into(),
            ));
        }

        Ok(Self {
            listen_udp,
            listen_tcp,
            forward_local: parse("forward-local", &cli.forward_local)?,
            forward_proxy: parse("forward-proxy", &cli.forward_proxy)?,
            query_cn: parse("query-cn", &cli.query_cn)?,
            dot_host: cli.dot_host,
            dot_port: cli.dot_port,
            verbose: cli.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            listen: None,
            listen_udp: None,
            listen_tcp: None,
            forward_local: "127.0.0.1:53".into(),
            forward_proxy: "127.0.0.1:1080".into(),
            query_cn: "127.0.0.1:1081".into(),
            dot_host: DEFAULT_DOT_HOST.into(),
            dot_port: DEFAULT_DOT_PORT,
            verbose: false,
        }
    }

    #[test]
    fn rejects_when_no_listen_address_given() {
        let cli = base_cli();
        assert!(AppConfig::from_cli(cli).is_err());
    }

    #[test]
    fn generic_listen_applies_to_both_transports() {
        let mut cli = base_cli();
        cli.listen = Some("0.0.0.0:53".into());
        let cfg = AppConfig::from_cli(cli).unwrap();
        assert_eq!(cfg.listen_udp.unwrap().port(), 53);
        assert_eq!(cfg.listen_tcp.unwrap().port(), 53);
    }

    #[test]
    fn specific_listen_overrides_generic() {
        let mut cli = base_cli();
        cli.listen = Some("0.0.0.0:53".into());
        cli.listen_tcp = Some("0.0.0.0:5353".into());
        let cfg = AppConfig::from_cli(cli).unwrap();
        assert_eq!(cfg.listen_udp.unwrap().port(), 53);
        assert_eq!(cfg.listen_tcp.unwrap().port(), 5353);
    }

    #[test]
    fn bad_address_is_a_parse_error() {
        let mut cli = base_cli();
        cli.listen = Some("not-an-address".into());
        assert!(matches!(AppConfig::from_cli(cli), Err(Error::Parse(_))));
    }
}
