use sockecho_uri::NetworkPort;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use thiserror::Error;
use tokio::net::lookup_host;
use tracing::info;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not resolve host `{host}`: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("host `{0}` has no IPv4 address")]
    NoIpv4(String),
}

/// First IPv4 address the system resolver knows for `host`.
pub async fn resolve(host: &str, port: NetworkPort) -> Result<SocketAddrV4, ResolveError> {
    let addrs = lookup_host((host, port.get()))
        .await
        .map_err(|source| ResolveError::Lookup {
            host: host.to_string(),
            source,
        })?;

    let addr = addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(addr) => Some(addr),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ResolveError::NoIpv4(host.to_string()))?;

    info!(host, addr = %addr.ip(), "resolved host");
    Ok(addr)
}
