//! Socket addresses written as URIs.
//!
//! ```not_rust
//! tcp://192.168.0.1:8000   tcp://localhost:1234
//! udp://192.168.0.1:1234
//! unix:///tmp/my.sock      (the path is /tmp/my.sock)
//! ```
//!
//! Only IPv4 hosts and names are supported.


mod error;
mod grammar;

pub use error::{ErrorKind, UriError};
pub use grammar::ADDRESS_PATTERN;

use once_cell::sync::OnceCell;
use sockecho_pattern::{
    compile, match_extract_with, CompiledPattern, Flags, HeapAlloc, NamedCapture, TextAlloc,
};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use tracing::{debug, error};

/// Longest unix socket path, `sun_path` minus the terminating NUL.
pub const UNIX_PATH_MAX: usize = 107;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Tcp { host: String, port: NetworkPort },
    Udp { host: String, port: NetworkPort },
    UnixPath { path: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tcp,
    Udp,
    Unix,
}

/// Whether a scheme hands out connections or datagrams.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Transport {
    Stream,
    Datagram,
}

/// A port kept in network byte order, the way socket addresses carry it.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NetworkPort(u16);

/// Parses addresses with one compiled grammar. Cheap to share between threads.
pub struct AddressParser {
    pattern: CompiledPattern,
}

static SHARED: OnceCell<AddressParser> = OnceCell::new();

/// Parses with a process wide parser, compiling the grammar on first use.
pub fn parse(uri: &str) -> Result<Address, UriError> {
    SHARED.get_or_try_init(AddressParser::new)?.parse(uri)
}

impl AddressParser {
    pub fn new() -> Result<Self, UriError> {
        Self::with_jit(true)
    }

    /// `jit` only decides whether matching may use the accelerated pre-pass.
    pub fn with_jit(jit: bool) -> Result<Self, UriError> {
        let mut flags = grammar::ADDRESS_FLAGS;
        flags.set(Flags::JIT, jit);
        let pattern = compile(ADDRESS_PATTERN, flags)?;
        Ok(Self { pattern })
    }

    pub fn parse(&self, uri: &str) -> Result<Address, UriError> {
        self.parse_with(uri, &HeapAlloc)
    }

    /// Like [`AddressParser::parse`], copying captures through `alloc`.
    pub fn parse_with<A: TextAlloc>(&self, uri: &str, alloc: &A) -> Result<Address, UriError> {
        if uri.is_empty() {
            error!("empty address");
            return Err(UriError::WrongArgs);
        }

        let captures = match_extract_with(&self.pattern, uri, &grammar::GROUP_NAMES, alloc)?;
        let field = |i: usize| value(&captures[i]);
        debug!(
            proto = field(grammar::PROTO),
            host = field(grammar::HOST),
            port = field(grammar::PORT),
            path = field(grammar::PATH),
            "address matched"
        );

        let proto = field(grammar::PROTO).unwrap_or_default();
        let scheme = proto
            .parse::<Scheme>()
            .map_err(|_| UriError::Scheme(proto.to_string()))?;

        let address = match scheme {
            Scheme::Tcp | Scheme::Udp => {
                let port = field(grammar::PORT).unwrap_or_default();
                let port = NetworkPort::parse(port).ok_or_else(|| {
                    error!(port, "port conversion failed");
                    UriError::PortInvalid(port.to_string())
                })?;
                let host = match field(grammar::HOST) {
                    Some(host) if !host.is_empty() => host.to_string(),
                    _ => return Err(UriError::HostMissing),
                };

                if scheme == Scheme::Tcp {
                    Address::Tcp { host, port }
                } else {
                    Address::Udp { host, port }
                }
            }
            Scheme::Unix => {
                let path = field(grammar::PATH).unwrap_or_default();
                if path.is_empty() || path.len() > UNIX_PATH_MAX {
                    error!(len = path.len(), "path conversion failed");
                    return Err(UriError::PathInvalid(path.to_string()));
                }
                Address::UnixPath {
                    path: path.to_string(),
                }
            }
        };

        Ok(address)
    }
}

impl Debug for AddressParser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressParser")
            .field("pattern", &self.pattern)
            .finish()
    }
}

fn value<T: AsRef<str>>(capture: &NamedCapture<T>) -> Option<&str> {
    capture.value.as_ref().map(|v| v.as_ref())
}

impl Address {
    pub fn scheme(&self) -> Scheme {
        match self {
            Address::Tcp { .. } => Scheme::Tcp,
            Address::Udp { .. } => Scheme::Udp,
            Address::UnixPath { .. } => Scheme::Unix,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            Address::Tcp { host, .. } | Address::Udp { host, .. } => Some(host),
            Address::UnixPath { .. } => None,
        }
    }

    pub fn port(&self) -> Option<NetworkPort> {
        match self {
            Address::Tcp { port, .. } | Address::Udp { port, .. } => Some(*port),
            Address::UnixPath { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Address::UnixPath { path } => Some(path),
            _ => None,
        }
    }
}

impl FromStr for Address {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Tcp { host, port } | Address::Udp { host, port } => {
                write!(f, "{}://{}:{}", self.scheme(), host, port)
            }
            Address::UnixPath { path } => write!(f, "unix://{}", path),
        }
    }
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Tcp => "tcp",
            Scheme::Udp => "udp",
            Scheme::Unix => "unix",
        }
    }

    pub fn transport(&self) -> Transport {
        match self {
            Scheme::Tcp | Scheme::Unix => Transport::Stream,
            Scheme::Udp => Transport::Datagram,
        }
    }
}

impl FromStr for Scheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Scheme::Tcp),
            "udp" => Ok(Scheme::Udp),
            "unix" => Ok(Scheme::Unix),
            _ => Err(()),
        }
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetworkPort {
    /// `None` unless `port` is a base 10 number in `1..=65535`.
    pub fn parse(port: &str) -> Option<Self> {
        let port = port.parse::<u32>().ok()?;
        let port = u16::try_from(port).ok().filter(|p| *p != 0)?;
        Some(Self::from_host(port))
    }

    pub fn from_host(port: u16) -> Self {
        Self(port.to_be())
    }

    /// The port as a plain number.
    pub fn get(self) -> u16 {
        u16::from_be(self.0)
    }

    /// The raw value in network byte order.
    pub fn to_network(self) -> u16 {
        self.0
    }
}

impl Debug for NetworkPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "NetworkPort({})", self.get())
    }
}

impl Display for NetworkPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.get(), f)
    }
}
