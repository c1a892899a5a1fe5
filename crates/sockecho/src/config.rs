use clap::Parser;
use sockecho_uri::{Address, AddressParser, UriError};
use thiserror::Error;

/// Echo everything received on a socket address back to its sender.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Args {
    /// Address to listen on: tcp://HOST:PORT, udp://HOST:PORT or unix://PATH
    pub uri: String,

    /// Pending connection queue length of stream sockets
    #[clap(long, default_value_t = 100)]
    pub backlog: u32,

    /// Most bytes read per request
    #[clap(long, default_value_t = 1024)]
    pub recv_buffer: usize,

    /// Parse the address without the accelerated matcher
    #[clap(long)]
    pub no_jit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub address: Address,
    pub backlog: u32,
    pub recv_buffer: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("uri parsing failed: {0}")]
    Uri(#[from] UriError),
    #[error("receive buffer must hold at least one byte")]
    RecvBuffer,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.recv_buffer == 0 {
            return Err(ConfigError::RecvBuffer);
        }

        let parser = AddressParser::with_jit(!args.no_jit)?;
        let address = parser.parse(&args.uri)?;

        Ok(Config {
            address,
            backlog: args.backlog,
            recv_buffer: args.recv_buffer,
        })
    }
}
