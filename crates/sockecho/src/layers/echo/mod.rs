use crate::util::{received_text, PinResultFuture};
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::task::{Context, Poll};
use tower::Service;
use tracing::debug;

/// Prints every request to stdout and answers with `Echo: "<text>"\n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub peer: Peer,
    pub payload: Vec<u8>,
}

/// Who sent a request. Unix peers are unnamed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Peer {
    Inet(SocketAddr),
    Unix,
}

impl Service<EchoRequest> for EchoService {
    type Response = Vec<u8>;
    type Error = io::Error;
    type Future = PinResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: EchoRequest) -> Self::Future {
        let result = echo(&req);
        Box::pin(async move { result })
    }
}

fn echo(req: &EchoRequest) -> io::Result<Vec<u8>> {
    let text = received_text(&req.payload);
    debug!(peer = %req.peer, len = req.payload.len(), "request");

    let mut out = io::stdout().lock();
    writeln!(out, "{}", request_line(req.peer, req.payload.len(), &text))?;
    out.flush()?;

    Ok(reply(&text).into_bytes())
}

/// The stdout line for one request, `[ip (n)] text` or `[UNIX] text`.
pub fn request_line(peer: Peer, len: usize, text: &str) -> String {
    match peer {
        Peer::Inet(addr) => format!("[{} ({})] {}", addr.ip(), len, text),
        Peer::Unix => format!("[UNIX] {}", text),
    }
}

pub fn reply(text: &str) -> String {
    format!("Echo: \"{}\"\n", text)
}

impl Display for Peer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Peer::Inet(addr) => Display::fmt(addr, f),
            Peer::Unix => f.write_str("unix"),
        }
    }
}
