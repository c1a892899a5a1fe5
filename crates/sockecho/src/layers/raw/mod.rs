use crate::layers::echo::{EchoRequest, Peer};
use crate::util::PinResultFuture;
use std::io;
use std::task::{Context, Poll};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::Service;
use tracing::debug;

pub mod stream;

pub use stream::EchoStream;

/// Runs one exchange per connection: a single read of at most
/// `recv_buffer` bytes, the inner service's reply, then close.
#[derive(Debug, Clone)]
pub struct RawService<S> {
    inner: S,
    recv_buffer: usize,
}

pub struct RawRequest {
    pub stream: EchoStream,
    pub peer: Peer,
}

impl<S> RawService<S> {
    pub fn new(inner: S, recv_buffer: usize) -> Self {
        Self { inner, recv_buffer }
    }
}

impl<S> Service<RawRequest> for RawService<S>
where
    S: Service<EchoRequest, Response = Vec<u8>, Error = io::Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = ();
    type Error = io::Error;
    type Future = PinResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, RawRequest { mut stream, peer }: RawRequest) -> Self::Future {
        // the ready clone is the one polled above
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let recv_buffer = self.recv_buffer;

        Box::pin(async move {
            let mut payload = vec![0; recv_buffer];
            let n = stream.read(&mut payload).await?;
            payload.truncate(n);

            let reply = inner.call(EchoRequest { peer, payload }).await?;
            stream.write_all(&reply).await?;

            if let Err(err) = stream.shutdown().await {
                debug!(%err, "shutdown after reply failed");
            }
            Ok(())
        })
    }
}
