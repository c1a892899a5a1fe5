use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;

pub type PinResultFuture<R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'static>>;

/// Received bytes as text, up to the first NUL. Invalid UTF-8 is replaced.
pub fn received_text(payload: &[u8]) -> Cow<'_, str> {
    let end = payload
        .iter()
        .position(|b| *b == 0)
        .unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end])
}
