use crate::message::{Endpoint, Request, Response};
use async_trait::async_trait;

/// One request/response round trip against a remote peer.
///
/// Implementations own the whole transport story for their hop:
/// retransmission, timeouts, congestion control. The forwarding layer
/// never retries; it awaits exactly one `send` per transaction and
/// treats `None` ("no response obtained": timeout, unreachable,
/// transport error) as a normal outcome. Ordinary network failure must
/// never surface as a panic or error from this trait.
///
/// Any sockets or per-exchange state an implementation acquires are
/// expected to be scoped to the single call, released before `send`
/// returns.
#[async_trait]
pub trait OutboundClient: Send + Sync {
    async fn send(&self, destination: &Endpoint, request: Request) -> Option<Response>;
}
