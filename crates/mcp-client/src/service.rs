use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{timeout::Timeout, Service, ServiceBuilder};

use crate::transport::{Error, Transport, TransportRequest, TransportResponse};

/// A wrapper service that implements Tower's Service trait for MCP transport
///
/// Each call is a single round-trip on the transport. Nothing is shared
/// between calls except the transport itself, so clones can be driven
/// concurrently from different tasks.
#[derive(Clone)]
pub struct McpService<T: Transport> {
    inner: Arc<T>,
}

impl<T: Transport> McpService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(transport),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    /// Wraps the service so that every call is abandoned after `timeout`.
    pub fn with_timeout(transport: T, timeout: std::time::Duration) -> Timeout<McpService<T>> {
        ServiceBuilder::new()
            .timeout(timeout)
            .service(McpService::new(transport))
    }
}

impl<T> Service<TransportRequest> for McpService<T>
where
    T: Transport,
{
    type Response = TransportResponse;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // One request per call; there is no queue to fill up.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: TransportRequest) -> Self::Future {
        let transport = self.inner.clone();
        Box::pin(async move { transport.send(request).await })
    }
}
