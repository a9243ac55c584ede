use crate::BoxError;
use std::future::Future;
use std::marker::PhantomData;

/// Represents a request to the mediator.
///
/// Requests are routed by their [`KIND`](Request::KIND) tag, so two request
/// types must never share the same tag on the same mediator.
pub trait Request: Send + Sync + 'static {
    /// Stable tag used to route the request to its handler.
    const KIND: &'static str;

    /// Type of the response produced by the handler.
    type Response: Send + Sync + 'static;

    /// Returns the routing tag of this request.
    fn kind(&self) -> &'static str {
        Self::KIND
    }
}

/// Handles a request to the mediator.
#[async_trait::async_trait]
pub trait RequestHandler<Req>: Send + Sync + 'static
where
    Req: Request,
{
    /// Handle a request and returns the response.
    async fn handle(&self, req: &Req) -> Result<Req::Response, BoxError>;
}

/// A [`RequestHandler`] backed by an async function.
pub struct FnHandler<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut> {
    /// Wraps `f` as a request handler.
    pub fn new(f: F) -> Self {
        FnHandler {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<Req, F, Fut> RequestHandler<Req> for FnHandler<F, Fut>
where
    Req: Request,
    F: Fn(&Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Req::Response, BoxError>> + Send + 'static,
{
    async fn handle(&self, req: &Req) -> Result<Req::Response, BoxError> {
        (self.f)(req).await
    }
}
