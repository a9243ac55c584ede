use crate::request::{FnHandler, RequestHandler};
use crate::{BoxError, DefaultMediator, Request};
use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;

#[cfg(feature = "global")]
static GLOBAL: once_cell::sync::Lazy<DefaultMediator> =
    once_cell::sync::Lazy::new(DefaultMediator::new);

#[cfg(feature = "global")]
impl DefaultMediator {
    /// Returns the process-wide mediator.
    ///
    /// Prefer passing a [DefaultMediator] around explicitly; tests in particular
    /// should build their own instance.
    pub fn global() -> &'static DefaultMediator {
        &GLOBAL
    }
}

/// Binds a handler for `Req` to a mediator at initialization time.
///
/// # Example
/// ```rust
/// use mediator::{BoxError, DefaultMediator, Handle, Request, RequestHandler};
///
/// struct PingRequest;
/// impl Request for PingRequest {
///     const KIND: &'static str = "PingRequest";
///     type Response = &'static str;
/// }
///
/// struct PingHandler;
///
/// #[mediator::async_trait]
/// impl RequestHandler<PingRequest> for PingHandler {
///     async fn handle(&self, _: &PingRequest) -> Result<&'static str, BoxError> {
///         Ok("pong")
///     }
/// }
///
/// let mediator = DefaultMediator::new();
/// Handle::<PingRequest>::on(&mediator).bind(PingHandler);
///
/// assert!(mediator.contains("PingRequest"));
/// ```
#[must_use = "a `Handle` does nothing until `bind` is called"]
pub struct Handle<'m, Req> {
    mediator: &'m DefaultMediator,
    kind: Cow<'static, str>,
    _marker: PhantomData<fn(Req)>,
}

#[cfg(feature = "global")]
impl<Req: Request> Handle<'static, Req> {
    /// Targets the process-wide mediator.
    pub fn new() -> Self {
        Self::on(DefaultMediator::global())
    }
}

#[cfg(feature = "global")]
impl<Req: Request> Default for Handle<'static, Req> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'m, Req: Request> Handle<'m, Req> {
    /// Targets `mediator`.
    pub fn on(mediator: &'m DefaultMediator) -> Self {
        Handle {
            mediator,
            kind: Cow::Borrowed(Req::KIND),
            _marker: PhantomData,
        }
    }

    /// Overrides the request kind the handler is bound to.
    pub fn kind(mut self, kind: impl Into<Cow<'static, str>>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Binds `handler`, replacing any handler already bound to the kind.
    pub fn bind<H>(self, handler: H)
    where
        H: RequestHandler<Req>,
    {
        self.mediator.register_as::<Req, H>(self.kind, handler);
    }

    /// Binds an async function as the handler.
    pub fn bind_fn<F, Fut>(self, f: F)
    where
        F: Fn(&Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Req::Response, BoxError>> + Send + 'static,
    {
        self.bind(FnHandler::new(f));
    }
}

/// Registers request handlers, in order.
///
/// Without a target the handlers are bound to [DefaultMediator::global].
///
/// # Example
/// ```rust,ignore
/// mediator::handle! {
///     in mediator;
///     SayHelloRequest => SayHelloHandler,
///     SayGoodbyeRequest => SayGoodbyeHandler,
/// }
///
/// mediator::handle!(SayHelloRequest => SayHelloHandler);
/// ```
#[cfg(feature = "macros")]
#[macro_export]
macro_rules! handle {
    (in $mediator:expr; $($req:ty => $handler:expr),+ $(,)?) => {{
        let mediator: &$crate::DefaultMediator = &$mediator;
        $( $crate::Handle::<$req>::on(mediator).bind($handler); )+
    }};
    ($($req:ty => $handler:expr),+ $(,)?) => {{
        $( $crate::Handle::<$req>::new().bind($handler); )+
    }};
}
