use crate::error::Error;
use crate::futures::{settle, Settled};
use crate::hooks::Hooks;
use crate::request::{FnHandler, RequestHandler};
use crate::{
    AfterHook, BeforeHook, BoxError, FnAfterHook, FnBeforeHook, HookHandle, Request, RequestRef,
    ResponseRef,
};
use futures::future::join_all;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// A mediator is a central hub for communication between components.
#[async_trait::async_trait]
pub trait Mediator {
    /// Sends a request to the handler bound to its kind.
    ///
    /// Returns `Ok(None)` if no handler is bound to the request kind.
    async fn send<Req>(&self, req: Req) -> crate::Result<Option<Req::Response>>
    where
        Req: Request;
}

// A bound handler, stored as `Arc<dyn RequestHandler<Req>>` behind `Any` so the
// map can hold handlers for any request type.
struct HandlerEntry {
    handler: Box<dyn Any + Send + Sync>,
    request_type: &'static str,
}

#[derive(Default)]
struct Shared {
    handlers: RwLock<HashMap<String, HandlerEntry>>,
    before_hooks: Arc<Hooks<dyn BeforeHook>>,
    after_hooks: Arc<Hooks<dyn AfterHook>>,
}

/// A default implementation for the [Mediator] trait.
///
/// Clones share the same handlers and hooks.
#[derive(Clone, Default)]
pub struct DefaultMediator {
    shared: Arc<Shared>,
}

impl DefaultMediator {
    /// Constructs an empty mediator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a [DefaultMediator] builder.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Binds `handler` to the kind of `Req`, replacing any handler already bound to it.
    pub fn register<Req, H>(&self, handler: H)
    where
        Req: Request,
        H: RequestHandler<Req>,
    {
        self.register_as::<Req, H>(Req::KIND, handler);
    }

    /// Binds an async function as the handler for the kind of `Req`.
    pub fn register_fn<Req, F, Fut>(&self, f: F)
    where
        Req: Request,
        F: Fn(&Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Req::Response, BoxError>> + Send + 'static,
    {
        self.register::<Req, _>(FnHandler::new(f));
    }

    /// Binds `handler` to an explicit request kind.
    ///
    /// Only requests whose [`Request::kind`] returns `kind` reach the handler.
    pub fn register_as<Req, H>(&self, kind: impl Into<String>, handler: H)
    where
        Req: Request,
        H: RequestHandler<Req>,
    {
        let kind = kind.into();
        let handler: Arc<dyn RequestHandler<Req>> = Arc::new(handler);
        let entry = HandlerEntry {
            handler: Box::new(handler),
            request_type: type_name::<Req>(),
        };

        let mut handlers = self
            .shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match handlers.insert(kind.clone(), entry) {
            Some(previous) => log::debug!(
                "replaced handler for `{}` ({} -> {})",
                kind,
                previous.request_type,
                type_name::<Req>()
            ),
            None => log::trace!("registered handler for `{}` ({})", kind, type_name::<Req>()),
        }
    }

    /// Removes the handler bound to `kind`. Returns `true` if there was one.
    pub fn unregister(&self, kind: &str) -> bool {
        self.shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(kind)
            .is_some()
    }

    /// Returns `true` if a handler is bound to `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.shared
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(kind)
    }

    /// Registers a hook that runs before every handler.
    ///
    /// Before hooks of a request run concurrently and all settle before the
    /// handler starts. Their failures are ignored.
    pub fn before_each<H>(&self, hook: H) -> HookHandle
    where
        H: BeforeHook,
    {
        let handle = self.shared.before_hooks.push(Arc::new(hook));
        log::trace!("added before hook {:?}", handle);
        handle
    }

    /// Registers an async function that runs before every handler.
    pub fn before_each_fn<F, Fut>(&self, f: F) -> HookHandle
    where
        F: Fn(RequestRef<'_>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.before_each(FnBeforeHook::new(f))
    }

    /// Registers a hook that runs after every handler, whether it succeeded or not.
    ///
    /// After hooks of a request run concurrently once the handler settled.
    /// Their failures are ignored.
    pub fn after_each<H>(&self, hook: H) -> HookHandle
    where
        H: AfterHook,
    {
        let handle = self.shared.after_hooks.push(Arc::new(hook));
        log::trace!("added after hook {:?}", handle);
        handle
    }

    /// Registers an async function that runs after every handler.
    pub fn after_each_fn<F, Fut>(&self, f: F) -> HookHandle
    where
        F: Fn(RequestRef<'_>, ResponseRef<'_>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.after_each(FnAfterHook::new(f))
    }

    /// Returns the number of registered before and after hooks.
    pub fn hook_count(&self) -> (usize, usize) {
        (
            self.shared.before_hooks.len(),
            self.shared.after_hooks.len(),
        )
    }

    fn resolve<Req>(&self, kind: &str) -> crate::Result<Option<Arc<dyn RequestHandler<Req>>>>
    where
        Req: Request,
    {
        let handlers = self
            .shared
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = handlers.get(kind) else {
            return Ok(None);
        };

        match entry.handler.downcast_ref::<Arc<dyn RequestHandler<Req>>>() {
            Some(handler) => Ok(Some(handler.clone())),
            None => Err(Error::type_mismatch(
                kind,
                entry.request_type,
                type_name::<Req>(),
            )),
        }
    }

    async fn run_before_hooks(&self, req: RequestRef<'_>) {
        let hooks = self.shared.before_hooks.snapshot();
        if hooks.is_empty() {
            return;
        }

        join_all(
            hooks
                .iter()
                .map(|hook| settle(async move { hook.before(req).await })),
        )
        .await;
    }

    async fn run_after_hooks(&self, req: RequestRef<'_>, res: ResponseRef<'_>) {
        let hooks = self.shared.after_hooks.snapshot();
        if hooks.is_empty() {
            return;
        }

        join_all(
            hooks
                .iter()
                .map(|hook| settle(async move { hook.after(req, res).await })),
        )
        .await;
    }
}

#[async_trait::async_trait]
impl Mediator for DefaultMediator {
    async fn send<Req>(&self, req: Req) -> crate::Result<Option<Req::Response>>
    where
        Req: Request,
    {
        let kind = req.kind();
        let Some(handler) = self.resolve::<Req>(kind)? else {
            log::debug!("no handler bound for `{}`", kind);
            return Ok(None);
        };

        let request = RequestRef::new(kind, &req);
        self.run_before_hooks(request).await;

        log::trace!("handling `{}`", kind);
        let settled = settle(async { handler.handle(&req).await }).await;

        let response = match &settled {
            Settled::Ok(res) => ResponseRef::new(res),
            _ => ResponseRef::absent(),
        };
        self.run_after_hooks(request, response).await;

        match settled {
            Settled::Ok(res) => Ok(Some(res)),
            Settled::Err(err) => Err(Error::handler(kind, err)),
            Settled::Panicked(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// A builder for the [DefaultMediator].
pub struct Builder {
    inner: DefaultMediator,
}

impl Builder {
    /// Constructs a new `Builder`.
    pub fn new() -> Self {
        Builder {
            inner: DefaultMediator::new(),
        }
    }

    /// Registers a request handler.
    pub fn add_handler<Req, H>(self, handler: H) -> Self
    where
        Req: Request,
        H: RequestHandler<Req>,
    {
        self.inner.register::<Req, H>(handler);
        self
    }

    /// Registers a request handler from an async function.
    pub fn add_handler_fn<Req, F, Fut>(self, f: F) -> Self
    where
        Req: Request,
        F: Fn(&Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Req::Response, BoxError>> + Send + 'static,
    {
        self.inner.register_fn::<Req, F, Fut>(f);
        self
    }

    /// Registers a hook that runs before every handler.
    pub fn before_each<H: BeforeHook>(self, hook: H) -> Self {
        self.inner.before_each(hook);
        self
    }

    /// Registers an async function that runs before every handler.
    pub fn before_each_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(RequestRef<'_>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.inner.before_each_fn(f);
        self
    }

    /// Registers a hook that runs after every handler.
    pub fn after_each<H: AfterHook>(self, hook: H) -> Self {
        self.inner.after_each(hook);
        self
    }

    /// Registers an async function that runs after every handler.
    pub fn after_each_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(RequestRef<'_>, ResponseRef<'_>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.inner.after_each_fn(f);
        self
    }

    /// Builds the mediator.
    pub fn build(self) -> DefaultMediator {
        self.inner
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn _assert_send_sync() {
    fn assert_send_sync<T: Send + Sync>(_: T) {}
    assert_send_sync(DefaultMediator::new());
}
