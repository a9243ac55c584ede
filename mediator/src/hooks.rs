use crate::BoxError;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// A borrowed, type-erased view of the request being dispatched.
#[derive(Clone, Copy)]
pub struct RequestRef<'a> {
    kind: &'a str,
    type_name: &'static str,
    value: &'a (dyn Any + Send + Sync),
}

impl<'a> RequestRef<'a> {
    pub(crate) fn new<T>(kind: &'a str, value: &'a T) -> Self
    where
        T: Any + Send + Sync,
    {
        RequestRef {
            kind,
            type_name: std::any::type_name::<T>(),
            value,
        }
    }

    /// Returns the routing tag of the request.
    pub fn kind(&self) -> &'a str {
        self.kind
    }

    /// Returns the Rust type name of the request.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the request is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns the request as a `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for RequestRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestRef")
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A borrowed, type-erased view of the handler response.
///
/// The response is absent when the handler failed.
#[derive(Clone, Copy)]
pub struct ResponseRef<'a> {
    value: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> ResponseRef<'a> {
    pub(crate) fn new<T>(value: &'a T) -> Self
    where
        T: Any + Send + Sync,
    {
        ResponseRef { value: Some(value) }
    }

    pub(crate) fn absent() -> Self {
        ResponseRef { value: None }
    }

    /// Returns `true` if the handler produced a response.
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the response as a `T`, if the handler succeeded and produced a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for ResponseRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseRef")
            .field("present", &self.is_present())
            .finish()
    }
}

/// A hook that runs before the handler of every dispatched request.
#[async_trait::async_trait]
pub trait BeforeHook: Send + Sync + 'static {
    /// Called with the request before its handler starts.
    async fn before(&self, req: RequestRef<'_>) -> Result<(), BoxError>;
}

/// A hook that runs after the handler of every dispatched request, even when the handler fails.
#[async_trait::async_trait]
pub trait AfterHook: Send + Sync + 'static {
    /// Called with the request and the handler response once the handler settled.
    async fn after(&self, req: RequestRef<'_>, res: ResponseRef<'_>) -> Result<(), BoxError>;
}

/// A [`BeforeHook`] backed by an async function.
pub struct FnBeforeHook<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnBeforeHook<F, Fut> {
    /// Wraps `f` as a before hook.
    pub fn new(f: F) -> Self {
        FnBeforeHook {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<F, Fut> BeforeHook for FnBeforeHook<F, Fut>
where
    F: Fn(RequestRef<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn before(&self, req: RequestRef<'_>) -> Result<(), BoxError> {
        (self.f)(req).await
    }
}

/// An [`AfterHook`] backed by an async function.
pub struct FnAfterHook<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnAfterHook<F, Fut> {
    /// Wraps `f` as an after hook.
    pub fn new(f: F) -> Self {
        FnAfterHook {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<F, Fut> AfterHook for FnAfterHook<F, Fut>
where
    F: Fn(RequestRef<'_>, ResponseRef<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn after(&self, req: RequestRef<'_>, res: ResponseRef<'_>) -> Result<(), BoxError> {
        (self.f)(req, res).await
    }
}

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

struct HookEntry<H: ?Sized> {
    id: u64,
    hook: Arc<H>,
}

// An ordered list of hooks, in registration order.
pub(crate) struct Hooks<H: ?Sized> {
    entries: RwLock<Vec<HookEntry<H>>>,
}

impl<H: ?Sized> Default for Hooks<H> {
    fn default() -> Self {
        Hooks {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<H> Hooks<H>
where
    H: ?Sized + Send + Sync + 'static,
{
    pub fn push(self: &Arc<Self>, hook: Arc<H>) -> HookHandle {
        let id = NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HookEntry { id, hook });

        let hooks: Weak<dyn Detach> = Arc::downgrade(self) as Weak<dyn Detach>;
        HookHandle { id, hooks }
    }

    /// Copies the current hooks, so hooks added or removed while a phase runs
    /// only take effect on the next phase.
    pub fn snapshot(&self) -> Vec<Arc<H>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.hook.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
}

impl<H> Detach for Hooks<H>
where
    H: ?Sized + Send + Sync + 'static,
{
    fn detach(&self, id: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Removes the hook it was returned for.
///
/// Dropping the handle keeps the hook registered.
#[derive(Clone)]
pub struct HookHandle {
    id: u64,
    hooks: Weak<dyn Detach>,
}

impl HookHandle {
    /// Removes the hook from the mediator.
    ///
    /// Returns `true` if this call removed the hook, `false` if it was already
    /// removed or the mediator no longer exists.
    pub fn remove(&self) -> bool {
        let removed = match self.hooks.upgrade() {
            Some(hooks) => hooks.detach(self.id),
            None => false,
        };

        if removed {
            log::trace!("removed hook #{}", self.id);
        }

        removed
    }
}

impl fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str);

    fn tags(hooks: &Hooks<Tag>) -> Vec<&'static str> {
        hooks.snapshot().iter().map(|tag| tag.0).collect()
    }

    #[test]
    fn remove_splices_only_its_own_entry() {
        let hooks = Arc::new(Hooks::<Tag>::default());
        let a = hooks.push(Arc::new(Tag("a")));
        let b = hooks.push(Arc::new(Tag("b")));
        let _c = hooks.push(Arc::new(Tag("c")));

        assert!(a.remove());
        assert_eq!(tags(&hooks), ["b", "c"]);

        // Removing again must not take a sibling with it.
        assert!(!a.remove());
        assert_eq!(tags(&hooks), ["b", "c"]);

        assert!(b.remove());
        assert_eq!(tags(&hooks), ["c"]);
    }

    #[test]
    fn remove_after_owner_dropped_is_noop() {
        let hooks = Arc::new(Hooks::<Tag>::default());
        let handle = hooks.push(Arc::new(Tag("a")));
        drop(hooks);

        assert!(!handle.remove());
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let hooks = Arc::new(Hooks::<Tag>::default());
        let a = hooks.push(Arc::new(Tag("a")));
        let snapshot = hooks.snapshot();

        a.remove();
        hooks.push(Arc::new(Tag("b")));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, "a");
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn erased_views_downcast() {
        let req = String::from("payload");
        let res = 42_u32;

        let req_ref = RequestRef::new("Echo", &req);
        assert_eq!(req_ref.kind(), "Echo");
        assert!(req_ref.is::<String>());
        assert_eq!(req_ref.downcast_ref::<String>().map(String::as_str), Some("payload"));
        assert!(req_ref.downcast_ref::<u32>().is_none());

        assert_eq!(ResponseRef::new(&res).downcast_ref::<u32>(), Some(&42));
        assert!(!ResponseRef::absent().is_present());
        assert!(ResponseRef::absent().downcast_ref::<u32>().is_none());
    }
}
