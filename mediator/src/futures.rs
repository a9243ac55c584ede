use crate::BoxError;
use ::futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// How a handler or hook future finished.
pub(crate) enum Settled<T> {
    Ok(T),
    Err(BoxError),
    Panicked(Box<dyn Any + Send>),
}

/// Drives `fut` to completion, turning errors and panics into a [`Settled`] value.
///
/// Wrap the call that creates the future in an `async` block so a panic raised
/// before the first poll is caught as well.
pub(crate) async fn settle<T, F>(fut: F) -> Settled<T>
where
    F: Future<Output = Result<T, BoxError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Settled::Ok(value),
        Ok(Err(err)) => Settled::Err(err),
        Err(payload) => Settled::Panicked(payload),
    }
}
