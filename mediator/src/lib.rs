//! # async-mediator
//! An async implementation of the Mediator pattern in Rust: requests are routed
//! by kind to a single handler, with hooks running before and after every handler.
//!
//! ## Mediator Pattern
//! https://en.wikipedia.org/wiki/Mediator_pattern
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use mediator::{BoxError, DefaultMediator, Mediator, Request, RequestHandler};
//!
//! struct SayHelloRequest {
//!     name: String,
//! }
//!
//! impl Request for SayHelloRequest {
//!     const KIND: &'static str = "SayHelloRequest";
//!     type Response = String;
//! }
//!
//! struct SayHelloHandler;
//!
//! #[mediator::async_trait]
//! impl RequestHandler<SayHelloRequest> for SayHelloHandler {
//!     async fn handle(&self, req: &SayHelloRequest) -> Result<String, BoxError> {
//!         Ok(format!("Hello {}", req.name))
//!     }
//! }
//!
//! let handled = Arc::new(AtomicUsize::new(0));
//! let counter = handled.clone();
//!
//! let mediator = DefaultMediator::builder()
//!     .add_handler(SayHelloHandler)
//!     .after_each_fn(move |_req, _res| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         async { Ok::<(), BoxError>(()) }
//!     })
//!     .build();
//!
//! futures::executor::block_on(async {
//!     let greeting = mediator
//!         .send(SayHelloRequest { name: "Tom".to_owned() })
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(greeting.as_deref(), Some("Hello Tom"));
//! });
//!
//! assert_eq!(handled.load(Ordering::SeqCst), 1);
//! ```

/// A convenient result type.
pub type Result<T> = std::result::Result<T, error::Error>;

/// Module for the mediator requests and handlers.
mod request;
pub use request::*;

/// Module for the before and after hooks.
mod hooks;
pub use hooks::{
    AfterHook, BeforeHook, FnAfterHook, FnBeforeHook, HookHandle, RequestRef, ResponseRef,
};

/// Module for the errors.
mod error;
pub use error::*;

/// Module for the mediator.
mod mediator;
pub use crate::mediator::*;

/// Module for declarative handler registration.
mod handle;
pub use handle::*;

/// Future utilities.
mod futures;

pub use async_trait::async_trait;
