//! # Handler abstractions and registration options.
//!
//! This module provides the capability contracts the registry dispatches to:
//! - [`RequestHandler`] - one handler per `(request, response)` type pair (`send`)
//! - [`EventHandler`] - any number of observers per event type (`notify`)
//! - [`RequestHandlerFn`], [`EventHandlerFn`] - closure-backed implementations
//! - [`Options`] / [`with_name`] - metadata applied at registration

mod event;
mod handler_fn;
mod options;
mod request;

pub use event::EventHandler;
pub use handler_fn::{EventHandlerFn, RequestHandlerFn};
pub use options::{with_name, Options};
pub use request::RequestHandler;
