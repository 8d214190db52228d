//! # Cascade Core
//!
//! The middleware dispatch core of the Cascade framework.
//!
//! An [`App`] accumulates an ordered sequence of handlers and dispatches each
//! incoming request through them. Dispatch runs on two tracks: normal
//! handlers while no error is set, error handlers once one is. A handler
//! resolves to a [`Flow`] (continue, continue with an error, or stop), and
//! an exhausted sequence falls back to 404 (no error) or 500 (unhandled
//! error). Applications compose: mounting one app inside another nests its
//! dispatch loop, with exhaustion bubbling back to the parent.
//!
//! This crate has no network I/O; the serving layer lives in
//! `cascade-server`.
//!
//! ## Example
//!
//! ```
//! use cascade_core::{App, Flow};
//!
//! let mut app = App::new();
//! app.use_fn(|_req, res| {
//!     res.send("hello");
//!     Ok(Flow::Halt)
//! });
//! ```

#![doc(html_root_url = "https://docs.rs/cascade-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod error;
pub mod handler;
pub mod types;

pub use app::App;
pub use error::{AppError, AppResult};
pub use handler::{BoxFuture, ErrorHandler, ErrorHandlerFn, Flow, Handler, HandlerFn};
pub use types::{Request, Response, ResponseBody, ResponseWriter};
