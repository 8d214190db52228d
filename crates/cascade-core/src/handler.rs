//! Handler traits and flow control.
//!
//! Each registered handler resolves to a [`Flow`] value that tells the
//! dispatcher what to do next, replacing the callback-style continuation with
//! an explicit result. Handlers come in two shapes: [`Handler`] for the
//! normal track and [`ErrorHandler`] for the error track. Which track a
//! registration belongs to is fixed at registration time, not inferred from
//! the callable at dispatch time.
//!
//! # Example
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

use std::future::Future;
use std::pin::Pin;

use crate::error::{AppError, AppResult};
use crate::types::{Request, ResponseWriter};

/// A boxed future, as returned by handler invocations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler tells the dispatcher to do after it ran.
#[derive(Debug)]
pub enum Flow {
    /// Continue with the next handler. Returned by an error handler, this
    /// clears the current error and resumes the normal track.
    Next,
    /// Continue carrying an error: subsequent normal handlers are skipped
    /// until an error handler runs or the sequence is exhausted.
    Fail(AppError),
    /// Stop dispatch; the response is complete as written.
    Halt,
}

/// A normal-track handler.
///
/// Invoked with the request and the mutable response writer while no error is
/// set. Returning `Err` is equivalent to returning `Ok(Flow::Fail(_))`: the
/// dispatcher switches to the error track at the next index either way.
pub trait Handler: Send + Sync + 'static {
    /// Processes the request.
    fn call<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut ResponseWriter,
    ) -> BoxFuture<'a, AppResult<Flow>>;
}

/// An error-track handler.
///
/// Invoked with the current error while one is set. Invocation alone does not
/// clear the error; only returning [`Flow::Next`] does.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Processes the current error.
    fn call<'a>(
        &'a self,
        error: &'a AppError,
        req: &'a Request,
        res: &'a mut ResponseWriter,
    ) -> BoxFuture<'a, AppResult<Flow>>;
}

/// A [`Handler`] built from a plain function or closure.
///
/// Cascade handlers run to completion synchronously; this adapter lifts a
/// synchronous function into the async [`Handler`] trait.
pub struct HandlerFn<F> {
    func: F,
}

impl<F> HandlerFn<F> {
    /// Wraps the given function.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request, &mut ResponseWriter) -> AppResult<Flow> + Send + Sync + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut ResponseWriter,
    ) -> BoxFuture<'a, AppResult<Flow>> {
        let out = (self.func)(req, res);
        Box::pin(std::future::ready(out))
    }
}

/// An [`ErrorHandler`] built from a plain function or closure.
pub struct ErrorHandlerFn<F> {
    func: F,
}

impl<F> ErrorHandlerFn<F> {
    /// Wraps the given function.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> ErrorHandler for ErrorHandlerFn<F>
where
    F: Fn(&AppError, &Request, &mut ResponseWriter) -> AppResult<Flow> + Send + Sync + 'static,
{
    fn call<'a>(
        &'a self,
        error: &'a AppError,
        req: &'a Request,
        res: &'a mut ResponseWriter,
    ) -> BoxFuture<'a, AppResult<Flow>> {
        let out = (self.func)(error, req, res);
        Box::pin(std::future::ready(out))
    }
}

/// A registered entry in an application's handler sequence.
///
/// The variant is fixed at registration time, so dispatch never has to
/// inspect the callable itself to decide which track it belongs to.
pub(crate) enum Registered {
    /// Normal-track handler.
    Normal(Box<dyn Handler>),
    /// Error-track handler.
    Error(Box<dyn ErrorHandler>),
    /// An embedded application, dispatched with its own cursor.
    SubApp(crate::app::App),
}
