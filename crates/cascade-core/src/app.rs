//! The application object and its dispatch loop.
//!
//! An [`App`] owns an ordered, append-only sequence of registered handlers.
//! For each request it walks the sequence with an explicit cursor and a
//! per-request error slot, invoking normal handlers while no error is set and
//! error handlers while one is. If the sequence is exhausted the dispatcher
//! falls back to a 500 (error still set) or a 404 (no error) response.
//!
//! An `App` can itself be mounted inside another `App`. A mounted app runs
//! its own sequence from its own cursor, but exhaustion bubbles back into the
//! parent loop instead of producing the fallback, preserving whatever error
//! state the sub-app reached.
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

use http::StatusCode;

use crate::error::{AppError, AppResult};
use crate::handler::{
    BoxFuture, ErrorHandler, ErrorHandlerFn, Flow, Handler, HandlerFn, Registered,
};
use crate::types::{Request, ResponseWriter};

/// How a single dispatch pass over one handler sequence ended.
///
/// Only the top-level [`App::handle`] maps `Exhausted` to a fallback
/// response; a mounted sub-app returns it to the parent loop instead.
enum Outcome {
    /// A handler completed the response; dispatch is over.
    Completed,
    /// The sequence ran out, carrying the error state reached (if any).
    Exhausted(Option<AppError>),
}

/// An application: an ordered sequence of registered handlers.
///
/// Created empty; grown only by appending. Registration happens during setup,
/// before requests are served: the serving layer holds the app behind an
/// `Arc`, so the sequence is read-only while requests are in flight.
#[derive(Default)]
pub struct App {
    handlers: Vec<Registered>,
}

impl App {
    /// Creates an empty application.
    ///
    /// Dispatching any request through an empty application yields 404.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a normal-track handler.
    pub fn use_handler<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.handlers.push(Registered::Normal(Box::new(handler)));
        self
    }

    /// Appends a normal-track handler from a plain function.
    ///
    /// # Example
    ///
    /// ```
    /// use cascade_core::{App, Flow};
    ///
    /// let mut app = App::new();
    /// app.use_fn(|_req, _res| Ok(Flow::Next))
    ///     .use_fn(|_req, res| {
    ///         res.send("second");
    ///         Ok(Flow::Halt)
    ///     });
    /// ```
    pub fn use_fn<F>(&mut self, func: F) -> &mut Self
    where
        F: Fn(&Request, &mut ResponseWriter) -> AppResult<Flow> + Send + Sync + 'static,
    {
        self.use_handler(HandlerFn::new(func))
    }

    /// Appends an error-track handler.
    pub fn use_error_handler<H: ErrorHandler>(&mut self, handler: H) -> &mut Self {
        self.handlers.push(Registered::Error(Box::new(handler)));
        self
    }

    /// Appends an error-track handler from a plain function.
    pub fn use_error_fn<F>(&mut self, func: F) -> &mut Self
    where
        F: Fn(&AppError, &Request, &mut ResponseWriter) -> AppResult<Flow>
            + Send
            + Sync
            + 'static,
    {
        self.use_error_handler(ErrorHandlerFn::new(func))
    }

    /// Mounts another application as a handler.
    ///
    /// The sub-app dispatches with its own cursor over its own sequence,
    /// starting on the normal track. If it exhausts its handlers without
    /// completing the response, dispatch continues with this application's
    /// next handler, preserving any error state the sub-app set. Like any
    /// normal-track handler, a mounted app is skipped while an error is set.
    pub fn mount(&mut self, app: App) -> &mut Self {
        self.handlers.push(Registered::SubApp(app));
        self
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatches one request through the handler sequence.
    ///
    /// This is the entry point the serving layer calls once per request.
    /// Exactly one response is produced: either a handler finishes the
    /// response writer, or the fallback does (500 if an unhandled error is
    /// still set when the sequence is exhausted, 404 otherwise). Errors never
    /// propagate out of this call.
    pub async fn handle(&self, req: &Request, res: &mut ResponseWriter) {
        match self.dispatch(req, res).await {
            Outcome::Completed => {}
            Outcome::Exhausted(error) => {
                let status = match error {
                    Some(err) => {
                        tracing::debug!(error = %err, "handler chain exhausted with unhandled error");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    None => StatusCode::NOT_FOUND,
                };
                tracing::debug!(status = %status, "emitting fallback response");
                res.set_status(status);
                res.end();
            }
        }
    }

    /// Walks this application's handler sequence once.
    ///
    /// The cursor and error slot live on this call's stack, so concurrent
    /// requests never share dispatch state. Boxed because mounted sub-apps
    /// re-enter this function recursively.
    fn dispatch<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut ResponseWriter,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let mut error: Option<AppError> = None;

            for entry in &self.handlers {
                match entry {
                    Registered::Normal(handler) => {
                        // Normal handlers are skipped while an error is set.
                        if error.is_some() {
                            continue;
                        }
                        match handler.call(req, res).await {
                            Ok(Flow::Next) => {}
                            Ok(Flow::Halt) => return Outcome::Completed,
                            Ok(Flow::Fail(err)) | Err(err) => {
                                tracing::debug!(error = %err, "entering error track");
                                error = Some(err);
                            }
                        }
                    }
                    Registered::Error(handler) => {
                        // Error handlers are skipped while no error is set.
                        let Some(current) = error.take() else {
                            continue;
                        };
                        match handler.call(&current, req, res).await {
                            // A bare continuation clears the error and
                            // resumes the normal track.
                            Ok(Flow::Next) => {}
                            Ok(Flow::Halt) => return Outcome::Completed,
                            Ok(Flow::Fail(err)) | Err(err) => error = Some(err),
                        }
                    }
                    Registered::SubApp(sub) => {
                        // A mounted app has the normal-handler shape, so it
                        // is skipped while an error is set. Errors bubble out
                        // of a sub-app, never into one, and its exhaustion
                        // never produces the fallback.
                        if error.is_some() {
                            continue;
                        }
                        match sub.dispatch(req, res).await {
                            Outcome::Completed => return Outcome::Completed,
                            Outcome::Exhausted(err) => error = err,
                        }
                    }
                }

                // First completion wins: a finished response ends dispatch
                // regardless of what the handler returned.
                if res.is_finished() {
                    return Outcome::Completed;
                }
            }

            Outcome::Exhausted(error)
        })
    }
}
