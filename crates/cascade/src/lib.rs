//! # Cascade
//!
//! **A minimal HTTP middleware framework**
//!
//! Cascade applications are ordered sequences of handlers. Each request walks
//! the sequence: normal handlers run while no error is set, error handlers
//! run once one is, and an exhausted sequence falls back to 404 (no error) or
//! 500 (unhandled error). Applications nest: mounting one app inside another
//! embeds its whole pipeline as a single handler.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cascade::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new();
//!     app.use_fn(|_req, res| {
//!         res.send("hello");
//!         Ok(Flow::Halt)
//!     });
//!
//!     let handle = cascade::server::listen(app, "127.0.0.1:3000").await?;
//!     handle.stopped().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! Request → handler 0 → handler 1 → ... → handler n-1 → 404
//!               │ Fail(err)                  ▲
//!               └──► error track ────────────┘ (unhandled → 500)
//! ```

#![doc(html_root_url = "https://docs.rs/cascade/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use cascade_core as core;

// Re-export server types
pub use cascade_server as server;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use cascade::prelude::*;
/// ```
pub mod prelude {
    pub use cascade_core::{
        App, AppError, AppResult, ErrorHandler, Flow, Handler, Request, ResponseWriter,
    };

    pub use cascade_server::{listen, Server, ServerConfig, ServerHandle, ShutdownSignal};
}
