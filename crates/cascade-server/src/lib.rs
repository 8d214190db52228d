//! # Cascade Server
//!
//! Hyper/Tokio serving layer for the Cascade middleware framework.
//!
//! This crate binds a `cascade_core::App` to the network:
//!
//! - HTTP/1.1 via Hyper, one task per connection
//! - Graceful shutdown on SIGTERM/SIGINT or programmatic trigger
//! - [`listen`] convenience for background serving with an ephemeral port
//!
//! ## Example
//!
//! ```rust,ignore
//! use cascade_core::{App, Flow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new();
//!     app.use_fn(|_req, res| {
//!         res.send("hello");
//!         Ok(Flow::Halt)
//!     });
//!
//!     let handle = cascade_server::listen(app, "127.0.0.1:3000").await?;
//!     handle.stopped().await;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/cascade-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use server::{listen, Server, ServerBuilder, ServerError, ServerHandle};
pub use shutdown::{ConnectionGuard, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
