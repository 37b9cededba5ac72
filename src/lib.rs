//! Password-protected page gating
//!
//! Puts per-path password gates in front of parts of a web site. Visitors
//! hitting a protected path are redirected to a login prompt; a correct
//! password unlocks that specific path for their session.
//!
//! ## Features
//!
//! - **Wildcard path rules** - `/private/*` guards a subtree, `/report*`
//!   guards a prefix, `/node/5` guards a single page
//! - **Per-path sessions** - unlocking one protected page does not unlock
//!   the others
//! - **Alias aware** - protection holds whether a page is requested by its
//!   canonical path or a configured alias
//! - **Explicit failure policy** - a broken record store fails closed (503)
//!   by default, fail-open is an opt-in configuration choice
//!
//! ## Example Configuration
//!
//! ```toml
//! [server]
//! port = 8273
//! content_dir = "public"
//!
//! [protection]
//! login_path = "/protected-page"
//! on_store_error = "deny"
//! # admin token from PAGEGATE_ADMIN_TOKEN env var
//!
//! [aliases]
//! "/new-events" = "/node/5"
//! ```
//!
//! Records are managed over the JSON admin API:
//!
//! ```text
//! POST /admin/pages {"path": "/private/*", "password": "..."}
//! ```

pub mod alias;
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod server;
pub mod session;
pub mod store;
pub mod util;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use gate::{AccessGate, Decision};
pub use store::{PageRule, ProtectedPage};
