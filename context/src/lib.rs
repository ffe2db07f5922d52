//! # vigil context
//!
//! An explicit service context for front-end state.
//!
//! Instead of process-wide globals (a theme cell here, a database handle
//! hung off the window there), everything shared lives in a [`Context`]
//! that is created once and passed to whoever needs it. Services are
//! registered by type, optionally under a name, either as ready values or as
//! lazy singletons built on first use.
//!
//! ```
//! use std::sync::Arc;
//! use vigil_context::{Context, Database};
//!
//! struct InMemory;
//! impl Database for InMemory {}
//!
//! struct Greeting(String);
//!
//! let ctx = Context::new();
//! ctx.provide_named("motd", String::from("Hello"));
//! ctx.provide_lazy(|ctx| {
//!   let motd = ctx.require_named::<String>("motd").unwrap();
//!   Greeting(format!("{}, world", motd))
//! });
//! ctx.attach_database(Arc::new(InMemory));
//!
//! assert_eq!(ctx.require::<Greeting>().unwrap().0, "Hello, world");
//! assert!(ctx.database().is_some());
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod context;
mod registry;
mod database;
pub mod error;

pub use context::Context;
pub use database::Database;
pub use error::{ContextError, Result};
