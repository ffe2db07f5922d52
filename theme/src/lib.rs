//! Theme selection for the front end.
//!
//! [`Theme`] is the validated `Light` / `Dark` enum. [`ThemeStore`] holds
//! the current theme and notifies subscribers when it changes; it is reached
//! through a [`vigil_context::Context`] rather than a global.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use vigil_context::Context;
//! use vigil_theme::{Theme, ThemeStore};
//!
//! let ctx = Context::new();
//! let store = ThemeStore::from_context(&ctx).unwrap();
//! assert_eq!(store.get(), Theme::Dark);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let _sub = store.subscribe(move |theme| sink.lock().unwrap().push(*theme));
//!
//! store.set(Theme::Light);
//! assert_eq!(*seen.lock().unwrap(), vec![Theme::Dark, Theme::Light]);
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod error;
pub mod store;
mod theme;
mod theme_store;

pub use error::ThemeParseError;
pub use store::{Subscription, Writable};
pub use theme::Theme;
pub use theme_store::ThemeStore;
