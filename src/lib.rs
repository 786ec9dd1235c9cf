//! Sessionstore: capture and restoration of browser navigation history.
//!
//! A live back/forward list (with nested frames) is captured into a
//! [`types::history::SessionSnapshot`], encoded as literal text, and later
//! evaluated and rebuilt into a fresh live history.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod database;
pub mod managers;
pub mod services;
pub mod types;

pub use managers::session_store::{SessionStore, SessionStoreTrait};
