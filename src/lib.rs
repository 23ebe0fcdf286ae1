//! Summer school client core.
//!
//! This crate provides the offline-first data layer behind the `summer`
//! client: validated records, a local cache, cache-then-network refresh and
//! login-code authentication.
//!
//! # Architecture
//!
//! - [`date`] - Named timestamp formats and a two-way codec
//! - [`schema`] - Generic, key-mapped record decoding
//! - [`model`] - Entity records (announcements, events, lecturers, forum, ...)
//! - [`pipeline`] - All-or-nothing collection decoding, filtering and sorting
//! - [`storage`] - SQLite record store and typed local cache
//! - [`net`] - Transport seam and API endpoints
//! - [`sync`] - Per-collection state machine and refresh coordinator
//! - [`session`] - Login code gate
//! - [`config`] - Paths, API settings and persisted settings
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod model;
pub mod net;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
