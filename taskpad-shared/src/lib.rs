//! # Taskpad Shared Library
//!
//! Types, persistence and business logic shared by the Taskpad API server
//! and its tooling binaries.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their owner-scoped queries
//! - `auth`: Password hashing, access tokens, nicknames and bearer resolution
//! - `db`: Connection pool and embedded migrations
//! - `generation`: AI task generation (prompt, Gemini client, response parsing)

pub mod auth;
pub mod db;
pub mod generation;
pub mod models;

/// Current version of the Taskpad shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
