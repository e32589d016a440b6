//! pawscue web service library.
//!
//! This crate primarily ships the `pawscue-web` binary, but exposes a small
//! library surface for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod geocode;
pub mod reports;
pub mod state;
pub mod stories;
pub mod time;
