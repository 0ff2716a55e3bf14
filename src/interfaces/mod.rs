//! User-facing interfaces outside the HTTP API

pub mod cli;
