//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML settings file from the platform
//! config directory, supplies defaults on first run, and writes the last
//! used host back after a successful connect.

pub mod config;
