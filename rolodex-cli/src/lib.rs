//! Rolodex CLI - Command-line interface for Rolodex address books.
//!
//! This crate provides the `rolodex` binary, which stores contacts in a
//! SQLite database and answers filter queries with JSON on stdout.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
