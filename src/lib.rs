//! Pokedex CLI Library
//!
//! This module exposes the cache, client, REPL and configuration modules for
//! use by the binary and in integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod pokedex;
