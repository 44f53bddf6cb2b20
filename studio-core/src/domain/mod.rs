//! Core domain types
//!
//! This module contains the core domain structures shared between the HTTP
//! client, the pollers and the CLI. None of these types perform I/O.

pub mod account;
pub mod batch;
pub mod character;
pub mod credits;
pub mod gallery;
pub mod job;
pub mod progress;
