//! Studio Core
//!
//! Core types and abstractions for the Character Image Studio client.
//!
//! This crate contains:
//! - Domain types: jobs, batch state, progress phases, characters, gallery, credits
//! - DTOs: request and response shapes of the image-generation API

pub mod domain;
pub mod dto;
