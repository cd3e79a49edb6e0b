//! Taskboard Core - Shared types library.
//!
//! This crate provides the types used across all Taskboard components:
//! - `client` - Session store, API client and resource services
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere, including the fake API in the integration tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, roles, task status, credential claims
//! - [`records`] - Wire records and request payloads for the remote API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod records;
pub mod types;

pub use records::*;
pub use types::*;
