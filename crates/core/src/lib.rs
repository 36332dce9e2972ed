//! Mart Core - Shared domain types.
//!
//! This crate provides the types used across the Mart cart client components:
//! - `cart-client` - The authenticated cart API adapter
//! - `cli` - Command-line front end for the adapter
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
