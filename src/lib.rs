//! LinkVault - short-link storage engine
//!
//! Deterministic short-link addresses, anonymous owner tokens and soft-delete
//! storage over three interchangeable backends.
//!
//! # Architecture
//! - `utils::short_code`: address derivation (SHA-256 + base58)
//! - `identity`: HMAC-signed owner tokens
//! - `storage`: `LinkBackend` trait with memory, append-only file and SeaORM backends
//! - `services`: `ShortLinkStore` façade and the background `DeletionPool`
//! - `config`: static configuration loaded once at startup
//! - `runtime`: process lifecycle used by the binary
//! - `system`: logging and signal handling

pub mod config;
pub mod errors;
pub mod identity;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
