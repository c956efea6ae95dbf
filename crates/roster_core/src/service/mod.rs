//! Use-case services over the record store.
//!
//! # Responsibility
//! - Compose repository calls into the named queries callers use.
//! - Keep listing/CLI layers free of predicate and SQL details.

pub mod member_service;
