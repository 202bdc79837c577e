//! Core traits for surgebox backends.

mod kv_store;

pub use kv_store::*;
