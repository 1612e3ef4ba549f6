//! Adapter implementations for notebook storage.

pub mod memory;
pub mod postgres;
