//! Adapter implementations for volunteer lookup.

pub mod memory;
pub mod postgres;
