//! Volunteer identities for the notebook review programme.
//!
//! Volunteers are registered outside this crate; the notebook core only needs
//! to confirm that a volunteer exists before accepting a reservation. The
//! module follows the same hexagonal split as [`crate::notebook`]:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
