//! Shared numeric helpers used by indicators and strategies.

pub mod math;
