//! Concrete provider adapters.

pub mod google;
