//! Derive macros shared across the crate.

pub use derive_more::{Display, Into};
