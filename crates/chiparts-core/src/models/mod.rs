//! Data models for ChiParts

mod order;

pub use order::*;
