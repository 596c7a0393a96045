//! Utility modules.

pub mod hash;
pub mod mime;
pub mod path;
