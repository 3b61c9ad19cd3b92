//! Institution-specific statement layouts

pub mod usaa;
