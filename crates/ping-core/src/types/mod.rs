//! Core data types: raw ping samples and the hourly buckets computed from them.

pub mod bucket;
pub mod sample;

pub use bucket::*;
pub use sample::*;
