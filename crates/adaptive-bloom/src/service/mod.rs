//! Service Layer
//!
//! Packages the domain filter for shared, multi-threaded use.

pub mod shared_filter;

pub use shared_filter::SharedBloomFilter;
