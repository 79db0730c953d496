//! Record source: the external analysis service.

pub mod client;

pub use client::*;
