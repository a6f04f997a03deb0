//! # gastro-review-lib
//!
//! `gastro-review-lib` is a collection of utilities used by the various `gastro-review-*` crates.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;
