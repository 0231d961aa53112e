//! Configuration types for output dispatch.
//!
//! This module provides:
//! - `OutputOptions`: The merged output settings bag
//! - `BaseOptions`: Settings shared with every adapter
//! - `OutportConfig`: File-based configuration grouping both

mod options;
mod pipeline;

pub use options::{
    BaseOptions, DEFAULT_FORMAT, DEFAULT_LIMIT, DEFAULT_OUTPUT, DEFAULT_SERVER, DEFAULT_SPACING,
    OutputOptions,
};
pub use pipeline::OutportConfig;
