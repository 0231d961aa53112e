//! # outport
//!
//! Validated dispatch of serializable payloads to a single output destination.
//!
//! ## Overview
//!
//! outport provides:
//! - **One destination per engine**: `return` (in memory), `console`,
//!   `couchbase`, `sync-gateway`, or any other value as a folder path
//! - **Option validation**: each option has a rule that can look at the whole
//!   option set; failures are logged or returned depending on the policy
//! - **Lazy, single-flight preparation**: the adapter is built and initialized
//!   once, on first use, no matter how many callers race for it
//! - **Formats**: JSON, CSV, YAML and CSON rendering for byte-based destinations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use outport::{BaseOptions, OutputEngine, OutputOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), outport::OutputError> {
//!     let options = OutputOptions::new().with_output("console").with_format("yaml");
//!     let engine = OutputEngine::new(BaseOptions::new(), options);
//!
//!     engine.output(&json!({ "name": "a", "value": 1 })).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `yaml` - YAML rendering (enabled by default)
//! - `csv` - CSV rendering (enabled by default)
//! - `miette` - Pretty error reporting with miette
//! - `cli` - The `outport_pipeline` binary
//!
//! ## Validation policies
//!
//! `OutputEngine::new` validates with `ValidationPolicy::Warn`: every failure
//! is logged through `tracing` and kept in `validation_report()`, and the
//! engine is still usable. `OutputBuilder::with_mode` selects `FastFail` or
//! `Accumulate` to turn failures into an `OutputError::Invalid` instead.
//!
//! ## Destination resolution
//!
//! The `output` option is resolved by `Destination::resolve`: the four named
//! identifiers map to their adapter and every other value is a folder path.
//! The `output` rule uses the same identifiers and additionally flags folder
//! paths that carry a file extension, since a folder cannot be written as a
//! single file. Such a value still resolves to the folder adapter.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod validate;

// Re-exports for convenience
pub use adapter::{
    AdapterFactory, AdapterRegistry, Destination, OUTPUT_TYPES, OutputAdapter, Preparation,
    is_server,
};
pub use builder::OutputBuilder;
pub use config::{BaseOptions, OutportConfig, OutputOptions};
pub use engine::{OutputEngine, PrepareState};
pub use error::{
    AdapterError, OutputError, Stage, ValidationError, ValidationPolicy, ValidationReport,
};
pub use format::{FormatError, FormatKind};
pub use io::{ByteSink, FileSink, MemorySink, StdoutSink};

/// Build an engine from a parsed configuration file with the built-in
/// adapters.
pub fn build_engine_from_config(config: OutportConfig) -> Result<OutputEngine, OutputError> {
    OutputBuilder::from_config(config)?.build()
}

// Miette re-exports
#[cfg(feature = "miette")]
pub use error::OutputDiagnostic;
