//! Builder for creating OutputEngine instances.

use std::sync::Arc;

use crate::adapter::{AdapterFactory, AdapterRegistry};
use crate::config::{BaseOptions, OutportConfig, OutputOptions};
use crate::engine::OutputEngine;
use crate::error::{OutputError, ValidationPolicy};
use crate::validate;

/// Builder for creating OutputEngine instances.
///
/// ```rust,ignore
/// use outport::{OutputBuilder, ValidationPolicy};
///
/// let engine = OutputBuilder::new()
///     .with_output("console")
///     .with_format("yaml")
///     .with_mode(ValidationPolicy::FastFail)
///     .build()?;
///
/// engine.output(&records).await?;
/// ```
#[derive(Debug)]
pub struct OutputBuilder {
    base: BaseOptions,
    options: OutputOptions,
    policy: ValidationPolicy,
    factory: Option<Arc<dyn AdapterFactory>>,
}

impl Default for OutputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBuilder {
    /// Create a builder holding the default options and the warn-only policy.
    pub fn new() -> Self {
        Self {
            base: BaseOptions::default(),
            options: OutputOptions::default(),
            policy: ValidationPolicy::default(),
            factory: None,
        }
    }

    /// Create a builder from a parsed configuration file.
    pub fn from_config(config: OutportConfig) -> Result<Self, OutputError> {
        let policy = config.validation_policy()?;
        Ok(Self::new()
            .with_base(config.base)
            .with_options(config.output)
            .with_mode(policy))
    }

    /// Set the base options.
    pub fn with_base(mut self, base: BaseOptions) -> Self {
        self.base = base;
        self
    }

    /// Replace all output options.
    pub fn with_options(mut self, options: OutputOptions) -> Self {
        self.options = options;
        self
    }

    /// Set a single output option.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options = self.options.set(key, value);
        self
    }

    /// Set the `output` option.
    pub fn with_output(self, output: impl Into<String>) -> Self {
        self.set("output", output.into())
    }

    /// Set the `format` option.
    pub fn with_format(self, format: impl Into<String>) -> Self {
        self.set("format", format.into())
    }

    /// Set the validation policy.
    pub fn with_mode(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a custom adapter factory instead of the built-in registry.
    pub fn with_factory(mut self, factory: Arc<dyn AdapterFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Validate the options and build the engine.
    ///
    /// Fails only when the policy is `FastFail` or `Accumulate` and a rule
    /// rejected an option.
    pub fn build(self) -> Result<OutputEngine, OutputError> {
        let report = validate::validate(&self.options, self.policy)?;
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(AdapterRegistry::default()) as Arc<dyn AdapterFactory>);
        Ok(OutputEngine::from_parts(
            self.base,
            self.options,
            report,
            factory,
        ))
    }
}
