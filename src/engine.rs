//! The output engine: validated options, one lazily prepared adapter.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapter::{AdapterFactory, AdapterRegistry, Destination, OutputAdapter, Preparation};
use crate::config::{BaseOptions, OutputOptions};
use crate::error::{AdapterError, OutputError, Stage, ValidationPolicy, ValidationReport};
use crate::validate;

/// Lifecycle of the engine's adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareState {
    /// No adapter yet
    Unprepared,
    /// The adapter is being built or initialized
    Preparing,
    /// The adapter is ready; this is final
    Prepared,
}

/// A failed preparation, cloned out to every caller that joined it.
#[derive(Debug, Clone)]
struct SetupFailure {
    stage: Stage,
    destination: String,
    source: Arc<AdapterError>,
}

impl SetupFailure {
    fn new(stage: Stage, destination: impl Into<String>, source: AdapterError) -> Self {
        Self {
            stage,
            destination: destination.into(),
            source: Arc::new(source),
        }
    }
}

impl From<SetupFailure> for OutputError {
    fn from(failure: SetupFailure) -> Self {
        OutputError::Adapter {
            stage: failure.stage,
            destination: failure.destination,
            source: failure.source,
        }
    }
}

type SetupResult = Result<Arc<dyn OutputAdapter>, SetupFailure>;
type SetupFuture = Shared<BoxFuture<'static, SetupResult>>;

/// The preparation attempt callers currently join, if any.
#[derive(Default)]
struct Inflight {
    generation: u64,
    setup: Option<SetupFuture>,
}

impl fmt::Debug for Inflight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inflight")
            .field("generation", &self.generation)
            .field("running", &self.setup.is_some())
            .finish()
    }
}

fn lock(inflight: &Mutex<Inflight>) -> MutexGuard<'_, Inflight> {
    inflight.lock().unwrap_or_else(|e| e.into_inner())
}

/// Routes payloads to the one destination named by its options.
///
/// The adapter is resolved, constructed and initialized on the first call to
/// [`prepare`](Self::prepare) or [`output`](Self::output). Concurrent callers
/// share that single preparation, so the adapter is built once and its
/// initialization hook runs at most once.
///
/// If initialization fails, every caller that joined that attempt gets the
/// same error and the engine returns to `Unprepared`. The next call starts a
/// fresh preparation.
#[derive(Debug)]
pub struct OutputEngine {
    base: BaseOptions,
    options: OutputOptions,
    destination: Destination,
    report: ValidationReport,
    factory: Arc<dyn AdapterFactory>,
    adapter: Arc<OnceLock<Arc<dyn OutputAdapter>>>,
    inflight: Arc<Mutex<Inflight>>,
}

impl OutputEngine {
    /// Create an engine with the built-in adapters.
    ///
    /// Validation failures are logged, never returned; inspect them with
    /// [`validation_report`](Self::validation_report). Use
    /// [`OutputBuilder`](crate::OutputBuilder) for a stricter policy.
    pub fn new(base: BaseOptions, options: OutputOptions) -> Self {
        let report =
            validate::validate(&options, ValidationPolicy::Warn).unwrap_or_else(|report| report);
        Self::from_parts(base, options, report, Arc::new(AdapterRegistry::default()))
    }

    pub(crate) fn from_parts(
        base: BaseOptions,
        options: OutputOptions,
        report: ValidationReport,
        factory: Arc<dyn AdapterFactory>,
    ) -> Self {
        let destination = options.destination();
        if let Destination::Folder(path) = &destination {
            debug!(
                output = ?options.get("output"),
                folder = %path.display(),
                "output is not a named destination, using folder adapter"
            );
        }
        Self {
            base,
            options,
            destination,
            report,
            factory,
            adapter: Arc::new(OnceLock::new()),
            inflight: Arc::new(Mutex::new(Inflight::default())),
        }
    }

    /// The merged output options.
    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    /// The base options handed to the adapter.
    pub fn base(&self) -> &BaseOptions {
        &self.base
    }

    /// Where payloads will go.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Failures found while validating the options.
    pub fn validation_report(&self) -> &ValidationReport {
        &self.report
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PrepareState {
        if self.adapter.get().is_some() {
            PrepareState::Prepared
        } else if lock(&self.inflight).setup.is_some() {
            PrepareState::Preparing
        } else {
            PrepareState::Unprepared
        }
    }

    /// Resolve, build and initialize the adapter, once.
    ///
    /// Repeated or concurrent calls wait for the same preparation and do not
    /// run it again.
    pub async fn prepare(&self) -> Result<(), OutputError> {
        self.adapter().await.map(|_| ())
    }

    /// Deliver `data` to the destination, preparing it first if needed.
    pub async fn output<T>(&self, data: &T) -> Result<(), OutputError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(data).map_err(OutputError::Payload)?;
        self.output_value(&value).await
    }

    /// Deliver an already converted payload.
    pub async fn output_value(&self, data: &Value) -> Result<(), OutputError> {
        let adapter = self.adapter().await?;
        adapter
            .output(data)
            .await
            .map_err(|e| OutputError::adapter(Stage::Output, adapter.id(), e))
    }

    /// Payloads kept by the `return` destination, in delivery order.
    ///
    /// Empty for every other destination and before preparation.
    pub fn returned(&self) -> Vec<Value> {
        self.adapter
            .get()
            .and_then(|adapter| adapter.returned())
            .unwrap_or_default()
    }

    async fn adapter(&self) -> Result<&dyn OutputAdapter, OutputError> {
        if let Some(adapter) = self.adapter.get() {
            return Ok(adapter.as_ref());
        }
        let adapter = self.join_setup().await?;
        Ok(self.adapter.get_or_init(|| adapter).as_ref())
    }

    /// Join the running preparation, or start one.
    fn join_setup(&self) -> SetupFuture {
        let mut inflight = lock(&self.inflight);
        if let Some(setup) = &inflight.setup {
            return setup.clone();
        }
        inflight.generation += 1;
        let setup = self.setup(inflight.generation).shared();
        inflight.setup = Some(setup.clone());
        setup
    }

    /// One preparation attempt. It publishes the adapter on success and
    /// releases its slot either way, so only callers arriving afterwards
    /// can start another attempt.
    fn setup(&self, generation: u64) -> BoxFuture<'static, SetupResult> {
        let factory = self.factory.clone();
        let destination = self.destination.clone();
        let base = self.base.clone();
        let options = self.options.clone();
        let cell = self.adapter.clone();
        let inflight = self.inflight.clone();

        async move {
            let result = build_adapter(factory.as_ref(), &destination, &base, &options).await;
            let result = match result {
                Ok(adapter) => {
                    info!(destination = %destination, id = adapter.id(), "output prepared");
                    Ok(cell.get_or_init(|| adapter).clone())
                }
                Err(failure) => {
                    warn!(
                        destination = %destination,
                        stage = %failure.stage,
                        "output preparation failed: {}",
                        failure.source
                    );
                    Err(failure)
                }
            };

            let mut slot = lock(&inflight);
            if slot.generation == generation {
                slot.setup = None;
            }
            result
        }
        .boxed()
    }
}

async fn build_adapter(
    factory: &dyn AdapterFactory,
    destination: &Destination,
    base: &BaseOptions,
    options: &OutputOptions,
) -> SetupResult {
    let adapter: Arc<dyn OutputAdapter> = factory
        .create(destination, base, options)
        .map_err(|e| SetupFailure::new(Stage::Create, destination.to_string(), e))?
        .into();

    if let Preparation::Pending(init) = adapter.prepare() {
        debug!(id = adapter.id(), "initializing output adapter");
        init.await
            .map_err(|e| SetupFailure::new(Stage::Prepare, adapter.id(), e))?;
    }
    Ok(adapter)
}
