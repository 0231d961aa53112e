//! Preparation lifecycle tests, using an adapter factory that counts calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::adapter::{AdapterFactory, Destination, OutputAdapter, Preparation};
use crate::config::{BaseOptions, OutputOptions};
use crate::engine::{OutputEngine, PrepareState};
use crate::error::{AdapterError, Stage};
use crate::{OutputBuilder, ValidationPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Init {
    /// No initialization hook
    None,
    /// Hook that yields once
    Yield,
    /// Hook that waits for `Recorder::gate`
    Gated,
}

#[derive(Debug, Default)]
struct Recorder {
    created: AtomicUsize,
    inits: AtomicUsize,
    failing_inits: AtomicUsize,
    failing_outputs: AtomicUsize,
    gate: Notify,
    destinations: Mutex<Vec<Destination>>,
    delivered: Mutex<Vec<Value>>,
}

impl Recorder {
    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    fn delivered(&self) -> Vec<Value> {
        self.delivered.lock().unwrap().clone()
    }

    fn destinations(&self) -> Vec<Destination> {
        self.destinations.lock().unwrap().clone()
    }

    /// Decrement `counter` if positive; true when it was.
    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug)]
struct RecordingFactory {
    recorder: Arc<Recorder>,
    init: Init,
}

impl AdapterFactory for RecordingFactory {
    fn create(
        &self,
        destination: &Destination,
        _base: &BaseOptions,
        _options: &OutputOptions,
    ) -> Result<Box<dyn OutputAdapter>, AdapterError> {
        self.recorder.created.fetch_add(1, Ordering::SeqCst);
        self.recorder
            .destinations
            .lock()
            .unwrap()
            .push(destination.clone());
        Ok(Box::new(RecordingAdapter {
            recorder: self.recorder.clone(),
            init: self.init,
        }))
    }
}

#[derive(Debug)]
struct RecordingAdapter {
    recorder: Arc<Recorder>,
    init: Init,
}

#[async_trait]
impl OutputAdapter for RecordingAdapter {
    fn id(&self) -> &str {
        "recorder"
    }

    fn prepare(&self) -> Preparation<'_> {
        if self.init == Init::None {
            return Preparation::Ready;
        }
        Preparation::Pending(
            async move {
                self.recorder.inits.fetch_add(1, Ordering::SeqCst);
                match self.init {
                    Init::Gated => self.recorder.gate.notified().await,
                    _ => tokio::task::yield_now().await,
                }
                if Recorder::take(&self.recorder.failing_inits) {
                    return Err(AdapterError::Store("init refused".into()));
                }
                Ok(())
            }
            .boxed(),
        )
    }

    async fn output(&self, data: &Value) -> Result<(), AdapterError> {
        if Recorder::take(&self.recorder.failing_outputs) {
            return Err(AdapterError::Store("write refused".into()));
        }
        self.recorder.delivered.lock().unwrap().push(data.clone());
        Ok(())
    }
}

fn engine_with(options: OutputOptions, init: Init) -> (OutputEngine, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let engine = OutputBuilder::new()
        .with_options(options)
        .with_factory(Arc::new(RecordingFactory {
            recorder: recorder.clone(),
            init,
        }))
        .build()
        .expect("warn policy never fails");
    (engine, recorder)
}

#[tokio::test]
async fn construction_does_not_build_the_adapter() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Yield);
    assert_eq!(engine.state(), PrepareState::Unprepared);
    assert_eq!(recorder.created(), 0);
    assert!(engine.returned().is_empty());
}

#[tokio::test]
async fn repeated_prepare_runs_setup_once() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Yield);

    engine.prepare().await.unwrap();
    engine.prepare().await.unwrap();

    assert_eq!(engine.state(), PrepareState::Prepared);
    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.inits(), 1);
}

#[tokio::test]
async fn adapter_without_init_hook_is_prepared_directly() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::None);

    engine.prepare().await.unwrap();

    assert_eq!(engine.state(), PrepareState::Prepared);
    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.inits(), 0);
}

#[tokio::test]
async fn concurrent_prepare_shares_one_preparation() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Yield);

    let (a, b) = tokio::join!(engine.prepare(), engine.prepare());
    a.unwrap();
    b.unwrap();

    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.inits(), 1);
}

#[tokio::test]
async fn output_waits_for_inflight_preparation() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Gated);
    let payload = json!({ "x": "y" });

    let (a, b, ()) = tokio::join!(
        engine.output(&payload),
        engine.output(&payload),
        async {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            assert_eq!(engine.state(), PrepareState::Preparing);
            assert!(recorder.delivered().is_empty());
            recorder.gate.notify_one();
        }
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.inits(), 1);
    assert_eq!(recorder.delivered(), vec![json!({ "x": "y" }), json!({ "x": "y" })]);
    assert_eq!(engine.state(), PrepareState::Prepared);
}

#[tokio::test]
async fn output_prepares_on_first_use() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Yield);

    engine.output(&json!(1)).await.unwrap();
    engine.output(&json!(2)).await.unwrap();

    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.delivered(), vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn init_failure_propagates_and_allows_retry() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Yield);
    recorder.failing_inits.store(1, Ordering::SeqCst);

    let err = engine.prepare().await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Prepare));
    assert_eq!(err.to_string(), "[Prepare] recorder: document store error: init refused");
    assert_eq!(engine.state(), PrepareState::Unprepared);

    engine.output(&json!("after")).await.unwrap();
    assert_eq!(recorder.created(), 2);
    assert_eq!(recorder.inits(), 2);
    assert_eq!(recorder.delivered(), vec![json!("after")]);
}

#[tokio::test]
async fn concurrent_callers_share_a_failed_preparation() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::Yield);
    recorder.failing_inits.store(1, Ordering::SeqCst);
    let first = json!({ "n": 1 });
    let second = json!({ "n": 2 });

    let (a, b) = tokio::join!(engine.output(&first), engine.output(&second));
    let (a, b) = (a.unwrap_err(), b.unwrap_err());

    assert_eq!(a.stage(), Some(Stage::Prepare));
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.inits(), 1);
    assert!(recorder.delivered().is_empty());
    assert_eq!(engine.state(), PrepareState::Unprepared);

    // a call made after the failure starts a new attempt
    engine.output(&second).await.unwrap();
    assert_eq!(recorder.created(), 2);
    assert_eq!(recorder.delivered(), vec![second]);
}

#[tokio::test]
async fn output_failure_propagates_to_caller() {
    let (engine, recorder) = engine_with(OutputOptions::new(), Init::None);
    recorder.failing_outputs.store(1, Ordering::SeqCst);

    let err = engine.output(&json!(1)).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Output));
    assert_eq!(engine.state(), PrepareState::Prepared);

    engine.output(&json!(2)).await.unwrap();
    assert_eq!(recorder.delivered(), vec![json!(2)]);
}

#[tokio::test]
async fn console_payload_is_forwarded_unchanged() {
    let options = OutputOptions::new().with_output("console").with_format("json");
    let (engine, recorder) = engine_with(options, Init::None);
    assert!(engine.validation_report().is_empty());

    engine.output(&json!({ "a": 1 })).await.unwrap();

    assert_eq!(recorder.destinations(), vec![Destination::Console]);
    assert_eq!(recorder.delivered(), vec![json!({ "a": 1 })]);
}

#[tokio::test]
async fn invalid_options_still_prepare_under_warn() {
    let options = OutputOptions::new()
        .with_output("couchbase")
        .with_server("db.local", "docs")
        .with_credentials("", "pw");
    let (engine, recorder) = engine_with(options, Init::Yield);

    let failures: Vec<String> = engine
        .validation_report()
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect();
    assert_eq!(failures, vec!["The username option must have a length"]);

    engine.prepare().await.unwrap();
    assert_eq!(recorder.destinations(), vec![Destination::Couchbase]);
    assert_eq!(recorder.created(), 1);
}

#[tokio::test]
async fn strict_policy_rejects_before_any_adapter_work() {
    let recorder = Arc::new(Recorder::default());
    let result = OutputBuilder::new()
        .with_output("console")
        .with_format("xml")
        .with_mode(ValidationPolicy::FastFail)
        .with_factory(Arc::new(RecordingFactory {
            recorder: recorder.clone(),
            init: Init::None,
        }))
        .build();

    assert!(matches!(result, Err(crate::OutputError::Invalid(ref r)) if r.len() == 1));
    assert_eq!(recorder.created(), 0);
}
