//! Integration tests for the beta signal pipeline.
//!
//! Exercises the public API end to end and checks the trace lines emitted
//! through an injected dispatcher.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;

use beta_signal::error::{PipelineError, SchemaError};
use beta_signal::pipeline::{
    MessageValidator, PLACEHOLDER_BETA_SCORE, Pipeline, RawMessage, REQUIRED_KEYS,
};

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn traced_pipeline() -> (Pipeline, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let pipeline = Pipeline::new(MessageValidator::default()).with_dispatch(Dispatch::new(subscriber));
    (pipeline, logs)
}

fn raw(value: Value) -> RawMessage {
    value.as_object().cloned().expect("test input must be an object")
}

fn valid_inputs() -> Vec<Value> {
    vec![
        json!({"symbol": "AAPL", "timestamp": 1700000000, "data": {"price": 150.0}}),
        json!({"symbol": "BRK.B", "timestamp": 1700000000.5, "data": {}}),
        json!({"symbol": "BTC/USD", "timestamp": "2024-06-01T00:00:00Z", "data": {"bid": 67000.1, "ask": 67000.9}}),
        json!({"symbol": "ES:H25", "timestamp": 0, "data": {"nested": {"depth": [1, 2, 3]}}, "venue": "CME"}),
    ]
}

#[test]
fn reference_example() {
    let out = Pipeline::default()
        .process(raw(json!({"symbol": "AAPL", "timestamp": 1700000000, "data": {"price": 150.0}})))
        .unwrap();

    assert_eq!(
        serde_json::to_value(&out).unwrap(),
        json!({
            "symbol": "AAPL",
            "timestamp": 1700000000,
            "data": {"price": 150.0, "symbol": "AAPL", "timestamp": 1700000000, "beta_score": 0.85}
        })
    );
}

#[test]
fn symbol_and_timestamp_pass_through() {
    let pipeline = Pipeline::default();
    for input in valid_inputs() {
        let out = pipeline.process(raw(input.clone())).unwrap();
        assert_eq!(json!(out.symbol), input["symbol"]);
        assert_eq!(out.timestamp, input["timestamp"]);
    }
}

#[test]
fn data_is_superset_plus_signal_fields() {
    let pipeline = Pipeline::default();
    for input in valid_inputs() {
        let original = input["data"].as_object().unwrap().clone();
        let out = pipeline.process(raw(input)).unwrap();

        for (key, value) in &original {
            assert_eq!(&out.data[key], value, "payload field {key} must survive");
        }
        let added: Vec<&String> = out
            .data
            .keys()
            .filter(|key| !original.contains_key(*key))
            .collect();
        assert_eq!(added.len(), 3);
        assert_eq!(out.data["beta_score"], PLACEHOLDER_BETA_SCORE);
    }
}

#[test]
fn processing_is_idempotent() {
    let pipeline = Pipeline::default();
    for input in valid_inputs() {
        let first = pipeline.process(raw(input.clone())).unwrap();
        let second = pipeline.process(raw(input)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn each_missing_key_is_reported() {
    let pipeline = Pipeline::default();
    let complete = json!({"symbol": "AAPL", "timestamp": 1700000000, "data": {}});

    for key in REQUIRED_KEYS {
        let mut input = raw(complete.clone());
        input.remove(key);
        assert_eq!(
            pipeline.process(input).unwrap_err(),
            PipelineError::MissingField(key.to_string())
        );
    }
}

#[test]
fn missing_timestamp_example() {
    let err = Pipeline::default()
        .process(raw(json!({"symbol": "AAPL", "data": {}})))
        .unwrap_err();
    assert_eq!(err, PipelineError::MissingField("timestamp".into()));
}

#[test]
fn schema_errors_precede_key_checks() {
    let pipeline = Pipeline::default();
    let cases = [
        json!({"symbol": 42, "timestamp": 1, "data": {}}),
        json!({"symbol": 42}),
        json!({"data": "flat"}),
        json!({"symbol": "AAPL", "timestamp": "last tuesday"}),
        json!({"symbol": ""}),
    ];
    for input in cases {
        let err = pipeline.process(raw(input.clone())).unwrap_err();
        assert!(
            matches!(err, PipelineError::Schema(_)),
            "{input} should fail the schema, got {err:?}"
        );
    }
}

#[test]
fn wrong_symbol_type_names_the_field() {
    let err = Pipeline::default()
        .process(raw(json!({"symbol": ["AAPL"], "timestamp": 1, "data": {}})))
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::Schema(SchemaError::WrongType {
            field: "symbol".into(),
            expected: "a string",
            found: "an array",
        })
    );
}

#[test]
fn shared_across_threads() {
    let pipeline = Arc::new(Pipeline::default());
    let handles: Vec<_> = ["AAPL", "MSFT", "NVDA", "AMZN"]
        .into_iter()
        .map(|symbol| {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || {
                pipeline
                    .process(raw(json!({"symbol": symbol, "timestamp": 1, "data": {}})))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let out = handle.join().unwrap();
        assert_eq!(out.data["symbol"], json!(out.symbol));
    }
}

#[test]
fn traces_successful_flow() {
    let (pipeline, logs) = traced_pipeline();
    pipeline
        .process(raw(json!({"symbol": "AAPL", "timestamp": 1700000000, "data": {"price": 150.0}})))
        .unwrap();

    let output = logs.contents();
    assert!(output.contains("INFO"), "{output}");
    assert!(output.contains("Processing new message"), "{output}");
    assert!(output.contains("Validating message schema"), "{output}");
    assert!(output.contains("Computing beta signal"), "{output}");
    assert!(output.contains("symbol=AAPL"), "{output}");
    assert!(output.contains("Final enriched message"), "{output}");
    assert!(output.contains(r#""beta_score":0.85"#), "{output}");
    assert!(!output.contains("ERROR"), "{output}");
}

#[test]
fn traces_schema_failure_with_payload() {
    let (pipeline, logs) = traced_pipeline();
    pipeline
        .process(raw(json!({"symbol": 42, "timestamp": 1, "data": {}})))
        .unwrap_err();

    let output = logs.contents();
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("Message schema invalid"), "{output}");
    assert!(output.contains(r#""symbol":42"#), "{output}");
    assert!(!output.contains("Computing beta signal"), "{output}");
}

#[test]
fn traces_missing_key_failure_with_payload() {
    let (pipeline, logs) = traced_pipeline();
    pipeline
        .process(raw(json!({"symbol": "AAPL", "data": {}})))
        .unwrap_err();

    let output = logs.contents();
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("Missing required keys in message"), "{output}");
    assert!(output.contains("missing=timestamp"), "{output}");
    assert!(output.contains(r#""symbol":"AAPL""#), "{output}");
}

#[test]
fn traces_unforwarded_top_level_keys() {
    let (pipeline, logs) = traced_pipeline();
    let out = pipeline
        .process(raw(json!({"symbol": "AAPL", "timestamp": 1, "data": {}, "venue": "XNAS"})))
        .unwrap();

    assert!(out.data.get("venue").is_none());
    let output = logs.contents();
    assert!(output.contains("are not forwarded"), "{output}");
    assert!(output.contains("venue"), "{output}");
}

#[test]
fn injected_sink_is_scoped_to_its_pipeline() {
    let (_traced, logs) = traced_pipeline();
    Pipeline::default()
        .process(raw(json!({"symbol": "AAPL", "timestamp": 1, "data": {}})))
        .unwrap();
    assert!(logs.contents().is_empty());
}
