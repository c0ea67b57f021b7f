use std::io;
use std::sync::{Arc, Mutex};

use kge_core::{ErrorKind, Hyperparams, KgeError, Tensor};

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(f: F) -> String {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.contents()
}

#[test]
fn invalid_param_name_is_logged() {
    let output = capture(|| {
        let err = Hyperparams::from_json_str(r#"{"Lambda": 1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    });
    assert!(output.contains("ERROR"));
    assert!(output.contains("Invalid param name: Lambda"));
}

#[test]
fn malformed_json_is_logged() {
    let output = capture(|| {
        let err = Hyperparams::from_json_str("{bad").unwrap_err();
        assert!(matches!(err, KgeError::SerializationError { .. }));
    });
    assert!(output.contains("ERROR"));
    assert!(output.contains("Invalid hyperparameter JSON"));
}

#[test]
fn non_object_and_nested_values_are_logged() {
    let output = capture(|| {
        assert!(Hyperparams::from_json_str("[1, 2]").is_err());
        assert!(Hyperparams::from_json_str(r#"{"lambda": {"a": 1}}"#).is_err());
    });
    assert!(output.contains("must be a JSON object"));
    assert!(output.contains("Nested objects are not supported"));
}

#[test]
fn shape_mismatch_is_logged() {
    let output = capture(|| {
        let err = Tensor::from_data(&[2], vec![1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    });
    assert!(output.contains("ERROR"));
    assert!(output.contains("cannot hold 1 elements"));
}

#[test]
fn successful_calls_log_nothing() {
    let output = capture(|| {
        Hyperparams::from_json_str(r#"{"lambda": [0.1, 1e-5]}"#).unwrap();
        Tensor::from_data(&[2, 1], vec![1.0, 2.0]).unwrap();
    });
    assert!(output.is_empty());
}
