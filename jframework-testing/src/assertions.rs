// Test assertions for framework results

use crate::mock::{CallRecorder, RecordingHandler};

/// Assert that a `FrameworkResult` failed with the given `ErrorKind`
///
/// ```
/// use jframework_core::{ErrorKind, FrameworkError, FrameworkResult};
/// use jframework_testing::assert_error_kind;
///
/// let result: FrameworkResult<()> = Err(FrameworkError::InvalidArgument("x".into()));
/// assert_error_kind!(result, ErrorKind::InvalidArgument);
/// ```
#[macro_export]
macro_rules! assert_error_kind {
    ($result:expr, $kind:expr) => {
        match &$result {
            Ok(_) => panic!("Expected error of kind {}, got Ok", $kind),
            Err(err) => assert_eq!(
                err.kind(),
                $kind,
                "Expected error of kind {}, got: {}",
                $kind,
                err
            ),
        }
    };
}

/// Assert that the recorder saw exactly `expected`, in order
pub fn assert_calls(recorder: &CallRecorder, expected: &[&str]) {
    let actual = recorder.calls();
    assert_eq!(
        actual, expected,
        "Expected calls {:?}, got {:?}",
        expected, actual
    );
}

/// Assert that `first` was recorded before `second`
pub fn assert_called_before(recorder: &CallRecorder, first: &str, second: &str) {
    match (recorder.index_of(first), recorder.index_of(second)) {
        (Some(a), Some(b)) => assert!(
            a < b,
            "Expected '{}' before '{}', got {:?}",
            first,
            second,
            recorder.calls()
        ),
        _ => panic!(
            "Expected both '{}' and '{}' to be recorded, got {:?}",
            first,
            second,
            recorder.calls()
        ),
    }
}

/// Assert the number of events of type `E` a handler received
pub fn assert_received<E: 'static>(handler: &RecordingHandler, expected: usize) {
    let actual = handler.count_of::<E>();
    assert_eq!(
        actual,
        expected,
        "Expected {} events of type {}, got {}",
        expected,
        std::any::type_name::<E>(),
        actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use jframework_core::{ErrorKind, FrameworkError, FrameworkResult};

    #[test]
    fn test_assert_calls() {
        let recorder = CallRecorder::new();
        recorder.record("a");
        recorder.record("b");
        assert_calls(&recorder, &["a", "b"]);
        assert_called_before(&recorder, "a", "b");
    }

    #[test]
    #[should_panic(expected = "Expected 'b' before 'a'")]
    fn test_assert_called_before_fails() {
        let recorder = CallRecorder::new();
        recorder.record("a");
        recorder.record("b");
        assert_called_before(&recorder, "b", "a");
    }

    #[test]
    fn test_error_kind_macro() {
        let result: FrameworkResult<u8> = Err(FrameworkError::ComponentNotRegistered("M".into()));
        assert_error_kind!(result, ErrorKind::ComponentNotRegistered);
    }

    #[test]
    #[should_panic(expected = "got Ok")]
    fn test_error_kind_macro_on_ok() {
        let result: FrameworkResult<u8> = Ok(1);
        assert_error_kind!(result, ErrorKind::InvalidArgument);
    }
}
