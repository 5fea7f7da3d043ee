//! Integration tests for Error types
//!
//! Tests error construction, display, context, and the legacy status codes.

use scalc_foundation::{
    CompileErrorKind, Error, ErrorContext, ErrorKind, EvalErrorKind, error_message,
};

// =============================================================================
// Compile Errors
// =============================================================================

#[test]
fn compile_error_carries_code_and_position() {
    let err = Error::compile(CompileErrorKind::ParenOpen, 3);
    assert_eq!(err.compile_kind(), Some(CompileErrorKind::ParenOpen));
    assert_eq!(err.status(), 6);
    assert!(err.eval_kind().is_none());
    assert!(format!("{err}").contains("Parenthesis still open"));
}

#[test]
fn legacy_messages_by_code() {
    assert_eq!(error_message(0), Some("No error"));
    assert_eq!(error_message(11), Some("Syntax error, unknown operator/operand"));
    assert_eq!(error_message(16), Some("Output buffer too small"));
    assert_eq!(error_message(17), None);
    assert_eq!(error_message(-3), None);
}

// =============================================================================
// Evaluation Errors
// =============================================================================

#[test]
fn eval_error_has_no_compile_code() {
    let err = Error::eval(EvalErrorKind::DivisionByZero);
    assert_eq!(err.status(), -1);
    assert_eq!(err.eval_kind(), Some(&EvalErrorKind::DivisionByZero));
    assert_eq!(format!("{err}"), "evaluation failed: division by zero");
}

#[test]
fn malformed_bytecode_names_offset() {
    let err = Error::malformed(12);
    assert_eq!(
        err.eval_kind(),
        Some(&EvalErrorKind::MalformedBytecode { offset: 12 })
    );
}

#[test]
fn io_and_serialization_kinds() {
    let err = Error::new(ErrorKind::IoError("disk full".to_string()));
    assert!(format!("{err}").contains("disk full"));
    let err = Error::new(ErrorKind::SerializationError("bad tag".to_string()));
    assert!(format!("{err}").contains("bad tag"));
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn context_points_at_position() {
    let context = ErrorContext::new().with_expression("A+*B").with_position(2);
    let err = Error::compile(CompileErrorKind::Syntax, 2).with_context(context);
    let rendered = err.context.map(|c| c.to_string()).unwrap_or_default();
    assert!(rendered.contains("A+*B"));
    assert!(rendered.ends_with("  ^"));
}
