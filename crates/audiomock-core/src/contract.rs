//! Precondition checks applied at public entry points.
//!
//! Each helper validates one argument and returns a typed [`GraphError`]
//! naming the failing operation. Entry points run these before touching the
//! graph, so a rejected call never leaves a partial mutation behind.

use crate::error::GraphError;

/// Formats the `Type#method` label used in error messages.
pub(crate) fn method(type_name: &str, op: &str) -> String {
    format!("{type_name}#{op}")
}

/// Requires `index < count` for an output slot.
pub(crate) fn check_output(method: &str, index: usize, count: usize) -> Result<(), GraphError> {
    if index >= count {
        return Err(GraphError::OutputOutOfRange {
            method: method.to_string(),
            index,
            count,
        });
    }
    Ok(())
}

/// Requires `index < count` for an input slot.
pub(crate) fn check_input(method: &str, index: usize, count: usize) -> Result<(), GraphError> {
    if index >= count {
        return Err(GraphError::InputOutOfRange {
            method: method.to_string(),
            index,
            count,
        });
    }
    Ok(())
}

/// Requires `index < len` for any other indexed argument.
pub(crate) fn check_index(
    method: &str,
    what: &'static str,
    index: usize,
    len: usize,
) -> Result<(), GraphError> {
    if index >= len {
        return Err(GraphError::IndexOutOfRange {
            method: method.to_string(),
            what,
            index,
            len,
        });
    }
    Ok(())
}

/// Requires a finite value.
pub(crate) fn check_finite(method: &str, name: &str, value: f64) -> Result<(), GraphError> {
    if !value.is_finite() {
        return Err(GraphError::invalid_argument(
            method,
            format!("{name} should be a finite number, got {value}"),
        ));
    }
    Ok(())
}

/// Requires a finite, non-negative time in seconds.
pub(crate) fn check_time(method: &str, name: &str, value: f64) -> Result<(), GraphError> {
    check_finite(method, name, value)?;
    if value < 0.0 {
        return Err(GraphError::invalid_argument(
            method,
            format!("{name} should be a positive number, got negative {value}"),
        ));
    }
    Ok(())
}

/// Requires a strictly positive count.
pub(crate) fn check_positive(method: &str, name: &str, value: usize) -> Result<(), GraphError> {
    if value == 0 {
        return Err(GraphError::invalid_argument(
            method,
            format!("{name} should be greater than zero"),
        ));
    }
    Ok(())
}
