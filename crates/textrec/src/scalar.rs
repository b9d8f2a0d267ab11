// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar formatter: booleans, integers, floats, strings and the absence token.
//!
//! Encoding is format-exact: the [`FormatSpec`] fully determines the output.
//! Decoding is permissive only within the requested kind and never falls
//! through to another kind.

use crate::error::CodecError;
use crate::format_spec::FormatSpec;
use crate::types::{ScalarKind, Value};

pub fn format_bool(value: bool, spec: &FormatSpec) -> String {
    if value {
        spec.true_token.clone()
    } else {
        spec.false_token.clone()
    }
}

pub fn format_int(value: i64) -> String {
    value.to_string()
}

/// Fixed decimals when a precision is configured, otherwise the shortest
/// text that parses back to the same `f64` (always with a `.` or exponent).
pub fn format_float(value: f64, spec: &FormatSpec) -> String {
    match spec.float_precision {
        Some(precision) => format!("{:.*}", precision, value),
        None => format!("{:?}", value),
    }
}

pub fn format_str(value: &str) -> String {
    value.to_string()
}

pub fn format_none(spec: &FormatSpec) -> String {
    spec.none_token.clone()
}

/// Accepts only the configured truthy/falsy tokens.
pub fn parse_bool(text: &str, spec: &FormatSpec) -> Result<bool, CodecError> {
    if spec.is_truthy(text) {
        Ok(true)
    } else if spec.is_falsy(text) {
        Ok(false)
    } else {
        Err(CodecError::invalid(ScalarKind::Bool, text))
    }
}

/// Decimal, or `0b`/`0o`/`0x` prefixed, with an optional sign.
pub fn parse_int(text: &str) -> Result<i64, CodecError> {
    let invalid = || CodecError::invalid(ScalarKind::Int, text);

    let (sign, unsigned) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };
    let radix = match unsigned.get(..2) {
        Some("0b") | Some("0B") => 2,
        Some("0o") | Some("0O") => 8,
        Some("0x") | Some("0X") => 16,
        _ => return text.parse::<i64>().map_err(|_| invalid()),
    };
    let digits = &unsigned[2..];
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    i64::from_str_radix(&format!("{}{}", sign, digits), radix).map_err(|_| invalid())
}

/// Any text Rust reads as an `f64`; integral text like `"3"` is accepted.
pub fn parse_float(text: &str) -> Result<f64, CodecError> {
    text.parse::<f64>()
        .map_err(|_| CodecError::invalid(ScalarKind::Float, text))
}

pub fn parse_str(text: &str) -> String {
    text.to_string()
}

/// Succeeds only on an exact match of the absence token.
pub fn parse_none(text: &str, spec: &FormatSpec) -> Result<(), CodecError> {
    if text == spec.none_token {
        Ok(())
    } else {
        Err(CodecError::invalid(ScalarKind::None, text))
    }
}

/// Render a scalar value declared as `kind`.
///
/// An `Int` value is accepted for a declared `Float`.
pub fn format_scalar(value: &Value, kind: ScalarKind, spec: &FormatSpec) -> Result<String, CodecError> {
    match (kind, value) {
        (ScalarKind::Bool, Value::Bool(v)) => Ok(format_bool(*v, spec)),
        (ScalarKind::Int, Value::Int(v)) => Ok(format_int(*v)),
        (ScalarKind::Float, Value::Float(v)) => Ok(format_float(*v, spec)),
        #[allow(clippy::cast_precision_loss)]
        (ScalarKind::Float, Value::Int(v)) => Ok(format_float(*v as f64, spec)),
        (ScalarKind::Str, Value::Str(v)) => Ok(format_str(v)),
        (ScalarKind::None, Value::None) => Ok(format_none(spec)),
        (kind, other) => Err(CodecError::mismatch(kind, other.shape())),
    }
}

/// Parse text as the declared scalar `kind`.
pub fn parse_scalar(text: &str, kind: ScalarKind, spec: &FormatSpec) -> Result<Value, CodecError> {
    match kind {
        ScalarKind::Bool => parse_bool(text, spec).map(Value::Bool),
        ScalarKind::Int => parse_int(text).map(Value::Int),
        ScalarKind::Float => parse_float(text).map(Value::Float),
        ScalarKind::Str => Ok(Value::Str(parse_str(text))),
        ScalarKind::None => parse_none(text, spec).map(|()| Value::None),
    }
}
