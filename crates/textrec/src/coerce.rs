// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Loose value coercion into a declared type.
//!
//! Used when value rows arrive with runtime shapes that do not exactly
//! match a record definition, e.g. integers read from a spreadsheet for a
//! boolean column. Unlike the dispatcher this converts between shapes:
//!
//! - `int -> bool` is `value == 1`, `int -> float` widens
//! - scalars render to `str`; `str` parses into `int`, `float` and `bool`
//! - a scalar becomes a one-element list, set or tuple
//! - lists, sets and tuples convert into each other elementwise
//! - an even-length list becomes a dict of consecutive pairs
//! - absence or empty text becomes an empty container
//!
//! Anything else is a [`CodecError::ShapeMismatch`].

use crate::container;
use crate::error::CodecError;
use crate::format_spec::FormatSpec;
use crate::scalar;
use crate::types::{FieldType, Record, ScalarKind, Value};

/// Coerce `value` into the declared type `ty`.
pub fn coerce_value(value: &Value, ty: &FieldType, spec: &FormatSpec) -> Result<Value, CodecError> {
    let mismatch = || CodecError::mismatch(ty, value.shape());

    match (ty, value) {
        (FieldType::Optional(_), Value::None) => Ok(Value::None),
        (FieldType::Optional(inner), value) => coerce_value(value, inner, spec),

        // Scalars
        (FieldType::None, Value::None) => Ok(Value::None),
        (FieldType::Bool, Value::Bool(v)) => Ok(Value::Bool(*v)),
        (FieldType::Bool, Value::Int(v)) => Ok(Value::Bool(*v == 1)),
        (FieldType::Bool, Value::Str(s)) => scalar::parse_bool(s, spec).map(Value::Bool),
        (FieldType::Int, Value::Int(v)) => Ok(Value::Int(*v)),
        (FieldType::Int, Value::Str(s)) => parse_integral(s).map(Value::Int),
        (FieldType::Float, Value::Float(v)) => Ok(Value::Float(*v)),
        #[allow(clippy::cast_precision_loss)]
        (FieldType::Float, Value::Int(v)) => Ok(Value::Float(*v as f64)),
        (FieldType::Float, Value::Str(s)) => scalar::parse_float(s).map(Value::Float),
        (FieldType::Str, Value::Str(s)) => Ok(Value::Str(s.clone())),
        (FieldType::Str, Value::None) => Ok(Value::Str(scalar::format_none(spec))),
        (FieldType::Str, Value::Bool(_) | Value::Int(_) | Value::Float(_)) => {
            let kind = value.shape().scalar_kind().ok_or_else(mismatch)?;
            scalar::format_scalar(value, kind, spec).map(Value::Str)
        }
        (FieldType::Str, Value::List(_) | Value::Set(_) | Value::Tuple(_) | Value::Dict(_)) => {
            container::format_untyped(value, 0, spec).map(Value::Str)
        }

        // Absence and empty text become empty containers
        (FieldType::List(_), Value::None) => Ok(Value::List(Vec::new())),
        (FieldType::Set(_), Value::None) => Ok(Value::Set(Vec::new())),
        (FieldType::Dict(_, _), Value::None) => Ok(Value::Dict(Vec::new())),
        (FieldType::List(_), Value::Str(s)) if s.is_empty() => Ok(Value::List(Vec::new())),
        (FieldType::Set(_), Value::Str(s)) if s.is_empty() => Ok(Value::Set(Vec::new())),
        (FieldType::Dict(_, _), Value::Str(s)) if s.is_empty() => Ok(Value::Dict(Vec::new())),
        (FieldType::Tuple(types), Value::Str(s)) if s.is_empty() && types.is_empty() => {
            Ok(Value::Tuple(Vec::new()))
        }

        // Sequences convert into each other elementwise
        (FieldType::List(element), Value::List(items) | Value::Set(items) | Value::Tuple(items)) => {
            coerce_items(items, element, spec).map(Value::List)
        }
        (FieldType::Set(element), Value::List(items) | Value::Set(items) | Value::Tuple(items)) => {
            coerce_items(items, element, spec).map(Value::set)
        }
        (FieldType::Tuple(types), Value::List(items) | Value::Set(items) | Value::Tuple(items)) => {
            if types.len() != items.len() {
                return Err(mismatch());
            }
            types
                .iter()
                .zip(items)
                .map(|(ty, item)| coerce_value(item, ty, spec))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple)
        }

        // A scalar becomes a one-element sequence
        (FieldType::List(element), item) if is_scalar(item) => {
            Ok(Value::List(vec![coerce_value(item, element, spec)?]))
        }
        (FieldType::Set(element), item) if is_scalar(item) => {
            Ok(Value::Set(vec![coerce_value(item, element, spec)?]))
        }
        (FieldType::Tuple(types), item) if is_scalar(item) && types.len() == 1 => {
            Ok(Value::Tuple(vec![coerce_value(item, &types[0], spec)?]))
        }

        // Dicts
        (FieldType::Dict(key_ty, value_ty), Value::Dict(entries)) => entries
            .iter()
            .map(|(k, v)| -> Result<(Value, Value), CodecError> {
                Ok((coerce_value(k, key_ty, spec)?, coerce_value(v, value_ty, spec)?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::dict),
        (FieldType::Dict(key_ty, value_ty), Value::List(items)) if items.len() % 2 == 0 => items
            .chunks(2)
            .map(|pair| -> Result<(Value, Value), CodecError> {
                Ok((
                    coerce_value(&pair[0], key_ty, spec)?,
                    coerce_value(&pair[1], value_ty, spec)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::dict),

        // Records
        (FieldType::Record(definition), Value::Record(record)) => {
            record.project(definition).map(Value::Record)
        }
        (FieldType::Record(definition), Value::List(items) | Value::Tuple(items)) => {
            if definition.len() != items.len() {
                return Err(mismatch());
            }
            let values = definition
                .fields()
                .iter()
                .zip(items)
                .enumerate()
                .map(|(position, (field, item))| {
                    coerce_value(item, &field.ty, spec).map_err(|e| e.in_field(position, &field.name))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Record::new(definition, values).map(Value::Record)
        }

        _ => Err(mismatch()),
    }
}

fn coerce_items(items: &[Value], element: &FieldType, spec: &FormatSpec) -> Result<Vec<Value>, CodecError> {
    items.iter().map(|item| coerce_value(item, element, spec)).collect()
}

fn is_scalar(value: &Value) -> bool {
    value.shape().scalar_kind().is_some_and(|kind| kind != ScalarKind::None)
}

/// Integer text, or float text with no fractional part.
fn parse_integral(text: &str) -> Result<i64, CodecError> {
    if let Ok(v) = scalar::parse_int(text) {
        return Ok(v);
    }
    match scalar::parse_float(text) {
        #[allow(clippy::cast_possible_truncation)]
        Ok(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(f as i64),
        _ => Err(CodecError::invalid(ScalarKind::Int, text)),
    }
}
