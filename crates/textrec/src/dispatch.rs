// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value dispatcher: routes a value or text to the scalar or container
//! formatter by declared type, or guesses a type when none is declared.
//!
//! # Type guessing
//!
//! Undeclared text is tried against [`FormatSpec::guess_order`] and falls
//! back to `Str`, so [`parse_value`] without a type never fails:
//!
//! | text    | default spec | `numeric_bools()` |
//! |---------|--------------|-------------------|
//! | `True`  | Bool         | Bool              |
//! | `1`     | Int          | Bool              |
//! | `0x1F`  | Int          | Int               |
//! | `3.0`   | Float        | Float             |
//! | `hello` | Str          | Str               |

use crate::container;
use crate::error::CodecError;
use crate::format_spec::{FormatSpec, GuessKind};
use crate::scalar;
use crate::types::{FieldType, Value};

/// Render a value as one text field.
///
/// With a declared type the value is rendered by that type; without one it
/// is rendered by its runtime shape. The result never contains the
/// configured delimiter.
pub fn format_value(
    value: &Value,
    ty: Option<&FieldType>,
    spec: &FormatSpec,
) -> Result<String, CodecError> {
    let text = format_at(value, ty, 0, spec)?;
    if text.contains(spec.delimiter) {
        return Err(CodecError::ReservedSeparator {
            text,
            separator: spec.delimiter,
        });
    }
    Ok(text)
}

/// Recover a value from one text field.
///
/// With a declared type, failures are typed errors. Without one, the text
/// is guessed and this never fails.
pub fn parse_value(
    text: &str,
    ty: Option<&FieldType>,
    spec: &FormatSpec,
) -> Result<Value, CodecError> {
    match ty {
        Some(ty) => parse_at(text, ty, 0, spec),
        None => Ok(guess_value(text, spec)),
    }
}

pub(crate) fn format_at(
    value: &Value,
    ty: Option<&FieldType>,
    depth: usize,
    spec: &FormatSpec,
) -> Result<String, CodecError> {
    let Some(ty) = ty else {
        return format_untyped_at(value, depth, spec);
    };
    if let Some(kind) = ty.scalar_kind() {
        return scalar::format_scalar(value, kind, spec);
    }
    match ty {
        FieldType::Optional(_) if value.is_none() => Ok(scalar::format_none(spec)),
        FieldType::Optional(inner) => format_at(value, Some(&**inner), depth, spec),
        _ => container::format_container(value, ty, depth, spec),
    }
}

pub(crate) fn format_untyped_at(
    value: &Value,
    depth: usize,
    spec: &FormatSpec,
) -> Result<String, CodecError> {
    match value.shape().scalar_kind() {
        Some(kind) => scalar::format_scalar(value, kind, spec),
        None => container::format_untyped(value, depth, spec),
    }
}

pub(crate) fn parse_at(
    text: &str,
    ty: &FieldType,
    depth: usize,
    spec: &FormatSpec,
) -> Result<Value, CodecError> {
    if let Some(kind) = ty.scalar_kind() {
        return scalar::parse_scalar(text, kind, spec);
    }
    match ty {
        FieldType::Optional(_) if text == spec.none_token => Ok(Value::None),
        FieldType::Optional(inner) => parse_at(text, inner, depth, spec),
        _ => container::parse_container(text, ty, depth, spec),
    }
}

/// Guess a scalar value from text using the configured guess order.
pub fn guess_value(text: &str, spec: &FormatSpec) -> Value {
    for step in &spec.guess_order {
        let guessed = match step {
            GuessKind::Bool => scalar::parse_bool(text, spec).ok().map(Value::Bool),
            GuessKind::Int => scalar::parse_int(text).ok().map(Value::Int),
            // `nan` and `inf` read as words, not floats, when undeclared
            GuessKind::Float => scalar::parse_float(text)
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float),
            GuessKind::None => (text == spec.none_token).then_some(Value::None),
        };
        if let Some(value) = guessed {
            return value;
        }
    }
    Value::Str(scalar::parse_str(text))
}

/// Declared type that [`guess_value`] would produce for `text`.
///
/// A guessed absence is typed `optional[str]`.
pub fn guess_type(text: &str, spec: &FormatSpec) -> FieldType {
    match guess_value(text, spec) {
        Value::Bool(_) => FieldType::Bool,
        Value::Int(_) => FieldType::Int,
        Value::Float(_) => FieldType::Float,
        Value::None => FieldType::optional(FieldType::Str),
        _ => FieldType::Str,
    }
}

/// Infer a declared type from a value's runtime shape.
///
/// Element types of lists, sets and dicts are unified: `int` and `float`
/// widen to `float`, absent elements make the element optional, an empty
/// container defaults to `str` elements. Any other disagreement is a
/// [`CodecError::ShapeMismatch`].
pub fn infer_type(value: &Value) -> Result<FieldType, CodecError> {
    Ok(match value {
        Value::Bool(_) => FieldType::Bool,
        Value::Int(_) => FieldType::Int,
        Value::Float(_) => FieldType::Float,
        Value::Str(_) => FieldType::Str,
        Value::None => FieldType::optional(FieldType::Str),
        Value::List(items) => FieldType::list(unify(items.iter())?),
        Value::Set(items) => FieldType::set(unify(items.iter())?),
        Value::Tuple(items) => {
            FieldType::tuple(items.iter().map(infer_type).collect::<Result<_, _>>()?)
        }
        Value::Dict(entries) => FieldType::dict(
            unify(entries.iter().map(|(k, _)| k))?,
            unify(entries.iter().map(|(_, v)| v))?,
        ),
        Value::Record(record) => FieldType::Record(record.definition().clone()),
    })
}

fn unify<'a>(values: impl Iterator<Item = &'a Value>) -> Result<FieldType, CodecError> {
    let mut merged: Option<FieldType> = None;
    let mut absent = false;
    for value in values {
        if value.is_none() {
            absent = true;
            continue;
        }
        let ty = infer_type(value)?;
        merged = Some(match merged {
            None => ty,
            Some(prev) => merge(prev, ty)?,
        });
    }
    let ty = merged.unwrap_or(FieldType::Str);
    Ok(match ty {
        FieldType::Optional(_) => ty,
        ty if absent => FieldType::optional(ty),
        ty => ty,
    })
}

fn merge(a: FieldType, b: FieldType) -> Result<FieldType, CodecError> {
    if a == b {
        return Ok(a);
    }
    Ok(match (a, b) {
        (FieldType::Int, FieldType::Float) | (FieldType::Float, FieldType::Int) => FieldType::Float,
        (FieldType::Optional(x), FieldType::Optional(y)) => FieldType::optional(merge(*x, *y)?),
        (FieldType::Optional(x), y) | (y, FieldType::Optional(x)) => {
            FieldType::optional(merge(*x, y)?)
        }
        (FieldType::List(x), FieldType::List(y)) => FieldType::list(merge(*x, *y)?),
        (FieldType::Set(x), FieldType::Set(y)) => FieldType::set(merge(*x, *y)?),
        (FieldType::Tuple(xs), FieldType::Tuple(ys)) if xs.len() == ys.len() => FieldType::tuple(
            xs.into_iter()
                .zip(ys)
                .map(|(x, y)| merge(x, y))
                .collect::<Result<_, _>>()?,
        ),
        (FieldType::Dict(xk, xv), FieldType::Dict(yk, yv)) => {
            FieldType::dict(merge(*xk, *yk)?, merge(*xv, *yv)?)
        }
        (a, b) => return Err(CodecError::mismatch(&a, &b)),
    })
}

/// Whether a runtime value may be stored under a declared type.
///
/// Shapes must match exactly, except that an absent value fits any
/// `optional[T]` and an `int` fits a declared `float`.
pub fn is_compatible(value: &Value, ty: &FieldType) -> bool {
    match (ty, value) {
        (FieldType::Optional(_), Value::None) => true,
        (FieldType::Optional(inner), value) => is_compatible(value, inner),
        (FieldType::Bool, Value::Bool(_))
        | (FieldType::Int, Value::Int(_))
        | (FieldType::Float, Value::Float(_) | Value::Int(_))
        | (FieldType::Str, Value::Str(_))
        | (FieldType::None, Value::None) => true,
        (FieldType::List(element), Value::List(items))
        | (FieldType::Set(element), Value::Set(items)) => {
            items.iter().all(|item| is_compatible(item, element))
        }
        (FieldType::Tuple(types), Value::Tuple(items)) => {
            types.len() == items.len()
                && types.iter().zip(items).all(|(ty, item)| is_compatible(item, ty))
        }
        (FieldType::Dict(key_ty, value_ty), Value::Dict(entries)) => entries
            .iter()
            .all(|(k, v)| is_compatible(k, key_ty) && is_compatible(v, value_ty)),
        (FieldType::Record(definition), Value::Record(record)) => {
            **record.definition() == **definition
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_priority() {
        let spec = FormatSpec::default();
        assert_eq!(guess_value("True", &spec), Value::Bool(true));
        assert_eq!(guess_value("1", &spec), Value::Int(1));
        assert_eq!(guess_value("0x1F", &spec), Value::Int(31));
        assert_eq!(guess_value("3.0", &spec), Value::Float(3.0));
        assert_eq!(guess_value("2.75", &spec), Value::Float(2.75));
        assert_eq!(guess_value("hello", &spec), Value::from("hello"));
        assert_eq!(guess_value("", &spec), Value::from(""));

        let numeric = FormatSpec::numeric_bools();
        assert_eq!(guess_value("1", &numeric), Value::Bool(true));
        assert_eq!(guess_value("2", &numeric), Value::Int(2));
    }

    #[test]
    fn test_guess_skips_non_finite_floats() {
        let spec = FormatSpec::default();
        for word in ["nan", "NaN", "inf", "-inf", "Infinity", "1e999"] {
            assert_eq!(guess_value(word, &spec), Value::from(word), "{word}");
            assert_eq!(guess_type(word, &spec), FieldType::Str);
        }
        // Declared floats still accept them.
        assert!(matches!(
            parse_value("inf", Some(&FieldType::Float), &spec),
            Ok(Value::Float(v)) if v.is_infinite()
        ));
    }

    #[test]
    fn test_guess_none_is_opt_in() {
        let spec = FormatSpec::default().with_guess_order(vec![
            GuessKind::None,
            GuessKind::Bool,
            GuessKind::Int,
            GuessKind::Float,
        ]);
        assert_eq!(guess_value("", &spec), Value::None);
        assert_eq!(guess_type("", &spec), FieldType::optional(FieldType::Str));
        assert_eq!(guess_type("7", &spec), FieldType::Int);
    }

    #[test]
    fn test_declared_routes_by_type() {
        let spec = FormatSpec::default();
        let ty = FieldType::optional(FieldType::list(FieldType::Int));
        assert_eq!(format_value(&Value::None, Some(&ty), &spec).unwrap(), "");
        assert_eq!(
            format_value(&Value::from(vec![1, 2]), Some(&ty), &spec).unwrap(),
            "1,2"
        );
        assert_eq!(parse_value("", Some(&ty), &spec).unwrap(), Value::None);
        assert_eq!(
            parse_value("4,5", Some(&ty), &spec).unwrap(),
            Value::from(vec![4, 5])
        );
        // Declared failures are errors, never silent coercions.
        assert!(matches!(
            parse_value("1.5", Some(&FieldType::Int), &spec),
            Err(CodecError::InvalidScalar { .. })
        ));
    }

    #[test]
    fn test_undeclared_routes_by_runtime_shape() {
        let spec = FormatSpec::default();
        assert_eq!(format_value(&Value::Float(1.5), None, &spec).unwrap(), "1.5");
        let value = Value::Tuple(vec![Value::Int(1), Value::from(vec!["a", "b"])]);
        assert_eq!(format_value(&value, None, &spec).unwrap(), "1,a;b");
    }

    #[test]
    fn test_delimiter_rejected() {
        let spec = FormatSpec::default();
        assert_eq!(
            format_value(&Value::from("a|b"), Some(&FieldType::Str), &spec),
            Err(CodecError::ReservedSeparator {
                text: "a|b".into(),
                separator: '|'
            })
        );
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(
            infer_type(&Value::List(vec![Value::Int(1), Value::Float(2.5)])).unwrap(),
            FieldType::list(FieldType::Float)
        );
        assert_eq!(
            infer_type(&Value::List(vec![Value::Int(1), Value::None])).unwrap(),
            FieldType::list(FieldType::optional(FieldType::Int))
        );
        assert_eq!(
            infer_type(&Value::List(vec![])).unwrap(),
            FieldType::list(FieldType::Str)
        );
        assert_eq!(
            infer_type(&Value::dict(vec![(Value::from("a"), Value::Bool(true))])).unwrap(),
            FieldType::dict(FieldType::Str, FieldType::Bool)
        );
        assert!(matches!(
            infer_type(&Value::List(vec![Value::Int(1), Value::from("x")])),
            Err(CodecError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_compatibility() {
        assert!(is_compatible(&Value::Int(1), &FieldType::Float));
        assert!(!is_compatible(&Value::Float(1.0), &FieldType::Int));
        assert!(is_compatible(
            &Value::None,
            &FieldType::optional(FieldType::list(FieldType::Int))
        ));
        assert!(!is_compatible(&Value::None, &FieldType::Int));
        assert!(!is_compatible(
            &Value::Tuple(vec![Value::Int(1)]),
            &FieldType::tuple(vec![FieldType::Int, FieldType::Int])
        ));
        assert!(!is_compatible(&Value::from(vec![1]), &FieldType::set(FieldType::Int)));
    }
}
