// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container formatter: lists, sets, tuples, dicts and nested records.
//!
//! A container at nesting `depth` joins its elements with the item
//! separator of that depth and hands every element back to the dispatcher
//! at `depth + 1`. Dict entries are written `key<kv>value`. Records are
//! written like a tuple of their fields.
//!
//! ```text
//! list[tuple[int, str]]   [(1, "a"), (2, "b")]   ->   1;a,2;b
//! ```

use crate::dispatch::{format_at, format_untyped_at, parse_at};
use crate::error::CodecError;
use crate::format_spec::{FormatSpec, Separators};
use crate::types::{FieldType, Record, RecordDefinition, Value};
use std::sync::Arc;

/// Render a container value declared as `ty` at nesting `depth`.
pub fn format_container(
    value: &Value,
    ty: &FieldType,
    depth: usize,
    spec: &FormatSpec,
) -> Result<String, CodecError> {
    if !ty.shape().is_container() {
        return Err(CodecError::UnsupportedType(format!(
            "{} is not a container type",
            ty
        )));
    }
    let sep = spec.level(depth)?;

    match (ty, value) {
        (FieldType::List(element), Value::List(items)) => {
            let texts = render_items(items, |item| format_at(item, Some(&**element), depth + 1, spec))?;
            join(texts, sep.item)
        }
        (FieldType::Set(element), Value::Set(items)) => {
            let mut texts =
                render_items(items, |item| format_at(item, Some(&**element), depth + 1, spec))?;
            texts.sort();
            join(texts, sep.item)
        }
        (FieldType::Tuple(types), Value::Tuple(items)) => {
            check_arity(types.len(), items.len(), ty)?;
            let texts = types
                .iter()
                .zip(items)
                .map(|(ty, item)| format_at(item, Some(ty), depth + 1, spec))
                .collect::<Result<Vec<_>, _>>()?;
            join(texts, sep.item)
        }
        (FieldType::Dict(key_ty, value_ty), Value::Dict(entries)) => {
            let texts = entries
                .iter()
                .map(|(k, v)| {
                    let key = format_at(k, Some(&**key_ty), depth + 1, spec)?;
                    let value = format_at(v, Some(&**value_ty), depth + 1, spec)?;
                    entry(key, value, sep)
                })
                .collect::<Result<Vec<_>, _>>()?;
            join(texts, sep.item)
        }
        (FieldType::Record(definition), Value::Record(record)) => {
            if **record.definition() != **definition {
                return Err(CodecError::mismatch(ty, record.name()));
            }
            let texts = definition
                .fields()
                .iter()
                .zip(record.values())
                .enumerate()
                .map(|(position, (field, value))| {
                    format_at(value, Some(&field.ty), depth + 1, spec)
                        .map_err(|e| e.in_field(position, &field.name))
                })
                .collect::<Result<Vec<_>, _>>()?;
            join(texts, sep.item)
        }
        (ty, value) => Err(CodecError::mismatch(ty, value.shape())),
    }
}

/// Parse container text as the declared `ty` at nesting `depth`.
pub fn parse_container(
    text: &str,
    ty: &FieldType,
    depth: usize,
    spec: &FormatSpec,
) -> Result<Value, CodecError> {
    if !ty.shape().is_container() {
        return Err(CodecError::UnsupportedType(format!(
            "{} is not a container type",
            ty
        )));
    }
    let sep = spec.level(depth)?;

    match ty {
        FieldType::List(element) => split(text, sep.item)
            .map(|piece| parse_at(piece, element, depth + 1, spec))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        FieldType::Set(element) => split(text, sep.item)
            .map(|piece| parse_at(piece, element, depth + 1, spec))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::set),
        FieldType::Tuple(types) => {
            let pieces = split_fixed(text, sep.item, types.len());
            check_arity(types.len(), pieces.len(), ty)?;
            types
                .iter()
                .zip(pieces)
                .map(|(ty, piece)| parse_at(piece, ty, depth + 1, spec))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple)
        }
        FieldType::Dict(key_ty, value_ty) => split(text, sep.item)
            .map(|piece| -> Result<(Value, Value), CodecError> {
                let (key, value) = piece.split_once(sep.kv).ok_or_else(|| {
                    CodecError::mismatch(format!("dict entry key{}value", sep.kv), piece)
                })?;
                Ok((
                    parse_at(key, key_ty, depth + 1, spec)?,
                    parse_at(value, value_ty, depth + 1, spec)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::dict),
        FieldType::Record(definition) => {
            parse_record_fields(text, definition, sep, depth, spec).map(Value::Record)
        }
        _ => Err(CodecError::mismatch(ty, "container")),
    }
}

/// Render a container by its runtime shape, without a declared type.
///
/// Elements are rendered untyped as well; sets are sorted.
pub fn format_untyped(value: &Value, depth: usize, spec: &FormatSpec) -> Result<String, CodecError> {
    if let Value::Record(record) = value {
        let ty = FieldType::Record(record.definition().clone());
        return format_container(value, &ty, depth, spec);
    }
    let sep = spec.level(depth)?;

    match value {
        Value::List(items) | Value::Tuple(items) => {
            let texts = render_items(items, |item| format_untyped_at(item, depth + 1, spec))?;
            join(texts, sep.item)
        }
        Value::Set(items) => {
            let mut texts = render_items(items, |item| format_untyped_at(item, depth + 1, spec))?;
            texts.sort();
            join(texts, sep.item)
        }
        Value::Dict(entries) => {
            let texts = entries
                .iter()
                .map(|(k, v)| {
                    let key = format_untyped_at(k, depth + 1, spec)?;
                    let value = format_untyped_at(v, depth + 1, spec)?;
                    entry(key, value, sep)
                })
                .collect::<Result<Vec<_>, _>>()?;
            join(texts, sep.item)
        }
        other => Err(CodecError::mismatch("container", other.shape())),
    }
}

fn parse_record_fields(
    text: &str,
    definition: &Arc<RecordDefinition>,
    sep: Separators,
    depth: usize,
    spec: &FormatSpec,
) -> Result<Record, CodecError> {
    let pieces = split_fixed(text, sep.item, definition.len());
    if pieces.len() != definition.len() {
        return Err(CodecError::mismatch(
            format!("{} fields for {}", definition.len(), definition.name),
            format!("{} items", pieces.len()),
        ));
    }
    let values = definition
        .fields()
        .iter()
        .zip(pieces)
        .enumerate()
        .map(|(position, (field, piece))| {
            parse_at(piece, &field.ty, depth + 1, spec).map_err(|e| e.in_field(position, &field.name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Record::from_parts(definition.clone(), values))
}

fn render_items<F>(items: &[Value], render: F) -> Result<Vec<String>, CodecError>
where
    F: Fn(&Value) -> Result<String, CodecError>,
{
    items.iter().map(render).collect()
}

fn entry(key: String, value: String, sep: Separators) -> Result<String, CodecError> {
    reserved(&key, sep.kv)?;
    Ok(format!("{}{}{}", key, sep.kv, value))
}

fn join(texts: Vec<String>, separator: char) -> Result<String, CodecError> {
    for text in &texts {
        reserved(text, separator)?;
    }
    Ok(texts.join(&separator.to_string()))
}

fn reserved(text: &str, separator: char) -> Result<(), CodecError> {
    if text.contains(separator) {
        return Err(CodecError::ReservedSeparator {
            text: text.to_string(),
            separator,
        });
    }
    Ok(())
}

/// Variable-length split: empty text has no elements.
fn split(text: &str, separator: char) -> impl Iterator<Item = &str> {
    let mut pieces = text.split(separator);
    if text.is_empty() {
        pieces.next();
    }
    pieces
}

/// Fixed-arity split: empty text has no elements only for arity zero.
fn split_fixed(text: &str, separator: char, arity: usize) -> Vec<&str> {
    if arity == 0 && text.is_empty() {
        return Vec::new();
    }
    text.split(separator).collect()
}

fn check_arity(expected: usize, found: usize, ty: &FieldType) -> Result<(), CodecError> {
    if expected != found {
        return Err(CodecError::mismatch(
            format!("{} ({} items)", ty, expected),
            format!("{} items", found),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordDefinitionBuilder;

    fn spec() -> FormatSpec {
        FormatSpec::default()
    }

    #[test]
    fn test_list_joins_with_level_separator() {
        let ty = FieldType::list(FieldType::Int);
        let value = Value::from(vec![1, 2, 3]);
        assert_eq!(format_container(&value, &ty, 0, &spec()).unwrap(), "1,2,3");
        assert_eq!(format_container(&value, &ty, 1, &spec()).unwrap(), "1;2;3");
        assert_eq!(parse_container("1,2,3", &ty, 0, &spec()).unwrap(), value);
    }

    #[test]
    fn test_empty_text_is_empty_container() {
        let s = spec();
        assert_eq!(
            parse_container("", &FieldType::list(FieldType::Int), 0, &s).unwrap(),
            Value::List(vec![])
        );
        assert_eq!(
            parse_container("", &FieldType::set(FieldType::Str), 0, &s).unwrap(),
            Value::Set(vec![])
        );
        assert_eq!(
            parse_container("", &FieldType::dict(FieldType::Str, FieldType::Int), 0, &s).unwrap(),
            Value::Dict(vec![])
        );
        assert_eq!(
            parse_container("", &FieldType::tuple(vec![]), 0, &s).unwrap(),
            Value::Tuple(vec![])
        );
        // A one-position tuple of str keeps its single empty element.
        assert_eq!(
            parse_container("", &FieldType::tuple(vec![FieldType::Str]), 0, &s).unwrap(),
            Value::Tuple(vec![Value::from("")])
        );
    }

    #[test]
    fn test_set_sorted_and_order_insensitive() {
        let ty = FieldType::set(FieldType::Str);
        let value = Value::set(vec![Value::from("b"), Value::from("c"), Value::from("a")]);
        assert_eq!(format_container(&value, &ty, 0, &spec()).unwrap(), "a,b,c");
        assert_eq!(parse_container("c,a,b", &ty, 0, &spec()).unwrap(), value);
        // Duplicates collapse on decode.
        assert_eq!(
            parse_container("a,a", &ty, 0, &spec()).unwrap(),
            Value::set(vec![Value::from("a")])
        );
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        let ty = FieldType::tuple(vec![FieldType::Int, FieldType::Int]);
        let three = Value::Tuple(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(matches!(
            format_container(&three, &ty, 0, &spec()),
            Err(CodecError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            parse_container("1,2,3", &ty, 0, &spec()),
            Err(CodecError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_dict_entries() {
        let ty = FieldType::dict(FieldType::Str, FieldType::Int);
        let value = Value::dict(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(2)),
        ]);
        assert_eq!(format_container(&value, &ty, 0, &spec()).unwrap(), "a=1,b=2");
        assert_eq!(parse_container("b=2,a=1", &ty, 0, &spec()).unwrap(), value);

        // Values split on the first kv separator only.
        let ty = FieldType::dict(FieldType::Str, FieldType::Str);
        assert_eq!(
            parse_container("k=v=w", &ty, 0, &spec()).unwrap(),
            Value::dict(vec![(Value::from("k"), Value::from("v=w"))])
        );
        assert!(matches!(
            parse_container("novalue", &ty, 0, &spec()),
            Err(CodecError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_nested_containers_use_deeper_levels() {
        let ty = FieldType::list(FieldType::tuple(vec![FieldType::Int, FieldType::Str]));
        let value = Value::List(vec![
            Value::Tuple(vec![Value::Int(1), Value::from("a")]),
            Value::Tuple(vec![Value::Int(2), Value::from("b")]),
        ]);
        let text = format_container(&value, &ty, 0, &spec()).unwrap();
        assert_eq!(text, "1;a,2;b");
        assert_eq!(parse_container(&text, &ty, 0, &spec()).unwrap(), value);
    }

    #[test]
    fn test_reserved_separator() {
        let ty = FieldType::list(FieldType::Str);
        let value = Value::from(vec!["a,b", "c"]);
        assert_eq!(
            format_container(&value, &ty, 0, &spec()),
            Err(CodecError::ReservedSeparator {
                text: "a,b".into(),
                separator: ','
            })
        );

        let ty = FieldType::dict(FieldType::Str, FieldType::Int);
        let value = Value::dict(vec![(Value::from("a=b"), Value::Int(1))]);
        assert!(matches!(
            format_container(&value, &ty, 0, &spec()),
            Err(CodecError::ReservedSeparator { separator: '=', .. })
        ));
    }

    #[test]
    fn test_too_deep() {
        let spec = FormatSpec::default().with_levels(vec![Separators::new(',', '=')]);
        let ty = FieldType::list(FieldType::list(FieldType::Int));
        let value = Value::List(vec![Value::from(vec![1])]);
        assert!(matches!(
            format_container(&value, &ty, 0, &spec),
            Err(CodecError::UnsupportedType(_))
        ));
        assert!(matches!(
            parse_container("1", &ty, 0, &spec),
            Err(CodecError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_nested_record_like_tuple() {
        let point = Arc::new(
            RecordDefinitionBuilder::new("Point")
                .field("x", FieldType::Int)
                .field("y", FieldType::Int)
                .build(),
        );
        let ty = FieldType::list(FieldType::record(point.clone()));
        let a = Record::new(&point, vec![Value::Int(1), Value::Int(2)]).unwrap();
        let b = Record::new(&point, vec![Value::Int(3), Value::Int(4)]).unwrap();
        let value = Value::List(vec![a.into(), b.into()]);

        let text = format_container(&value, &ty, 0, &spec()).unwrap();
        assert_eq!(text, "1;2,3;4");
        assert_eq!(parse_container(&text, &ty, 0, &spec()).unwrap(), value);

        let err = parse_container("1;x", &ty, 0, &spec()).unwrap_err();
        assert_eq!(err.field(), Some((1, "y")));
    }

    #[test]
    fn test_untyped_rendering() {
        let value = Value::List(vec![Value::Int(1), Value::from("a"), Value::Bool(true)]);
        assert_eq!(format_untyped(&value, 0, &spec()).unwrap(), "1,a,true");

        let value = Value::set(vec![Value::Int(3), Value::Int(1)]);
        assert_eq!(format_untyped(&value, 0, &spec()).unwrap(), "1,3");
        assert!(format_untyped(&Value::Int(1), 0, &spec()).is_err());
    }
}
