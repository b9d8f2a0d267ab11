// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Keyed record collections.

use crate::codec::{Batch, RecordCodec};
use crate::error::CodecError;
use crate::types::{Record, RecordDefinition, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Key field value of a record, with its rendered text.
///
/// Keys order by value: numbers numerically (`-1 < 3 < 10`), strings
/// lexically, booleans first and container keys last. Keys with equal
/// values order by their text.
#[derive(Debug, Clone)]
pub struct RecordKey {
    value: Value,
    text: String,
}

impl RecordKey {
    pub fn new(value: Value, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Rendered form, as written to the key field.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn rank(&self) -> u8 {
        match self.value {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Str(_) => 2,
            _ => 3,
        }
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        match (&self.value, &other.value) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other).then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RecordKey {}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Records keyed by their key field.
///
/// Iteration follows key value order, which is the order the file writer
/// emits.
pub type KeyedRecords = BTreeMap<RecordKey, Record>;

/// Record whose key renders as `key`.
pub fn get_record<'a>(items: &'a KeyedRecords, key: &str) -> Option<&'a Record> {
    items
        .iter()
        .find(|(k, _)| k.text() == key)
        .map(|(_, record)| record)
}

/// Key of `record`.
pub fn record_key(codec: &RecordCodec, record: &Record, key_field: &str) -> Result<RecordKey, CodecError> {
    let definition = record.definition();
    let index = definition
        .field_index(key_field)
        .ok_or_else(|| CodecError::UnknownField {
            record: definition.name.clone(),
            field: key_field.to_string(),
        })?;
    let field = &definition.fields()[index];
    let value = &record.values()[index];
    let text = codec
        .format_value(value, Some(&field.ty))
        .map_err(|e| e.in_field(index, &field.name))?;
    Ok(RecordKey::new(value.clone(), text))
}

/// Insert `record` unless its key is already present.
///
/// Returns the rendered key when the record was added.
pub fn insert_record(
    codec: &RecordCodec,
    record: Record,
    key_field: &str,
    items: &mut KeyedRecords,
) -> Result<Option<String>, CodecError> {
    let key = record_key(codec, &record, key_field)?;
    if items.contains_key(&key) {
        log::info!("{} {} already defined, skipping", record.name(), key);
        return Ok(None);
    }
    log::debug!("{} {} added", record.name(), key);
    let text = key.text().to_string();
    items.insert(key, record);
    Ok(Some(text))
}

/// Normalize `batch` against `source`, rebuild each record as `dest` (or
/// keep `source`), and add it to `items` under its `key_field` value.
///
/// `dest` may declare more fields than `source`; missing ones take their
/// type's default. Keys already present are skipped. Returns the keys added,
/// in batch order.
pub fn add_items(
    codec: &RecordCodec,
    batch: impl Into<Batch>,
    source: &Arc<RecordDefinition>,
    dest: Option<&Arc<RecordDefinition>>,
    key_field: &str,
    items: &mut KeyedRecords,
) -> Result<Vec<String>, CodecError> {
    let (_, records) = codec.process_batch(batch, Some(source))?;
    let dest = dest.unwrap_or(source);

    let mut added = Vec::new();
    for record in records {
        let record = record.project(dest)?;
        if let Some(key) = insert_record(codec, record, key_field, items)? {
            added.push(key);
        }
    }
    Ok(added)
}
