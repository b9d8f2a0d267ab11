// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record codec: whole records to and from ordered text fields.
//!
//! Every declared field maps to exactly one text field, in declaration
//! order. Definitions can also be synthesized from a row of text or values,
//! with fields named `col0`, `col1`, ... or taken from a header row.

use crate::coerce;
use crate::dispatch;
use crate::error::CodecError;
use crate::format_spec::FormatSpec;
use crate::types::{FieldDef, FieldType, Record, RecordDefinition, Value};
use std::sync::Arc;

/// Record name used when a batch synthesizes its own definition.
pub const DEFAULT_RECORD_NAME: &str = "Row";

/// Name of the synthesized field at `index`.
pub fn column_name(index: usize) -> String {
    format!("col{}", index)
}

/// Rows accepted by [`RecordCodec::process_batch`].
#[derive(Debug, Clone)]
pub enum Batch {
    /// One row of text fields.
    Fields(Vec<String>),
    /// Many rows of text fields.
    FieldRows(Vec<Vec<String>>),
    /// One row of loosely typed values.
    Values(Vec<Value>),
    /// Many rows of loosely typed values.
    ValueRows(Vec<Vec<Value>>),
    /// One decoded record.
    Record(Record),
    /// Many decoded records.
    Records(Vec<Record>),
}

impl Batch {
    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        match self {
            Self::Fields(_) | Self::Values(_) | Self::Record(_) => 1,
            Self::FieldRows(rows) => rows.len(),
            Self::ValueRows(rows) => rows.len(),
            Self::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for Batch {
    fn from(v: Vec<String>) -> Self {
        Self::Fields(v)
    }
}

impl From<Vec<&str>> for Batch {
    fn from(v: Vec<&str>) -> Self {
        Self::Fields(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Vec<String>>> for Batch {
    fn from(v: Vec<Vec<String>>) -> Self {
        Self::FieldRows(v)
    }
}

impl From<Vec<Value>> for Batch {
    fn from(v: Vec<Value>) -> Self {
        Self::Values(v)
    }
}

impl From<Vec<Vec<Value>>> for Batch {
    fn from(v: Vec<Vec<Value>>) -> Self {
        Self::ValueRows(v)
    }
}

impl From<Record> for Batch {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<Vec<Record>> for Batch {
    fn from(v: Vec<Record>) -> Self {
        Self::Records(v)
    }
}

/// Stateless codec bound to one [`FormatSpec`].
///
/// # Example
///
/// ```rust
/// use textrec::{FieldType, Record, RecordCodec, RecordDefinitionBuilder, Value};
/// use std::sync::Arc;
///
/// let def = Arc::new(RecordDefinitionBuilder::new("Tagged")
///     .field("id", FieldType::Int)
///     .list_field("tags", FieldType::Str)
///     .build());
/// let codec = RecordCodec::default();
///
/// let record = Record::new(&def, vec![Value::Int(7), Value::from(vec!["a", "b"])]).unwrap();
/// let fields = codec.format_record(&record).unwrap();
/// assert_eq!(fields, vec!["7", "a,b"]);
/// assert_eq!(codec.parse_record(fields.as_slice(), &def).unwrap(), record);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCodec {
    spec: FormatSpec,
}

impl RecordCodec {
    pub fn new(spec: FormatSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// See [`dispatch::format_value`].
    pub fn format_value(&self, value: &Value, ty: Option<&FieldType>) -> Result<String, CodecError> {
        dispatch::format_value(value, ty, &self.spec)
    }

    /// See [`dispatch::parse_value`].
    pub fn parse_value(&self, text: &str, ty: Option<&FieldType>) -> Result<Value, CodecError> {
        dispatch::parse_value(text, ty, &self.spec)
    }

    /// See [`coerce::coerce_value`].
    pub fn coerce_value(&self, value: &Value, ty: &FieldType) -> Result<Value, CodecError> {
        coerce::coerce_value(value, ty, &self.spec)
    }

    /// Encode a record as one text field per declared field.
    pub fn format_record(&self, record: &Record) -> Result<Vec<String>, CodecError> {
        record
            .definition()
            .fields()
            .iter()
            .zip(record.values())
            .enumerate()
            .map(|(position, (field, value))| {
                self.format_value(value, Some(&field.ty))
                    .map_err(|e| e.in_field(position, &field.name))
            })
            .collect()
    }

    /// Decode text fields into a record; all fields succeed or none do.
    pub fn parse_record<S: AsRef<str>>(
        &self,
        fields: &[S],
        definition: &Arc<RecordDefinition>,
    ) -> Result<Record, CodecError> {
        if fields.len() != definition.len() {
            return Err(CodecError::mismatch(
                format!("{} fields for {}", definition.len(), definition.name),
                format!("{} fields", fields.len()),
            ));
        }
        let values = definition
            .fields()
            .iter()
            .zip(fields)
            .enumerate()
            .map(|(position, (field, text))| {
                self.parse_value(text.as_ref(), Some(&field.ty))
                    .map_err(|e| e.in_field(position, &field.name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Record::from_parts(definition.clone(), values))
    }

    /// Synthesize a definition with positional `colN` fields from one text
    /// row, guessing each field type, and decode the row with it.
    pub fn define_record<S: AsRef<str>>(
        &self,
        name: &str,
        fields: &[S],
    ) -> (Arc<RecordDefinition>, Record) {
        let names = (0..fields.len()).map(column_name);
        let (defs, values) = names
            .zip(fields)
            .map(|(field_name, text)| self.guess_field(field_name, text.as_ref()))
            .unzip::<_, _, Vec<_>, Vec<_>>();
        let definition = Arc::new(RecordDefinition::new(name, defs));
        log::debug!(
            "synthesized record {} with {} positional fields",
            name,
            definition.len()
        );
        let record = Record::from_parts(definition.clone(), values);
        (definition, record)
    }

    /// Like [`define_record`](Self::define_record) but with field names
    /// taken from a header row.
    pub fn define_record_with_header<H: AsRef<str>, S: AsRef<str>>(
        &self,
        name: &str,
        header: &[H],
        fields: &[S],
    ) -> Result<(Arc<RecordDefinition>, Record), CodecError> {
        if header.len() != fields.len() {
            return Err(CodecError::mismatch(
                format!("{} fields from header", header.len()),
                format!("{} fields", fields.len()),
            ));
        }
        check_unique(header.iter().map(|h| h.as_ref()))?;

        let (defs, values) = header
            .iter()
            .zip(fields)
            .map(|(field_name, text)| self.guess_field(field_name.as_ref().to_string(), text.as_ref()))
            .unzip::<_, _, Vec<_>, Vec<_>>();
        let definition = Arc::new(RecordDefinition::new(name, defs));
        log::debug!(
            "synthesized record {} from header ({} fields)",
            name,
            definition.len()
        );
        let record = Record::from_parts(definition.clone(), values);
        Ok((definition, record))
    }

    /// Synthesize a definition with positional `colN` fields from one row
    /// of values, inferring each field type from the value's runtime shape.
    pub fn define_record_from_values(
        &self,
        name: &str,
        values: &[Value],
    ) -> Result<(Arc<RecordDefinition>, Record), CodecError> {
        let defs = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let field_name = column_name(index);
                dispatch::infer_type(value)
                    .map(|ty| FieldDef::new(field_name.clone(), ty))
                    .map_err(|e| e.in_field(index, &field_name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let definition = Arc::new(RecordDefinition::new(name, defs));
        log::debug!(
            "synthesized record {} from {} values",
            name,
            definition.len()
        );
        let record = Record::new(&definition, values.to_vec())?;
        Ok((definition, record))
    }

    /// Normalize a batch into records sharing one definition.
    ///
    /// When `definition` is `None` it is synthesized from the first row
    /// and named [`DEFAULT_RECORD_NAME`].
    pub fn process_batch(
        &self,
        batch: impl Into<Batch>,
        definition: Option<&Arc<RecordDefinition>>,
    ) -> Result<(Arc<RecordDefinition>, Vec<Record>), CodecError> {
        self.process_batch_named(DEFAULT_RECORD_NAME, batch, definition)
    }

    /// [`process_batch`](Self::process_batch) with an explicit name for a
    /// synthesized definition.
    pub fn process_batch_named(
        &self,
        name: &str,
        batch: impl Into<Batch>,
        definition: Option<&Arc<RecordDefinition>>,
    ) -> Result<(Arc<RecordDefinition>, Vec<Record>), CodecError> {
        let batch = batch.into();
        log::debug!("normalizing batch of {} rows", batch.len());

        match batch {
            Batch::Fields(row) => self.text_rows(name, vec![row], definition),
            Batch::FieldRows(rows) => self.text_rows(name, rows, definition),
            Batch::Values(row) => self.value_rows(name, vec![row], definition),
            Batch::ValueRows(rows) => self.value_rows(name, rows, definition),
            Batch::Record(record) => self.records(vec![record], definition),
            Batch::Records(records) => self.records(records, definition),
        }
    }

    fn guess_field(&self, name: String, text: &str) -> (FieldDef, Value) {
        let value = dispatch::guess_value(text, &self.spec);
        let ty = dispatch::guess_type(text, &self.spec);
        (FieldDef::new(name, ty), value)
    }

    fn text_rows(
        &self,
        name: &str,
        rows: Vec<Vec<String>>,
        definition: Option<&Arc<RecordDefinition>>,
    ) -> Result<(Arc<RecordDefinition>, Vec<Record>), CodecError> {
        let mut rows = rows.into_iter();
        let (definition, mut records) = match definition {
            Some(def) => (def.clone(), Vec::with_capacity(rows.len())),
            None => {
                let first = rows.next().ok_or_else(empty_batch)?;
                let (def, record) = self.define_record(name, first.as_slice());
                (def, vec![record])
            }
        };
        for row in rows {
            records.push(self.parse_record(row.as_slice(), &definition)?);
        }
        Ok((definition, records))
    }

    fn value_rows(
        &self,
        name: &str,
        rows: Vec<Vec<Value>>,
        definition: Option<&Arc<RecordDefinition>>,
    ) -> Result<(Arc<RecordDefinition>, Vec<Record>), CodecError> {
        let mut rows = rows.into_iter();
        let (definition, mut records) = match definition {
            Some(def) => (def.clone(), Vec::with_capacity(rows.len())),
            None => {
                let first = rows.next().ok_or_else(empty_batch)?;
                let (def, record) = self.define_record_from_values(name, &first)?;
                (def, vec![record])
            }
        };
        for row in rows {
            records.push(self.coerce_row(&row, &definition)?);
        }
        Ok((definition, records))
    }

    fn records(
        &self,
        records: Vec<Record>,
        definition: Option<&Arc<RecordDefinition>>,
    ) -> Result<(Arc<RecordDefinition>, Vec<Record>), CodecError> {
        let definition = match definition {
            Some(def) => def.clone(),
            None => records.first().ok_or_else(empty_batch)?.definition().clone(),
        };
        let records = records
            .iter()
            .map(|record| record.project(&definition))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((definition, records))
    }

    /// Coerce one value row into the declared field types.
    fn coerce_row(
        &self,
        row: &[Value],
        definition: &Arc<RecordDefinition>,
    ) -> Result<Record, CodecError> {
        if row.len() != definition.len() {
            return Err(CodecError::mismatch(
                format!("{} fields for {}", definition.len(), definition.name),
                format!("{} values", row.len()),
            ));
        }
        let values = definition
            .fields()
            .iter()
            .zip(row)
            .enumerate()
            .map(|(position, (field, value))| {
                self.coerce_value(value, &field.ty)
                    .map_err(|e| e.in_field(position, &field.name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Record::new(definition, values)
    }
}

fn empty_batch() -> CodecError {
    CodecError::mismatch("at least one row to define a record", "empty batch")
}

fn check_unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), CodecError> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Err(CodecError::mismatch(
                "unique field names",
                format!("duplicate field {:?}", name),
            ));
        }
        seen.push(name);
    }
    Ok(())
}
