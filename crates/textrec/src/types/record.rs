// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record container: a definition plus positional field values.

use crate::dispatch::is_compatible;
use crate::error::CodecError;
use crate::types::{RecordDefinition, Value};
use std::sync::Arc;

/// Populated record with runtime type checking.
///
/// `values[i]` always belongs to `definition.fields()[i]` and is compatible
/// with that field's declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    definition: Arc<RecordDefinition>,
    values: Vec<Value>,
}

impl Record {
    /// Create a record, checking arity and per-field compatibility.
    pub fn new(definition: &Arc<RecordDefinition>, values: Vec<Value>) -> Result<Self, CodecError> {
        if values.len() != definition.len() {
            return Err(CodecError::mismatch(
                format!("{} fields for {}", definition.len(), definition.name),
                format!("{} values", values.len()),
            ));
        }
        for (position, (field, value)) in definition.fields().iter().zip(&values).enumerate() {
            if !is_compatible(value, &field.ty) {
                return Err(CodecError::mismatch(&field.ty, value.shape()).in_field(position, &field.name));
            }
        }
        Ok(Self::from_parts(definition.clone(), values))
    }

    /// Values already known to match the definition.
    pub(crate) fn from_parts(definition: Arc<RecordDefinition>, values: Vec<Value>) -> Self {
        Self { definition, values }
    }

    /// Record with every field set to its type's default value.
    pub fn with_defaults(definition: &Arc<RecordDefinition>) -> Self {
        let values = definition.fields().iter().map(|f| f.ty.default_value()).collect();
        Self::from_parts(definition.clone(), values)
    }

    pub fn definition(&self) -> &Arc<RecordDefinition> {
        &self.definition
    }

    /// Record type name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.definition.field_index(name).map(|i| &self.values[i])
    }

    /// Get a field value by position.
    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Set a field value by name.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CodecError> {
        let index = self
            .definition
            .field_index(name)
            .ok_or_else(|| CodecError::UnknownField {
                record: self.definition.name.clone(),
                field: name.to_string(),
            })?;
        let value = value.into();
        let ty = &self.definition.fields()[index].ty;
        if !is_compatible(&value, ty) {
            return Err(CodecError::mismatch(ty, value.shape()).in_field(index, name));
        }
        self.values[index] = value;
        Ok(())
    }

    /// Iterate `(field name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.definition.field_names().zip(self.values.iter())
    }

    /// Rebuild this record under another definition, matching fields by name.
    ///
    /// Target fields absent from this record take their type's default value.
    pub fn project(&self, target: &Arc<RecordDefinition>) -> Result<Record, CodecError> {
        if Arc::ptr_eq(&self.definition, target) || *self.definition == **target {
            return Ok(Self::from_parts(target.clone(), self.values.clone()));
        }
        let values = target
            .fields()
            .iter()
            .map(|field| {
                self.get(&field.name)
                    .cloned()
                    .unwrap_or_else(|| field.ty.default_value())
            })
            .collect();
        Record::new(target, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldType, RecordDefinitionBuilder};

    fn player() -> Arc<RecordDefinition> {
        Arc::new(
            RecordDefinitionBuilder::new("Player")
                .field("id", FieldType::Int)
                .string_field("name")
                .optional_field("rating", FieldType::Float)
                .build(),
        )
    }

    #[test]
    fn test_new_checks_arity() {
        let err = Record::new(&player(), vec![Value::Int(1)]).unwrap_err();
        assert!(matches!(err, CodecError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_new_checks_compatibility() {
        let err = Record::new(
            &player(),
            vec![Value::from("x"), Value::from("n"), Value::None],
        )
        .unwrap_err();
        assert_eq!(err.field(), Some((0, "id")));

        // Int widens into a declared float.
        let rec = Record::new(&player(), vec![Value::Int(1), Value::from("n"), Value::Int(3)]);
        assert!(rec.is_ok());
    }

    #[test]
    fn test_get_set() {
        let mut rec = Record::with_defaults(&player());
        assert_eq!(rec.get("rating"), Some(&Value::None));
        rec.set("name", "Stafford").unwrap();
        rec.set("rating", 97.5).unwrap();
        assert_eq!(rec.get("name").and_then(Value::as_str), Some("Stafford"));
        assert_eq!(rec.get_at(2), Some(&Value::Float(97.5)));

        assert!(matches!(
            rec.set("team", "DET"),
            Err(CodecError::UnknownField { .. })
        ));
        assert!(rec.set("id", "seven").is_err());
    }

    #[test]
    fn test_project_subset_and_superset() {
        let mut rec = Record::with_defaults(&player());
        rec.set("id", 9).unwrap();
        rec.set("name", "Goff").unwrap();

        let brief = Arc::new(
            RecordDefinitionBuilder::new("Brief")
                .string_field("name")
                .field("team", FieldType::Str)
                .build(),
        );
        let projected = rec.project(&brief).unwrap();
        let pairs: Vec<_> = projected.fields().collect();
        assert_eq!(
            pairs,
            vec![("name", &Value::from("Goff")), ("team", &Value::from(""))]
        );
    }
}
