// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for RecordDefinition.

use crate::types::{FieldDef, FieldType, RecordDefinition};
use std::sync::Arc;

/// Builder for creating RecordDefinition instances.
#[derive(Debug)]
pub struct RecordDefinitionBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl RecordDefinitionBuilder {
    /// Create a new builder for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field with a declared type.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Str)
    }

    /// Add an optional field.
    pub fn optional_field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(name, FieldType::optional(ty))
    }

    /// Add a list field.
    pub fn list_field(self, name: impl Into<String>, element: FieldType) -> Self {
        self.field(name, FieldType::list(element))
    }

    /// Add a set field.
    pub fn set_field(self, name: impl Into<String>, element: FieldType) -> Self {
        self.field(name, FieldType::set(element))
    }

    /// Add a dict field.
    pub fn dict_field(self, name: impl Into<String>, key: FieldType, value: FieldType) -> Self {
        self.field(name, FieldType::dict(key, value))
    }

    /// Add a nested record field.
    pub fn nested_field(self, name: impl Into<String>, nested: Arc<RecordDefinition>) -> Self {
        self.field(name, FieldType::record(nested))
    }

    /// Build the RecordDefinition.
    pub fn build(self) -> RecordDefinition {
        RecordDefinition::new(self.name, self.fields)
    }
}
