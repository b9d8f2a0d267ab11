// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema configuration.
//!
//! A schema file carries the [`FormatSpec`] plus record type declarations:
//!
//! ```toml
//! [format]
//! delimiter = "|"
//!
//! [[records]]
//! name = "Player"
//! prefix = "P"
//! key = "id"
//! fields = [
//!   { name = "id", type = "int" },
//!   { name = "tags", type = "list[str]" },
//! ]
//! ```
//!
//! Records may use previously declared records as field types.

use crate::codec::RecordCodec;
use crate::error::CodecError;
use crate::format_spec::FormatSpec;
use crate::introspect::{is_builtin_name, resolve_str, HashMapRecordRegistry, TypeExpr};
use crate::table::RowType;
use crate::types::{FieldDef, RecordDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Record {record}, field {field}: {source}")]
    Type {
        record: String,
        field: String,
        #[source]
        source: CodecError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Format rules plus declared record types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Text rendering rules.
    #[serde(default)]
    pub format: FormatSpec,

    /// Record types, in declaration order.
    #[serde(default)]
    pub records: Vec<RecordConfig>,
}

/// One declared record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Record type name.
    pub name: String,

    /// Leading field identifying rows of this type in a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Field whose rendered value keys records of this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Fields in positional order.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    /// Type expression, e.g. `optional[list[int]]`.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

impl RecordConfig {
    /// Describe an existing definition.
    pub fn from_definition(definition: &RecordDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            prefix: None,
            key: None,
            fields: definition
                .fields()
                .iter()
                .map(|f| FieldConfig::new(f.name.clone(), f.ty.to_string()))
                .collect(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl SchemaConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Schema describing existing definitions.
    pub fn from_definitions(format: FormatSpec, definitions: &[Arc<RecordDefinition>]) -> Self {
        Self {
            format,
            records: definitions
                .iter()
                .map(|def| RecordConfig::from_definition(def))
                .collect(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.format.validate()?;

        for (i, record) in self.records.iter().enumerate() {
            if record.name.is_empty() {
                return Err(ConfigError::Invalid(format!("Record {} has an empty name", i)));
            }
            if TypeExpr::parse(&record.name).ok() != Some(TypeExpr::name(record.name.clone())) {
                return Err(ConfigError::Invalid(format!(
                    "Record name {:?} is not a plain type name",
                    record.name
                )));
            }
            if is_builtin_name(&record.name) {
                return Err(ConfigError::Invalid(format!(
                    "Record {} shadows a built-in type name",
                    record.name
                )));
            }
            if self.records[..i].iter().any(|r| r.name == record.name) {
                return Err(ConfigError::Invalid(format!(
                    "Record {} is declared more than once",
                    record.name
                )));
            }
            if record.fields.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Record {} has no fields",
                    record.name
                )));
            }
            for (j, field) in record.fields.iter().enumerate() {
                if record.fields[..j].iter().any(|f| f.name == field.name) {
                    return Err(ConfigError::Invalid(format!(
                        "Record {} declares field {} more than once",
                        record.name, field.name
                    )));
                }
            }
            if let Some(key) = &record.key {
                if !record.fields.iter().any(|f| &f.name == key) {
                    return Err(ConfigError::Invalid(format!(
                        "Record {} key {} is not one of its fields",
                        record.name, key
                    )));
                }
            }
            if let Some(prefix) = &record.prefix {
                if prefix.contains(self.format.delimiter) {
                    return Err(ConfigError::Invalid(format!(
                        "Record {} prefix {:?} contains the delimiter",
                        record.name, prefix
                    )));
                }
            }
        }

        // Type expressions must resolve.
        self.definitions()?;
        Ok(())
    }

    /// Resolve every declared record, in declaration order.
    pub fn definitions(&self) -> Result<Vec<Arc<RecordDefinition>>, ConfigError> {
        let mut registry = HashMapRecordRegistry::new();
        let mut definitions = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let fields = record
                .fields
                .iter()
                .map(|field| {
                    resolve_str(&field.type_name, &registry)
                        .map(|ty| FieldDef::new(field.name.clone(), ty))
                        .map_err(|source| ConfigError::Type {
                            record: record.name.clone(),
                            field: field.name.clone(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let definition = Arc::new(RecordDefinition::new(record.name.clone(), fields));
            registry.register(definition.clone());
            definitions.push(definition);
        }
        Ok(definitions)
    }

    /// Look up one resolved record by name.
    pub fn definition(&self, name: &str) -> Result<Arc<RecordDefinition>, ConfigError> {
        self.definitions()?
            .into_iter()
            .find(|def| def.name == name)
            .ok_or_else(|| ConfigError::Invalid(format!("Unknown record {}", name)))
    }

    /// Row types for the file layer, one per declared record.
    pub fn row_types(&self) -> Result<Vec<RowType>, ConfigError> {
        Ok(self
            .records
            .iter()
            .zip(self.definitions()?)
            .map(|(record, definition)| RowType {
                prefix: record.prefix.clone(),
                key: record.key.clone(),
                definition,
            })
            .collect())
    }

    /// Codec configured with this schema's format rules.
    pub fn codec(&self) -> RecordCodec {
        RecordCodec::new(self.format.clone())
    }
}
