// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field types, values and records.
//!
//! # Features
//!
//! - **FieldType**: closed tagged union of scalar and container shapes
//! - **RecordDefinition**: ordered field name -> FieldType mapping
//! - **Value**: runtime value tagged with one of the FieldType shapes
//! - **Record**: a definition plus one value per declared field
//! - **Builder API**: fluent interface for building record definitions
//!
//! # Example
//!
//! ```rust
//! use textrec::types::{FieldType, Record, RecordDefinitionBuilder, Value};
//! use std::sync::Arc;
//!
//! let player = Arc::new(RecordDefinitionBuilder::new("Player")
//!     .field("id", FieldType::Int)
//!     .field("tags", FieldType::list(FieldType::Str))
//!     .build());
//!
//! let record = Record::new(&player, vec![Value::Int(7), Value::from(vec!["a", "b"])]).unwrap();
//! assert_eq!(record.get("id").and_then(Value::as_int), Some(7));
//! ```

mod builder;
mod field_type;
mod record;
mod value;

pub use builder::RecordDefinitionBuilder;
pub use field_type::{FieldDef, FieldType, RecordDefinition, ScalarKind, Shape};
pub use record::Record;
pub use value::Value;
