// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-directed text codec for delimited record files
//!
//! Converts typed records (scalars, optional values and nested containers)
//! to and from flat, human-readable text fields suitable for
//! line-oriented, pipe-delimited files.
//!
//! # Features
//!
//! - **Type Introspection**: resolve type expressions like `optional[list[int]]`
//! - **Scalar/Container Formatting**: per-depth separators, deterministic set order
//! - **Type Guessing**: recover values from untyped text with a configurable guess order
//! - **Record Codec**: whole records to ordered fields, on-the-fly definitions
//! - **File Layer**: prefixed multi-type pipe-delimited files, keyed collections
//!
//! # Example
//!
//! ```rust
//! use textrec::{FieldType, RecordCodec};
//!
//! let codec = RecordCodec::default();
//!
//! // Declared type
//! let ty = FieldType::dict(FieldType::Str, FieldType::list(FieldType::Int));
//! let value = codec.parse_value("a=1;2,b=", Some(&ty)).unwrap();
//! assert_eq!(codec.format_value(&value, Some(&ty)).unwrap(), "a=1;2,b=");
//!
//! // Undeclared: guessed
//! let (definition, record) = codec.define_record("Row", &["7", "2.5", "True", "hello"]);
//! assert_eq!(definition.fields()[1].ty, FieldType::Float);
//! assert_eq!(codec.format_record(&record).unwrap(), vec!["7", "2.5", "true", "hello"]);
//! ```
//!
//! # Schema File
//!
//! ```toml
//! [format]
//! float_precision = 3
//!
//! [[records]]
//! name = "Player"
//! prefix = "P"
//! key = "id"
//! fields = [
//!   { name = "id", type = "int" },
//!   { name = "tags", type = "set[str]" },
//! ]
//! ```

pub mod codec;
pub mod coerce;
pub mod config;
pub mod container;
pub mod dispatch;
pub mod error;
pub mod format_spec;
pub mod introspect;
pub mod keyed;
pub mod scalar;
pub mod table;
pub mod types;


pub use codec::{Batch, RecordCodec, DEFAULT_RECORD_NAME};
pub use config::{ConfigError, FieldConfig, RecordConfig, SchemaConfig};
pub use dispatch::{format_value, guess_type, guess_value, infer_type, is_compatible, parse_value};
pub use error::CodecError;
pub use format_spec::{FormatSpec, GuessKind, Separators};
pub use introspect::{
    is_builtin_name, resolve, resolve_str, HashMapRecordRegistry, RecordRegistry, TypeExpr,
    MAX_TYPE_DEPTH,
};
pub use keyed::{add_items, get_record, KeyedRecords, RecordKey};
pub use table::{read_rows, write_rows, Dialect, RowType, Table, TableError};
pub use types::{
    FieldDef, FieldType, Record, RecordDefinition, RecordDefinitionBuilder, ScalarKind, Shape,
    Value,
};
