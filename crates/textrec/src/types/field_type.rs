// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declared field types and record definitions.

use crate::types::Value;
use std::fmt;
use std::sync::Arc;

/// Atomic value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
    None,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Base shape of a type or value, without element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Bool,
    Int,
    Float,
    Str,
    None,
    Optional,
    List,
    Set,
    Tuple,
    Dict,
    Record,
}

impl Shape {
    /// Scalar kind for atomic shapes.
    pub fn scalar_kind(self) -> Option<ScalarKind> {
        match self {
            Self::Bool => Some(ScalarKind::Bool),
            Self::Int => Some(ScalarKind::Int),
            Self::Float => Some(ScalarKind::Float),
            Self::Str => Some(ScalarKind::Str),
            Self::None => Some(ScalarKind::None),
            _ => None,
        }
    }

    /// Shapes encoded by joining element texts with a separator.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::List | Self::Set | Self::Tuple | Self::Dict | Self::Record
        )
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.scalar_kind() {
            return fmt::Display::fmt(&kind, f);
        }
        let name = match self {
            Self::Optional => "optional",
            Self::List => "list",
            Self::Set => "set",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            _ => "record",
        };
        f.write_str(name)
    }
}

/// Declared type of a field or container element.
///
/// Containers always carry fully resolved element types. `Display` renders
/// the type expression grammar accepted by [`crate::introspect::TypeExpr`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    None,
    Optional(Box<FieldType>),
    List(Box<FieldType>),
    Set(Box<FieldType>),
    /// Fixed arity, one type per position.
    Tuple(Vec<FieldType>),
    Dict(Box<FieldType>, Box<FieldType>),
    Record(Arc<RecordDefinition>),
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(element: FieldType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: FieldType) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn tuple(elements: Vec<FieldType>) -> Self {
        Self::Tuple(elements)
    }

    pub fn dict(key: FieldType, value: FieldType) -> Self {
        Self::Dict(Box::new(key), Box::new(value))
    }

    pub fn record(definition: Arc<RecordDefinition>) -> Self {
        Self::Record(definition)
    }

    /// Base shape, one level deep.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Bool => Shape::Bool,
            Self::Int => Shape::Int,
            Self::Float => Shape::Float,
            Self::Str => Shape::Str,
            Self::None => Shape::None,
            Self::Optional(_) => Shape::Optional,
            Self::List(_) => Shape::List,
            Self::Set(_) => Shape::Set,
            Self::Tuple(_) => Shape::Tuple,
            Self::Dict(_, _) => Shape::Dict,
            Self::Record(_) => Shape::Record,
        }
    }

    /// Element types one level down (field types for records).
    pub fn elements(&self) -> Vec<&FieldType> {
        match self {
            Self::Optional(inner) | Self::List(inner) | Self::Set(inner) => vec![&**inner],
            Self::Tuple(items) => items.iter().collect(),
            Self::Dict(key, value) => vec![&**key, &**value],
            Self::Record(def) => def.fields().iter().map(|f| &f.ty).collect(),
            _ => Vec::new(),
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        self.shape().scalar_kind()
    }

    /// Value used to fill a field missing from a source record.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Str => Value::Str(String::new()),
            Self::None | Self::Optional(_) => Value::None,
            Self::List(_) => Value::List(Vec::new()),
            Self::Set(_) => Value::Set(Vec::new()),
            Self::Tuple(items) => Value::Tuple(items.iter().map(Self::default_value).collect()),
            Self::Dict(_, _) => Value::Dict(Vec::new()),
            Self::Record(def) => Value::Record(crate::types::Record::with_defaults(def)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optional(inner) => write!(f, "optional[{}]", inner),
            Self::List(inner) => write!(f, "list[{}]", inner),
            Self::Set(inner) => write!(f, "set[{}]", inner),
            Self::Tuple(items) => {
                f.write_str("tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Dict(key, value) => write!(f, "dict[{}, {}]", key, value),
            Self::Record(def) => f.write_str(&def.name),
            scalar => write!(f, "{}", scalar.shape()),
        }
    }
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub ty: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered field layout of a record type.
///
/// Field order is the positional contract for text encoding and never
/// changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDefinition {
    /// Record type name.
    pub name: String,
    fields: Vec<FieldDef>,
}

impl RecordDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordDefinitionBuilder;

    #[test]
    fn test_one_level_decomposition() {
        let ty = FieldType::optional(FieldType::list(FieldType::Int));
        assert_eq!(ty.shape(), Shape::Optional);
        let inner = ty.elements();
        assert_eq!(inner, vec![&FieldType::list(FieldType::Int)]);
        assert_eq!(inner[0].shape(), Shape::List);
        assert_eq!(inner[0].elements(), vec![&FieldType::Int]);
        assert!(FieldType::Int.elements().is_empty());
    }

    #[test]
    fn test_display_grammar() {
        let point = Arc::new(
            RecordDefinitionBuilder::new("Point")
                .field("x", FieldType::Float)
                .field("y", FieldType::Float)
                .build(),
        );
        let ty = FieldType::dict(
            FieldType::Str,
            FieldType::tuple(vec![FieldType::Int, FieldType::record(point)]),
        );
        assert_eq!(ty.to_string(), "dict[str, tuple[int, Point]]");
        assert_eq!(FieldType::tuple(vec![]).to_string(), "tuple[]");
        assert_eq!(
            FieldType::optional(FieldType::set(FieldType::Bool)).to_string(),
            "optional[set[bool]]"
        );
    }

    #[test]
    fn test_definition_lookup() {
        let def = RecordDefinitionBuilder::new("Row")
            .field("a", FieldType::Int)
            .field("b", FieldType::Str)
            .build();
        assert_eq!(def.len(), 2);
        assert_eq!(def.field_index("b"), Some(1));
        assert!(def.field("c").is_none());
        assert_eq!(def.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_default_values() {
        let ty = FieldType::tuple(vec![FieldType::Int, FieldType::optional(FieldType::Str)]);
        assert_eq!(
            ty.default_value(),
            Value::Tuple(vec![Value::Int(0), Value::None])
        );
        assert_eq!(FieldType::Str.default_value(), Value::Str(String::new()));
    }
}
