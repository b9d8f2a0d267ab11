// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec error taxonomy.

use crate::types::ScalarKind;
use thiserror::Error;

/// Errors produced while resolving types or converting values to and from text.
///
/// Every variant is deterministic: retrying the same call with the same
/// input reproduces the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Declared type lies outside the closed set of supported shapes.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Text does not parse as the declared scalar kind.
    #[error("invalid {kind} text {text:?}")]
    InvalidScalar { kind: ScalarKind, text: String },

    /// Value shape or arity disagrees with the declared type.
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// Rendered text contains a separator it would be embedded under.
    #[error("text {text:?} contains reserved separator {separator:?}")]
    ReservedSeparator { text: String, separator: char },

    /// Named field does not exist on the record definition.
    #[error("unknown field {field:?} on record {record}")]
    UnknownField { record: String, field: String },

    /// Error localized to one field of a record.
    #[error("field {position} ({name}): {source}")]
    Field {
        position: usize,
        name: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn invalid(kind: ScalarKind, text: &str) -> Self {
        Self::InvalidScalar {
            kind,
            text: text.to_string(),
        }
    }

    /// Attach the position and name of the field being processed.
    pub fn in_field(self, position: usize, name: &str) -> Self {
        Self::Field {
            position,
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with all field context stripped.
    pub fn root(&self) -> &CodecError {
        match self {
            Self::Field { source, .. } => source.root(),
            other => other,
        }
    }

    /// Field position and name of the outermost field context, if any.
    pub fn field(&self) -> Option<(usize, &str)> {
        match self {
            Self::Field { position, name, .. } => Some((*position, name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_context_and_root() {
        let err = CodecError::invalid(ScalarKind::Int, "12a").in_field(3, "count");
        assert_eq!(err.field(), Some((3, "count")));
        assert_eq!(
            err.root(),
            &CodecError::InvalidScalar {
                kind: ScalarKind::Int,
                text: "12a".into()
            }
        );
        assert_eq!(err.to_string(), "field 3 (count): invalid int text \"12a\"");
    }

    #[test]
    fn test_nested_context_keeps_outermost() {
        let err = CodecError::mismatch("list", "int")
            .in_field(1, "inner")
            .in_field(0, "outer");
        assert_eq!(err.field(), Some((0, "outer")));
        assert!(matches!(err.root(), CodecError::ShapeMismatch { .. }));
    }
}
