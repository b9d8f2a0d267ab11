// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type introspection: declared type expressions to [`FieldType`].
//!
//! Declared types arrive as [`TypeExpr`] trees, usually parsed from type
//! strings such as `optional[list[int]]` or `dict[str, tuple[int, Point]]`.
//! [`resolve`] unwraps one level of genericity at a time and rejects every
//! shape outside the closed set with [`CodecError::UnsupportedType`].
//!
//! Record names are resolved through a [`RecordRegistry`]. Base names of
//! the built-in shapes are case-insensitive, so `List[int]` and `list[int]`
//! are the same type.

use crate::error::CodecError;
use crate::types::{FieldType, RecordDefinition};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Deepest bracket nesting accepted in a type expression.
pub const MAX_TYPE_DEPTH: usize = 64;

/// Names claimed by the built-in shapes, matched case-insensitively.
const BUILTIN_NAMES: &[&str] = &[
    "bool", "boolean", "int", "integer", "float", "str", "string", "none", "nonetype",
    "optional", "list", "set", "tuple", "dict",
];

/// Whether `name` resolves to a built-in shape rather than a record.
pub fn is_builtin_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    BUILTIN_NAMES.contains(&lower.as_str())
}

// ---------------------------------------------------------------------------
// RecordRegistry trait + HashMap implementation
// ---------------------------------------------------------------------------

/// Resolves record type names to their definitions.
pub trait RecordRegistry {
    /// Look up a record definition by name.
    ///
    /// Returns `None` if the name is unknown.
    fn lookup(&self, name: &str) -> Option<Arc<RecordDefinition>>;
}

/// Simple [`HashMap`]-backed [`RecordRegistry`].
#[derive(Debug, Default, Clone)]
pub struct HashMapRecordRegistry {
    records: HashMap<String, Arc<RecordDefinition>>,
}

impl HashMapRecordRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its own name.
    pub fn register(&mut self, definition: Arc<RecordDefinition>) {
        self.records.insert(definition.name.clone(), definition);
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordRegistry for HashMapRecordRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<RecordDefinition>> {
        self.records.get(name).cloned()
    }
}

/// Registry that knows no records; only built-in shapes resolve.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecords;

impl RecordRegistry for NoRecords {
    fn lookup(&self, _name: &str) -> Option<Arc<RecordDefinition>> {
        None
    }
}

// ---------------------------------------------------------------------------
// TypeExpr
// ---------------------------------------------------------------------------

/// Unresolved declared type: a base name plus bracketed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    /// Base name as written (`list`, `Optional`, `Player`, ...).
    pub base: String,
    /// `None` when written without brackets, `Some(vec![])` for `name[]`.
    pub args: Option<Vec<TypeExpr>>,
}

impl TypeExpr {
    /// Bare name without brackets.
    pub fn name(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            args: None,
        }
    }

    /// Generic name with bracketed arguments.
    pub fn generic(base: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self {
            base: base.into(),
            args: Some(args),
        }
    }

    /// Parse a type string.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let mut parser = Parser::new(text);
        let expr = parser.expr(0)?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }
}

impl FromStr for TypeExpr {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if let Some(args) = &self.args {
            f.write_str("[")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Recursive descent over `name ('[' expr (',' expr)* ']')?`.
struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn error(&self, msg: &str) -> CodecError {
        CodecError::UnsupportedType(format!(
            "malformed type expression {:?} at offset {}: {}",
            self.text, self.pos, msg
        ))
    }

    fn ident(&mut self) -> Result<&'a str, CodecError> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '_' | '.' | ':')))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn expr(&mut self, depth: usize) -> Result<TypeExpr, CodecError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.skip_ws();
        let base = self.ident()?.to_string();
        self.skip_ws();
        if self.peek() != Some('[') {
            return Ok(TypeExpr::name(base));
        }
        self.pos += 1;
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(TypeExpr::generic(base, args));
        }
        loop {
            args.push(self.expr(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    return Ok(TypeExpr::generic(base, args));
                }
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a declared type into a fully specified [`FieldType`].
pub fn resolve(expr: &TypeExpr, registry: &dyn RecordRegistry) -> Result<FieldType, CodecError> {
    resolve_at(expr, registry, 0)
}

fn resolve_at(
    expr: &TypeExpr,
    registry: &dyn RecordRegistry,
    depth: usize,
) -> Result<FieldType, CodecError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(CodecError::UnsupportedType(format!(
            "type expression nested deeper than {} levels",
            MAX_TYPE_DEPTH
        )));
    }
    let base = expr.base.to_ascii_lowercase();
    let args = expr.args.as_deref();

    let scalar = match base.as_str() {
        "bool" | "boolean" => Some(FieldType::Bool),
        "int" | "integer" => Some(FieldType::Int),
        "float" => Some(FieldType::Float),
        "str" | "string" => Some(FieldType::Str),
        "none" | "nonetype" => Some(FieldType::None),
        _ => None,
    };
    if let Some(ty) = scalar {
        return match args {
            None => Ok(ty),
            Some(_) => Err(unsupported(expr, "scalar types take no arguments")),
        };
    }

    match base.as_str() {
        "optional" => Ok(FieldType::optional(single(expr, args, registry, depth)?)),
        "list" => Ok(FieldType::list(single(expr, args, registry, depth)?)),
        "set" => Ok(FieldType::set(single(expr, args, registry, depth)?)),
        "tuple" => {
            let args = args.ok_or_else(|| unsupported(expr, "tuple requires element types"))?;
            let items = args
                .iter()
                .map(|arg| resolve_at(arg, registry, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FieldType::tuple(items))
        }
        "dict" => match args {
            Some([key, value]) => Ok(FieldType::dict(
                resolve_at(key, registry, depth + 1)?,
                resolve_at(value, registry, depth + 1)?,
            )),
            _ => Err(unsupported(expr, "dict requires exactly a key and a value type")),
        },
        _ => {
            if args.is_some() {
                return Err(unsupported(expr, "records take no arguments"));
            }
            registry
                .lookup(&expr.base)
                .map(FieldType::Record)
                .ok_or_else(|| unsupported(expr, "unknown type name"))
        }
    }
}

/// Parse and resolve a type string.
pub fn resolve_str(text: &str, registry: &dyn RecordRegistry) -> Result<FieldType, CodecError> {
    resolve(&TypeExpr::parse(text)?, registry)
}

fn single(
    expr: &TypeExpr,
    args: Option<&[TypeExpr]>,
    registry: &dyn RecordRegistry,
    depth: usize,
) -> Result<FieldType, CodecError> {
    match args {
        Some([inner]) => resolve_at(inner, registry, depth + 1),
        _ => Err(unsupported(expr, "exactly one element type is required")),
    }
}

fn unsupported(expr: &TypeExpr, reason: &str) -> CodecError {
    CodecError::UnsupportedType(format!("{}: {}", expr, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordDefinitionBuilder;

    #[test]
    fn test_parse_nested() {
        let expr = TypeExpr::parse(" Optional[ List[int] ] ").unwrap();
        assert_eq!(
            expr,
            TypeExpr::generic(
                "Optional",
                vec![TypeExpr::generic("List", vec![TypeExpr::name("int")])]
            )
        );
        assert_eq!(expr.to_string(), "Optional[List[int]]");
        assert_eq!(TypeExpr::parse("tuple[]").unwrap().args, Some(vec![]));
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "list[", "list[int", "list[int,]", "[int]", "int]", "dict[str int]"] {
            assert!(
                matches!(TypeExpr::parse(bad), Err(CodecError::UnsupportedType(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_resolve_unwraps_one_level_at_a_time() {
        let ty = resolve_str("optional[list[int]]", &NoRecords).unwrap();
        assert_eq!(ty, FieldType::optional(FieldType::list(FieldType::Int)));

        let ty = resolve_str("Dict[str, tuple[int, float, bool]]", &NoRecords).unwrap();
        assert_eq!(
            ty,
            FieldType::dict(
                FieldType::Str,
                FieldType::tuple(vec![FieldType::Int, FieldType::Float, FieldType::Bool])
            )
        );
        assert_eq!(
            resolve_str("tuple[]", &NoRecords).unwrap(),
            FieldType::tuple(vec![])
        );
    }

    #[test]
    fn test_resolve_rejects_outside_closed_set() {
        for bad in [
            "complex",
            "list",
            "list[int, str]",
            "set[]",
            "dict[str]",
            "optional",
            "int[str]",
            "tuple",
            "Player",
        ] {
            assert!(
                matches!(resolve_str(bad, &NoRecords), Err(CodecError::UnsupportedType(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_resolve_records_through_registry() {
        let point = Arc::new(
            RecordDefinitionBuilder::new("Point")
                .field("x", FieldType::Int)
                .field("y", FieldType::Int)
                .build(),
        );
        let mut registry = HashMapRecordRegistry::new();
        registry.register(point.clone());
        assert_eq!(registry.len(), 1);

        let ty = resolve_str("list[Point]", &registry).unwrap();
        assert_eq!(ty, FieldType::list(FieldType::Record(point)));
        // Record names are case-sensitive.
        assert!(resolve_str("point", &registry).is_err());
        assert!(resolve_str("Point[int]", &registry).is_err());
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let deep = format!("{}int{}", "list[".repeat(10_000), "]".repeat(10_000));
        assert!(matches!(
            TypeExpr::parse(&deep),
            Err(CodecError::UnsupportedType(_))
        ));

        let at_limit = format!(
            "{}int{}",
            "list[".repeat(MAX_TYPE_DEPTH),
            "]".repeat(MAX_TYPE_DEPTH)
        );
        assert!(resolve_str(&at_limit, &NoRecords).is_ok());

        // Trees built by hand are bounded at resolution too.
        let mut expr = TypeExpr::name("int");
        for _ in 0..=MAX_TYPE_DEPTH {
            expr = TypeExpr::generic("list", vec![expr]);
        }
        assert!(matches!(
            resolve(&expr, &NoRecords),
            Err(CodecError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_builtin_names() {
        assert!(is_builtin_name("int"));
        assert!(is_builtin_name("List"));
        assert!(is_builtin_name("NoneType"));
        assert!(!is_builtin_name("Point"));
    }

    #[test]
    fn test_display_parses_back() {
        let ty = FieldType::dict(
            FieldType::Str,
            FieldType::optional(FieldType::set(FieldType::Float)),
        );
        assert_eq!(resolve_str(&ty.to_string(), &NoRecords).unwrap(), ty);
    }
}
