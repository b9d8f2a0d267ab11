// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Delimited-file layer.
//!
//! Lines are split on the dialect delimiter with no quoting or escaping;
//! the codec guarantees encoded fields never contain the delimiter. A file
//! may interleave several record types, each identified by a leading
//! prefix field:
//!
//! ```text
//! P|7|a,b
//! T|DET|Detroit
//! ```

use crate::codec::RecordCodec;
use crate::error::CodecError;
use crate::keyed::KeyedRecords;
use crate::types::{Record, RecordDefinition};
use std::io::{BufRead, Write};
use std::sync::Arc;
use thiserror::Error;

/// File layer errors.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row failed to decode or was refused by the sink. `line` is 1-based.
    #[error("line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: CodecError,
    },

    /// A record failed to encode.
    #[error("record {key:?} of {record}: {source}")]
    Write {
        record: String,
        key: String,
        #[source]
        source: CodecError,
    },
}

impl TableError {
    /// Underlying codec error, if any.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            Self::Row { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Io(_) => None,
        }
    }
}

/// Line layout: unix pipe-delimited, no quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: char,
    pub line_terminator: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: '|',
            line_terminator: "\n".to_string(),
        }
    }
}

impl Dialect {
    /// Dialect using the codec's configured delimiter.
    pub fn for_codec(codec: &RecordCodec) -> Self {
        Self {
            delimiter: codec.spec().delimiter,
            ..Self::default()
        }
    }

    pub fn with_line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Split one line (without terminator) into fields.
    pub fn split_line<'a>(&self, line: &'a str) -> Vec<&'a str> {
        line.split(self.delimiter).collect()
    }

    /// Join fields into one line (without terminator).
    pub fn join_fields<S: AsRef<str>>(&self, fields: &[S]) -> Result<String, CodecError> {
        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            let field = field.as_ref();
            if let Some(separator) = field
                .chars()
                .find(|&c| c == self.delimiter || c == '\n' || c == '\r')
            {
                return Err(CodecError::ReservedSeparator {
                    text: field.to_string(),
                    separator,
                });
            }
            if i > 0 {
                line.push(self.delimiter);
            }
            line.push_str(field);
        }
        Ok(line)
    }
}

/// One record type in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct RowType {
    /// Leading field selecting this type; `None` takes every row.
    pub prefix: Option<String>,
    /// Positional layout of the remaining fields.
    pub definition: Arc<RecordDefinition>,
    /// Field keying records of this type, if any.
    pub key: Option<String>,
}

impl RowType {
    pub fn new(definition: Arc<RecordDefinition>) -> Self {
        Self {
            prefix: None,
            definition,
            key: None,
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

    /// Data fields of `fields` if the row belongs to this type.
    pub fn select<'f, 'a>(&self, fields: &'f [&'a str]) -> Option<&'f [&'a str]> {
        match &self.prefix {
            None => Some(fields),
            Some(prefix) => match fields.split_first() {
                Some((first, rest)) if first == prefix => Some(rest),
                _ => None,
            },
        }
    }
}

/// Decode every row of `reader` and hand each record to `sink`.
///
/// A row is offered to every row type whose prefix matches, so a row type
/// without prefix sees all rows. Blank lines are skipped and both `\n` and
/// `\r\n` end a line. Returns the number of records decoded.
pub fn read_rows<R, F>(
    reader: R,
    row_types: &[RowType],
    codec: &RecordCodec,
    dialect: &Dialect,
    mut sink: F,
) -> Result<usize, TableError>
where
    R: BufRead,
    F: FnMut(&RowType, Record) -> Result<(), CodecError>,
{
    let mut count = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }
        let number = index + 1;
        let fields = dialect.split_line(line);

        for row_type in row_types {
            let Some(data) = row_type.select(&fields) else {
                continue;
            };
            codec
                .parse_record(data, &row_type.definition)
                .and_then(|record| sink(row_type, record))
                .map_err(|source| {
                    log::warn!("line {}: rejected {} row: {}", number, row_type.definition.name, source);
                    TableError::Row {
                        line: number,
                        source,
                    }
                })?;
            count += 1;
        }
    }
    log::debug!("read {} rows", count);
    Ok(count)
}

/// Records of one type to write, with their output layout.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    /// Prefix and output definition; may be a subset of the stored records.
    pub row_type: &'a RowType,
    /// Records in key order.
    pub records: &'a KeyedRecords,
}

/// Write each table's records in key order, each line ended by the
/// dialect's terminator. Returns the row count.
pub fn write_rows<W: Write>(
    mut writer: W,
    tables: &[Table<'_>],
    codec: &RecordCodec,
    dialect: &Dialect,
) -> Result<usize, TableError> {
    let mut count = 0;

    for table in tables {
        let definition = &table.row_type.definition;
        for (key, record) in table.records {
            let wrap = |source| TableError::Write {
                record: definition.name.clone(),
                key: key.text().to_string(),
                source,
            };
            let record = record.project(definition).map_err(wrap)?;
            let mut fields = codec.format_record(&record).map_err(wrap)?;
            if let Some(prefix) = &table.row_type.prefix {
                fields.insert(0, prefix.clone());
            }
            let line = dialect.join_fields(&fields).map_err(wrap)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(dialect.line_terminator.as_bytes())?;
            count += 1;
        }
    }
    writer.flush()?;
    log::debug!("wrote {} rows", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldType, RecordDefinitionBuilder, Value};
    use std::io::Cursor;

    fn player() -> RowType {
        RowType::new(Arc::new(
            RecordDefinitionBuilder::new("Player")
                .field("id", FieldType::Int)
                .list_field("tags", FieldType::Str)
                .build(),
        ))
        .with_prefix("P")
        .with_key("id")
    }

    fn team() -> RowType {
        RowType::new(Arc::new(
            RecordDefinitionBuilder::new("Team")
                .string_field("code")
                .string_field("city")
                .build(),
        ))
        .with_prefix("T")
    }

    #[test]
    fn test_dialect_join_split() {
        let dialect = Dialect::default();
        assert_eq!(dialect.join_fields(&["a", "", "c"]).unwrap(), "a||c");
        assert_eq!(dialect.split_line("a||c"), vec!["a", "", "c"]);
        assert!(dialect.join_fields(&["a|b"]).is_err());
        assert!(dialect.join_fields(&["a\nb"]).is_err());
    }

    #[test]
    fn test_select_by_prefix() {
        let row_type = player();
        assert_eq!(row_type.select(&["P", "1", "a"]), Some(&["1", "a"][..]));
        assert_eq!(row_type.select(&["T", "1", "a"]), None);
        assert_eq!(row_type.select(&[]), None);
    }

    #[test]
    fn test_read_rows_dispatches_by_prefix() {
        let input = "P|7|a,b\n\nT|DET|Detroit\r\nP|9|\nX|ignored\n";
        let codec = RecordCodec::default();
        let mut players = Vec::new();
        let mut teams = Vec::new();
        let count = read_rows(
            Cursor::new(input),
            &[player(), team()],
            &codec,
            &Dialect::default(),
            |row_type, record| {
                match row_type.prefix.as_deref() {
                    Some("P") => players.push(record),
                    _ => teams.push(record),
                }
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(players.len(), 2);
        assert_eq!(players[1].get("tags"), Some(&Value::List(vec![])));
        assert_eq!(teams[0].get("city"), Some(&Value::from("Detroit")));
    }

    #[test]
    fn test_read_rows_reports_line() {
        let input = "P|1|a\nP|x|b\n";
        let codec = RecordCodec::default();
        let err = read_rows(Cursor::new(input), &[player()], &codec, &Dialect::default(), |_, _| {
            Ok(())
        })
        .unwrap_err();
        match err {
            TableError::Row { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.field(), Some((0, "id")));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_write_rows_sorted_and_prefixed() {
        let codec = RecordCodec::default();
        let row_type = player();
        let mut records = KeyedRecords::new();
        for (id, tags) in [(10, vec!["b"]), (-1, vec!["a", "c"]), (3, vec![])] {
            let record =
                Record::new(&row_type.definition, vec![Value::Int(id), Value::from(tags)]).unwrap();
            crate::keyed::insert_record(&codec, record, "id", &mut records).unwrap();
        }

        let mut out = Vec::new();
        let count = write_rows(
            &mut out,
            &[Table {
                row_type: &row_type,
                records: &records,
            }],
            &codec,
            &Dialect::default(),
        )
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "P|-1|a,c\nP|3|\nP|10|b\n");
    }

    #[test]
    fn test_dialect_line_terminator() {
        let codec = RecordCodec::default();
        let row_type = player();
        let mut records = KeyedRecords::new();
        let record = Record::new(&row_type.definition, vec![Value::Int(1), Value::from(vec!["a"])]).unwrap();
        crate::keyed::insert_record(&codec, record, "id", &mut records).unwrap();

        let dialect = Dialect::for_codec(&codec).with_line_terminator("\r\n");
        let mut out = Vec::new();
        let tables = [Table {
            row_type: &row_type,
            records: &records,
        }];
        write_rows(&mut out, &tables, &codec, &dialect).unwrap();
        assert_eq!(out, b"P|1|a\r\n");

        let mut reread = Vec::new();
        read_rows(out.as_slice(), &[player()], &codec, &dialect, |_, r| {
            reread.push(r);
            Ok(())
        })
        .unwrap();
        assert_eq!(reread.len(), 1);
        assert_eq!(reread[0].get("tags"), Some(&Value::from(vec!["a"])));
    }

    #[test]
    fn test_dialect_delimiter() {
        let codec = RecordCodec::default();
        let dialect = Dialect {
            delimiter: '\t',
            ..Dialect::default()
        };
        let mut ids = Vec::new();
        read_rows(Cursor::new("P\t4\tx|y\n"), &[player()], &codec, &dialect, |_, r| {
            ids.push(r.get("id").cloned());
            Ok(())
        })
        .unwrap();
        assert_eq!(ids, vec![Some(Value::Int(4))]);
    }

    #[test]
    fn test_write_rows_projects_to_subset() {
        let codec = RecordCodec::default();
        let full = player();
        let ids = RowType::new(Arc::new(
            RecordDefinitionBuilder::new("Ids").field("id", FieldType::Int).build(),
        ));
        let mut records = KeyedRecords::new();
        let record = Record::new(&full.definition, vec![Value::Int(5), Value::from(vec!["x"])]).unwrap();
        crate::keyed::insert_record(&codec, record, "id", &mut records).unwrap();

        let mut out = Vec::new();
        write_rows(
            &mut out,
            &[Table {
                row_type: &ids,
                records: &records,
            }],
            &codec,
            &Dialect::default(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "5\n");
    }
}
