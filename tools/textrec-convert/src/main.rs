// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! textrec-convert
//!
//! Command-line tool for pipe-delimited record files.
//!
//! # Usage
//!
//! ```bash
//! # Write an example schema
//! textrec-convert gen-config --output schema.toml
//!
//! # Check every row of a file against a schema
//! textrec-convert validate --schema schema.toml --input players.txt
//!
//! # Guess a schema from the first row
//! textrec-convert infer --input players.txt --header --name Player
//!
//! # Normalize booleans, floats and set ordering
//! textrec-convert reformat --schema schema.toml --input in.txt --output out.txt
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use textrec::{
    read_rows, Dialect, FieldType, FormatSpec, RecordCodec, RecordConfig,
    RecordDefinitionBuilder, SchemaConfig,
};
use tracing_subscriber::EnvFilter;

/// Pipe-delimited record file tool
#[derive(Parser, Debug)]
#[command(name = "textrec-convert")]
#[command(about = "Validate, infer and reformat pipe-delimited record files")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode every row against a schema and report failures
    Validate {
        /// Schema file path
        #[arg(short, long)]
        schema: PathBuf,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Synthesize a schema from the first data row
    Infer {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Record type name
        #[arg(short, long, default_value = textrec::DEFAULT_RECORD_NAME)]
        name: String,

        /// First line holds field names
        #[arg(long)]
        header: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode and re-encode every row
    Reformat {
        /// Schema file path
        #[arg(short, long)]
        schema: PathBuf,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate example schema file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "schema.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Validate { schema, input } => cmd_validate(&schema, &input).map(|_| ()),
        Commands::Infer {
            input,
            name,
            header,
            output,
        } => {
            let toml_str = cmd_infer(&input, &name, header)?;
            emit(output.as_deref(), &toml_str)
        }
        Commands::Reformat {
            schema,
            input,
            output,
        } => {
            let text = cmd_reformat(&schema, &input)?;
            emit(output.as_deref(), &text)
        }
        Commands::GenConfig { output } => cmd_gen_config(&output),
    }
}

fn load_schema(path: &Path) -> Result<SchemaConfig> {
    SchemaConfig::from_file(path).with_context(|| format!("loading schema {}", path.display()))
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Returns the number of rows checked; fails if any row is invalid.
fn cmd_validate(schema: &Path, input: &Path) -> Result<usize> {
    let config = load_schema(schema)?;
    let codec = config.codec();
    let row_types = config.row_types()?;
    let dialect = Dialect::for_codec(&codec);
    let content =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

    let mut checked = 0;
    let mut failures = 0;
    for (index, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields = dialect.split_line(line);
        let mut matched = false;
        for row_type in &row_types {
            let Some(data) = row_type.select(&fields) else {
                continue;
            };
            matched = true;
            checked += 1;
            if let Err(e) = codec.parse_record(data, &row_type.definition) {
                failures += 1;
                println!("line {}: {}: {}", index + 1, row_type.definition.name, e);
            }
        }
        if !matched {
            tracing::warn!("line {}: no record type matches", index + 1);
        }
    }

    if failures > 0 {
        bail!("{} of {} rows failed validation", failures, checked);
    }
    println!("{} rows OK", checked);
    Ok(checked)
}

fn cmd_infer(input: &Path, name: &str, header: bool) -> Result<String> {
    let content =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let codec = RecordCodec::default();
    let dialect = Dialect::for_codec(&codec);
    let mut lines = content.lines().filter(|l| !l.is_empty());

    let definition = if header {
        let names = lines.next().context("input is empty")?;
        let row = lines.next().context("no data row after header")?;
        let (definition, _) = codec.define_record_with_header(
            name,
            dialect.split_line(names).as_slice(),
            dialect.split_line(row).as_slice(),
        )?;
        definition
    } else {
        let row = lines.next().context("input is empty")?;
        codec.define_record(name, dialect.split_line(row).as_slice()).0
    };
    tracing::info!(
        "Inferred {} with {} fields",
        definition.name,
        definition.len()
    );

    let config = SchemaConfig::from_definitions(codec.spec().clone(), &[definition]);
    Ok(config.to_toml_string()?)
}

fn cmd_reformat(schema: &Path, input: &Path) -> Result<String> {
    let config = load_schema(schema)?;
    let codec = config.codec();
    let row_types = config.row_types()?;
    let dialect = Dialect::for_codec(&codec);
    let file = fs::File::open(input).with_context(|| format!("opening {}", input.display()))?;

    let mut out = String::new();
    let rows = read_rows(BufReader::new(file), &row_types, &codec, &dialect, |row_type, record| {
        let mut fields = codec.format_record(&record)?;
        if let Some(prefix) = &row_type.prefix {
            fields.insert(0, prefix.clone());
        }
        out.push_str(&dialect.join_fields(&fields)?);
        out.push_str(&dialect.line_terminator);
        Ok(())
    })
    .with_context(|| format!("reformatting {}", input.display()))?;

    tracing::info!("Reformatted {} rows", rows);
    Ok(out)
}

fn example_schema() -> SchemaConfig {
    let point = RecordDefinitionBuilder::new("Point")
        .field("x", FieldType::Float)
        .field("y", FieldType::Float)
        .build();
    let route = RecordDefinitionBuilder::new("Route")
        .field("id", FieldType::Int)
        .string_field("name")
        .list_field("stops", FieldType::Str)
        .set_field("tags", FieldType::Str)
        .dict_field("limits", FieldType::Str, FieldType::Float)
        .optional_field("note", FieldType::Str)
        .build();

    let mut route = RecordConfig::from_definition(&route)
        .with_prefix("R")
        .with_key("id");
    // Stops reference the Point record declared above.
    if let Some(stops) = route.fields.iter_mut().find(|f| f.name == "stops") {
        stops.type_name = "list[Point]".into();
    }

    SchemaConfig {
        format: FormatSpec::default().with_float_precision(3),
        records: vec![
            RecordConfig::from_definition(&point).with_prefix("P"),
            route,
        ],
    }
}

fn cmd_gen_config(output: &Path) -> Result<()> {
    let config = example_schema();
    config.validate()?;
    let toml_str = config.to_toml_string()?;

    // Add comments
    let content = format!(
        "# textrec schema\n\
         # Generated by textrec-convert v{}\n\
         #\n\
         # [format] sets rendering rules; [[records]] declare row types.\n\
         # Field types: bool, int, float, str, none, optional[T], list[T],\n\
         # set[T], tuple[T1, ...], dict[K, V], or an earlier record name.\n\n\
         {}",
        env!("CARGO_PKG_VERSION"),
        toml_str
    );

    fs::write(output, content).with_context(|| format!("writing {}", output.display()))?;
    println!("Generated example schema: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.toml");
        cmd_gen_config(&path).unwrap();
        let config = SchemaConfig::from_file(&path).unwrap();
        assert_eq!(config, example_schema());
    }

    #[test]
    fn test_validate_counts_and_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.toml");
        cmd_gen_config(&schema).unwrap();

        let good = dir.path().join("good.txt");
        fs::write(&good, "P|1.0|2.0\nR|1|Loop|1;2|x|speed=5.0|\n").unwrap();
        assert_eq!(cmd_validate(&schema, &good).unwrap(), 2);

        let bad = dir.path().join("bad.txt");
        fs::write(&bad, "P|1.0|oops\nR|1|Loop|||\n").unwrap();
        assert!(cmd_validate(&schema, &bad).is_err());
    }

    #[test]
    fn test_reformat_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.toml");
        cmd_gen_config(&schema).unwrap();

        let input = dir.path().join("in.txt");
        fs::write(&input, "R|0x10|Loop|1.5;2,3;4|night,express|speed=50|\n").unwrap();
        let out = cmd_reformat(&schema, &input).unwrap();
        assert_eq!(out, "R|16|Loop|1.500;2.000,3.000;4.000|express,night|speed=50.000|\n");
    }

    #[test]
    fn test_infer_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("players.txt");
        fs::write(&input, "id|name|rating\n7|Goff|97.5\n").unwrap();
        let toml_str = cmd_infer(&input, "Player", true).unwrap();
        let config = SchemaConfig::from_toml_str(&toml_str).unwrap();
        let def = config.definition("Player").unwrap();
        assert_eq!(def.field("id").map(|f| &f.ty), Some(&FieldType::Int));
        assert_eq!(def.field("rating").map(|f| &f.ty), Some(&FieldType::Float));

        let toml_str = cmd_infer(&input, "Row", false).unwrap();
        assert!(toml_str.contains("col2"));
    }
}
