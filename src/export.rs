//! Delimited text interchange
//!
//! Node and edge lists are `;`-separated with a header row, the layout
//! Gephi's spreadsheet importer expects. Raw edge lists can be read back so
//! that sparsification can be re-run without recomputing similarity.

use crate::nodes::{Cell, NodeList};
use ludograph_similarity::WeightedEdge;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DELIMITER: char = ';';
pub const EDGE_HEADER: [&str; 3] = ["Source", "Target", "Weight"];

/// Errors raised while writing or reading delimited files
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Edge list is empty, expected header {}", EDGE_HEADER.join(";"))]
    MissingHeader,

    #[error("Unexpected edge list header: {found}")]
    UnexpectedHeader { found: String },

    #[error("Malformed edge list row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },
}

pub type ExportResult<T> = Result<T, ExportError>;

fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(DELIMITER) || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn format_cell(cell: &Cell) -> Cow<'_, str> {
    match cell {
        Cell::Int(i) => Cow::Owned(i.to_string()),
        Cell::UInt(u) => Cow::Owned(u.to_string()),
        Cell::Float(f) => Cow::Owned(f.to_string()),
        Cell::Empty => Cow::Borrowed(""),
    }
}

/// Write `id;label;<columns...>` followed by one line per node
pub fn write_node_list<W: Write>(mut writer: W, nodes: &NodeList) -> ExportResult<()> {
    let mut header = vec!["id", "label"];
    header.extend(nodes.columns.iter().copied());
    writeln!(writer, "{}", header.join(";"))?;

    for row in &nodes.rows {
        write!(writer, "{}{}{}", row.id, DELIMITER, escape_field(&row.label))?;
        for cell in &row.fields {
            write!(writer, "{}{}", DELIMITER, format_cell(cell))?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `Source;Target;Weight` followed by one line per edge, in slice order
pub fn write_edge_list<W: Write>(mut writer: W, edges: &[WeightedEdge]) -> ExportResult<()> {
    writeln!(writer, "{}", EDGE_HEADER.join(";"))?;
    for edge in edges {
        writeln!(
            writer,
            "{}{d}{}{d}{}",
            edge.source,
            edge.target,
            edge.weight,
            d = DELIMITER
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> ExportResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::File {
            path: path.to_path_buf(),
            source,
        })
}

pub fn write_node_list_file(path: impl AsRef<Path>, nodes: &NodeList) -> ExportResult<()> {
    let path = path.as_ref();
    write_node_list(create(path)?, nodes)?;
    info!(path = %path.display(), nodes = nodes.len(), "Wrote node list");
    Ok(())
}

pub fn write_edge_list_file(path: impl AsRef<Path>, edges: &[WeightedEdge]) -> ExportResult<()> {
    let path = path.as_ref();
    write_edge_list(create(path)?, edges)?;
    info!(path = %path.display(), edges = edges.len(), "Wrote edge list");
    Ok(())
}

fn parse_edge_row(line: &str, line_no: usize) -> ExportResult<WeightedEdge> {
    let malformed = |message: String| ExportError::MalformedRow {
        line: line_no,
        message,
    };

    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() != EDGE_HEADER.len() {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            EDGE_HEADER.len(),
            fields.len()
        )));
    }

    let source: u64 = fields[0]
        .parse()
        .map_err(|_| malformed(format!("invalid Source '{}'", fields[0])))?;
    let target: u64 = fields[1]
        .parse()
        .map_err(|_| malformed(format!("invalid Target '{}'", fields[1])))?;
    let weight: f64 = fields[2]
        .parse()
        .map_err(|_| malformed(format!("invalid Weight '{}'", fields[2])))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(malformed(format!("weight must be non-negative, got {}", weight)));
    }

    Ok(WeightedEdge::new(source, target, weight))
}

/// Read an edge list written by [`write_edge_list`]. Blank lines are skipped.
pub fn read_edge_list<R: BufRead>(reader: R) -> ExportResult<Vec<WeightedEdge>> {
    let mut lines = reader.lines();

    let header = lines.next().ok_or(ExportError::MissingHeader)??;
    let header = header.trim_start_matches('\u{feff}').trim();
    let columns: Vec<&str> = header.split(DELIMITER).map(str::trim).collect();
    if columns != EDGE_HEADER {
        return Err(ExportError::UnexpectedHeader {
            found: header.to_string(),
        });
    }

    let mut edges = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // Header is line 1
        edges.push(parse_edge_row(&line, offset + 2)?);
    }
    Ok(edges)
}

pub fn read_edge_list_file(path: impl AsRef<Path>) -> ExportResult<Vec<WeightedEdge>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ExportError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let edges = read_edge_list(BufReader::new(file))?;
    info!(path = %path.display(), edges = edges.len(), "Read edge list");
    Ok(edges)
}
