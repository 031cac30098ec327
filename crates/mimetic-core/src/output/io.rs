//! Graph Files
//!
//! Loading and saving signed graphs as JSON, CSV edge lists or whitespace
//! separated text edge lists. The format is picked from the file extension.

use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use mimetic_events::{GraphSnapshot, Sign};

use crate::components::SignedGraph;
use crate::error::SimError;

/// Errors raised while reading or writing graph files
#[derive(Debug, Error)]
pub enum GraphIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported graph file format: {0}")]
    UnsupportedFormat(String),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("invalid sign '{value}' ({location})")]
    InvalidSign { value: String, location: String },

    #[error("node id {id:?} cannot be written as {format}")]
    UnrepresentableId { id: String, format: &'static str },

    #[error(transparent)]
    Graph(#[from] SimError),
}

/// On-disk graph formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphFormat {
    Json,
    Csv,
    Txt,
}

impl GraphFormat {
    /// Format for a path, by extension (`.edges` reads as text)
    pub fn from_path(path: &Path) -> Result<Self, GraphIoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(GraphFormat::Json),
            Some("csv") => Ok(GraphFormat::Csv),
            Some("txt") | Some("edges") => Ok(GraphFormat::Txt),
            _ => Err(GraphIoError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            GraphFormat::Json => "json",
            GraphFormat::Csv => "csv",
            GraphFormat::Txt => "txt",
        }
    }
}

/// Parse a sign written as `1`/`-1`, `+`/`-`, `positive`/`negative` or
/// `friend`/`enemy` (case-insensitive)
pub fn parse_sign(text: &str) -> Option<Sign> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "+1" | "+" | "positive" | "friend" => Some(Sign::Positive),
        "-1" | "-" | "negative" | "enemy" => Some(Sign::Negative),
        _ => None,
    }
}

/// Load a graph, detecting the format from the extension
pub fn load_graph(path: impl AsRef<Path>) -> Result<SignedGraph, GraphIoError> {
    let path = path.as_ref();
    let format = GraphFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let graph = parse_graph(&content, format)?;
    tracing::debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Loaded graph"
    );
    Ok(graph)
}

pub fn parse_graph(content: &str, format: GraphFormat) -> Result<SignedGraph, GraphIoError> {
    match format {
        GraphFormat::Json => parse_json(content),
        GraphFormat::Csv => parse_csv(content),
        GraphFormat::Txt => parse_txt(content),
    }
}

fn value_to_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_sign(value: &Value, location: String) -> Result<Sign, GraphIoError> {
    let text = value_to_id(value);
    parse_sign(&text).ok_or(GraphIoError::InvalidSign {
        value: text,
        location,
    })
}

fn parse_json(content: &str) -> Result<SignedGraph, GraphIoError> {
    let data: Value = serde_json::from_str(content)?;
    let (Some(nodes), Some(edges)) = (
        data.get("nodes").and_then(Value::as_array),
        data.get("edges").and_then(Value::as_array),
    ) else {
        return Err(GraphIoError::Malformed {
            line: 1,
            reason: "JSON must contain 'nodes' and 'edges' arrays".into(),
        });
    };

    let mut graph = SignedGraph::new();
    for node in nodes {
        graph.add_node(value_to_id(node));
    }
    for (i, edge) in edges.iter().enumerate() {
        let field = |name: &str| {
            edge.get(name).ok_or_else(|| GraphIoError::Malformed {
                line: 1,
                reason: format!("edge {} is missing '{}'", i, name),
            })
        };
        let source = value_to_id(field("source")?);
        let target = value_to_id(field("target")?);
        let sign = value_to_sign(field("sign")?, format!("edge {}", i))?;
        graph.add_edge(source, target, sign)?;
    }
    Ok(graph)
}

/// Split CSV text into records of fields (RFC 4180).
///
/// Quoted fields may hold commas, doubled quotes and line breaks; unquoted
/// fields are trimmed. Each record carries the line it starts on. Blank
/// lines are skipped.
fn csv_records(content: &str) -> Result<Vec<(usize, Vec<String>)>, GraphIoError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    let finish_field = |field: &mut String, quoted: &mut bool, fields: &mut Vec<String>| {
        let value = if *quoted {
            std::mem::take(field)
        } else {
            std::mem::take(field).trim().to_string()
        };
        fields.push(value);
        *quoted = false;
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.trim().is_empty() && !quoted => {
                field.clear();
                quoted = true;
                in_quotes = true;
            }
            ',' => finish_field(&mut field, &mut quoted, &mut fields),
            '\r' => {}
            c if quoted && c.is_whitespace() && c != '\n' => {}
            '\n' => {
                finish_field(&mut field, &mut quoted, &mut fields);
                if !(fields.len() == 1 && fields[0].is_empty()) {
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(GraphIoError::Malformed {
            line: record_line,
            reason: "unterminated quoted field".into(),
        });
    }
    if quoted || !field.trim().is_empty() || !fields.is_empty() {
        finish_field(&mut field, &mut quoted, &mut fields);
        records.push((record_line, fields));
    }
    Ok(records)
}

/// Quote a CSV field when it would not survive a plain read
fn csv_field(value: &str) -> String {
    let needs_quotes = value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r'))
        || value.trim() != value
        || value.is_empty();
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn parse_csv(content: &str) -> Result<SignedGraph, GraphIoError> {
    let mut records = csv_records(content)?.into_iter();
    let Some((_, header)) = records.next() else {
        return Ok(SignedGraph::new());
    };

    let columns: Vec<String> = header.iter().map(|c| c.to_ascii_lowercase()).collect();
    let position = |name: &str| {
        columns.iter().position(|c| c == name).ok_or_else(|| GraphIoError::Malformed {
            line: 1,
            reason: "CSV must have 'source', 'target', 'sign' columns".into(),
        })
    };
    let (source_col, target_col, sign_col) =
        (position("source")?, position("target")?, position("sign")?);

    let mut graph = SignedGraph::new();
    for (line_number, fields) in records {
        let get = |col: usize| {
            fields.get(col).map(String::as_str).ok_or_else(|| GraphIoError::Malformed {
                line: line_number,
                reason: format!("expected {} columns, got {}", columns.len(), fields.len()),
            })
        };
        let (source, target, sign_text) = (get(source_col)?, get(target_col)?, get(sign_col)?);
        let sign = parse_sign(sign_text).ok_or_else(|| GraphIoError::InvalidSign {
            value: sign_text.to_string(),
            location: format!("line {}, edge {}-{}", line_number, source, target),
        })?;
        graph.add_edge(source, target, sign)?;
    }
    Ok(graph)
}

fn parse_txt(content: &str) -> Result<SignedGraph, GraphIoError> {
    let mut graph = SignedGraph::new();
    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let [source, target, sign_text] = parts[..] else {
            return Err(GraphIoError::Malformed {
                line: line_number,
                reason: format!("expected 3 columns, got {}", parts.len()),
            });
        };
        let sign = parse_sign(sign_text).ok_or_else(|| GraphIoError::InvalidSign {
            value: sign_text.to_string(),
            location: format!("line {}", line_number),
        })?;
        graph.add_edge(source, target, sign)?;
    }
    Ok(graph)
}

/// Render a graph in the given format; edges in canonical order.
///
/// Text edge lists are whitespace separated, so ids with whitespace (or a
/// leading `#`) are rejected there instead of producing an unreadable file.
pub fn render_graph(graph: &SignedGraph, format: GraphFormat) -> Result<String, GraphIoError> {
    match format {
        GraphFormat::Json => {
            let snapshot: GraphSnapshot = graph.snapshot();
            Ok(snapshot.to_json_pretty()? + "\n")
        }
        GraphFormat::Csv => {
            let mut out = String::from("source,target,sign\n");
            for (key, sign) in graph.edges() {
                out.push_str(&format!(
                    "{},{},{}\n",
                    csv_field(key.first()),
                    csv_field(key.second()),
                    sign.value()
                ));
            }
            Ok(out)
        }
        GraphFormat::Txt => {
            if let Some(id) = graph.nodes().find(|n| !is_txt_safe(n)) {
                return Err(GraphIoError::UnrepresentableId {
                    id: id.to_string(),
                    format: "txt",
                });
            }
            let mut out = String::new();
            for (key, sign) in graph.edges() {
                out.push_str(&format!("{} {} {}\n", key.first(), key.second(), sign.symbol()));
            }
            Ok(out)
        }
    }
}

fn is_txt_safe(id: &str) -> bool {
    !id.is_empty() && !id.starts_with('#') && !id.chars().any(char::is_whitespace)
}

/// Save a graph; the format comes from the extension
pub fn save_graph(graph: &SignedGraph, path: impl AsRef<Path>) -> Result<(), GraphIoError> {
    let path = path.as_ref();
    let format = GraphFormat::from_path(path)?;
    save_graph_as(graph, path, format)
}

pub fn save_graph_as(
    graph: &SignedGraph,
    path: impl AsRef<Path>,
    format: GraphFormat,
) -> Result<(), GraphIoError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_graph(graph, format)?)?;
    tracing::debug!(path = %path.display(), "Saved graph");
    Ok(())
}
