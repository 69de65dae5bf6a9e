use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use crate::graph::{self, Graph};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while reading graph file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading graph"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Vertex count line is not found"))]
    MissingVertexCount,
    #[snafu(display("Failed to parse line {} '{}' as vertex count", line_no, line))]
    MalformedVertexCount {
        line_no: usize,
        line: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("Failed to parse line {} '{}' as edge 'u v'", line_no, line))]
    MalformedEdge { line_no: usize, line: String },
    #[snafu(display("Graph is invalid"))]
    InvalidGraph { source: graph::Error },
}

/// Parse an edge line `u v`
fn parse_edge(line_no: usize, line: &str) -> Result<(usize, usize), Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    match splitted.as_slice() {
        [from, to] => match (from.parse::<usize>(), to.parse::<usize>()) {
            (Ok(from), Ok(to)) => Ok((from, to)),
            _ => MalformedEdge {
                line_no,
                line: line.to_owned(),
            }
            .fail(),
        },
        _ => MalformedEdge {
            line_no,
            line: line.to_owned(),
        }
        .fail(),
    }
}

/// Parses a graph: the first meaningful line is the vertex count and every
/// following line is an edge. Blank lines and `#` comments are skipped.
pub fn parse_graph(reader: impl Read) -> Result<Graph, Error> {
    let mut vertex_count = None;
    let mut edges = Vec::new();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.context(ReadError)?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            // empty line, comment
            continue;
        }

        let line_no = idx + 1;
        match vertex_count {
            None => {
                vertex_count = Some(trimmed.parse::<usize>().context(MalformedVertexCount {
                    line_no,
                    line: trimmed,
                })?);
            }
            Some(_) => edges.push(parse_edge(line_no, trimmed)?),
        }
    }

    let vertex_count = vertex_count.context(MissingVertexCount)?;
    debug!(
        "Read graph with {} vertices and {} edge lines",
        vertex_count,
        edges.len()
    );

    Graph::new(vertex_count, edges).context(InvalidGraph)
}

/// Parses a graph from a file
pub fn parse_graph_file(path: impl AsRef<Path>) -> Result<Graph, Error> {
    let path = path.as_ref();
    let file = File::open(path).context(IoError {
        path: path.to_owned(),
    })?;

    parse_graph(file)
}
