/*!
Undirected graphs over the contiguous vertex ids `1..=vertex_count`.
*/

use std::collections::BTreeSet;

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("A graph needs at least one vertex"))]
    NoVertices,
    #[snafu(display(
        "Edge ({}, {}) references a vertex outside of 1 to {}",
        from,
        to,
        vertex_count
    ))]
    VertexOutOfRange {
        from: usize,
        to: usize,
        vertex_count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    vertex_count: usize,
    /// Normalized so that the first component is never larger than the second.
    edges: BTreeSet<(usize, usize)>,
}

impl Graph {
    /// Creates a graph after checking every endpoint is within `1..=vertex_count`.
    pub fn new(
        vertex_count: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, Error> {
        ensure!(vertex_count > 0, NoVertices);

        let mut normalized = BTreeSet::new();
        for (from, to) in edges {
            ensure!(
                (1..=vertex_count).contains(&from) && (1..=vertex_count).contains(&to),
                VertexOutOfRange {
                    from,
                    to,
                    vertex_count,
                }
            );
            if from == to {
                warn!("Ignoring self-loop on vertex {}", from);
                continue;
            }
            normalized.insert((from.min(to), from.max(to)));
        }

        Ok(Graph {
            vertex_count,
            edges: normalized,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> {
        1..=self.vertex_count
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    /// Adjacency test, independent of the order the edge was given in.
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&(a.min(b), a.max(b)))
    }
}
