/*!
Turns a satisfying assignment back into a clique cover.

The decoder only sees a normalized list of signed integers; extracting it
from the solver's text output is the job of [`crate::solver`].
*/

use std::fmt::Display;

use typed_index_collections::TiVec;

use crate::graph::Graph;
use crate::numbering::{self, Slot};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("The number of cliques must be at least 1"))]
    NoSlots,
}

#[derive(Debug, Snafu)]
pub enum VerifyError {
    #[snafu(display("Vertex {} is not assigned to any clique", vertex))]
    UnassignedVertex { vertex: usize },
    #[snafu(display("Vertex {} is assigned to more than one clique", vertex))]
    DuplicateVertex { vertex: usize },
    #[snafu(display("Vertex {} does not exist in a graph of {} vertices", vertex, vertex_count))]
    UnknownVertex { vertex: usize, vertex_count: usize },
    #[snafu(display(
        "Vertices {} and {} share clique {} but are not adjacent",
        first,
        second,
        slot
    ))]
    NonAdjacent {
        first: usize,
        second: usize,
        slot: usize,
    },
}

/// A non-empty group of vertices together with the slot it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clique {
    slot: Slot,
    vertices: Vec<usize>,
}

impl Clique {
    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }
}

/// Non-empty cliques in ascending slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliqueCover {
    cliques: Vec<Clique>,
}

impl CliqueCover {
    pub fn cliques(&self) -> &[Clique] {
        &self.cliques
    }

    pub fn len(&self) -> usize {
        self.cliques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cliques.is_empty()
    }

    pub fn into_groups(self) -> Vec<Vec<usize>> {
        self.cliques
            .into_iter()
            .map(|clique| clique.vertices)
            .collect()
    }

    /// Checks that the cover is a partition of the graph's vertices into cliques.
    pub fn verify(&self, graph: &Graph) -> Result<(), VerifyError> {
        let vertex_count = graph.vertex_count();
        let mut seen = vec![false; vertex_count];

        for clique in &self.cliques {
            for &vertex in &clique.vertices {
                ensure!(
                    (1..=vertex_count).contains(&vertex),
                    UnknownVertex {
                        vertex,
                        vertex_count
                    }
                );
                ensure!(!seen[vertex - 1], DuplicateVertex { vertex });
                seen[vertex - 1] = true;
            }

            for (idx, &first) in clique.vertices.iter().enumerate() {
                for &second in &clique.vertices[idx + 1..] {
                    ensure!(
                        graph.is_adjacent(first, second),
                        NonAdjacent {
                            first,
                            second,
                            slot: clique.slot.number(),
                        }
                    );
                }
            }
        }

        if let Some(idx) = seen.iter().position(|&assigned| !assigned) {
            return UnassignedVertex { vertex: idx + 1 }.fail();
        }

        Ok(())
    }
}

impl Display for CliqueCover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, clique) in self.cliques.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "Clique {}: {:?}", idx + 1, clique.vertices)?;
        }
        Ok(())
    }
}

/// Groups the vertices selected by the positive literals of `assignment` by slot.
///
/// Negative literals and `0` terminators are skipped. An assignment with no
/// positive literal yields an empty cover.
pub fn decode(assignment: &[i64], slots: usize) -> Result<CliqueCover, Error> {
    ensure!(slots > 0, NoSlots);

    let mut groups: TiVec<Slot, Vec<usize>> = (0..slots).map(|_| Vec::new()).collect();
    for &literal in assignment {
        if literal <= 0 {
            continue;
        }
        let (vertex, slot) = numbering::locate(literal as usize, slots);
        trace!("Variable {} places vertex {} in slot {}", literal, vertex, slot.number());
        groups[slot].push(vertex);
    }

    let cliques = groups
        .into_iter()
        .enumerate()
        .filter(|(_, vertices)| !vertices.is_empty())
        .map(|(idx, vertices)| Clique {
            slot: Slot::from(idx),
            vertices,
        })
        .collect::<Vec<_>>();

    debug!(
        "Decoded {} non-empty cliques out of {} slots",
        cliques.len(),
        slots
    );

    Ok(CliqueCover { cliques })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_in_one_slot() {
        let cover = decode(&[1, 2, 3], 1).unwrap();
        assert_eq!(cover.into_groups(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn ignores_negatives_and_terminator() {
        // vertices 1,2 in slot 1 and 3,4 in slot 2
        let cover = decode(&[1, -2, 3, -4, -5, 6, -7, 8, 0], 2).unwrap();
        assert_eq!(cover.len(), 2);
        assert_eq!(cover.cliques()[0].slot(), Slot::new(0));
        assert_eq!(cover.into_groups(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn empty_slots_are_dropped() {
        // slots 1 and 3 of 3 are used
        let cover = decode(&[1, -2, -3, -4, -5, 6], 3).unwrap();
        let slots = cover
            .cliques()
            .iter()
            .map(|clique| clique.slot().number())
            .collect::<Vec<_>>();
        assert_eq!(slots, vec![1, 3]);
        assert_eq!(cover.into_groups(), vec![vec![1], vec![2]]);
    }

    #[test]
    fn no_positive_literal_is_empty() {
        assert!(decode(&[], 2).unwrap().is_empty());
        assert!(decode(&[-1, -2, -3, -4], 2).unwrap().is_empty());
    }

    #[test]
    fn rejects_zero_slots() {
        assert!(matches!(decode(&[1], 0), Err(Error::NoSlots)));
    }

    #[test]
    fn display_numbers_visible_cliques() {
        let cover = decode(&[-1, 2, -3, 4, 5, -6], 2).unwrap();
        assert_eq!(cover.to_string(), "Clique 1: [3]\nClique 2: [1, 2]");
    }

    #[test]
    fn verify_accepts_partition_into_cliques() {
        let graph = Graph::new(4, vec![(1, 2), (3, 4)]).unwrap();
        let cover = decode(&[1, -2, 3, -4, -5, 6, -7, 8], 2).unwrap();
        cover.verify(&graph).unwrap();
    }

    #[test]
    fn verify_reports_each_failure() {
        let graph = Graph::new(3, vec![(1, 2)]).unwrap();

        let missing = decode(&[1, 2], 1).unwrap();
        assert!(matches!(
            missing.verify(&graph),
            Err(VerifyError::UnassignedVertex { vertex: 3 })
        ));

        let nonadjacent = decode(&[1, 4, 5], 2).unwrap();
        assert!(matches!(
            nonadjacent.verify(&graph),
            Err(VerifyError::NonAdjacent {
                first: 1,
                second: 3,
                slot: 1
            })
        ));

        let duplicated = decode(&[1, 2, 3], 2).unwrap();
        assert!(matches!(
            duplicated.verify(&graph),
            Err(VerifyError::DuplicateVertex { vertex: 1 })
        ));

        let unknown = decode(&[1, 2, 3, 4], 1).unwrap();
        assert!(matches!(
            unknown.verify(&graph),
            Err(VerifyError::UnknownVertex { vertex: 4, .. })
        ));
    }
}
