/*!
Reduction from clique cover to CNF.

Three clause families are generated, always in this order:

1. coverage: every vertex sits in at least one slot,
2. uniqueness: every vertex sits in at most one slot (pairwise encoding),
3. exclusion: two non-adjacent vertices never share a slot.
*/

use crate::formula::{Clause, Cnf, Literal};
use crate::graph::Graph;
use crate::numbering::{self, Numbering};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Invalid number of cliques"))]
    InvalidSlots { source: numbering::Error },
}

/// How exclusion clauses are emitted for a non-adjacent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Once per ordered pair, so every clause appears in both orientations.
    Ordered,
    /// Once per unordered pair.
    Unordered,
}

impl Default for Exclusion {
    fn default() -> Self {
        Exclusion::Ordered
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub exclusion: Exclusion,
}

/// Encodes "`graph` is covered by at most `slots` cliques" with default options.
pub fn encode(graph: &Graph, slots: usize) -> Result<Cnf, Error> {
    encode_with(graph, slots, &EncodeOptions::default())
}

pub fn encode_with(graph: &Graph, slots: usize, options: &EncodeOptions) -> Result<Cnf, Error> {
    let numbering = Numbering::new(graph.vertex_count(), slots).context(InvalidSlots)?;
    let encoder = Encoder {
        graph,
        numbering,
        options: *options,
    };
    Ok(encoder.run())
}

struct Encoder<'a> {
    graph: &'a Graph,
    numbering: Numbering,
    options: EncodeOptions,
}

impl Encoder<'_> {
    fn run(&self) -> Cnf {
        let mut cnf = Cnf::new(self.numbering.num_variables());

        self.add_coverage(&mut cnf);
        let coverage = cnf.num_clauses();

        self.add_uniqueness(&mut cnf);
        let uniqueness = cnf.num_clauses() - coverage;

        self.add_exclusion(&mut cnf);
        let exclusion = cnf.num_clauses() - coverage - uniqueness;

        debug!(
            "Encoded {} vertices into {} slots: {} coverage, {} uniqueness, {} exclusion clauses",
            self.numbering.vertex_count(),
            self.numbering.slots(),
            coverage,
            uniqueness,
            exclusion
        );

        cnf
    }

    fn add_coverage(&self, cnf: &mut Cnf) {
        for vertex in self.graph.vertices() {
            let literals = self
                .numbering
                .slot_iter()
                .map(|slot| Literal::positive_of(self.numbering.variable(vertex, slot)))
                .collect();
            cnf.add_clause(Clause::new(literals));
        }
    }

    fn add_uniqueness(&self, cnf: &mut Cnf) {
        let slots = self.numbering.slot_iter().collect::<Vec<_>>();
        for vertex in self.graph.vertices() {
            for (idx, &first) in slots.iter().enumerate() {
                for &second in &slots[idx + 1..] {
                    cnf.add_clause(Clause::new(vec![
                        Literal::negative_of(self.numbering.variable(vertex, first)),
                        Literal::negative_of(self.numbering.variable(vertex, second)),
                    ]));
                }
            }
        }
    }

    fn add_exclusion(&self, cnf: &mut Cnf) {
        for a in self.graph.vertices() {
            let start = match self.options.exclusion {
                Exclusion::Ordered => 1,
                Exclusion::Unordered => a + 1,
            };
            for b in start..=self.graph.vertex_count() {
                if a == b || self.graph.is_adjacent(a, b) {
                    continue;
                }
                for slot in self.numbering.slot_iter() {
                    cnf.add_clause(Clause::new(vec![
                        Literal::negative_of(self.numbering.variable(a, slot)),
                        Literal::negative_of(self.numbering.variable(b, slot)),
                    ]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::numbering::Slot;

    fn as_ints(clause: &Clause) -> Vec<i64> {
        clause.iter().map(|l| l.to_dimacs()).collect()
    }

    #[test]
    fn triangle_with_one_slot() {
        let graph = Graph::new(3, vec![(1, 2), (2, 3), (1, 3)]).unwrap();
        let cnf = encode(&graph, 1).unwrap();

        assert_eq!(cnf.to_string(), "p cnf 3 3\n1 0\n2 0\n3 0");
    }

    #[test]
    fn single_edge_two_slots_is_bit_exact() {
        let graph = Graph::new(3, vec![(1, 2)]).unwrap();
        let cnf = encode(&graph, 2).unwrap();

        let expected = "p cnf 6 14\n\
                        1 2 0\n3 4 0\n5 6 0\n\
                        -1 -2 0\n-3 -4 0\n-5 -6 0\n\
                        -1 -5 0\n-2 -6 0\n\
                        -3 -5 0\n-4 -6 0\n\
                        -5 -1 0\n-6 -2 0\n\
                        -5 -3 0\n-6 -4 0";
        assert_eq!(cnf.to_string(), expected);
    }

    #[test]
    fn coverage_clauses_come_first() {
        let graph = Graph::new(4, vec![(1, 2), (3, 4)]).unwrap();
        let cnf = encode(&graph, 3).unwrap();
        let numbering = Numbering::new(4, 3).unwrap();

        for vertex in 1..=4 {
            let clause = &cnf.clauses()[vertex - 1];
            let expected: Vec<i64> = (0..3)
                .map(|slot| numbering.variable(vertex, Slot::new(slot)).id() as i64)
                .collect();
            assert_eq!(as_ints(clause), expected);
        }
    }

    #[test]
    fn uniqueness_covers_every_slot_pair_once() {
        let graph = Graph::new(2, vec![(1, 2)]).unwrap();
        let slots = 4;
        let cnf = encode(&graph, slots).unwrap();
        let numbering = Numbering::new(2, slots).unwrap();

        let uniqueness = &cnf.clauses()[2..2 + 2 * 6];
        for vertex in 1..=2 {
            for first in 0..slots {
                for second in first + 1..slots {
                    let expected = vec![
                        -(numbering.variable(vertex, Slot::new(first)).id() as i64),
                        -(numbering.variable(vertex, Slot::new(second)).id() as i64),
                    ];
                    let count = uniqueness
                        .iter()
                        .filter(|clause| as_ints(clause) == expected)
                        .count();
                    assert_eq!(count, 1);
                }
            }
        }
    }

    #[test]
    fn unordered_exclusion_yields_same_clause_set() {
        let graph = Graph::new(5, vec![(1, 2), (2, 3), (4, 5)]).unwrap();
        let ordered = encode(&graph, 2).unwrap();
        let unordered = encode_with(
            &graph,
            2,
            &EncodeOptions {
                exclusion: Exclusion::Unordered,
            },
        )
        .unwrap();

        let normalize = |cnf: &Cnf| {
            cnf.clauses()
                .iter()
                .map(|clause| {
                    let mut ints = as_ints(clause);
                    ints.sort_unstable();
                    ints
                })
                .collect::<BTreeSet<_>>()
        };

        assert_eq!(normalize(&ordered), normalize(&unordered));
        assert!(unordered.num_clauses() < ordered.num_clauses());
        assert_eq!(unordered.num_variables(), ordered.num_variables());
    }

    #[test]
    fn rejects_zero_slots() {
        let graph = Graph::new(2, vec![]).unwrap();
        assert!(matches!(encode(&graph, 0), Err(Error::InvalidSlots { .. })));
    }
}
