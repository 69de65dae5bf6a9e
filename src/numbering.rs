/*!
The bijection between (vertex, slot) pairs and CNF variables shared by the
encoder and the decoder.

Vertex `i` in slot `j` (both 1-based) is variable `(i - 1) * k + j`.
*/

use crate::formula::Variable;
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("The number of cliques must be at least 1"))]
    NoSlots,
    #[snafu(display(
        "{} vertices with {} cliques need more than the supported {} variables",
        vertex_count,
        slots,
        Variable::MAX_VARIABLE_ID
    ))]
    TooManyVariables { vertex_count: usize, slots: usize },
}

/// Zero-based clique slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(usize);

impl Slot {
    pub fn new(index: usize) -> Self {
        Slot(index)
    }

    /// 1-based slot number as used in the variable formula.
    pub fn number(&self) -> usize {
        self.0 + 1
    }
}

impl From<usize> for Slot {
    fn from(index: usize) -> Self {
        Slot(index)
    }
}

impl From<Slot> for usize {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numbering {
    vertex_count: usize,
    slots: usize,
}

impl Numbering {
    pub fn new(vertex_count: usize, slots: usize) -> Result<Self, Error> {
        ensure!(slots > 0, NoSlots);
        ensure!(
            vertex_count
                .checked_mul(slots)
                .map_or(false, |n| n <= Variable::MAX_VARIABLE_ID),
            TooManyVariables {
                vertex_count,
                slots
            }
        );

        Ok(Numbering {
            vertex_count,
            slots,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn num_variables(&self) -> usize {
        self.vertex_count * self.slots
    }

    pub fn slot_iter(&self) -> impl Iterator<Item = Slot> {
        (0..self.slots).map(Slot)
    }

    /// # Panics
    ///
    /// Panics when `vertex` is outside `1..=vertex_count`.
    pub fn variable(&self, vertex: usize, slot: Slot) -> Variable {
        assert!((1..=self.vertex_count).contains(&vertex));
        assert!(slot.0 < self.slots);

        let id = (vertex - 1) * self.slots + slot.number();
        Variable::from_id(id).expect("checked against MAX_VARIABLE_ID in Numbering::new")
    }

    /// Inverse of [`Numbering::variable`].
    pub fn locate(&self, variable: Variable) -> (usize, Slot) {
        locate(variable.id(), self.slots)
    }
}

/// Splits a variable id into its vertex and slot, for any `slots > 0`.
/// Works without knowing the vertex count, which the decoder relies on.
pub(crate) fn locate(id: usize, slots: usize) -> (usize, Slot) {
    debug_assert!(id > 0 && slots > 0);
    ((id - 1) / slots + 1, Slot((id - 1) % slots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_follow_vertex_major_order() {
        let numbering = Numbering::new(3, 2).unwrap();
        assert_eq!(numbering.variable(1, Slot::new(0)).id(), 1);
        assert_eq!(numbering.variable(1, Slot::new(1)).id(), 2);
        assert_eq!(numbering.variable(2, Slot::new(0)).id(), 3);
        assert_eq!(numbering.variable(3, Slot::new(1)).id(), 6);
        assert_eq!(numbering.num_variables(), 6);
    }

    #[test]
    fn locate_inverts_variable() {
        for slots in 1..=5 {
            let numbering = Numbering::new(7, slots).unwrap();
            let mut seen = Vec::new();
            for vertex in 1..=7 {
                for slot in numbering.slot_iter() {
                    let variable = numbering.variable(vertex, slot);
                    assert_eq!(numbering.locate(variable), (vertex, slot));
                    seen.push(variable.id());
                }
            }
            let expected: Vec<usize> = (1..=numbering.num_variables()).collect();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn rejects_zero_slots() {
        assert!(matches!(Numbering::new(3, 0), Err(Error::NoSlots)));
    }

    #[test]
    fn rejects_variable_overflow() {
        assert!(matches!(
            Numbering::new(Variable::MAX_VARIABLE_ID, 2),
            Err(Error::TooManyVariables { .. })
        ));
        assert!(matches!(
            Numbering::new(usize::MAX, 2),
            Err(Error::TooManyVariables { .. })
        ));
    }
}
