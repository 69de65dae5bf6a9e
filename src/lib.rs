/*!
Decides whether a graph can be partitioned into at most `k` cliques by
reducing the question to CNF-SAT and handing the formula to an external solver.

The pipeline is `parser` -> `encoder` -> DIMACS file -> `solver` -> `decoder`.
*/

#[macro_use]
extern crate log;

pub mod decoder;
pub mod encoder;
pub mod formula;
pub mod graph;
pub mod numbering;
pub mod parser;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod solver;
