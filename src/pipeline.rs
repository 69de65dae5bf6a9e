/*!
Glue for a full run: encode, write the DIMACS file, solve, decode, verify.
*/

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::decoder::{self, CliqueCover, VerifyError};
use crate::encoder::{self, EncodeOptions};
use crate::formula::Cnf;
use crate::graph::Graph;
use crate::prelude::*;
use crate::solver::{self, Solver, SolverOutput};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to encode graph"))]
    Encode { source: encoder::Error },
    #[snafu(display("Failed to write CNF formula to '{}'", path.display()))]
    WriteCnf {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("SAT solver failed"))]
    Solve { source: solver::Error },
    #[snafu(display("Failed to decode solver model"))]
    Decode { source: decoder::Error },
    #[snafu(display("Solver model does not describe a clique cover"))]
    InvalidCover { source: VerifyError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Satisfiable, with the decoded and verified cover.
    Cover(CliqueCover),
    /// Unsatisfiable: no cover with that many cliques exists.
    NoCover,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Run {
    pub outcome: Outcome,
    /// Raw solver output, for verbose reporting.
    pub solver_output: String,
}

impl Run {
    /// Console summary. In verbose mode the raw solver output stands in for
    /// the verdict line; an unknown result is always spelled out.
    pub fn summary(&self, verbose: bool) -> String {
        let verdict = match &self.outcome {
            Outcome::Cover(_) => "Result: SATISFIABLE",
            Outcome::NoCover => "Result: UNSATISFIABLE",
            Outcome::Unknown => "Result: UNKNOWN",
        };

        let mut lines = Vec::new();
        if verbose {
            lines.push(self.solver_output.trim_end().to_owned());
        }
        if !verbose || self.outcome == Outcome::Unknown {
            lines.push(verdict.to_owned());
        }
        if let Outcome::Cover(cover) = &self.outcome {
            lines.push(cover.to_string());
        }
        lines.join("\n")
    }
}

/// Encodes `graph` for `slots` cliques and writes the DIMACS text to `cnf_path`.
pub fn write_formula(
    graph: &Graph,
    slots: usize,
    options: &EncodeOptions,
    cnf_path: &Path,
) -> Result<Cnf, Error> {
    let cnf = encoder::encode_with(graph, slots, options).context(Encode)?;

    let file = File::create(cnf_path).context(WriteCnf { path: cnf_path })?;
    cnf.write_dimacs(BufWriter::new(file))
        .context(WriteCnf { path: cnf_path })?;
    info!(
        "Wrote {} variables and {} clauses to {}",
        cnf.num_variables(),
        cnf.num_clauses(),
        cnf_path.display()
    );

    Ok(cnf)
}

/// Solves the formula previously written by [`write_formula`] and turns the
/// verdict into an [`Outcome`]. A model that does not decode into a valid
/// cover of `graph` is an error, never a `NoCover`.
pub fn solve_formula<S: Solver>(
    solver: &S,
    graph: &Graph,
    slots: usize,
    cnf_path: &Path,
) -> Result<Run, Error> {
    let result = solver.solve(cnf_path).context(Solve)?;

    let outcome = match result.output {
        SolverOutput::Sat(model) => {
            let cover = decoder::decode(&model, slots).context(Decode)?;
            cover.verify(graph).context(InvalidCover)?;
            Outcome::Cover(cover)
        }
        SolverOutput::Unsat => Outcome::NoCover,
        SolverOutput::Unknown => Outcome::Unknown,
    };

    Ok(Run {
        outcome,
        solver_output: result.raw,
    })
}

/// Decides whether `graph` is covered by at most `slots` cliques, writing the
/// intermediate formula to `cnf_path`.
pub fn run<S: Solver>(
    solver: &S,
    graph: &Graph,
    slots: usize,
    options: &EncodeOptions,
    cnf_path: &Path,
) -> Result<Run, Error> {
    write_formula(graph, slots, options, cnf_path)?;
    solve_formula(solver, graph, slots, cnf_path)
}
