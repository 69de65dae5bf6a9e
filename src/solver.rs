/*!
Runs an external DIMACS SAT solver and normalizes what it prints.

Only the verdict and the model survive normalization; statistics and
comment lines are left to the caller through [`SolverRun::raw`].
*/

use std::{
    io::{BufRead, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use crate::prelude::*;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long to wait for buffered output once the solver has been killed.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to start SAT solver '{}', was it found?", program.display()))]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for SAT solver"))]
    Wait { source: std::io::Error },
    #[snafu(display("Standard output of the SAT solver is not available"))]
    StdoutUnavailable,
    #[snafu(display("Failed to read SAT solver output"))]
    ReadOutput { source: std::io::Error },
    #[snafu(display("SAT solver output reader panicked"))]
    ReaderPanicked,
    #[snafu(display("SAT solver returned unexpected exit code {}", code))]
    UnexpectedExit { code: i32 },
    #[snafu(display("SAT solver was terminated by a signal"))]
    Terminated,
    #[snafu(display("SAT solver output contains no SAT/UNSAT verdict"))]
    MissingVerdict,
    #[snafu(display("SAT solver reported SAT but printed no model"))]
    MissingModel,
    #[snafu(display("Failed to parse '{}' in the model line", token))]
    MalformedModel {
        token: String,
        source: std::num::ParseIntError,
    },
}

/// Normalized solver verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverOutput {
    /// Signed literals of the model, without the `0` terminator.
    Sat(Vec<i64>),
    Unsat,
    /// The solver gave up, or ran out of its time budget.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct SolverRun {
    pub output: SolverOutput,
    /// Everything the solver printed on standard output.
    pub raw: String,
}

pub trait Solver {
    /// Solves the DIMACS CNF stored at `cnf_path`.
    fn solve(&self, cnf_path: &Path) -> Result<SolverRun, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub program: PathBuf,
    /// Arguments placed before the CNF path.
    pub args: Vec<String>,
    /// Wall-clock budget. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            program: PathBuf::from("./glucose"),
            args: vec!["-model".to_owned()],
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExternalSolver {
    config: SolverConfig,
}

impl ExternalSolver {
    pub fn new(config: SolverConfig) -> Self {
        ExternalSolver { config }
    }

    fn supervise(&self, child: &mut Child) -> Result<SolverRun, Error> {
        // drain stdout on a second thread so the solver never blocks on a full pipe
        let mut stdout = child.stdout.take().context(StdoutUnavailable)?;
        let (sender, output) = mpsc::channel();
        thread::spawn(move || {
            let mut raw = String::new();
            let read = stdout.read_to_string(&mut raw).map(|_| raw);
            // nobody listens anymore once the budget is exhausted
            let _ = sender.send(read);
        });

        let deadline = self.config.timeout.map(|budget| Instant::now() + budget);
        let status = match deadline {
            Some(deadline) => wait_until(child, deadline)?,
            None => Some(child.wait().context(Wait)?),
        };

        let status = match status {
            Some(status) => status,
            None => {
                warn!(
                    "SAT solver exceeded its budget of {:?}, result is unknown",
                    self.config.timeout
                );
                let raw = collect_output(&output, Some(DRAIN_GRACE))
                    .ok()
                    .flatten()
                    .unwrap_or_default();
                return Ok(SolverRun {
                    output: SolverOutput::Unknown,
                    raw,
                });
            }
        };

        // a process started by the solver may still hold the pipe after it exited
        let wait = deadline.map(|deadline| {
            deadline
                .saturating_duration_since(Instant::now())
                .max(DRAIN_GRACE)
        });
        let raw = match collect_output(&output, wait)? {
            Some(raw) => raw,
            None => {
                warn!("SAT solver output stayed open past its budget, result is unknown");
                return Ok(SolverRun {
                    output: SolverOutput::Unknown,
                    raw: String::new(),
                });
            }
        };
        check_exit_status(status)?;

        let output = parse_solver_output(raw.as_bytes())?;
        debug!("SAT solver finished with {:?}", status);

        Ok(SolverRun { output, raw })
    }
}

impl Solver for ExternalSolver {
    fn solve(&self, cnf_path: &Path) -> Result<SolverRun, Error> {
        info!(
            "Running {} {} {}",
            self.config.program.display(),
            self.config.args.join(" "),
            cnf_path.display()
        );

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(cnf_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .context(Spawn {
                program: self.config.program.clone(),
            })?;

        let run = self.supervise(&mut child);
        if run.is_err() {
            kill_quietly(&mut child);
        }
        run
    }
}

/// Waits for `child`, killing it once `deadline` has passed.
/// Returns `None` when the process was killed.
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>, Error> {
    loop {
        if let Some(status) = child.try_wait().context(Wait)? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            child.kill().context(Wait)?;
            child.wait().context(Wait)?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Takes the text read by the stdout thread. `None` when `wait` runs out first.
fn collect_output(
    output: &Receiver<std::io::Result<String>>,
    wait: Option<Duration>,
) -> Result<Option<String>, Error> {
    let read = match wait {
        Some(wait) => match output.recv_timeout(wait) {
            Ok(read) => read,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => return ReaderPanicked.fail(),
        },
        None => output.recv().map_err(|_| ReaderPanicked.build())?,
    };
    read.context(ReadOutput).map(Some)
}

fn kill_quietly(child: &mut Child) {
    if child.kill().is_ok() {
        let _ = child.wait();
    }
}

fn check_exit_status(status: ExitStatus) -> Result<(), Error> {
    match status.code() {
        // conventional SAT solver exit codes: 10 for SAT, 20 for UNSAT
        Some(0) | Some(10) | Some(20) => Ok(()),
        Some(code) => UnexpectedExit { code }.fail(),
        None => Terminated.fail(),
    }
}

fn push_model_tokens<'a>(
    model: &mut Vec<i64>,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<(), Error> {
    for token in tokens {
        let value = token
            .parse::<i64>()
            .context(MalformedModel { token })?;
        if value == 0 {
            break;
        }
        model.push(value);
    }
    Ok(())
}

/// Extracts the verdict and model from solver output.
///
/// The verdict is the first `SAT`/`SATISFIABLE`, `UNSAT`/`UNSATISFIABLE` or
/// `UNKNOWN`/`INDETERMINATE` token outside comment lines. Model literals come
/// from `v` lines, or from bare integer lines once SAT has been reported.
pub fn parse_solver_output(reader: impl BufRead) -> Result<SolverOutput, Error> {
    let mut is_sat = false;
    let mut model: Option<Vec<i64>> = None;

    for line in reader.lines() {
        let line = line.context(ReadOutput)?;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            None | Some("c") => continue,
            Some("v") => {
                push_model_tokens(model.get_or_insert_with(Vec::new), tokens)?;
                continue;
            }
            Some(first) if is_sat && first.parse::<i64>().is_ok() => {
                push_model_tokens(model.get_or_insert_with(Vec::new), line.split_whitespace())?;
                continue;
            }
            _ => (),
        }

        for token in line.split_whitespace() {
            match token {
                "UNSAT" | "UNSATISFIABLE" => return Ok(SolverOutput::Unsat),
                "UNKNOWN" | "INDETERMINATE" => return Ok(SolverOutput::Unknown),
                "SAT" | "SATISFIABLE" => is_sat = true,
                _ => (),
            }
        }
    }

    ensure!(is_sat, MissingVerdict);

    match model {
        Some(model) if !model.is_empty() => Ok(SolverOutput::Sat(model)),
        _ => MissingModel.fail(),
    }
}
