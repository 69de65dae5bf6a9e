/*!
A module to represent conjunctive normal form formula and its DIMACS text form.
*/

use std::{
    convert::TryInto,
    fmt::Display,
    io::{self, Write},
    num::NonZeroU32,
    str::FromStr,
};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Failed to parse Variable ID"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display(
        "Variable ID {} is out of range (must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: usize },
}

#[derive(Debug, Snafu)]
pub enum DimacsError {
    #[snafu(display("Failed to parse line '{}' as clause", clause))]
    MalformedClause { clause: String },
    #[snafu(display("Invalid variable found in clause '{}'", clause))]
    MalformedVariable {
        clause: String,
        source: VariableParseError,
    },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MalformedProblemDefinition,
    #[snafu(display(
        "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
        found,
        expected,
    ))]
    ClauseCountMismatch { expected: usize, found: usize },
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    pub const MAX_VARIABLE_ID: usize = std::u32::MAX as usize;
}

impl Variable {
    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// The 1-based DIMACS identifier.
    pub fn id(&self) -> usize {
        self.0.get() as usize
    }

    /// Creates a variable from its 1-based DIMACS identifier.
    pub fn from_id(id: usize) -> Option<Self> {
        if id > Variable::MAX_VARIABLE_ID {
            return None;
        }
        Some(Variable(NonZeroU32::new(id.try_into().ok()?)?))
    }
}

impl FromStr for Variable {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<usize>().context(ParseIntError)?;
        Variable::from_id(num).context(RangeError { num })
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    id: Variable,
    positive: bool,
}

impl Literal {
    pub fn new(id: Variable, positive: bool) -> Self {
        Literal { id, positive }
    }

    pub fn positive_of(id: Variable) -> Self {
        Literal::new(id, true)
    }

    pub fn negative_of(id: Variable) -> Self {
        Literal::new(id, false)
    }

    pub fn variable(&self) -> Variable {
        self.id
    }

    pub fn positive(&self) -> bool {
        self.positive
    }

    /// Signed integer form, e.g. `-3` for the negation of variable 3.
    pub fn to_dimacs(&self) -> i64 {
        let id = self.id.id() as i64;
        if self.positive {
            id
        } else {
            -id
        }
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (positive, id) = if let Some(rest) = s.strip_prefix('-') {
            (false, rest.parse()?)
        } else {
            (true, s.parse()?)
        };

        Ok(Literal { id, positive })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.positive { "" } else { "-" }, self.id)
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            id: self.id,
            positive: !self.positive,
        }
    }
}

/// Disjunction of literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    /// Satisfied when at least one literal agrees with `assignment`,
    /// indexed by `Variable::as_index`. Unassigned variables count as false.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.iter().any(|literal| {
            let value = assignment
                .get(literal.variable().as_index())
                .copied()
                .unwrap_or(false);
            value == literal.positive()
        })
    }
}

/// DIMACS clause line: space separated literals terminated by `0`.
impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for literal in self.literals.iter() {
            write!(f, "{} ", literal)?;
        }
        write!(f, "0")
    }
}

/// Formula representation in Conjunctive Normal Form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Cnf {
            num_variables,
            clauses: Vec::new(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &Vec<Clause> {
        &self.clauses
    }

    pub fn add_clause(&mut self, clause: Clause) {
        debug_assert!(clause.iter().all(|l| l.variable().id() <= self.num_variables));
        self.clauses.push(clause);
    }

    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.is_satisfied_by(assignment))
    }

    /// Writes the DIMACS text of this formula.
    pub fn write_dimacs<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{}", self)?;
        writer.flush()
    }
}

/// DIMACS CNF: the `p cnf` header followed by one clause per line.
/// Lines are joined by `\n` with no trailing newline.
impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_variables, self.clauses.len())?;

        let mut iter = self.clauses.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for clause in iter {
            write!(f, "\n{}", clause)?;
        }

        Ok(())
    }
}

/// Parse a line to a clause
fn parse_line(line: &str) -> Result<Clause, DimacsError> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    ensure!(
        !splitted.is_empty() && splitted[splitted.len() - 1] == "0",
        MalformedClause {
            clause: line.to_owned(),
        }
    );

    let mut literals = Vec::with_capacity(splitted.len() - 1);
    for s in &splitted[..splitted.len() - 1] {
        literals.push(s.parse::<Literal>().with_context(|| MalformedVariable {
            clause: line.to_owned(),
        })?);
    }

    Ok(Clause::new(literals))
}

/// Reads DIMACS text back, checking the header against the clause lines.
impl FromStr for Cnf {
    type Err = DimacsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // skip until we find the problem definition
        let mut lines = s.lines().skip_while(|line| !line.starts_with('p'));

        let prob_line = lines
            .next()
            .ok_or_else(|| MalformedProblemDefinition.build())?;

        let splitted = prob_line.split_whitespace().collect::<Vec<_>>();

        // We only support CNF DIMACS format
        ensure!(
            splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
            MalformedProblemDefinition
        );

        let (num_variables, num_clauses) =
            match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
                (Ok(num_variables), Ok(num_clauses))
                    if num_variables <= Variable::MAX_VARIABLE_ID =>
                {
                    (num_variables, num_clauses)
                }
                _ => return MalformedProblemDefinition.fail(),
            };

        let mut cnf = Cnf::new(num_variables);

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('c') {
                // empty line, comment
                continue;
            }
            cnf.clauses.push(parse_line(trimmed)?);
        }

        ensure!(
            cnf.clauses.len() == num_clauses,
            ClauseCountMismatch {
                found: cnf.clauses.len(),
                expected: num_clauses,
            }
        );

        Ok(cnf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: i64) -> Literal {
        let variable = Variable::from_id(n.unsigned_abs() as usize).unwrap();
        Literal::new(variable, n > 0)
    }

    #[test]
    fn literal_text_is_signed_integer() {
        assert_eq!(lit(3).to_string(), "3");
        assert_eq!(lit(-12).to_string(), "-12");
        assert_eq!((!lit(5)).to_dimacs(), -5);
        assert_eq!("-7".parse::<Literal>().unwrap(), lit(-7));
    }

    #[test]
    fn zero_is_not_a_variable() {
        assert!(Variable::from_id(0).is_none());
        assert!("0".parse::<Variable>().is_err());
        assert!("-0".parse::<Literal>().is_err());
    }

    #[test]
    fn renders_dimacs_without_trailing_newline() {
        let mut cnf = Cnf::new(3);
        cnf.add_clause(Clause::new(vec![lit(1), lit(2)]));
        cnf.add_clause(Clause::new(vec![lit(-1), lit(-3)]));

        assert_eq!(cnf.to_string(), "p cnf 3 2\n1 2 0\n-1 -3 0");

        let mut buffer = Vec::new();
        cnf.write_dimacs(&mut buffer).unwrap();
        assert_eq!(buffer, cnf.to_string().into_bytes());
    }

    #[test]
    fn reads_back_what_it_writes() {
        let mut cnf = Cnf::new(4);
        cnf.add_clause(Clause::new(vec![lit(1), lit(-4)]));
        cnf.add_clause(Clause::new(vec![lit(2)]));

        let parsed: Cnf = cnf.to_string().parse().unwrap();
        assert_eq!(parsed, cnf);
    }

    #[test]
    fn detects_header_mismatch() {
        let result = "p cnf 2 3\n1 2 0\n-1 0".parse::<Cnf>();
        match result {
            Err(DimacsError::ClauseCountMismatch { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_unterminated_clause() {
        assert!(matches!(
            "p cnf 2 1\n1 2".parse::<Cnf>(),
            Err(DimacsError::MalformedClause { .. })
        ));
        assert!(matches!(
            "1 2 0".parse::<Cnf>(),
            Err(DimacsError::MalformedProblemDefinition)
        ));
    }

    #[test]
    fn evaluates_assignment() {
        let mut cnf = Cnf::new(2);
        cnf.add_clause(Clause::new(vec![lit(1), lit(2)]));
        cnf.add_clause(Clause::new(vec![lit(-1), lit(-2)]));

        assert!(cnf.is_satisfied_by(&[true, false]));
        assert!(!cnf.is_satisfied_by(&[true, true]));
        assert!(!cnf.is_satisfied_by(&[false, false]));
    }
}
