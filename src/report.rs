/*!
Prints a snafu error together with its chain of causes when returned from `main`.
*/

use std::error::Error as StdError;

pub struct Report(Box<dyn StdError>);

impl Report {
    /// The error and all of its sources, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(Some(self.0.as_ref()), |&e| e.source())
    }
}

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chain = self.chain();
        if let Some(top) = chain.next() {
            writeln!(f, "{}", top)?;
        }

        let mut causes = chain.enumerate().peekable();
        if causes.peek().is_some() {
            writeln!(f, "\nCaused by:")?;
            for (i, e) in causes {
                writeln!(f, "  {}: {}", i, e)?;
            }
        }

        Ok(())
    }
}

impl<E: Into<Box<dyn StdError>>> From<E> for Report {
    fn from(e: E) -> Self {
        Report(e.into())
    }
}
