//! Import counters and row error collection.

/// What happened to a row that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
    /// The email already exists and updates were not requested.
    Existing,
}

/// Result of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Row errors in file order, each prefixed with `L<line>: `.
    pub errors: Vec<String>,
}

impl ImportSummary {
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Existing => self.skipped += 1,
        }
    }

    /// Count a skipped row and keep its error message.
    pub fn reject(&mut self, line: usize, message: impl AsRef<str>) {
        self.skipped += 1;
        self.errors.push(format!("L{line}: {}", message.as_ref()));
    }

    /// Rows that made it to the store.
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.skipped
    }

    /// The first `limit` errors; the rest are not reported.
    pub fn surfaced_errors(&self, limit: usize) -> &[String] {
        &self.errors[..self.errors.len().min(limit)]
    }

    pub fn message(&self) -> String {
        format!(
            "Importación: {} creados, {} actualizados, {} omitidos.",
            self.created, self.updated, self.skipped
        )
    }

    /// Summary line followed by the first `limit` errors, one per line.
    /// Errors past the limit are left out without a trailer.
    pub fn report(&self, limit: usize) -> String {
        let mut report = self.message();
        for error in self.surfaced_errors(limit) {
            report.push_str("\n  ");
            report.push_str(error);
        }
        report
    }
}
