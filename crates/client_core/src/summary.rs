use std::fmt;

use shared::domain::{EmailResult, EmailStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailSummary {
    pub sent: usize,
    pub failed: usize,
    pub no_email: usize,
    /// Results whose status tag was none of the known ones.
    pub unrecognized: usize,
}

impl EmailSummary {
    pub fn from_results(results: &[EmailResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                match result.status {
                    EmailStatus::Sent => summary.sent += 1,
                    EmailStatus::Failed => summary.failed += 1,
                    EmailStatus::NoEmail => summary.no_email += 1,
                    EmailStatus::Unrecognized => summary.unrecognized += 1,
                }
                summary
            })
    }
}

impl fmt::Display for EmailSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email Results:\n✓ Sent: {}", self.sent)?;
        if self.failed > 0 {
            write!(f, "\n✗ Failed: {}", self.failed)?;
        }
        if self.no_email > 0 {
            write!(f, "\n⚠ No email: {}", self.no_email)?;
        }
        if self.unrecognized > 0 {
            write!(f, "\n? Unrecognized status: {}", self.unrecognized)?;
        }
        Ok(())
    }
}
