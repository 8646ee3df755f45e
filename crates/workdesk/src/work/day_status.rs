use super::domain::{DayStatus, SubmissionStatus, WorkSubmission};
use super::resolver::resolve_effective_status;

/// Collapses one day's submissions into a single [`DayStatus`].
///
/// Rules apply in order and the first match wins:
/// 1. no submissions: `NotSubmitted`
/// 2. only `Verified`: `Verified`
/// 3. only `Rejected`: `Rejected`
/// 4. some `Verified` or `Submitted` alongside some `Rejected`: `Partial`
/// 5. any `Submitted`, `Verified` or `Pending`: `Submitted`
/// 6. otherwise `NotSubmitted`
///
/// Rules 2 and 3 need a uniform day, so a single `Pending` record next to verified
/// ones lands in rule 5.
pub fn day_status<'a, I>(submissions: I) -> DayStatus
where
    I: IntoIterator<Item = &'a WorkSubmission>,
{
    let tally = StatusTally::from_statuses(submissions.into_iter().map(resolve_effective_status));
    tally.day_status()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatusTally {
    pub(crate) pending: usize,
    pub(crate) submitted: usize,
    pub(crate) verified: usize,
    pub(crate) rejected: usize,
}

impl StatusTally {
    pub(crate) fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = SubmissionStatus>,
    {
        let mut tally = Self::default();
        for status in statuses {
            tally.record(status);
        }
        tally
    }

    pub(crate) fn record(&mut self, status: SubmissionStatus) {
        match status {
            SubmissionStatus::Pending => self.pending += 1,
            SubmissionStatus::Submitted => self.submitted += 1,
            SubmissionStatus::Verified => self.verified += 1,
            SubmissionStatus::Rejected => self.rejected += 1,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.pending + self.submitted + self.verified + self.rejected
    }

    pub(crate) fn day_status(&self) -> DayStatus {
        let has_pending = self.pending > 0;
        let has_submitted = self.submitted > 0;
        let has_verified = self.verified > 0;
        let has_rejected = self.rejected > 0;

        if self.total() == 0 {
            return DayStatus::NotSubmitted;
        }
        if has_verified && !has_submitted && !has_rejected && !has_pending {
            return DayStatus::Verified;
        }
        if has_rejected && !has_verified && !has_submitted && !has_pending {
            return DayStatus::Rejected;
        }
        if (has_verified || has_submitted) && has_rejected {
            return DayStatus::Partial;
        }
        if has_submitted || has_verified || has_pending {
            return DayStatus::Submitted;
        }
        DayStatus::NotSubmitted
    }
}
