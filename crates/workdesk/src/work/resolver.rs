//! Date-scoped resolution of an assignment's submission and status.
//!
//! A submission's status only ever speaks for its own work day; nothing here lets a
//! verified or rejected record leak into another day.

use super::dates::CalendarDay;
use super::domain::{Assignment, SubmissionStatus, WorkSubmission};
use chrono::NaiveDate;
use tracing::debug;

/// Finds the submission recorded against `assignment` for `target`.
///
/// The assignment's own `workSubmissions` are searched first. Only when none of those
/// match is `all_submissions` consulted, filtered by day and by assignment id. When
/// several records share the day, the first one wins.
pub fn resolve_submission_for_date<'a, D>(
    assignment: &'a Assignment,
    target: D,
    all_submissions: Option<&'a [WorkSubmission]>,
) -> Option<&'a WorkSubmission>
where
    D: CalendarDay,
{
    let day = target.calendar_day()?;

    if let Some(found) = first_for_day(assignment.work_submissions.iter(), day) {
        return Some(found);
    }

    let fallback = all_submissions?
        .iter()
        .filter(|submission| submission.assignment_id.matches(&assignment.id));
    first_for_day(fallback, day)
}

fn first_for_day<'a, I>(mut submissions: I, day: NaiveDate) -> Option<&'a WorkSubmission>
where
    I: Iterator<Item = &'a WorkSubmission>,
{
    let found = submissions.find(|submission| submission.work_day() == Some(day))?;

    let duplicates = submissions
        .filter(|submission| submission.work_day() == Some(day))
        .count();
    if duplicates > 0 {
        debug!(
            submission_id = %found.id,
            assignment_id = %found.assignment_id,
            %day,
            duplicates,
            "multiple submissions share a work day; keeping the first"
        );
    }

    Some(found)
}

/// Effective status of a submission: its own status, then the embedded assignment's
/// legacy status, then `Submitted`.
pub fn resolve_effective_status(submission: &WorkSubmission) -> SubmissionStatus {
    submission
        .status
        .or_else(|| {
            submission
                .assignment
                .as_ref()
                .and_then(|assignment| assignment.status)
        })
        .unwrap_or(SubmissionStatus::Submitted)
}

/// Status of `assignment` for `target`; `Pending` when nothing was submitted that day.
pub fn status_for_date<D>(
    assignment: &Assignment,
    target: D,
    all_submissions: Option<&[WorkSubmission]>,
) -> SubmissionStatus
where
    D: CalendarDay,
{
    resolve_submission_for_date(assignment, target, all_submissions)
        .map(resolve_effective_status)
        .unwrap_or(SubmissionStatus::Pending)
}
