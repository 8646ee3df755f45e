use super::activity::{is_active_on, submitted_for_date, SubmittedAssignment};
use super::dates::{display_long, CalendarDay};
use super::day_status::StatusTally;
use super::domain::{Assignment, DayStatus, SubmissionStatus, WorkSubmission};
use super::resolver::resolve_effective_status;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountEntry {
    pub status: SubmissionStatus,
    pub status_label: &'static str,
    pub count: usize,
}

/// One staff member's dashboard numbers for a single day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOverview {
    pub date: NaiveDate,
    pub display_date: String,
    pub active_assignments: usize,
    pub submitted_assignments: usize,
    pub awaiting_submission: usize,
    pub status_counts: Vec<StatusCountEntry>,
    pub day_status: DayStatus,
    pub day_status_label: &'static str,
    pub total_hours: f64,
    pub verified_hours: f64,
}

impl DailyOverview {
    /// Summarizes `day` from the assignments and the submissions resolved for it.
    ///
    /// Submissions count toward the day whether or not their responsibility is still
    /// active; only the awaiting-submission figure is restricted to active work.
    pub fn build(
        assignments: &[Assignment],
        all_submissions: Option<&[WorkSubmission]>,
        day: NaiveDate,
    ) -> Self {
        let active_assignments = assignments
            .iter()
            .filter(|assignment| is_active_on(assignment.responsibility.as_ref(), day))
            .count();

        let submitted = submitted_for_date(assignments, day, all_submissions);
        let awaiting_submission = awaiting_count(assignments, &submitted, day);

        let tally = StatusTally::from_statuses(
            submitted
                .iter()
                .map(|entry| resolve_effective_status(entry.submission)),
        );

        let total_hours: f64 = submitted.iter().map(|entry| entry.submission.hours()).sum();
        let verified_hours: f64 = submitted
            .iter()
            .filter(|entry| {
                resolve_effective_status(entry.submission) == SubmissionStatus::Verified
            })
            .map(|entry| entry.submission.hours())
            .sum();

        let status_counts = SubmissionStatus::ordered()
            .into_iter()
            .map(|status| StatusCountEntry {
                status,
                status_label: status.label(),
                count: match status {
                    SubmissionStatus::Pending => tally.pending,
                    SubmissionStatus::Submitted => tally.submitted,
                    SubmissionStatus::Verified => tally.verified,
                    SubmissionStatus::Rejected => tally.rejected,
                },
            })
            .collect();

        let day_status = tally.day_status();

        Self {
            date: day,
            display_date: display_long(day),
            active_assignments,
            submitted_assignments: submitted.len(),
            awaiting_submission,
            status_counts,
            day_status,
            day_status_label: day_status.label(),
            total_hours,
            verified_hours,
        }
    }

    pub fn count_for(&self, status: SubmissionStatus) -> usize {
        self.status_counts
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }
}

fn awaiting_count(
    assignments: &[Assignment],
    submitted: &[SubmittedAssignment<'_>],
    day: NaiveDate,
) -> usize {
    assignments
        .iter()
        .filter(|assignment| is_active_on(assignment.responsibility.as_ref(), day))
        .filter(|assignment| {
            !submitted
                .iter()
                .any(|entry| std::ptr::eq(entry.assignment, *assignment))
        })
        .count()
}

/// Submissions a manager still has to verify or reject, oldest work day first.
///
/// Records without a readable work day sort last; ties keep id order.
pub fn verification_queue<'a, I>(submissions: I) -> Vec<&'a WorkSubmission>
where
    I: IntoIterator<Item = &'a WorkSubmission>,
{
    let mut queue: Vec<&WorkSubmission> = submissions
        .into_iter()
        .filter(|submission| {
            matches!(
                resolve_effective_status(submission),
                SubmissionStatus::Submitted | SubmissionStatus::Pending
            )
        })
        .collect();

    queue.sort_by(|a, b| match (a.work_day(), b.work_day()) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| by_id(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_id(a, b),
    });
    queue
}

fn by_id(a: &WorkSubmission, b: &WorkSubmission) -> Ordering {
    match (a.id.numeric(), b.id.numeric()) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        _ => a.id.as_str().cmp(b.id.as_str()),
    }
}

/// Convenience for callers holding an unparsed target date.
pub fn overview_for<D: CalendarDay>(
    assignments: &[Assignment],
    all_submissions: Option<&[WorkSubmission]>,
    target: D,
) -> Option<DailyOverview> {
    target
        .calendar_day()
        .map(|day| DailyOverview::build(assignments, all_submissions, day))
}
