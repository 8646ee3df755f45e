use super::dates::CalendarDay;
use super::domain::{Assignment, Responsibility, WorkSubmission};
use super::resolver::resolve_submission_for_date;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Whether `responsibility` recurs on `day`.
///
/// Both bounds are inclusive at day granularity. A missing bound leaves that side open,
/// and so does a bound that cannot be read as a date.
pub fn is_active_on(responsibility: Option<&Responsibility>, day: NaiveDate) -> bool {
    let Some(responsibility) = responsibility else {
        return true;
    };

    let start = responsibility.start_date.calendar_day();
    let end = responsibility.end_date.calendar_day();

    start.map_or(true, |start| day >= start) && end.map_or(true, |end| day <= end)
}

/// Assignments that are active on `target` and have nothing submitted for it yet.
pub fn active_unsubmitted<'a, D>(
    assignments: &'a [Assignment],
    target: D,
    all_submissions: Option<&'a [WorkSubmission]>,
) -> Vec<&'a Assignment>
where
    D: CalendarDay,
{
    let Some(day) = target.calendar_day() else {
        return Vec::new();
    };

    assignments
        .iter()
        .filter(|assignment| is_active_on(assignment.responsibility.as_ref(), day))
        .filter(|assignment| {
            resolve_submission_for_date(assignment, day, all_submissions).is_none()
        })
        .collect()
}

/// An assignment together with the submission it received for a given day.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAssignment<'a> {
    pub assignment: &'a Assignment,
    pub submission: &'a WorkSubmission,
}

/// Every assignment that has a submission for `target`, paired with that submission.
pub fn submitted_for_date<'a, D>(
    assignments: &'a [Assignment],
    target: D,
    all_submissions: Option<&'a [WorkSubmission]>,
) -> Vec<SubmittedAssignment<'a>>
where
    D: CalendarDay,
{
    let Some(day) = target.calendar_day() else {
        return Vec::new();
    };

    assignments
        .iter()
        .filter_map(|assignment| {
            resolve_submission_for_date(assignment, day, all_submissions).map(|submission| {
                SubmittedAssignment {
                    assignment,
                    submission,
                }
            })
        })
        .collect()
}

/// Which days a staff member may still submit work for, relative to an explicit `now`.
///
/// Today is always open; `lookback_days` opens that many earlier days as well. Future
/// days are never open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionWindow {
    today: NaiveDate,
    lookback_days: u32,
}

impl SubmissionWindow {
    pub fn new(now: impl CalendarDay, lookback_days: u32) -> Option<Self> {
        now.calendar_day().map(|today| Self {
            today,
            lookback_days,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn earliest_open_day(&self) -> NaiveDate {
        self.today
            .checked_sub_signed(Duration::days(i64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn is_open(&self, day: impl CalendarDay) -> bool {
        day.calendar_day()
            .is_some_and(|day| day <= self.today && day >= self.earliest_open_day())
    }

    pub fn is_locked(&self, day: impl CalendarDay) -> bool {
        !self.is_open(day)
    }
}
