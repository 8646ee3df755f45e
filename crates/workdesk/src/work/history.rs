//! Day-grouped, paginated submission history.

use super::dates::{display_long, CalendarDate};
use super::day_status::day_status;
use super::domain::{DayStatus, RecordId, SubmissionStatus, WorkSubmission};
use super::resolver::resolve_effective_status;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// All submissions recorded for one calendar day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
    pub date: NaiveDate,
    pub display_date: String,
    pub total_hours: f64,
    pub verified_hours: f64,
    pub status: DayStatus,
    pub status_label: &'static str,
    pub submissions: Vec<WorkSubmission>,
}

impl DayGroup {
    fn build(date: NaiveDate, mut submissions: Vec<WorkSubmission>) -> Self {
        submissions.sort_by(|a, b| compare_ids(&a.id, &b.id));

        let total_hours: f64 = submissions.iter().map(WorkSubmission::hours).sum();
        let verified_hours: f64 = submissions
            .iter()
            .filter(|submission| resolve_effective_status(submission) == SubmissionStatus::Verified)
            .map(WorkSubmission::hours)
            .sum();
        let status = day_status(&submissions);

        Self {
            date,
            display_date: display_long(date),
            total_hours,
            verified_hours,
            status,
            status_label: status.label(),
            submissions,
        }
    }
}

/// Groups submissions by work day, most recent day first.
///
/// Records whose work day is missing or unparseable are left out.
pub fn group_by_day<'a, I>(submissions: I) -> Vec<DayGroup>
where
    I: IntoIterator<Item = &'a WorkSubmission>,
{
    let mut by_day: BTreeMap<NaiveDate, Vec<WorkSubmission>> = BTreeMap::new();
    let mut skipped = 0usize;

    for submission in submissions {
        match submission.work_day() {
            Some(day) => by_day.entry(day).or_default().push(submission.clone()),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "submissions without a readable work day left out of history");
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, submissions)| DayGroup::build(date, submissions))
        .collect()
}

fn compare_ids(a: &RecordId, b: &RecordId) -> Ordering {
    match (a.numeric(), b.numeric()) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.as_str().cmp(b.as_str()),
    }
}

/// 1-indexed page selection. Both values are clamped to at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(crate::config::HistoryConfig::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slices out items `[(page - 1) * size, page * size)`; pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(request.page_size());
    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.page_size())
        .collect();

    Page {
        items,
        page: request.page(),
        page_size: request.page_size(),
        total_items,
        total_pages,
    }
}

/// Filter and page state for a history view.
///
/// Changing any filter puts the view back on page 1; only [`HistoryQuery::set_page`]
/// moves between pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    status: Option<SubmissionStatus>,
    page: PageRequest,
}

impl HistoryQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            from: None,
            to: None,
            status: None,
            page: PageRequest::first(page_size),
        }
    }

    pub fn set_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.from = from;
        self.to = to;
        self.reset_page();
    }

    pub fn set_day(&mut self, day: NaiveDate) {
        self.set_range(Some(day), Some(day));
    }

    pub fn set_status(&mut self, status: Option<SubmissionStatus>) {
        self.status = status;
        self.reset_page();
    }

    pub fn clear_filters(&mut self) {
        self.from = None;
        self.to = None;
        self.status = None;
        self.reset_page();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = PageRequest::new(page, self.page.page_size());
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    fn reset_page(&mut self) {
        self.page = PageRequest::first(self.page.page_size());
    }

    fn admits(&self, submission: &WorkSubmission) -> bool {
        let Some(day) = submission.work_day() else {
            return false;
        };
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }
        self.status
            .map_or(true, |status| resolve_effective_status(submission) == status)
    }

    /// Filters, groups and pages `submissions`.
    pub fn run<'a, I>(&self, submissions: I) -> Page<DayGroup>
    where
        I: IntoIterator<Item = &'a WorkSubmission>,
    {
        let groups = group_by_day(
            submissions
                .into_iter()
                .filter(|submission| self.admits(submission)),
        );
        paginate(groups, self.page)
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self::new(crate::config::HistoryConfig::DEFAULT_PAGE_SIZE)
    }
}

/// Hides rejected records that were superseded by a resubmission.
///
/// Within each (assignment, work day) pair a `Rejected` record is dropped when another
/// record for the same pair was submitted after it: a later `submittedAt`, or the same
/// or unknown time and a later position in `submissions`. Other records are kept, in
/// input order. Records without a readable work day are kept untouched.
pub fn collapse_resubmissions<'a, I>(submissions: I) -> Vec<&'a WorkSubmission>
where
    I: IntoIterator<Item = &'a WorkSubmission>,
{
    let submissions: Vec<&WorkSubmission> = submissions.into_iter().collect();

    let superseded: Vec<bool> = submissions
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            resolve_effective_status(candidate) == SubmissionStatus::Rejected
                && candidate.work_day().is_some()
                && submissions.iter().enumerate().any(|(other_index, other)| {
                    other_index != index
                        && other.work_day() == candidate.work_day()
                        && other.assignment_id.matches(&candidate.assignment_id)
                        && submitted_after((other_index, *other), (index, *candidate))
                })
        })
        .collect();

    submissions
        .into_iter()
        .zip(superseded)
        .filter_map(|(submission, dropped)| (!dropped).then_some(submission))
        .collect()
}

fn submitted_after(
    (other_index, other): (usize, &WorkSubmission),
    (index, candidate): (usize, &WorkSubmission),
) -> bool {
    let other_at = other.submitted_at.as_ref().and_then(CalendarDate::instant);
    let candidate_at = candidate.submitted_at.as_ref().and_then(CalendarDate::instant);
    match (other_at, candidate_at) {
        (Some(left), Some(right)) if left != right => left > right,
        _ => other_index > index,
    }
}
