//! Daily work-submission status engine.
//!
//! Everything here is a pure computation over already-fetched assignments and
//! submissions. Dates are compared at calendar-day granularity.

pub mod activity;
pub mod dates;
pub mod day_status;
pub mod domain;
pub mod history;
pub mod overview;
pub mod resolver;
pub mod router;
pub mod snapshot;

pub use activity::{
    active_unsubmitted, is_active_on, submitted_for_date, SubmissionWindow, SubmittedAssignment,
};
pub use dates::{display_long, normalize_day, normalize_moment, CalendarDate, CalendarDay};
pub use day_status::day_status;
pub use domain::{
    Assignment, AssignmentStatusRef, DayStatus, RecordId, Responsibility, SubmissionStatus,
    WorkSubmission,
};
pub use history::{
    collapse_resubmissions, group_by_day, paginate, DayGroup, HistoryQuery, Page, PageRequest,
};
pub use overview::{overview_for, verification_queue, DailyOverview, StatusCountEntry};
pub use resolver::{resolve_effective_status, resolve_submission_for_date, status_for_date};
pub use router::work_router;
pub use snapshot::{SnapshotError, WorkSnapshot};
