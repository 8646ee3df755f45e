use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use workdesk::config::{AppConfig, HistoryConfig};
use workdesk::error::AppError;
use workdesk::telemetry;
use workdesk::work::{
    active_unsubmitted, resolve_effective_status, submitted_for_date, verification_queue,
    DailyOverview, DayGroup, HistoryQuery, Page, SubmissionStatus, SubmissionWindow,
    WorkSnapshot,
};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON file holding `assignments` and `submissions` as returned by the API
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Day to report on (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Override the current day used for the submission window
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// History page to print
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// History page size (defaults to APP_HISTORY_PAGE_SIZE)
    #[arg(long)]
    pub(crate) page_size: Option<usize>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let snapshot = WorkSnapshot::from_path(&args.snapshot)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let date = args.date.unwrap_or(today);
    info!(snapshot = %args.snapshot.display(), %date, %today, "building daily report");

    let report = DailyReport::build(
        &snapshot,
        date,
        today,
        config.history,
        args.page,
        args.page_size,
    );
    render_report(&report);
    Ok(())
}

pub(crate) struct PendingLine {
    pub(crate) title: String,
}

pub(crate) struct SubmittedLine {
    pub(crate) title: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) hours: f64,
    pub(crate) summary: Option<String>,
    pub(crate) rejection_reason: Option<String>,
}

pub(crate) struct DailyReport {
    pub(crate) overview: DailyOverview,
    pub(crate) window_open: bool,
    pub(crate) earliest_open_day: NaiveDate,
    pub(crate) pending: Vec<PendingLine>,
    pub(crate) submitted: Vec<SubmittedLine>,
    pub(crate) awaiting_review: usize,
    pub(crate) history: Page<DayGroup>,
}

impl DailyReport {
    pub(crate) fn build(
        snapshot: &WorkSnapshot,
        date: NaiveDate,
        today: NaiveDate,
        settings: HistoryConfig,
        page: usize,
        page_size: Option<usize>,
    ) -> Self {
        let fallback = snapshot.fallback_submissions();
        let overview = DailyOverview::build(&snapshot.assignments, fallback, date);

        let (window_open, earliest_open_day) =
            match SubmissionWindow::new(today, settings.lookback_days) {
                Some(window) => (window.is_open(date), window.earliest_open_day()),
                None => (false, today),
            };

        let pending = active_unsubmitted(&snapshot.assignments, date, fallback)
            .into_iter()
            .map(|assignment| PendingLine {
                title: title_of(assignment.responsibility.as_ref().map(|r| r.title.as_str())),
            })
            .collect();

        let submitted = submitted_for_date(&snapshot.assignments, date, fallback)
            .into_iter()
            .map(|entry| SubmittedLine {
                title: title_of(
                    entry
                        .assignment
                        .responsibility
                        .as_ref()
                        .map(|r| r.title.as_str()),
                ),
                status: resolve_effective_status(entry.submission),
                hours: entry.submission.hours(),
                summary: entry.submission.summary().map(str::to_string),
                rejection_reason: entry.submission.rejection_reason.clone(),
            })
            .collect();

        let all_submissions = snapshot.all_submissions();
        let awaiting_review = verification_queue(all_submissions.iter().copied()).len();

        let mut query = HistoryQuery::new(page_size.unwrap_or(settings.page_size));
        query.set_page(page);
        let history = query.run(all_submissions);

        Self {
            overview,
            window_open,
            earliest_open_day,
            pending,
            submitted,
            awaiting_review,
            history,
        }
    }
}

fn title_of(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => "Untitled responsibility".to_string(),
    }
}

pub(crate) fn render_report(report: &DailyReport) {
    let overview = &report.overview;
    println!("Daily work report");
    println!("Date: {}", overview.display_date);
    println!(
        "Day status: {} ({} submitted of {} active, {} awaiting submission)",
        overview.day_status_label,
        overview.submitted_assignments,
        overview.active_assignments,
        overview.awaiting_submission
    );
    println!(
        "Hours: {:.2} logged, {:.2} verified",
        overview.total_hours, overview.verified_hours
    );
    if report.window_open {
        println!("Submission window: open");
    } else {
        println!(
            "Submission window: locked (earliest open day {})",
            report.earliest_open_day
        );
    }

    println!("\nStatus counts");
    for entry in &overview.status_counts {
        println!("  - {}: {}", entry.status_label, entry.count);
    }

    if report.pending.is_empty() {
        println!("\nAwaiting submission: none");
    } else {
        println!("\nAwaiting submission");
        for line in &report.pending {
            println!("  - {}", line.title);
        }
    }

    if report.submitted.is_empty() {
        println!("\nSubmitted: none");
    } else {
        println!("\nSubmitted");
        for line in &report.submitted {
            println!(
                "  - {} | {} | {:.2}h",
                line.title,
                line.status.label(),
                line.hours
            );
            if let Some(summary) = &line.summary {
                println!("      {}", summary);
            }
            if let Some(reason) = &line.rejection_reason {
                println!("      Rejected: {}", reason);
            }
        }
    }

    println!("\nAwaiting verification: {}", report.awaiting_review);

    let history = &report.history;
    println!(
        "\nHistory (page {} of {}, {} days)",
        history.page, history.total_pages, history.total_items
    );
    for group in &history.items {
        println!(
            "  - {} | {} | {} submission(s) | {:.2}h ({:.2}h verified)",
            group.display_date,
            group.status_label,
            group.submissions.len(),
            group.total_hours,
            group.verified_hours
        );
    }
}
