use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::activity::{
    active_unsubmitted, submitted_for_date, SubmissionWindow, SubmittedAssignment,
};
use super::dates::CalendarDate;
use super::day_status::day_status;
use super::domain::{Assignment, DayStatus, SubmissionStatus, WorkSubmission};
use super::history::{collapse_resubmissions, HistoryQuery};
use super::overview::{verification_queue, DailyOverview};
use super::resolver::{resolve_effective_status, resolve_submission_for_date};
use crate::config::HistoryConfig;

/// Router exposing the status engine over JSON. Every route is a pure computation over
/// the already-fetched data in the request body.
pub fn work_router(settings: HistoryConfig) -> Router {
    Router::new()
        .route("/api/v1/work/status", post(status_handler))
        .route("/api/v1/work/day-status", post(day_status_handler))
        .route("/api/v1/work/history", post(history_handler))
        .route("/api/v1/work/pending", post(pending_handler))
        .route("/api/v1/work/overview", post(overview_handler))
        .route(
            "/api/v1/work/verification-queue",
            post(verification_queue_handler),
        )
        .route(
            "/api/v1/work/submission-window",
            post(submission_window_handler),
        )
        .with_state(Arc::new(settings))
}

type Settings = State<Arc<HistoryConfig>>;

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn required_day(field: &str, value: &CalendarDate) -> Result<NaiveDate, Response> {
    value.day().ok_or_else(|| {
        bad_request(format!(
            "{field} '{}' is not an ISO-8601 date or date-time",
            value.raw()
        ))
    })
}

fn optional_day(field: &str, value: Option<&CalendarDate>) -> Result<Option<NaiveDate>, Response> {
    value.map(|value| required_day(field, value)).transpose()
}

fn non_empty(submissions: &[WorkSubmission]) -> Option<&[WorkSubmission]> {
    (!submissions.is_empty()).then_some(submissions)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusRequest {
    pub(crate) assignment: Assignment,
    pub(crate) date: CalendarDate,
    #[serde(default)]
    pub(crate) submissions: Vec<WorkSubmission>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusResponse {
    pub(crate) date: NaiveDate,
    pub(crate) status: SubmissionStatus,
    pub(crate) status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submission: Option<WorkSubmission>,
}

pub(crate) async fn status_handler(Json(request): Json<StatusRequest>) -> Response {
    let date = match required_day("date", &request.date) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let submission =
        resolve_submission_for_date(&request.assignment, date, non_empty(&request.submissions));
    let status = submission
        .map(resolve_effective_status)
        .unwrap_or(SubmissionStatus::Pending);

    let body = StatusResponse {
        date,
        status,
        status_label: status.label(),
        submission: submission.cloned(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DayStatusRequest {
    #[serde(default)]
    pub(crate) date: Option<CalendarDate>,
    #[serde(default)]
    pub(crate) submissions: Vec<WorkSubmission>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DayStatusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<NaiveDate>,
    pub(crate) status: DayStatus,
    pub(crate) status_label: &'static str,
    pub(crate) submission_count: usize,
}

pub(crate) async fn day_status_handler(Json(request): Json<DayStatusRequest>) -> Response {
    let date = match optional_day("date", request.date.as_ref()) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let same_day: Vec<&WorkSubmission> = request
        .submissions
        .iter()
        .filter(|submission| date.map_or(true, |date| submission.work_day() == Some(date)))
        .collect();
    let status = day_status(same_day.iter().copied());

    let body = DayStatusResponse {
        date,
        status,
        status_label: status.label(),
        submission_count: same_day.len(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryRequest {
    #[serde(default)]
    pub(crate) submissions: Vec<WorkSubmission>,
    #[serde(default)]
    pub(crate) from: Option<CalendarDate>,
    #[serde(default)]
    pub(crate) to: Option<CalendarDate>,
    #[serde(default)]
    pub(crate) status: Option<SubmissionStatus>,
    #[serde(default)]
    pub(crate) page: Option<usize>,
    #[serde(default)]
    pub(crate) page_size: Option<usize>,
    #[serde(default)]
    pub(crate) collapse_resubmissions: bool,
}

pub(crate) async fn history_handler(
    State(settings): Settings,
    Json(request): Json<HistoryRequest>,
) -> Response {
    let range = optional_day("from", request.from.as_ref())
        .and_then(|from| optional_day("to", request.to.as_ref()).map(|to| (from, to)));
    let (from, to) = match range {
        Ok(range) => range,
        Err(response) => return response,
    };

    let mut query = HistoryQuery::new(request.page_size.unwrap_or(settings.page_size));
    query.set_range(from, to);
    query.set_status(request.status);
    query.set_page(request.page.unwrap_or(1));

    let page = if request.collapse_resubmissions {
        query.run(collapse_resubmissions(&request.submissions))
    } else {
        query.run(&request.submissions)
    };
    (StatusCode::OK, Json(page)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DayRequest {
    #[serde(default)]
    pub(crate) assignments: Vec<Assignment>,
    #[serde(default)]
    pub(crate) submissions: Vec<WorkSubmission>,
    pub(crate) date: CalendarDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PendingResponse<'a> {
    pub(crate) date: NaiveDate,
    pub(crate) active_unsubmitted: Vec<&'a Assignment>,
    pub(crate) submitted: Vec<SubmittedAssignment<'a>>,
}

pub(crate) async fn pending_handler(Json(request): Json<DayRequest>) -> Response {
    let date = match required_day("date", &request.date) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let fallback = non_empty(&request.submissions);
    let body = PendingResponse {
        date,
        active_unsubmitted: active_unsubmitted(&request.assignments, date, fallback),
        submitted: submitted_for_date(&request.assignments, date, fallback),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn overview_handler(Json(request): Json<DayRequest>) -> Response {
    let date = match required_day("date", &request.date) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let overview =
        DailyOverview::build(&request.assignments, non_empty(&request.submissions), date);
    (StatusCode::OK, Json(overview)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueueRequest {
    #[serde(default)]
    pub(crate) submissions: Vec<WorkSubmission>,
}

pub(crate) async fn verification_queue_handler(Json(request): Json<QueueRequest>) -> Response {
    let queue = verification_queue(&request.submissions);
    (StatusCode::OK, Json(queue)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WindowRequest {
    pub(crate) now: CalendarDate,
    pub(crate) date: CalendarDate,
    #[serde(default)]
    pub(crate) lookback_days: Option<u32>,
}

pub(crate) async fn submission_window_handler(
    State(settings): Settings,
    Json(request): Json<WindowRequest>,
) -> Response {
    let days = required_day("now", &request.now)
        .and_then(|now| required_day("date", &request.date).map(|date| (now, date)));
    let (now, date) = match days {
        Ok(days) => days,
        Err(response) => return response,
    };

    let lookback_days = request.lookback_days.unwrap_or(settings.lookback_days);
    let Some(window) = SubmissionWindow::new(now, lookback_days) else {
        return bad_request("now is not a readable date".to_string());
    };

    let payload = json!({
        "date": date,
        "open": window.is_open(date),
        "earliestOpenDay": window.earliest_open_day(),
        "today": window.today(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
        let response = work_router(HistoryConfig::default())
            .oneshot(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn assignment() -> Value {
        json!({
            "id": 1, "staffId": 4, "responsibilityId": 8,
            "workSubmissions": [
                { "id": 1, "assignmentId": 1, "staffId": 4, "workDate": "2024-01-10",
                  "status": "VERIFIED", "hoursWorked": 3 },
                { "id": 2, "assignmentId": 1, "staffId": 4, "workDate": "2024-01-11",
                  "status": "SUBMITTED", "hoursWorked": 2 }
            ]
        })
    }

    #[tokio::test]
    async fn status_route_is_date_scoped() {
        let (status, body) = post_json(
            "/api/v1/work/status",
            json!({ "assignment": assignment(), "date": "2024-01-10T08:00:00Z" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "VERIFIED");

        let (_, body) = post_json(
            "/api/v1/work/status",
            json!({ "assignment": assignment(), "date": "2024-01-12" }),
        )
        .await;
        assert_eq!(body["status"], "PENDING");
        assert!(body.get("submission").is_none());
    }

    #[tokio::test]
    async fn status_route_rejects_unreadable_dates() {
        let (status, body) = post_json(
            "/api/v1/work/status",
            json!({ "assignment": assignment(), "date": "next tuesday" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("next tuesday"));
    }

    #[tokio::test]
    async fn history_route_pages_day_groups() {
        let submissions: Vec<Value> = (1..=12)
            .map(|day| {
                json!({
                    "id": day, "assignmentId": 1, "staffId": 4,
                    "workDate": format!("2024-02-{day:02}"), "status": "VERIFIED",
                    "hoursWorked": 1
                })
            })
            .collect();

        let (status, body) = post_json(
            "/api/v1/work/history",
            json!({ "submissions": submissions, "page": 2 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][0]["date"], "2024-02-02");
    }

    #[tokio::test]
    async fn pending_route_splits_assignments() {
        let (status, body) = post_json(
            "/api/v1/work/pending",
            json!({
                "assignments": [
                    assignment(),
                    { "id": 2, "staffId": 4, "responsibilityId": 9,
                      "responsibility": { "title": "Expired", "endDate": "2024-01-10" } },
                    { "id": 3, "staffId": 4, "responsibilityId": 10,
                      "responsibility": { "title": "Ends today", "endDate": "2024-01-11" } }
                ],
                "date": "2024-01-11"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let pending = body["activeUnsubmitted"].as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["id"], 3);
        let submitted = body["submitted"].as_array().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0]["submission"]["id"], 2);
    }

    #[tokio::test]
    async fn submission_window_route_uses_explicit_now() {
        let (status, body) = post_json(
            "/api/v1/work/submission-window",
            json!({ "now": "2024-01-11T09:00:00Z", "date": "2024-01-10" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["open"], false);

        let (_, body) = post_json(
            "/api/v1/work/submission-window",
            json!({ "now": "2024-01-11T09:00:00Z", "date": "2024-01-10", "lookbackDays": 1 }),
        )
        .await;
        assert_eq!(body["open"], true);
    }

    #[tokio::test]
    async fn day_status_route_filters_to_the_requested_day() {
        let (status, body) = post_json(
            "/api/v1/work/day-status",
            json!({
                "date": "2024-01-10",
                "submissions": [
                    { "id": 1, "assignmentId": 1, "staffId": 4,
                      "workDate": "2024-01-10", "status": "VERIFIED" },
                    { "id": 2, "assignmentId": 2, "staffId": 4,
                      "workDate": "2024-01-10", "status": "PENDING" },
                    { "id": 3, "assignmentId": 3, "staffId": 4,
                      "workDate": "2024-01-11", "status": "REJECTED" }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "SUBMITTED");
        assert_eq!(body["submissionCount"], 2);
    }
}
