use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use workdesk::work::{
    active_unsubmitted, collapse_resubmissions, day_status, group_by_day, paginate,
    resolve_effective_status, resolve_submission_for_date, status_for_date, Assignment,
    DayStatus, HistoryQuery, PageRequest, SubmissionStatus, WorkSnapshot, WorkSubmission,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn submissions(value: serde_json::Value) -> Vec<WorkSubmission> {
    serde_json::from_value(value).expect("submissions deserialize")
}

fn assignment(value: serde_json::Value) -> Assignment {
    serde_json::from_value(value).expect("assignment deserializes")
}

fn with_statuses(statuses: &[&str]) -> Vec<WorkSubmission> {
    let records: Vec<serde_json::Value> = statuses
        .iter()
        .enumerate()
        .map(|(index, status)| {
            json!({
                "id": index + 1, "assignmentId": index + 1, "staffId": 1,
                "workDate": "2024-05-01", "status": status
            })
        })
        .collect();
    submissions(json!(records))
}

#[test]
fn assignment_without_submissions_is_pending_on_any_day() {
    let bare = assignment(json!({ "id": 1, "staffId": 2, "responsibilityId": 3 }));
    for target in ["2024-01-01", "2030-12-31T23:59:59Z", "1999-06-15"] {
        assert_eq!(status_for_date(&bare, target, None), SubmissionStatus::Pending);
    }
    assert_eq!(
        status_for_date(&bare, "2024-01-01", Some(&[][..])),
        SubmissionStatus::Pending
    );
}

#[test]
fn effective_status_is_always_one_of_the_four() {
    let records = submissions(json!([
        { "id": 1, "assignmentId": 1, "staffId": 1, "status": "VERIFIED" },
        { "id": 2, "assignmentId": 1, "staffId": 1, "assignment": { "status": "REJECTED" } },
        { "id": 3, "assignmentId": 1, "staffId": 1 },
        { "id": 4, "assignmentId": 1, "staffId": 1, "status": "ARCHIVED" },
        { "id": 5, "assignmentId": 1, "staffId": 1, "status": null,
          "assignment": { "status": null } }
    ]));

    let statuses: Vec<SubmissionStatus> = records.iter().map(resolve_effective_status).collect();
    assert_eq!(
        statuses,
        vec![
            SubmissionStatus::Verified,
            SubmissionStatus::Rejected,
            SubmissionStatus::Submitted,
            SubmissionStatus::Submitted,
            SubmissionStatus::Submitted,
        ]
    );
}

#[test]
fn empty_day_is_not_submitted() {
    assert_eq!(day_status(&Vec::<WorkSubmission>::new()), DayStatus::NotSubmitted);
}

#[test]
fn day_status_is_not_a_majority_vote() {
    assert_eq!(
        day_status(&with_statuses(&["VERIFIED", "PENDING"])),
        DayStatus::Submitted
    );
    assert_eq!(
        day_status(&with_statuses(&["VERIFIED", "VERIFIED", "VERIFIED", "PENDING"])),
        DayStatus::Submitted
    );
    assert_eq!(
        day_status(&with_statuses(&["VERIFIED", "REJECTED"])),
        DayStatus::Partial
    );
    assert_eq!(
        day_status(&with_statuses(&["REJECTED", "REJECTED"])),
        DayStatus::Rejected
    );
    assert_eq!(
        day_status(&with_statuses(&["VERIFIED", "VERIFIED"])),
        DayStatus::Verified
    );
}

#[test]
fn grouping_ignores_input_order() {
    let records = submissions(json!([
        { "id": 1, "assignmentId": 1, "staffId": 1, "workDate": "2024-03-01",
          "hoursWorked": 1, "status": "VERIFIED" },
        { "id": 2, "assignmentId": 2, "staffId": 1, "workDate": "2024-03-02T09:00:00Z",
          "hoursWorked": 2 },
        { "id": 3, "assignmentId": 3, "staffId": 1, "workDate": "2024-03-01T20:00:00Z",
          "hoursWorked": 4, "status": "REJECTED" },
        { "id": 4, "assignmentId": 4, "staffId": 1, "submittedAt": "2024-03-03T07:30:00Z",
          "hoursWorked": 0.5 }
    ]));
    let reversed: Vec<&WorkSubmission> = records.iter().rev().collect();

    let forward = group_by_day(&records);
    let backward = group_by_day(reversed);

    let shape = |groups: &[workdesk::work::DayGroup]| -> Vec<(NaiveDate, Vec<String>, f64)> {
        groups
            .iter()
            .map(|group| {
                (
                    group.date,
                    group
                        .submissions
                        .iter()
                        .map(|submission| submission.id.to_string())
                        .collect(),
                    group.total_hours,
                )
            })
            .collect()
    };

    assert_eq!(shape(&forward), shape(&backward));
    assert_eq!(
        forward.iter().map(|group| group.date).collect::<Vec<_>>(),
        vec![day(2024, 3, 3), day(2024, 3, 2), day(2024, 3, 1)]
    );
    assert_eq!(forward[2].status, DayStatus::Partial);
    assert_eq!(forward[2].total_hours, 5.0);
    assert_eq!(forward[2].verified_hours, 1.0);
}

#[test]
fn date_matching_ignores_time_of_day_and_offset() {
    let target: DateTime<Utc> = "2024-03-01T00:05:00Z".parse().expect("valid instant");
    let a = assignment(json!({
        "id": 1, "staffId": 1, "responsibilityId": 1,
        "workSubmissions": [
            { "id": 9, "assignmentId": 1, "staffId": 1, "workDate": "2024-03-01T23:59:00Z" }
        ]
    }));

    let found = resolve_submission_for_date(&a, target, None).expect("same calendar day");
    assert_eq!(found.id.as_str(), "9");
}

#[test]
fn twenty_three_groups_fill_three_pages() {
    let groups: Vec<u32> = (1..=23).collect();

    let first = paginate(groups.clone(), PageRequest::new(1, 10));
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_pages, 3);

    let last = paginate(groups, PageRequest::new(3, 10));
    assert_eq!(last.items, vec![21, 22, 23]);
    assert_eq!(last.total_items, 23);
}

#[test]
fn responsibility_ending_yesterday_is_inactive() {
    let assignments: Vec<Assignment> = serde_json::from_value(json!([
        { "id": 1, "staffId": 1, "responsibilityId": 1,
          "responsibility": { "title": "Ended yesterday", "endDate": "2024-04-09T17:00:00Z" } },
        { "id": 2, "staffId": 1, "responsibilityId": 2,
          "responsibility": { "title": "Ends today", "endDate": "2024-04-10" } },
        { "id": 3, "staffId": 1, "responsibilityId": 3,
          "responsibility": { "title": "Starts tomorrow", "startDate": "2024-04-11" } }
    ]))
    .expect("assignments deserialize");

    let active = active_unsubmitted(&assignments, day(2024, 4, 10), None);
    let ids: Vec<&str> = active.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
}

#[test]
fn status_does_not_carry_forward() {
    let a = assignment(json!({
        "id": 1, "staffId": 1, "responsibilityId": 1,
        "workSubmissions": [
            { "id": 1, "assignmentId": 1, "staffId": 1, "workDate": "2024-01-10",
              "status": "VERIFIED", "hoursWorked": 3 },
            { "id": 2, "assignmentId": 1, "staffId": 1, "workDate": "2024-01-11",
              "status": "SUBMITTED", "hoursWorked": 2 }
        ]
    }));

    assert_eq!(status_for_date(&a, "2024-01-10", None), SubmissionStatus::Verified);
    assert_eq!(status_for_date(&a, "2024-01-11", None), SubmissionStatus::Submitted);
    assert_eq!(status_for_date(&a, "2024-01-12", None), SubmissionStatus::Pending);
}

#[test]
fn fallback_list_matches_ids_numerically() {
    let a = assignment(json!({ "id": 7, "staffId": 1, "responsibilityId": 1 }));
    let global = submissions(json!([
        { "id": 1, "assignmentId": "8", "staffId": 1, "workDate": "2024-02-01",
          "status": "VERIFIED" },
        { "id": 2, "assignmentId": "7", "staffId": 1, "workDate": "2024-02-01",
          "status": "REJECTED" }
    ]));

    assert_eq!(
        status_for_date(&a, "2024-02-01", Some(global.as_slice())),
        SubmissionStatus::Rejected
    );
}

#[test]
fn resubmission_replaces_rejected_record_in_history() {
    let records = submissions(json!([
        { "id": 1, "assignmentId": 1, "staffId": 1, "workDate": "2024-02-01",
          "submittedAt": "2024-02-01T09:00:00Z", "status": "REJECTED", "hoursWorked": 2 },
        { "id": 2, "assignmentId": 1, "staffId": 1, "workDate": "2024-02-01",
          "submittedAt": "2024-02-01T15:00:00Z", "status": "SUBMITTED", "hoursWorked": 2 }
    ]));

    let raw = group_by_day(&records);
    assert_eq!(raw[0].status, DayStatus::Partial);

    let collapsed = group_by_day(collapse_resubmissions(&records));
    assert_eq!(collapsed[0].status, DayStatus::Submitted);
    assert_eq!(collapsed[0].submissions.len(), 1);
}

#[test]
fn changing_a_filter_returns_to_the_first_page() {
    let records: Vec<serde_json::Value> = (1..=25)
        .map(|n| {
            json!({
                "id": n, "assignmentId": 1, "staffId": 1,
                "workDate": format!("2024-01-{n:02}"),
                "status": if n % 2 == 0 { "VERIFIED" } else { "SUBMITTED" }
            })
        })
        .collect();
    let records = submissions(json!(records));

    let mut query = HistoryQuery::new(10);
    query.set_page(3);
    assert_eq!(query.run(&records).items.len(), 5);

    query.set_status(Some(SubmissionStatus::Verified));
    let page = query.run(&records);
    assert_eq!(page.page, 1);
    assert_eq!(page.total_items, 12);
    assert_eq!(page.items[0].date, day(2024, 1, 24));
}

#[test]
fn snapshot_drives_the_engine_end_to_end() {
    let snapshot: WorkSnapshot = serde_json::from_value(json!({
        "assignments": [
            { "id": "1", "staffId": 1, "responsibilityId": 1,
              "responsibility": {
                  "title": "Morning checks", "startDate": "2024-01-01", "endDate": ""
              } }
        ],
        "submissions": [
            { "id": 11, "assignmentId": 1, "staffId": 1, "workDate": "",
              "submittedAt": "2024-01-15T08:00:00Z",
              "hoursWorked": "2.5", "status": "verified" }
        ]
    }))
    .expect("snapshot deserializes");

    let a = &snapshot.assignments[0];
    assert_eq!(
        status_for_date(a, day(2024, 1, 15), snapshot.fallback_submissions()),
        SubmissionStatus::Verified
    );
    let pending = active_unsubmitted(
        &snapshot.assignments,
        "2024-01-16",
        snapshot.fallback_submissions(),
    );
    assert!(pending.iter().any(|assignment| assignment.id.as_str() == "1"));
    assert_eq!(snapshot.submissions[0].hours(), 2.5);
}

#[test]
fn owning_assignment_status_never_leaks_into_a_day() {
    let a = assignment(json!({
        "id": 1, "staffId": 1, "responsibilityId": 1, "status": "VERIFIED",
        "workSubmissions": [
            { "id": 1, "assignmentId": 1, "staffId": 1, "workDate": "2024-01-10" }
        ]
    }));

    assert_eq!(a.status, Some(SubmissionStatus::Verified));
    assert_eq!(status_for_date(&a, "2024-01-10", None), SubmissionStatus::Submitted);
    assert_eq!(status_for_date(&a, "2024-01-11", None), SubmissionStatus::Pending);
}
