//! Status follow-ups for applications already in the tracker.
//!
//! Two rules, applied in this order:
//! - an application still "Envoyée" more than [`FOLLOW_UP_AFTER_DAYS`] days
//!   after it was sent moves to "À relancer";
//! - an application whose interview date has passed moves to
//!   "Entretien passé", unless it is there already.
//!
//! Entries without the relevant date are left alone.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::tracking::SinkError;

pub const STATUS_SENT: &str = "Envoyée";
pub const STATUS_FOLLOW_UP: &str = "À relancer";
pub const STATUS_INTERVIEW_DONE: &str = "Entretien passé";

pub const FOLLOW_UP_AFTER_DAYS: i64 = 10;

/// A date as stored by the tracker: either a wall-clock value with no offset
/// (a bare date reads as midnight) or a full timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDate {
    Local(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl EntryDate {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(EntryDate::Zoned(dt));
        }
        if let Ok(naive) = raw.parse::<NaiveDateTime>() {
            return Some(EntryDate::Local(naive));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(EntryDate::Local)
    }

    /// Strictly earlier than `reference`. An offset-less date is compared with
    /// the wall-clock time of `reference`; a zoned one as an instant.
    pub fn is_before(&self, reference: DateTime<FixedOffset>) -> bool {
        match self {
            EntryDate::Local(naive) => *naive < reference.naive_local(),
            EntryDate::Zoned(dt) => *dt < reference,
        }
    }
}

/// A status change decided by the follow-up rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    Relaunch,
    InterviewDone,
}

impl FollowUp {
    pub fn status(self) -> &'static str {
        match self {
            FollowUp::Relaunch => STATUS_FOLLOW_UP,
            FollowUp::InterviewDone => STATUS_INTERVIEW_DONE,
        }
    }
}

pub fn relaunch_due(
    status: &str,
    applied_on: Option<EntryDate>,
    now: DateTime<FixedOffset>,
) -> bool {
    let Some(limit) = now.checked_sub_signed(Duration::days(FOLLOW_UP_AFTER_DAYS)) else {
        return false;
    };
    status == STATUS_SENT && applied_on.is_some_and(|date| date.is_before(limit))
}

pub fn interview_past(
    status: &str,
    interview_on: Option<EntryDate>,
    now: DateTime<FixedOffset>,
) -> bool {
    status != STATUS_INTERVIEW_DONE && interview_on.is_some_and(|date| date.is_before(now))
}

/// Final status change for one application, if any. When both rules fire
/// the interview wins, as it is applied last.
pub fn next_status(
    status: &str,
    applied_on: Option<EntryDate>,
    interview_on: Option<EntryDate>,
    now: DateTime<FixedOffset>,
) -> Option<FollowUp> {
    if interview_past(status, interview_on, now) {
        Some(FollowUp::InterviewDone)
    } else if relaunch_due(status, applied_on, now) {
        Some(FollowUp::Relaunch)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedApplication {
    pub id: String,
    pub name: String,
    pub status: String,
    pub applied_on: Option<EntryDate>,
    pub interview_on: Option<EntryDate>,
}

/// Tracker holding existing applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn applications(&self) -> Result<Vec<TrackedApplication>, SinkError>;
    async fn set_status(&self, id: &str, status: &str) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FollowUpReport {
    pub relaunched: usize,
    pub interviews_done: usize,
    /// "Envoyée" applications with no sending date.
    pub skipped_undated: usize,
}

impl FollowUpReport {
    pub fn total(&self) -> usize {
        self.relaunched + self.interviews_done
    }
}

/// Applies both rules to every application in `store`.
///
/// The relaunch pass runs first and the interview pass sees its result, so
/// an old unanswered application whose interview is over counts in both and
/// ends up "Entretien passé". Stops at the first store error.
pub async fn run_follow_ups<S>(
    store: &S,
    now: DateTime<FixedOffset>,
) -> Result<FollowUpReport, SinkError>
where
    S: ApplicationStore + ?Sized,
{
    let mut applications = store.applications().await?;
    let mut report = FollowUpReport::default();

    for app in applications.iter_mut() {
        if app.status == STATUS_SENT && app.applied_on.is_none() {
            debug!(name = %app.name, "no application date, skipped");
            report.skipped_undated += 1;
            continue;
        }
        if relaunch_due(&app.status, app.applied_on, now) {
            store.set_status(&app.id, STATUS_FOLLOW_UP).await?;
            info!(name = %app.name, status = STATUS_FOLLOW_UP, "status updated");
            app.status = STATUS_FOLLOW_UP.to_string();
            report.relaunched += 1;
        }
    }

    for app in &applications {
        if interview_past(&app.status, app.interview_on, now) {
            store.set_status(&app.id, STATUS_INTERVIEW_DONE).await?;
            info!(name = %app.name, status = STATUS_INTERVIEW_DONE, "status updated");
            report.interviews_done += 1;
        }
    }

    info!(
        relaunched = report.relaunched,
        interviews_done = report.interviews_done,
        "follow-up pass complete"
    );
    Ok(report)
}
