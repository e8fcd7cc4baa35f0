use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use triage_logging::{triage_debug, triage_info, triage_warn};

use crate::failure_log::FailureLog;
use crate::markup::classify_content;
use crate::view_model::{
    AppViewModel, FailureLogView, ReportView, SavedReportView, UploadSummary,
};
use crate::{
    Effect, FailureRow, Gate, Notice, ReportCache, ReportKind, TermDefinitions, FAILURE_SCAN,
};

pub type UploadId = u64;
pub type RequestId = u64;

/// Controller-side view of a failed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    /// HTTP status when the backend answered with a non-2xx code.
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Upload acknowledgment as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadAck {
    /// False when the backend answered with an error payload instead of accepting the file.
    pub acknowledged: bool,
    pub unknown_terms: Vec<String>,
    pub message: Option<String>,
    pub rows: Option<u64>,
    pub failure_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStatus {
    Ready,
    Pending,
    Error,
    /// The backend sent no status.
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportPayload {
    pub answer: Option<String>,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReportSummary {
    pub id: String,
    pub timestamp: String,
    pub machine_name: Option<String>,
    pub analysis_type: String,
    pub total_failures: Option<u64>,
}

/// One saved report with the failure rows captured when it was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReportDetail {
    pub summary: SavedReportSummary,
    pub failures: Vec<FailureRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectedReport {
    summary: SavedReportSummary,
    failures: FailureLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    /// Run the fast failure identification after every accepted upload.
    pub auto_analyze: bool,
    /// Announce polled reports once they are ready.
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_analyze: true,
            notifications: false,
        }
    }
}

/// How pending generated reports are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Re-fetches allowed after the first `pending` answer.
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 12,
        }
    }
}

/// The backend exposes no job progress; `Running` only means the start request was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisJobState {
    #[default]
    Idle,
    AwaitingTerminology,
    Starting,
    Running,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportRequest {
    kind: ReportKind,
    attempt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    gate: Gate,
    job: AnalysisJobState,
    last_upload_id: UploadId,
    upload_in_flight: Option<UploadId>,
    accepted_upload: Option<UploadId>,
    definitions_in_flight: Option<UploadId>,
    last_upload: Option<UploadSummary>,
    reports: ReportCache,
    last_request_id: RequestId,
    reports_in_flight: BTreeMap<RequestId, ReportRequest>,
    failure_log: FailureLog,
    failure_loads_in_flight: u32,
    history: Vec<SavedReportSummary>,
    history_loads_in_flight: u32,
    saved_report_in_flight: Option<String>,
    selected_report: Option<SelectedReport>,
    preferences: Preferences,
    poll_policy: PollPolicy,
    notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_policy(poll_policy: PollPolicy) -> Self {
        Self {
            poll_policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let terminology = match &self.gate {
            Gate::Clear => None,
            Gate::Blocked { definitions, .. } => Some(definitions.slots().to_vec()),
        };
        let reports = self
            .reports
            .iter()
            .map(|(title, content)| ReportView {
                title: title.to_string(),
                lines: classify_content(content),
            })
            .collect();
        let failure_log = self
            .failure_log
            .is_open()
            .then(|| failure_log_view(&self.failure_log));
        let selected_report = self.selected_report.as_ref().map(|selected| SavedReportView {
            summary: selected.summary.clone(),
            failures: failure_log_view(&selected.failures),
        });

        AppViewModel {
            terminology,
            job: self.job,
            upload_in_flight: self.upload_in_flight.is_some(),
            last_upload: self.last_upload.clone(),
            fetch_outstanding: !self.reports_in_flight.is_empty(),
            reports,
            failure_log,
            history: self.history.clone(),
            selected_report,
            loading: self.failure_loads_in_flight > 0
                || self.history_loads_in_flight > 0
                || self.saved_report_in_flight.is_some(),
            preferences: self.preferences,
            dirty: self.dirty,
        }
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn job(&self) -> AnalysisJobState {
        self.job
    }

    pub fn reports(&self) -> &ReportCache {
        &self.reports
    }

    pub fn failure_log(&self) -> &FailureLog {
        &self.failure_log
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn fetch_outstanding(&self) -> bool {
        !self.reports_in_flight.is_empty()
    }

    /// Drains queued notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.mark_dirty();
    }

    pub(crate) fn request_upload(&mut self, path: PathBuf, machine_name: Option<String>) -> Effect {
        self.last_upload_id += 1;
        let upload_id = self.last_upload_id;
        self.upload_in_flight = Some(upload_id);
        self.mark_dirty();
        let machine_name = machine_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Effect::Upload {
            upload_id,
            path,
            machine_name,
        }
    }

    pub(crate) fn apply_upload_result(
        &mut self,
        upload_id: UploadId,
        result: Result<UploadAck, TransportError>,
    ) -> Vec<Effect> {
        if self.upload_in_flight != Some(upload_id) {
            triage_debug!("Ignoring completion of superseded upload {}", upload_id);
            return Vec::new();
        }
        self.upload_in_flight = None;
        self.mark_dirty();

        let ack = match result {
            Ok(ack) if ack.acknowledged => ack,
            Ok(ack) => {
                let message = ack
                    .message
                    .unwrap_or_else(|| "the backend rejected the file".to_string());
                self.notify(Notice::UploadFailed { message });
                return Vec::new();
            }
            Err(err) => {
                self.notify(Notice::UploadFailed {
                    message: err.message,
                });
                return Vec::new();
            }
        };

        self.accepted_upload = Some(upload_id);
        self.last_upload = Some(UploadSummary {
            message: ack.message,
            rows: ack.rows,
            failure_count: ack.failure_count,
        });

        let mut effects = Vec::with_capacity(2);
        if ack.unknown_terms.is_empty() {
            self.gate = Gate::Clear;
            self.job = AnalysisJobState::Starting;
            effects.push(Effect::StartAnalysis);
        } else {
            let definitions = TermDefinitions::with_terms(ack.unknown_terms);
            triage_info!(
                "Upload {} blocked on {} undefined term(s)",
                upload_id,
                definitions.len()
            );
            self.gate = Gate::Blocked {
                upload_id,
                definitions,
            };
            self.job = AnalysisJobState::AwaitingTerminology;
        }

        if self.preferences.auto_analyze {
            effects.push(self.issue_report_fetch(ReportKind::IdentifyFailures, 0, None));
        }
        effects
    }

    pub(crate) fn define_term(&mut self, term: &str, meaning: String) {
        if let Gate::Blocked { definitions, .. } = &mut self.gate {
            if definitions.define(term, meaning) {
                self.mark_dirty();
            } else {
                triage_debug!("Ignoring definition for term {:?} that is not pending", term);
            }
        }
    }

    pub(crate) fn submit_definitions(&mut self) -> Vec<Effect> {
        match std::mem::take(&mut self.gate) {
            Gate::Blocked {
                upload_id,
                definitions,
            } => {
                triage_info!(
                    "Submitting {}/{} term definition(s) for upload {}",
                    definitions.defined_count(),
                    definitions.len(),
                    upload_id
                );
                self.job = AnalysisJobState::Starting;
                self.definitions_in_flight = Some(upload_id);
                self.mark_dirty();
                vec![Effect::SubmitDefinitions {
                    upload_id,
                    definitions: definitions.into_pairs(),
                }]
            }
            Gate::Clear => Vec::new(),
        }
    }

    pub(crate) fn skip_definitions(&mut self) -> Vec<Effect> {
        if !self.gate.is_blocked() {
            return Vec::new();
        }
        self.gate = Gate::Clear;
        self.job = AnalysisJobState::Starting;
        self.mark_dirty();
        vec![Effect::StartAnalysis]
    }

    pub(crate) fn apply_definitions_saved(
        &mut self,
        upload_id: UploadId,
        result: Result<(), TransportError>,
    ) -> Vec<Effect> {
        if self.definitions_in_flight != Some(upload_id) {
            return Vec::new();
        }
        self.definitions_in_flight = None;
        if let Err(err) = result {
            self.notify(Notice::DefinitionsSaveFailed {
                message: err.message,
            });
        }
        if self.accepted_upload != Some(upload_id) || self.gate.is_blocked() {
            triage_debug!("Upload {} was superseded; not starting analysis", upload_id);
            return Vec::new();
        }
        self.mark_dirty();
        vec![Effect::StartAnalysis]
    }

    pub(crate) fn apply_analysis_started(&mut self, result: Result<(), TransportError>) {
        if self.job != AnalysisJobState::Starting {
            return;
        }
        self.job = match result {
            Ok(()) => AnalysisJobState::Running,
            Err(err) => {
                triage_warn!("Background analysis could not be started: {}", err);
                AnalysisJobState::Failed
            }
        };
        self.mark_dirty();
    }

    pub(crate) fn issue_report_fetch(
        &mut self,
        kind: ReportKind,
        attempt: u32,
        delay: Option<Duration>,
    ) -> Effect {
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.reports_in_flight.insert(
            request_id,
            ReportRequest {
                kind: kind.clone(),
                attempt,
            },
        );
        self.mark_dirty();
        Effect::FetchReport {
            request_id,
            kind,
            delay,
        }
    }

    pub(crate) fn apply_report_result(
        &mut self,
        request_id: RequestId,
        result: Result<ReportPayload, TransportError>,
    ) -> Vec<Effect> {
        let Some(ReportRequest { kind, attempt }) = self.reports_in_flight.remove(&request_id)
        else {
            triage_debug!("Ignoring completion of unknown report request {}", request_id);
            return Vec::new();
        };
        self.mark_dirty();

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                self.notify(Notice::ReportFetchFailed {
                    kind,
                    message: err.message,
                });
                return Vec::new();
            }
        };

        if kind.is_fast_path() {
            if let Some(answer) = payload.answer {
                self.reports.upsert(kind.title(), answer);
            }
            return vec![self.request_failures()];
        }

        if payload.status == ReportStatus::Pending {
            if attempt < self.poll_policy.max_polls {
                let interval = self.poll_policy.interval;
                triage_debug!("Report '{}' pending; poll {} in {:?}", kind, attempt + 1, interval);
                return vec![self.issue_report_fetch(kind, attempt + 1, Some(interval))];
            }
            self.notify(Notice::ReportStillPending { kind });
            return Vec::new();
        }

        if let Some(answer) = payload.answer {
            self.reports.upsert(kind.title(), answer);
            if attempt > 0 && payload.status != ReportStatus::Error && self.preferences.notifications
            {
                self.notify(Notice::ReportReady {
                    title: kind.title().to_string(),
                });
            }
        }
        Vec::new()
    }

    pub(crate) fn request_failures(&mut self) -> Effect {
        self.failure_loads_in_flight += 1;
        self.mark_dirty();
        Effect::LoadFailures
    }

    pub(crate) fn apply_failures(
        &mut self,
        result: Result<Vec<FailureRow>, TransportError>,
    ) -> Vec<Effect> {
        if self.failure_loads_in_flight == 0 {
            triage_debug!("Ignoring failure list nobody is waiting for");
            return Vec::new();
        }
        self.failure_loads_in_flight -= 1;
        self.mark_dirty();

        match result {
            Ok(rows) if rows.is_empty() => {
                // Rows of an earlier dataset must not stay on screen.
                self.failure_log.close();
                self.notify(Notice::NoFailuresFound);
                Vec::new()
            }
            Ok(rows) => {
                self.failure_log = FailureLog::show(rows);
                vec![Effect::SaveViewingEvent {
                    analysis_type: FAILURE_SCAN.to_string(),
                }]
            }
            Err(err) => {
                triage_warn!("Failure list could not be loaded: {}", err);
                self.notify(Notice::FailureLogFailed {
                    message: err.message,
                });
                Vec::new()
            }
        }
    }

    pub(crate) fn close_failure_log(&mut self) {
        if self.failure_log.is_open() {
            self.failure_log.close();
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_viewing_event_saved(&mut self, result: Result<(), TransportError>) {
        if let Err(err) = result {
            self.notify(Notice::ViewingEventSaveFailed {
                message: err.message,
            });
        }
    }

    pub(crate) fn request_history(&mut self) -> Effect {
        self.history_loads_in_flight += 1;
        self.mark_dirty();
        Effect::LoadHistory
    }

    pub(crate) fn apply_history(
        &mut self,
        result: Result<Vec<SavedReportSummary>, TransportError>,
    ) {
        if self.history_loads_in_flight == 0 {
            triage_debug!("Ignoring report history nobody is waiting for");
            return;
        }
        self.history_loads_in_flight -= 1;
        self.mark_dirty();

        match result {
            Ok(history) => self.history = history,
            Err(err) => self.notify(Notice::HistoryLoadFailed {
                message: err.message,
            }),
        }
    }

    /// The latest request wins; an earlier one still in flight is dropped on arrival.
    pub(crate) fn request_saved_report(&mut self, id: String) -> Vec<Effect> {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Vec::new();
        }
        self.saved_report_in_flight = Some(id.clone());
        self.mark_dirty();
        vec![Effect::LoadSavedReport { id }]
    }

    pub(crate) fn apply_saved_report(
        &mut self,
        id: String,
        result: Result<SavedReportDetail, TransportError>,
    ) {
        if self.saved_report_in_flight.as_deref() != Some(id.as_str()) {
            triage_debug!("Ignoring saved report {} that is no longer requested", id);
            return;
        }
        self.saved_report_in_flight = None;
        self.mark_dirty();

        match result {
            Ok(detail) => {
                self.selected_report = Some(SelectedReport {
                    summary: detail.summary,
                    failures: FailureLog::show(detail.failures),
                });
            }
            Err(err) if err.is_not_found() => self.notify(Notice::SavedReportNotFound { id }),
            Err(err) => self.notify(Notice::SavedReportLoadFailed {
                id,
                message: err.message,
            }),
        }
    }

    pub(crate) fn close_saved_report(&mut self) {
        if self.selected_report.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn restore_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
        self.mark_dirty();
    }

    /// Returns the persist effect when the value actually changed.
    pub(crate) fn update_preferences(
        &mut self,
        change: impl FnOnce(&mut Preferences),
    ) -> Vec<Effect> {
        let before = self.preferences;
        change(&mut self.preferences);
        if self.preferences == before {
            return Vec::new();
        }
        self.mark_dirty();
        vec![Effect::PersistPreferences(self.preferences)]
    }

    /// Drops everything session-scoped. Id counters keep running so late
    /// completions of the old session never match a new request.
    pub(crate) fn reset_session(&mut self) {
        *self = Self {
            last_upload_id: self.last_upload_id,
            last_request_id: self.last_request_id,
            preferences: self.preferences,
            poll_policy: self.poll_policy,
            dirty: true,
            ..Self::default()
        };
    }
}

fn failure_log_view(log: &FailureLog) -> FailureLogView {
    FailureLogView {
        columns: log.columns().to_vec(),
        rows: log.table(),
    }
}
