use crate::{AnalysisJobState, MarkupLine, Preferences, SavedReportSummary, TermSlot};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadSummary {
    pub message: Option<String>,
    pub rows: Option<u64>,
    pub failure_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub title: String,
    pub lines: Vec<MarkupLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureLogView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A saved report opened from the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReportView {
    pub summary: SavedReportSummary,
    pub failures: FailureLogView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    /// Definition slots while the gate is blocked.
    pub terminology: Option<Vec<TermSlot>>,
    pub job: AnalysisJobState,
    pub upload_in_flight: bool,
    pub last_upload: Option<UploadSummary>,
    /// At least one report fetch is outstanding.
    pub fetch_outstanding: bool,
    /// Reports in first-insertion order.
    pub reports: Vec<ReportView>,
    /// Present only while the failure log is open.
    pub failure_log: Option<FailureLogView>,
    pub history: Vec<SavedReportSummary>,
    pub selected_report: Option<SavedReportView>,
    /// A failure list, history or saved report request is outstanding.
    pub loading: bool,
    pub preferences: Preferences,
    pub dirty: bool,
}
