//! Triage core: pure orchestration state machine and view-model helpers.
mod effect;
mod failure_log;
mod gate;
mod markup;
mod msg;
mod notice;
mod report_cache;
mod report_kind;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use failure_log::{derive_columns, FailureLog, FailureRow, FAILURE_SCAN};
pub use gate::{Gate, TermDefinitions, TermSlot};
pub use markup::{classify_line, MarkupLine};
pub use msg::Msg;
pub use notice::Notice;
pub use report_cache::ReportCache;
pub use report_kind::{
    ParseReportKindError, ReportKind, FAILURE_IDENTIFICATION_TITLE, RELIABILITY_REPORT_TITLE,
};
pub use state::{
    AnalysisJobState, AppState, PollPolicy, Preferences, ReportPayload, ReportStatus, RequestId,
    SavedReportDetail, SavedReportSummary, TransportError, UploadAck, UploadId,
};
pub use update::update;
pub use view_model::{AppViewModel, FailureLogView, ReportView, SavedReportView, UploadSummary};
