use std::path::PathBuf;

use crate::{
    FailureRow, Preferences, ReportKind, ReportPayload, RequestId, SavedReportDetail,
    SavedReportSummary, TransportError, UploadAck, UploadId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a failure log to upload. An empty machine name counts as none.
    UploadRequested {
        path: PathBuf,
        machine_name: Option<String>,
    },
    /// Backend answered (or failed) an upload.
    UploadCompleted {
        upload_id: UploadId,
        result: Result<UploadAck, TransportError>,
    },
    /// User filled in the meaning of a pending term.
    TermDefined { term: String, meaning: String },
    /// User submitted the definition form, complete or not.
    DefinitionsSubmitted,
    /// User dismissed the definition form.
    DefinitionsSkipped,
    /// The definitions save call finished.
    DefinitionsSaved {
        upload_id: UploadId,
        result: Result<(), TransportError>,
    },
    /// The background analysis start request finished.
    AnalysisStarted(Result<(), TransportError>),
    /// User asked for a report artifact.
    ReportRequested(ReportKind),
    /// A report fetch finished.
    ReportFetched {
        request_id: RequestId,
        result: Result<ReportPayload, TransportError>,
    },
    /// User opened the failure log.
    FailureLogRequested,
    /// The failure list request finished.
    FailuresLoaded(Result<Vec<FailureRow>, TransportError>),
    /// User closed the failure log.
    FailureLogClosed,
    /// The viewing-event save finished.
    ViewingEventSaved(Result<(), TransportError>),
    /// User opened the saved report history.
    HistoryRequested,
    HistoryLoaded(Result<Vec<SavedReportSummary>, TransportError>),
    /// User opened one entry of the history.
    SavedReportRequested { id: String },
    SavedReportLoaded {
        id: String,
        result: Result<SavedReportDetail, TransportError>,
    },
    /// User went back from a saved report to the list.
    SavedReportClosed,
    /// Preferences read from durable storage at startup.
    PreferencesRestored(Preferences),
    AutoAnalyzeToggled(bool),
    NotificationsToggled(bool),
    /// Full session reset; preferences survive.
    SessionReset,
    /// Fallback for placeholder wiring.
    NoOp,
}
