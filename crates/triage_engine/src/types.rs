use std::fmt;
use std::path::PathBuf;

/// Caller-chosen tag echoed back in the matching [`EngineEvent`].
pub type RequestId = u64;

/// One failure row as `(column, cell text)` pairs in backend order.
pub type FailureRecord = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub machine_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReply {
    /// False when the backend answered with an `error` field.
    pub accepted: bool,
    pub unknown_terms: Vec<String>,
    /// Backend message, or the error text when not accepted.
    pub message: Option<String>,
    pub filename: Option<String>,
    pub rows: Option<u64>,
    pub failure_count: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportReply {
    pub answer: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub id: String,
    pub timestamp: String,
    pub machine_name: Option<String>,
    pub analysis_type: String,
    pub total_failures: Option<u64>,
}

/// A saved report with the failure rows stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReportDetail {
    pub report: SavedReport,
    pub failures: Vec<FailureRecord>,
}

/// Which report endpoint to hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRoute {
    /// `GET /analysis/fast_failure`.
    Fast,
    /// `GET /analysis/report?type=...`.
    Generated { report_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadCompleted {
        upload_id: RequestId,
        result: Result<UploadReply, GatewayError>,
    },
    DefinitionsSaved {
        upload_id: RequestId,
        result: Result<(), GatewayError>,
    },
    AnalysisStarted {
        result: Result<(), GatewayError>,
    },
    ReportFetched {
        request_id: RequestId,
        result: Result<ReportReply, GatewayError>,
    },
    FailuresLoaded {
        result: Result<Vec<FailureRecord>, GatewayError>,
    },
    ViewingEventSaved {
        result: Result<(), GatewayError>,
    },
    HistoryLoaded {
        result: Result<Vec<SavedReport>, GatewayError>,
    },
    SavedReportLoaded {
        id: String,
        result: Result<SavedReportDetail, GatewayError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: FailureKind,
    pub message: String,
}

impl GatewayError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} ({})", self.kind, self.message)
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The body was not the JSON shape the endpoint promises.
    InvalidResponse,
    /// The file to upload could not be read.
    LocalFile,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::LocalFile => write!(f, "cannot read file"),
        }
    }
}
