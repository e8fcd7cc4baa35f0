use std::fmt;

use crate::ReportKind;

/// User-visible, non-fatal alert raised by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    UploadFailed { message: String },
    DefinitionsSaveFailed { message: String },
    ReportFetchFailed { kind: ReportKind, message: String },
    /// Polling budget spent while the backend still reported `pending`.
    ReportStillPending { kind: ReportKind },
    /// A polled report became ready and notifications are enabled.
    ReportReady { title: String },
    NoFailuresFound,
    FailureLogFailed { message: String },
    ViewingEventSaveFailed { message: String },
    HistoryLoadFailed { message: String },
    SavedReportNotFound { id: String },
    SavedReportLoadFailed { id: String, message: String },
}

impl Notice {
    /// Whether the notice reports a failed request.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Notice::ReportStillPending { .. } | Notice::ReportReady { .. } | Notice::NoFailuresFound
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::UploadFailed { message } => write!(f, "Upload failed: {message}"),
            Notice::DefinitionsSaveFailed { message } => write!(
                f,
                "Could not save term definitions ({message}); analysis continues without them"
            ),
            Notice::ReportFetchFailed { kind, message } => write!(
                f,
                "Analysis '{kind}' failed: {message}. Please check the backend connection"
            ),
            Notice::ReportStillPending { kind } => write!(
                f,
                "Report '{kind}' is still being generated; request it again later"
            ),
            Notice::ReportReady { title } => write!(f, "{title} is ready"),
            Notice::NoFailuresFound => write!(f, "No failures detected in the dataset"),
            Notice::FailureLogFailed { message } => {
                write!(f, "Could not load the failure log: {message}")
            }
            Notice::ViewingEventSaveFailed { message } => {
                write!(f, "Failure scan was not saved to history: {message}")
            }
            Notice::HistoryLoadFailed { message } => {
                write!(f, "Could not load saved reports: {message}")
            }
            Notice::SavedReportNotFound { id } => write!(f, "Saved report {id} does not exist"),
            Notice::SavedReportLoadFailed { id, message } => {
                write!(f, "Could not load saved report {id}: {message}")
            }
        }
    }
}
