use std::path::PathBuf;
use std::time::Duration;

use crate::{Preferences, ReportKind, RequestId, UploadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Upload {
        upload_id: UploadId,
        path: PathBuf,
        machine_name: Option<String>,
    },
    SubmitDefinitions {
        upload_id: UploadId,
        definitions: Vec<(String, String)>,
    },
    /// Fire-and-forget background analysis start.
    StartAnalysis,
    FetchReport {
        request_id: RequestId,
        kind: ReportKind,
        /// Wait before issuing the request; set when polling a pending report.
        delay: Option<Duration>,
    },
    LoadFailures,
    SaveViewingEvent { analysis_type: String },
    LoadHistory,
    LoadSavedReport { id: String },
    /// Must be written through before the next message is handled.
    PersistPreferences(Preferences),
}
