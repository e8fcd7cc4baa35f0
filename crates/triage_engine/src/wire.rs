//! JSON shapes exchanged with the backend.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    FailureKind, FailureRecord, GatewayError, ReportReply, SavedReport, SavedReportDetail,
    UploadReply,
};

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    unknown_acronyms: Option<Vec<String>>,
    message: Option<String>,
    filename: Option<String>,
    rows: Option<u64>,
    failure_count: Option<u64>,
    status: Option<String>,
    error: Option<String>,
}

impl From<UploadBody> for UploadReply {
    fn from(body: UploadBody) -> Self {
        let accepted = body.error.is_none();
        Self {
            accepted,
            unknown_terms: body.unknown_acronyms.unwrap_or_default(),
            message: body.error.or(body.message),
            filename: body.filename,
            rows: body.rows,
            failure_count: body.failure_count,
            status: body.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportBody {
    answer: Option<String>,
    status: Option<String>,
}

impl From<ReportBody> for ReportReply {
    fn from(body: ReportBody) -> Self {
        Self {
            answer: body.answer,
            status: body.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FailuresBody {
    failures: Option<Vec<Map<String, Value>>>,
}

impl FailuresBody {
    pub(crate) fn into_records(self) -> Vec<FailureRecord> {
        records(self.failures)
    }
}

fn records(rows: Option<Vec<Map<String, Value>>>) -> Vec<FailureRecord> {
    rows.unwrap_or_default()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| (key, cell_text(value)))
                .collect()
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedReportBody {
    id: Value,
    #[serde(default)]
    timestamp: String,
    machine_name: Option<String>,
    #[serde(default)]
    analysis_type: String,
    total_failures: Option<u64>,
}

impl From<SavedReportBody> for SavedReport {
    fn from(body: SavedReportBody) -> Self {
        Self {
            id: cell_text(body.id),
            timestamp: body.timestamp,
            machine_name: body.machine_name,
            analysis_type: body.analysis_type,
            total_failures: body.total_failures,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedReportDetailBody {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    timestamp: String,
    machine_name: Option<String>,
    #[serde(default)]
    analysis_type: String,
    total_failures: Option<u64>,
    failures: Option<Vec<Map<String, Value>>>,
}

impl SavedReportDetailBody {
    /// `requested_id` stands in when the stored record carries no id of its own.
    pub(crate) fn into_detail(self, requested_id: &str) -> SavedReportDetail {
        let id = match self.id {
            Value::Null => requested_id.to_string(),
            other => cell_text(other),
        };
        SavedReportDetail {
            report: SavedReport {
                id,
                timestamp: self.timestamp,
                machine_name: self.machine_name,
                analysis_type: self.analysis_type,
                total_failures: self.total_failures,
            },
            failures: records(self.failures),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DefinitionsBody {
    acronyms: Map<String, Value>,
}

impl DefinitionsBody {
    pub(crate) fn new(definitions: &[(String, String)]) -> Self {
        let acronyms = definitions
            .iter()
            .map(|(term, meaning)| (term.clone(), Value::String(meaning.clone())))
            .collect();
        Self { acronyms }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveReportBody<'a> {
    pub(crate) analysis_type: &'a str,
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(bytes)
        .map_err(|err| GatewayError::new(FailureKind::InvalidResponse, err.to_string()))
}

pub(crate) fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>, GatewayError> {
    serde_json::to_vec(body)
        .map_err(|err| GatewayError::new(FailureKind::InvalidResponse, err.to_string()))
}

/// Strings render bare, null renders empty, everything else as JSON text.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
