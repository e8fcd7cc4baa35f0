//! Triage engine: backend gateway, request execution and local persistence.
mod engine;
mod gateway;
mod persist;
mod types;
mod wire;

pub use engine::{EngineCommand, EngineHandle};
pub use gateway::{BackendSettings, Gateway, ReqwestGateway, DEFAULT_BACKEND_URL};
pub use persist::{ensure_state_dir, StateFiles, PersistError};
pub use types::{
    EngineEvent, FailureKind, FailureRecord, GatewayError, ReportReply, ReportRoute, RequestId,
    SavedReport, SavedReportDetail, UploadReply, UploadRequest,
};
