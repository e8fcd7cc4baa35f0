use std::time::Duration;

use triage_core::{
    Effect, FailureRow, Msg, ReportKind, ReportPayload, ReportStatus, SavedReportDetail,
    SavedReportSummary, TransportError, UploadAck,
};
use triage_engine::{
    BackendSettings, EngineCommand, EngineEvent, EngineHandle, FailureKind, GatewayError,
    ReportReply, ReportRoute, SavedReport, UploadReply, UploadRequest,
};
use triage_logging::{triage_debug, triage_info, triage_warn};

use super::persistence::PreferenceStore;

pub(crate) struct EffectRunner {
    engine: EngineHandle,
    preferences: PreferenceStore,
}

impl EffectRunner {
    pub(crate) fn new(
        settings: BackendSettings,
        preferences: PreferenceStore,
    ) -> Result<Self, GatewayError> {
        triage_info!("Using analysis backend at {}", settings.base_url);
        let engine = EngineHandle::new(settings)?;
        Ok(Self {
            engine,
            preferences,
        })
    }

    pub(crate) fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Upload {
                    upload_id,
                    path,
                    machine_name,
                } => {
                    triage_info!("Upload {} of {}", upload_id, path.display());
                    self.engine.dispatch(EngineCommand::Upload {
                        upload_id,
                        request: UploadRequest { path, machine_name },
                    });
                }
                Effect::SubmitDefinitions {
                    upload_id,
                    definitions,
                } => self.engine.dispatch(EngineCommand::SubmitDefinitions {
                    upload_id,
                    definitions,
                }),
                Effect::StartAnalysis => self.engine.dispatch(EngineCommand::StartAnalysis),
                Effect::FetchReport {
                    request_id,
                    kind,
                    delay,
                } => {
                    triage_debug!("Report request {} for '{}'", request_id, kind);
                    self.engine.dispatch(EngineCommand::FetchReport {
                        request_id,
                        route: route_for(&kind),
                        delay,
                    });
                }
                Effect::LoadFailures => self.engine.dispatch(EngineCommand::LoadFailures),
                Effect::SaveViewingEvent { analysis_type } => self
                    .engine
                    .dispatch(EngineCommand::SaveViewingEvent { analysis_type }),
                Effect::LoadHistory => self.engine.dispatch(EngineCommand::LoadHistory),
                Effect::LoadSavedReport { id } => {
                    self.engine.dispatch(EngineCommand::LoadSavedReport { id })
                }
                Effect::PersistPreferences(preferences) => self.preferences.save(preferences),
            }
        }
    }

    /// Collects finished engine work, waiting up to `wait` for the first event.
    pub(crate) fn poll_events(&self, wait: Duration) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(event) = self.engine.recv_timeout(wait) {
            msgs.push(event_to_msg(event));
        }
        while let Some(event) = self.engine.try_recv() {
            msgs.push(event_to_msg(event));
        }
        msgs
    }
}

fn route_for(kind: &ReportKind) -> ReportRoute {
    match kind.query_type() {
        None => ReportRoute::Fast,
        Some(report_type) => ReportRoute::Generated {
            report_type: report_type.to_string(),
        },
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted { upload_id, result } => Msg::UploadCompleted {
            upload_id,
            result: result.map(upload_ack).map_err(transport_error),
        },
        EngineEvent::DefinitionsSaved { upload_id, result } => Msg::DefinitionsSaved {
            upload_id,
            result: result.map_err(transport_error),
        },
        EngineEvent::AnalysisStarted { result } => {
            Msg::AnalysisStarted(result.map_err(transport_error))
        }
        EngineEvent::ReportFetched { request_id, result } => Msg::ReportFetched {
            request_id,
            result: result.map(report_payload).map_err(transport_error),
        },
        EngineEvent::FailuresLoaded { result } => Msg::FailuresLoaded(
            result
                .map(|records| records.into_iter().map(FailureRow::new).collect())
                .map_err(transport_error),
        ),
        EngineEvent::ViewingEventSaved { result } => {
            Msg::ViewingEventSaved(result.map_err(transport_error))
        }
        EngineEvent::HistoryLoaded { result } => Msg::HistoryLoaded(
            result
                .map(|reports| reports.into_iter().map(saved_report_summary).collect())
                .map_err(transport_error),
        ),
        EngineEvent::SavedReportLoaded { id, result } => Msg::SavedReportLoaded {
            id,
            result: result
                .map(|detail| SavedReportDetail {
                    summary: saved_report_summary(detail.report),
                    failures: detail.failures.into_iter().map(FailureRow::new).collect(),
                })
                .map_err(transport_error),
        },
    }
}

fn transport_error(err: GatewayError) -> TransportError {
    triage_warn!("Backend call failed: {}", err);
    match err.kind {
        FailureKind::HttpStatus(code) => TransportError::with_status(code, err.to_string()),
        _ => TransportError::new(err.to_string()),
    }
}

fn upload_ack(reply: UploadReply) -> UploadAck {
    UploadAck {
        acknowledged: reply.accepted,
        unknown_terms: reply.unknown_terms,
        message: reply.message,
        rows: reply.rows,
        failure_count: reply.failure_count,
    }
}

fn report_payload(reply: ReportReply) -> ReportPayload {
    let status = match reply.status.as_deref() {
        Some("ready") => ReportStatus::Ready,
        Some("pending") => ReportStatus::Pending,
        Some("error") => ReportStatus::Error,
        Some(other) => {
            triage_debug!("Unrecognized report status {:?}", other);
            ReportStatus::Unspecified
        }
        None => ReportStatus::Unspecified,
    };
    ReportPayload {
        answer: reply.answer,
        status,
    }
}

fn saved_report_summary(report: SavedReport) -> SavedReportSummary {
    SavedReportSummary {
        id: report.id,
        timestamp: report.timestamp,
        machine_name: report.machine_name,
        analysis_type: report.analysis_type,
        total_failures: report.total_failures,
    }
}
