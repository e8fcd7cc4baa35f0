use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use triage_logging::triage_debug;

use crate::gateway::{BackendSettings, Gateway, ReqwestGateway};
use crate::{EngineEvent, FailureKind, GatewayError, ReportRoute, RequestId, UploadRequest};

/// Work the engine executes against the backend. Every command produces
/// exactly one [`EngineEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Upload {
        upload_id: RequestId,
        request: UploadRequest,
    },
    SubmitDefinitions {
        upload_id: RequestId,
        definitions: Vec<(String, String)>,
    },
    StartAnalysis,
    FetchReport {
        request_id: RequestId,
        route: ReportRoute,
        delay: Option<Duration>,
    },
    LoadFailures,
    SaveViewingEvent {
        analysis_type: String,
    },
    LoadHistory,
    LoadSavedReport {
        id: String,
    },
}

/// Runs gateway calls on a background tokio runtime. Commands are executed
/// concurrently; completion order is not dispatch order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: BackendSettings) -> Result<Self, GatewayError> {
        let gateway = ReqwestGateway::new(settings)?;
        Self::with_gateway(Arc::new(gateway)).map_err(|err| {
            GatewayError::new(FailureKind::Network, format!("engine runtime: {err}"))
        })
    }

    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("triage-engine")
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let gateway = gateway.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_command(gateway.as_ref(), command).await;
                    let _ = event_tx.send(event);
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn dispatch(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(gateway: &dyn Gateway, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Upload { upload_id, request } => EngineEvent::UploadCompleted {
            upload_id,
            result: gateway.upload(&request).await,
        },
        EngineCommand::SubmitDefinitions {
            upload_id,
            definitions,
        } => EngineEvent::DefinitionsSaved {
            upload_id,
            result: gateway.submit_definitions(&definitions).await,
        },
        EngineCommand::StartAnalysis => EngineEvent::AnalysisStarted {
            result: gateway.start_analysis().await,
        },
        EngineCommand::FetchReport {
            request_id,
            route,
            delay,
        } => {
            if let Some(delay) = delay {
                triage_debug!("Report request {} waiting {:?}", request_id, delay);
                tokio::time::sleep(delay).await;
            }
            EngineEvent::ReportFetched {
                request_id,
                result: gateway.fetch_report(&route).await,
            }
        }
        EngineCommand::LoadFailures => EngineEvent::FailuresLoaded {
            result: gateway.failures().await,
        },
        EngineCommand::SaveViewingEvent { analysis_type } => EngineEvent::ViewingEventSaved {
            result: gateway.save_viewing_event(&analysis_type).await,
        },
        EngineCommand::LoadHistory => EngineEvent::HistoryLoaded {
            result: gateway.saved_reports().await,
        },
        EngineCommand::LoadSavedReport { id } => {
            let result = gateway.saved_report(&id).await;
            EngineEvent::SavedReportLoaded { id, result }
        }
    }
}
