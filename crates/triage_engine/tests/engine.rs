use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use triage_engine::{
    EngineCommand, EngineEvent, EngineHandle, FailureKind, FailureRecord, Gateway, GatewayError,
    ReportReply, ReportRoute, SavedReport, SavedReportDetail, UploadReply, UploadRequest,
};

/// Records every call and answers from canned data.
#[derive(Default)]
struct FakeGateway {
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Gateway for FakeGateway {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReply, GatewayError> {
        self.record(format!("upload {}", request.path.display()));
        Ok(UploadReply {
            accepted: true,
            unknown_terms: vec!["TWF".to_string()],
            ..UploadReply::default()
        })
    }

    async fn submit_definitions(
        &self,
        definitions: &[(String, String)],
    ) -> Result<(), GatewayError> {
        self.record(format!("definitions {}", definitions.len()));
        Ok(())
    }

    async fn start_analysis(&self) -> Result<(), GatewayError> {
        self.record("start");
        Ok(())
    }

    async fn fetch_report(&self, route: &ReportRoute) -> Result<ReportReply, GatewayError> {
        match route {
            ReportRoute::Fast => {
                self.record("fast");
                Ok(ReportReply {
                    answer: Some("X".to_string()),
                    status: None,
                })
            }
            ReportRoute::Generated { report_type } => {
                self.record(format!("report {report_type}"));
                Err(GatewayError {
                    kind: FailureKind::HttpStatus(503),
                    message: "unavailable".to_string(),
                })
            }
        }
    }

    async fn failures(&self) -> Result<Vec<FailureRecord>, GatewayError> {
        self.record("failures");
        Ok(vec![vec![("a".to_string(), "1".to_string())]])
    }

    async fn save_viewing_event(&self, analysis_type: &str) -> Result<(), GatewayError> {
        self.record(format!("save {analysis_type}"));
        Ok(())
    }

    async fn saved_reports(&self) -> Result<Vec<SavedReport>, GatewayError> {
        self.record("history");
        Ok(Vec::new())
    }

    async fn saved_report(&self, id: &str) -> Result<SavedReportDetail, GatewayError> {
        self.record(format!("saved {id}"));
        Err(GatewayError {
            kind: FailureKind::HttpStatus(404),
            message: "Report not found".to_string(),
        })
    }
}

fn collect_events(engine: &EngineHandle, count: usize) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while events.len() < count && Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            events.push(event);
        }
    }
    events
}

#[test]
fn every_command_yields_one_matching_event() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = EngineHandle::with_gateway(gateway.clone()).expect("engine");

    engine.dispatch(EngineCommand::Upload {
        upload_id: 7,
        request: UploadRequest {
            path: "log.csv".into(),
            machine_name: None,
        },
    });
    engine.dispatch(EngineCommand::SubmitDefinitions {
        upload_id: 7,
        definitions: vec![("TWF".to_string(), String::new())],
    });
    engine.dispatch(EngineCommand::StartAnalysis);
    engine.dispatch(EngineCommand::FetchReport {
        request_id: 1,
        route: ReportRoute::Fast,
        delay: None,
    });
    engine.dispatch(EngineCommand::FetchReport {
        request_id: 2,
        route: ReportRoute::Generated {
            report_type: "why".to_string(),
        },
        delay: None,
    });
    engine.dispatch(EngineCommand::LoadFailures);
    engine.dispatch(EngineCommand::SaveViewingEvent {
        analysis_type: "Failure Scan".to_string(),
    });
    engine.dispatch(EngineCommand::LoadHistory);
    engine.dispatch(EngineCommand::LoadSavedReport {
        id: "r9".to_string(),
    });

    let events = collect_events(&engine, 9);
    assert_eq!(events.len(), 9);

    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::UploadCompleted { upload_id: 7, result: Ok(reply) } if reply.accepted
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::ReportFetched { request_id: 1, result: Ok(reply) }
            if reply.answer.as_deref() == Some("X")
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::ReportFetched { request_id: 2, result: Err(err) }
            if err.kind == FailureKind::HttpStatus(503)
    )));
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::DefinitionsSaved { upload_id: 7, result: Ok(()) })));
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::HistoryLoaded { result: Ok(_) })));
    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::SavedReportLoaded { id, result: Err(err) }
            if id == "r9" && err.kind == FailureKind::HttpStatus(404)
    )));

    let mut calls = gateway.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "definitions 1",
            "failures",
            "fast",
            "history",
            "report why",
            "save Failure Scan",
            "saved r9",
            "start",
            "upload log.csv",
        ]
    );
}

#[test]
fn delayed_report_fetch_waits_before_calling() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = EngineHandle::with_gateway(gateway.clone()).expect("engine");

    let started = Instant::now();
    engine.dispatch(EngineCommand::FetchReport {
        request_id: 3,
        route: ReportRoute::Fast,
        delay: Some(Duration::from_millis(150)),
    });
    assert!(engine.try_recv().is_none());

    let events = collect_events(&engine, 1);
    assert_eq!(events.len(), 1);
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(gateway.calls(), vec!["fast"]);
}
