use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use triage_core::{
    update, AnalysisJobState, AppState, Effect, Gate, Msg, Notice, Preferences, TermSlot,
    TransportError, UploadAck, UploadId,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(triage_logging::initialize_for_tests);
}

/// State with auto-analyze off so uploads only produce gate effects.
fn manual_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::PreferencesRestored(Preferences {
            auto_analyze: false,
            notifications: false,
        }),
    );
    state
}

fn request_upload(state: AppState) -> (AppState, UploadId) {
    let (state, effects) = update(
        state,
        Msg::UploadRequested {
            path: PathBuf::from("logs.csv"),
            machine_name: Some("KUKA Robot".to_string()),
        },
    );
    let upload_id = match effects.as_slice() {
        [Effect::Upload { upload_id, .. }] => *upload_id,
        other => panic!("expected a single upload effect, got {other:?}"),
    };
    (state, upload_id)
}

fn acknowledge(state: AppState, upload_id: UploadId, terms: &[&str]) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::UploadCompleted {
            upload_id,
            result: Ok(UploadAck {
                acknowledged: true,
                unknown_terms: terms.iter().map(|term| term.to_string()).collect(),
                ..UploadAck::default()
            }),
        },
    )
}

fn count_starts(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::StartAnalysis))
        .count()
}

#[test]
fn upload_trims_machine_name_and_drops_blank_one() {
    init_logging();
    let (_, effects) = update(
        manual_state(),
        Msg::UploadRequested {
            path: PathBuf::from("a.csv"),
            machine_name: Some("   ".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Upload {
            upload_id: 1,
            path: PathBuf::from("a.csv"),
            machine_name: None,
        }]
    );
}

#[test]
fn upload_without_unknown_terms_starts_analysis_once() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());
    assert!(state.view().upload_in_flight);

    let (state, effects) = acknowledge(state, upload_id, &[]);

    assert_eq!(effects, vec![Effect::StartAnalysis]);
    assert_eq!(state.gate(), &Gate::Clear);
    assert_eq!(state.job(), AnalysisJobState::Starting);
    assert!(state.view().terminology.is_none());
    assert!(!state.view().upload_in_flight);
}

#[test]
fn upload_with_unknown_terms_blocks_with_one_slot_per_term() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());

    let (state, effects) = acknowledge(state, upload_id, &["TWF", "HDF", "PWF"]);

    assert!(effects.is_empty());
    assert_eq!(state.job(), AnalysisJobState::AwaitingTerminology);
    let slots = state.view().terminology.expect("gate is blocked");
    let terms: Vec<_> = slots.iter().map(|slot| slot.term.as_str()).collect();
    assert_eq!(terms, vec!["TWF", "HDF", "PWF"]);
    assert!(slots.iter().all(|slot| slot.meaning.is_empty()));
}

#[test]
fn partial_definitions_are_submitted_and_start_follows_the_save() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());
    let (state, _) = acknowledge(state, upload_id, &["TWF", "HDF", "PWF"]);
    let (state, _) = update(
        state,
        Msg::TermDefined {
            term: "TWF".to_string(),
            meaning: "Tool Wear Failure".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::TermDefined {
            term: "HDF".to_string(),
            meaning: "Heat Dissipation Failure".to_string(),
        },
    );

    let (state, effects) = update(state, Msg::DefinitionsSubmitted);
    assert_eq!(
        effects,
        vec![Effect::SubmitDefinitions {
            upload_id,
            definitions: vec![
                ("TWF".to_string(), "Tool Wear Failure".to_string()),
                ("HDF".to_string(), "Heat Dissipation Failure".to_string()),
                ("PWF".to_string(), String::new()),
            ],
        }]
    );
    assert_eq!(state.gate(), &Gate::Clear);
    assert_eq!(state.job(), AnalysisJobState::Starting);

    let (state, effects) = update(
        state,
        Msg::DefinitionsSaved {
            upload_id,
            result: Ok(()),
        },
    );
    assert_eq!(count_starts(&effects), 1);

    // A duplicate completion must not start a second job.
    let (_, effects) = update(
        state,
        Msg::DefinitionsSaved {
            upload_id,
            result: Ok(()),
        },
    );
    assert_eq!(count_starts(&effects), 0);
}

#[test]
fn failed_definitions_save_still_starts_analysis_and_notifies() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());
    let (state, _) = acknowledge(state, upload_id, &["TWF"]);
    let (state, _) = update(state, Msg::DefinitionsSubmitted);

    let (mut state, effects) = update(
        state,
        Msg::DefinitionsSaved {
            upload_id,
            result: Err(TransportError::new("http status 500")),
        },
    );

    assert_eq!(effects, vec![Effect::StartAnalysis]);
    assert_eq!(
        state.take_notices(),
        vec![Notice::DefinitionsSaveFailed {
            message: "http status 500".to_string()
        }]
    );
}

#[test]
fn skipping_starts_analysis_without_sending_definitions() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());
    let (state, _) = acknowledge(state, upload_id, &["TWF", "OSF"]);
    let (state, _) = update(
        state,
        Msg::TermDefined {
            term: "TWF".to_string(),
            meaning: "Tool Wear Failure".to_string(),
        },
    );

    let (state, effects) = update(state, Msg::DefinitionsSkipped);

    assert_eq!(effects, vec![Effect::StartAnalysis]);
    assert_eq!(state.gate(), &Gate::Clear);

    // The gate is clear now; neither action does anything further.
    let (state, effects) = update(state, Msg::DefinitionsSubmitted);
    assert!(effects.is_empty());
    let (_, effects) = update(state, Msg::DefinitionsSkipped);
    assert!(effects.is_empty());
}

#[test]
fn second_upload_replaces_pending_terms() {
    init_logging();
    let (state, first) = request_upload(manual_state());
    let (state, _) = acknowledge(state, first, &["TWF", "HDF"]);

    let (state, second) = request_upload(state);
    let (state, effects) = acknowledge(state, second, &["RNF"]);

    assert!(effects.is_empty());
    assert_eq!(
        state.view().terminology,
        Some(vec![TermSlot {
            term: "RNF".to_string(),
            meaning: String::new(),
        }])
    );
}

#[test]
fn stale_upload_completion_is_ignored() {
    init_logging();
    let (state, first) = request_upload(manual_state());
    let (state, second) = request_upload(state);

    let (state, effects) = acknowledge(state, first, &[]);
    assert!(effects.is_empty());
    assert!(state.view().upload_in_flight);

    let (_, effects) = acknowledge(state, second, &[]);
    assert_eq!(effects, vec![Effect::StartAnalysis]);
}

#[test]
fn definitions_save_of_superseded_upload_does_not_start() {
    init_logging();
    let (state, first) = request_upload(manual_state());
    let (state, _) = acknowledge(state, first, &["TWF"]);
    let (state, _) = update(state, Msg::DefinitionsSubmitted);

    let (state, second) = request_upload(state);
    let (state, _) = acknowledge(state, second, &["HDF"]);

    let (state, effects) = update(
        state,
        Msg::DefinitionsSaved {
            upload_id: first,
            result: Ok(()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.gate().is_blocked());
}

#[test]
fn upload_failure_notifies_and_leaves_gate_alone() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());

    let (mut state, effects) = update(
        state,
        Msg::UploadCompleted {
            upload_id,
            result: Err(TransportError::new("network error")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.gate(), &Gate::Clear);
    assert_eq!(state.job(), AnalysisJobState::Idle);
    assert_eq!(
        state.take_notices(),
        vec![Notice::UploadFailed {
            message: "network error".to_string()
        }]
    );
}

#[test]
fn rejected_upload_is_reported_like_a_failure() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());

    let (mut state, effects) = update(
        state,
        Msg::UploadCompleted {
            upload_id,
            result: Ok(UploadAck {
                acknowledged: false,
                unknown_terms: vec!["TWF".to_string()],
                message: Some("Failed to parse CSV".to_string()),
                ..UploadAck::default()
            }),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.gate().is_blocked());
    assert_eq!(
        state.take_notices(),
        vec![Notice::UploadFailed {
            message: "Failed to parse CSV".to_string()
        }]
    );
}

#[test]
fn analysis_start_outcome_sets_job_state() {
    init_logging();
    let (state, upload_id) = request_upload(manual_state());
    let (state, _) = acknowledge(state, upload_id, &[]);

    let (state, _) = update(state, Msg::AnalysisStarted(Ok(())));
    assert_eq!(state.job(), AnalysisJobState::Running);

    let (state, upload_id) = request_upload(state);
    let (state, _) = acknowledge(state, upload_id, &[]);
    let (mut state, effects) = update(
        state,
        Msg::AnalysisStarted(Err(TransportError::new("timeout"))),
    );
    assert!(effects.is_empty());
    assert_eq!(state.job(), AnalysisJobState::Failed);
    // Start failures are only logged.
    assert!(state.take_notices().is_empty());
}

#[test]
fn auto_analyze_requests_failure_identification_after_upload() {
    init_logging();
    let (state, upload_id) = request_upload(AppState::new());

    let (state, effects) = acknowledge(state, upload_id, &["TWF"]);

    assert_eq!(effects.len(), 1);
    assert!(matches!(
        &effects[0],
        Effect::FetchReport { kind, delay: None, .. } if kind.is_fast_path()
    ));
    assert!(state.fetch_outstanding());
}
