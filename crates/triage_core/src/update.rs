use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadRequested { path, machine_name } => {
            vec![state.request_upload(path, machine_name)]
        }
        Msg::UploadCompleted { upload_id, result } => state.apply_upload_result(upload_id, result),
        Msg::TermDefined { term, meaning } => {
            state.define_term(&term, meaning);
            Vec::new()
        }
        Msg::DefinitionsSubmitted => state.submit_definitions(),
        Msg::DefinitionsSkipped => state.skip_definitions(),
        Msg::DefinitionsSaved { upload_id, result } => {
            state.apply_definitions_saved(upload_id, result)
        }
        Msg::AnalysisStarted(result) => {
            state.apply_analysis_started(result);
            Vec::new()
        }
        Msg::ReportRequested(kind) => vec![state.issue_report_fetch(kind, 0, None)],
        Msg::ReportFetched { request_id, result } => state.apply_report_result(request_id, result),
        Msg::FailureLogRequested => vec![state.request_failures()],
        Msg::FailuresLoaded(result) => state.apply_failures(result),
        Msg::FailureLogClosed => {
            state.close_failure_log();
            Vec::new()
        }
        Msg::ViewingEventSaved(result) => {
            state.apply_viewing_event_saved(result);
            Vec::new()
        }
        Msg::HistoryRequested => vec![state.request_history()],
        Msg::HistoryLoaded(result) => {
            state.apply_history(result);
            Vec::new()
        }
        Msg::SavedReportRequested { id } => state.request_saved_report(id),
        Msg::SavedReportLoaded { id, result } => {
            state.apply_saved_report(id, result);
            Vec::new()
        }
        Msg::SavedReportClosed => {
            state.close_saved_report();
            Vec::new()
        }
        Msg::PreferencesRestored(preferences) => {
            state.restore_preferences(preferences);
            Vec::new()
        }
        Msg::AutoAnalyzeToggled(enabled) => {
            state.update_preferences(|preferences| preferences.auto_analyze = enabled)
        }
        Msg::NotificationsToggled(enabled) => {
            state.update_preferences(|preferences| preferences.notifications = enabled)
        }
        Msg::SessionReset => {
            state.reset_session();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
