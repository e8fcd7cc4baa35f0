//! Plain-text rendering of the view model for the terminal front end.

use triage_core::{
    AnalysisJobState, AppViewModel, FailureLogView, MarkupLine, ReportView, SavedReportSummary,
    SavedReportView, TermSlot, UploadSummary,
};

pub(crate) fn status_line(view: &AppViewModel) -> String {
    let job = match view.job {
        AnalysisJobState::Idle => "idle",
        AnalysisJobState::AwaitingTerminology => "awaiting term definitions",
        AnalysisJobState::Starting => "starting analysis",
        AnalysisJobState::Running => "analysis running",
        AnalysisJobState::Failed => "analysis failed to start",
    };
    let mut parts = vec![format!("[{job}]")];
    if view.upload_in_flight {
        parts.push("uploading".to_string());
    }
    if view.fetch_outstanding {
        parts.push("fetching report".to_string());
    }
    if view.loading {
        parts.push("loading".to_string());
    }
    parts.push(format!(
        "auto-analyze {} | notify {}",
        on_off(view.preferences.auto_analyze),
        on_off(view.preferences.notifications)
    ));
    parts.join(" ")
}

/// Lines for the parts of `current` that differ from `previous`, followed by the status line.
pub(crate) fn render_changes(previous: &AppViewModel, current: &AppViewModel) -> Vec<String> {
    let mut out = Vec::new();

    if current.last_upload != previous.last_upload {
        if let Some(summary) = &current.last_upload {
            out.extend(render_upload(summary));
        }
    }
    if current.terminology != previous.terminology {
        if let Some(slots) = &current.terminology {
            out.extend(render_terminology(slots));
        }
    }
    for report in &current.reports {
        if !previous.reports.contains(report) {
            out.extend(render_report(report));
        }
    }
    if current.failure_log != previous.failure_log {
        match &current.failure_log {
            Some(log) => out.extend(render_failure_log(log)),
            None => out.push("Failure log closed.".to_string()),
        }
    }
    if current.history != previous.history {
        out.extend(render_history(&current.history));
    }
    if current.selected_report != previous.selected_report {
        match &current.selected_report {
            Some(report) => out.extend(render_saved_report(report)),
            None => out.push("Back to the report list.".to_string()),
        }
    }

    out.push(status_line(current));
    out
}

pub(crate) fn render_full(view: &AppViewModel) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(summary) = &view.last_upload {
        out.extend(render_upload(summary));
    }
    if let Some(slots) = &view.terminology {
        out.extend(render_terminology(slots));
    }
    if view.reports.is_empty() {
        out.push("No reports yet.".to_string());
    }
    for report in &view.reports {
        out.extend(render_report(report));
    }
    if let Some(log) = &view.failure_log {
        out.extend(render_failure_log(log));
    }
    if !view.history.is_empty() {
        out.extend(render_history(&view.history));
    }
    if let Some(report) = &view.selected_report {
        out.extend(render_saved_report(report));
    }
    out.push(status_line(view));
    out
}

fn render_upload(summary: &UploadSummary) -> Vec<String> {
    let mut line = summary
        .message
        .clone()
        .unwrap_or_else(|| "Upload accepted".to_string());
    if let Some(rows) = summary.rows {
        line.push_str(&format!(", {rows} rows"));
    }
    if let Some(failures) = summary.failure_count {
        line.push_str(&format!(", {failures} failures"));
    }
    vec![line]
}

fn render_terminology(slots: &[TermSlot]) -> Vec<String> {
    let mut out = vec!["The backend does not know these terms:".to_string()];
    for slot in slots {
        if slot.meaning.is_empty() {
            out.push(format!("  {:<10} (undefined)", slot.term));
        } else {
            out.push(format!("  {:<10} {}", slot.term, slot.meaning));
        }
    }
    out.push("Use 'define', then 'submit' or 'skip'.".to_string());
    out
}

fn render_report(report: &ReportView) -> Vec<String> {
    let mut out = vec![String::new(), format!("== {} ==", report.title)];
    for line in &report.lines {
        match line {
            MarkupLine::Heading(text) => {
                out.push(text.clone());
                out.push("-".repeat(text.chars().count()));
            }
            MarkupLine::Emphasis(text) => out.push(format!("> {text}")),
            MarkupLine::Text(text) => out.push(text.clone()),
        }
    }
    out
}

fn render_failure_log(log: &FailureLogView) -> Vec<String> {
    let widths: Vec<usize> = log
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            log.rows
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![
        String::new(),
        format!("Failure log ({} rows)", log.rows.len()),
        format_row(&log.columns),
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    ];
    out.extend(log.rows.iter().map(|row| format_row(row)));
    out
}

fn render_saved_report(report: &SavedReportView) -> Vec<String> {
    let summary = &report.summary;
    let mut out = vec![
        String::new(),
        format!("== {} Report ==", summary.analysis_type),
        format!(
            "Machine: {} | Date: {}",
            summary.machine_name.as_deref().unwrap_or("-"),
            summary.timestamp
        ),
    ];
    if !report.failures.rows.is_empty() {
        let mut table = render_failure_log(&report.failures);
        if let Some(total) = summary.total_failures {
            table[1] = format!("Failure log ({total})");
        }
        out.extend(table);
    }
    out
}

fn render_history(history: &[SavedReportSummary]) -> Vec<String> {
    if history.is_empty() {
        return vec!["No saved reports.".to_string()];
    }
    let mut out = vec![String::new(), "Saved reports:".to_string()];
    for entry in history {
        let machine = entry.machine_name.as_deref().unwrap_or("-");
        let failures = entry
            .total_failures
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push(format!(
            "  #{} {} {} [{}] failures: {}",
            entry.id, entry.timestamp, entry.analysis_type, machine, failures
        ));
    }
    out
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
