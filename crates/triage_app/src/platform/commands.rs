use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use triage_core::{Msg, ReportKind};

pub(crate) const HELP: &str = "\
Commands:
  upload <path> [machine name]   upload a failure log CSV
  define <TERM> <meaning>        define a term the backend did not recognize
  submit                         save the definitions and start the analysis
  skip                           start the analysis without definitions
  report <kind>                  identify-failures, root-cause, impact, fix or any backend type
  failures                       open the failure log
  close                          close the failure log
  history [id]                   list saved reports, or open one
  back                           leave the opened saved report
  auto-analyze on|off            run failure identification after each upload
  notify on|off                  announce polled reports when ready
  reset                          start a new session
  show                           print the whole session
  wait                           block until uploads and reports settle
  help                           print this text
  quit                           leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Dispatch(Msg),
    Show,
    Wait,
    Help,
    Quit,
    Empty,
}

pub(crate) fn parse_command(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "upload" => {
            let (path, machine) = match rest.split_once(char::is_whitespace) {
                Some((path, machine)) => (path, Some(machine.trim().to_string())),
                None => (rest, None),
            };
            if path.is_empty() {
                bail!("usage: upload <path> [machine name]");
            }
            Command::Dispatch(Msg::UploadRequested {
                path: PathBuf::from(path),
                machine_name: machine,
            })
        }
        "define" => {
            let (term, meaning) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: define <TERM> <meaning>"))?;
            Command::Dispatch(Msg::TermDefined {
                term: term.to_string(),
                meaning: meaning.trim().to_string(),
            })
        }
        "submit" => Command::Dispatch(Msg::DefinitionsSubmitted),
        "skip" => Command::Dispatch(Msg::DefinitionsSkipped),
        "report" => {
            let kind = rest
                .parse::<ReportKind>()
                .context("usage: report <kind>")?;
            Command::Dispatch(Msg::ReportRequested(kind))
        }
        "failures" => Command::Dispatch(Msg::FailureLogRequested),
        "close" => Command::Dispatch(Msg::FailureLogClosed),
        "history" if rest.is_empty() => Command::Dispatch(Msg::HistoryRequested),
        "history" => Command::Dispatch(Msg::SavedReportRequested {
            id: rest.to_string(),
        }),
        "back" => Command::Dispatch(Msg::SavedReportClosed),
        "auto-analyze" => Command::Dispatch(Msg::AutoAnalyzeToggled(parse_switch(rest)?)),
        "notify" => Command::Dispatch(Msg::NotificationsToggled(parse_switch(rest)?)),
        "reset" => Command::Dispatch(Msg::SessionReset),
        "show" => Command::Show,
        "wait" => Command::Wait,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}', try 'help'"),
    };
    Ok(command)
}

fn parse_switch(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => bail!("expected on or off, got '{other}'"),
    }
}
