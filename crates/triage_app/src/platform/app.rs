use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use triage_core::{update, AnalysisJobState, AppState, AppViewModel, Msg, Notice, PollPolicy};
use triage_engine::{ensure_state_dir, BackendSettings};
use triage_logging::{triage_info, triage_warn};

use super::commands::{parse_command, Command, HELP};
use super::effects::EffectRunner;
use super::persistence::PreferenceStore;
use super::render::{render_changes, render_full};
use super::Args;

const LOG_FILENAME: &str = "triage.log";
const INPUT_POLL: Duration = Duration::from_millis(50);
const ENGINE_POLL: Duration = Duration::from_millis(25);
const WAIT_LIMIT: Duration = Duration::from_secs(600);

pub fn run_app(args: Args) -> anyhow::Result<()> {
    ensure_state_dir(&args.state_dir)
        .with_context(|| format!("cannot use state directory {}", args.state_dir.display()))?;
    triage_logging::initialize(
        args.log_to.into(),
        args.log_level,
        &args.state_dir.join(LOG_FILENAME),
    );
    triage_info!("Starting triage client, state in {:?}", args.state_dir);

    let store = PreferenceStore::new(args.state_dir.clone());
    let restored = store.load();
    let runner = EffectRunner::new(BackendSettings::with_base_url(args.backend_url), store)
        .context("cannot set up the backend connection")?;

    let poll_policy = PollPolicy {
        interval: Duration::from_secs(args.poll_interval_secs),
        max_polls: args.poll_attempts,
    };
    let mut session = Session::new(runner, AppState::with_poll_policy(poll_policy));
    session.dispatch(Msg::PreferencesRestored(restored));

    println!("Type 'help' for commands.");
    let input = spawn_input_reader();

    loop {
        session.pump(ENGINE_POLL);
        match input.recv_timeout(INPUT_POLL) {
            Ok(line) => match parse_command(&line) {
                Ok(Command::Dispatch(msg)) => session.dispatch(msg),
                Ok(Command::Show) => print_lines(render_full(&session.state.view())),
                Ok(Command::Wait) => session.wait_until_idle(),
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Quit) => break,
                Ok(Command::Empty) => {}
                Err(err) => println!("{err:#}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                session.wait_until_idle();
                break;
            }
        }
    }

    triage_info!("Exiting triage client");
    Ok(())
}

fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });
    line_rx
}

/// Owns the controller state and the last rendered view.
struct Session {
    state: AppState,
    runner: EffectRunner,
    shown: AppViewModel,
}

impl Session {
    fn new(runner: EffectRunner, state: AppState) -> Self {
        let shown = state.view();
        Self {
            state,
            runner,
            shown,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notices = state.take_notices();
        let dirty = state.consume_dirty();
        self.state = state;

        for notice in &notices {
            print_notice(notice);
        }
        self.runner.run(effects);

        if dirty {
            let view = self.state.view();
            print_lines(render_changes(&self.shown, &view));
            self.shown = view;
        }
    }

    fn pump(&mut self, wait: Duration) {
        for msg in self.runner.poll_events(wait) {
            self.dispatch(msg);
        }
    }

    fn is_busy(&self) -> bool {
        let view = self.state.view();
        view.upload_in_flight
            || view.fetch_outstanding
            || view.loading
            || view.job == AnalysisJobState::Starting
    }

    fn wait_until_idle(&mut self) {
        let started = Instant::now();
        while self.is_busy() {
            if started.elapsed() > WAIT_LIMIT {
                triage_warn!("Gave up waiting for outstanding requests");
                println!("Still waiting on the backend; giving up.");
                return;
            }
            self.pump(Duration::from_millis(100));
        }
    }
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        triage_warn!("{}", notice);
    } else {
        triage_info!("{}", notice);
    }
    let marker = if notice.is_error() { "!" } else { "*" };
    println!("{} {} {}", Local::now().format("%H:%M:%S"), marker, notice);
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
