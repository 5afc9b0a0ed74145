//! Foreground agent: the 1 Hz tick loop plus user commands and shutdown.
//!
//! Ticks, console commands, and shutdown signals are all awaited by one
//! `select!` on one task, so the accumulator is never touched concurrently.

use crate::libs::accumulator::{ActivityAccumulator, ActivitySource};
use crate::libs::audio::SoundThreshold;
use crate::libs::config::Config;
use crate::libs::console::{status_message, ConsoleUi};
use crate::libs::controller::{Command, ReminderController, ReminderUi};
use crate::libs::instance::InstanceGuard;
use crate::libs::messages::Message;
use crate::libs::sampler::system_sampler;
use crate::libs::sound::{sound_from_config, NotificationSound};
use crate::{msg_debug, msg_error, msg_info, msg_print, msg_warning};
use anyhow::Result;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// Tick period of the accumulator.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A line typed into the agent's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(Command),
    Status,
    Quit,
}

/// Parses `resume`, `interval <minutes>`, `status`, `quit` and their
/// one-letter forms. Returns `None` for anything else.
pub fn parse_input(line: &str) -> Option<ConsoleInput> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?.to_lowercase();
    match verb.as_str() {
        "r" | "resume" => Some(ConsoleInput::Command(Command::Resume)),
        "i" | "interval" => {
            let minutes = parts.next()?.parse().ok()?;
            Some(ConsoleInput::Command(Command::SetInterval(minutes)))
        }
        "s" | "status" => Some(ConsoleInput::Status),
        "q" | "quit" | "exit" => Some(ConsoleInput::Quit),
        _ => None,
    }
}

/// Runs the agent until Ctrl+C, SIGTERM, or `quit`.
pub async fn run_with_signal_handling() -> Result<()> {
    let _guard = InstanceGuard::acquire()?;

    let config = Config::read()?;
    let reminder = config.reminder_or_default();
    let accumulator = ActivityAccumulator::new(reminder.interval_minutes)?;
    let mut controller = ReminderController::new(accumulator, ConsoleUi::new(), sound_from_config(&config.sound_or_default()));

    let threshold = Arc::new(SoundThreshold::new(reminder.sound_threshold));
    let mut sampler = system_sampler(threshold)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    spawn_signal_handler(shutdown_tx);

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(input_tx);

    msg_info!(Message::AgentStarted {
        interval_minutes: reminder.interval_minutes,
        sound_threshold: reminder.sound_threshold,
    });
    msg_print!(Message::AgentCommandsHint);

    run_loop(&mut controller, &mut sampler, input_rx, shutdown_rx).await;

    msg_info!(Message::AgentStopped);
    Ok(())
}

/// The tick loop itself. Must run on a multi-threaded runtime: sampling
/// blocks for up to the probe timeout and is moved off the async workers.
///
/// Returns on `quit` or a shutdown signal. A dropped shutdown sender only
/// disables that branch.
pub async fn run_loop<U, S, A>(
    controller: &mut ReminderController<U, S>,
    source: &mut A,
    mut inputs: mpsc::UnboundedReceiver<ConsoleInput>,
    mut shutdown: oneshot::Receiver<()>,
) where
    U: ReminderUi,
    S: NotificationSound,
    A: ActivitySource,
{
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut inputs_open = true;
    let mut shutdown_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tokio::task::block_in_place(|| controller.on_tick(source));
            }
            input = inputs.recv(), if inputs_open => match input {
                Some(ConsoleInput::Command(command)) => apply_command(controller, command),
                Some(ConsoleInput::Status) => msg_print!(status_message(&controller.display())),
                Some(ConsoleInput::Quit) => break,
                None => inputs_open = false,
            },
            signal = &mut shutdown, if shutdown_open => match signal {
                Ok(()) => {
                    msg_info!(Message::AgentShuttingDown);
                    break;
                }
                Err(_) => shutdown_open = false,
            },
        }
    }
}

fn apply_command<U: ReminderUi, S: NotificationSound>(controller: &mut ReminderController<U, S>, command: Command) {
    match controller.handle(command) {
        Ok(_) => {
            if let Command::SetInterval(minutes) = command {
                if let Err(e) = persist_interval(minutes) {
                    msg_warning!(Message::ConfigSaveFailed(e.to_string()));
                }
            }
        }
        Err(e) => msg_error!(Message::CommandRejected(e.to_string())),
    }
}

fn persist_interval(minutes: u32) -> Result<()> {
    let mut config = Config::read()?;
    config.set_interval(minutes)?;
    config.save()
}

/// Reads commands on a plain thread; a blocking stdin read inside the
/// runtime would hold up shutdown.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<ConsoleInput>) {
    let spawned = std::thread::Builder::new().name("eyerest-stdin".into()).spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_input(&line) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None => msg_warning!(Message::UnknownCommand(line.trim().to_string())),
            }
        }
        msg_debug!(Message::StdinClosed);
    });

    if let Err(e) = spawned {
        msg_warning!(Message::AgentError(e.to_string()));
    }
}

fn spawn_signal_handler(shutdown_tx: oneshot::Sender<()>) {
    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    msg_error!(Message::SignalHandlerFailed(e.to_string()));
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => msg_info!(Message::ReceivedSigterm),
                _ = sigint.recv() => msg_info!(Message::ReceivedSigint),
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => msg_info!(Message::ReceivedCtrlC),
                Err(e) => {
                    msg_error!(Message::SignalHandlerFailed(e.to_string()));
                    return;
                }
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(not(any(unix, windows)))]
    {
        drop(shutdown_tx);
        msg_warning!(Message::SignalHandlingNotSupported);
    }
}
