//! Terminal presentation of the reminder countdown.

use crate::libs::accumulator::{format_remaining, ActivityKind, CurrentDisplay, Phase};
use crate::libs::controller::ReminderUi;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_print, msg_success};
use chrono::Local;

/// Label shown next to the countdown.
pub fn activity_label(kind: ActivityKind) -> Message {
    match kind {
        ActivityKind::Idle => Message::ActivityIdle,
        ActivityKind::Input => Message::ActivityInput,
        ActivityKind::Audio => Message::ActivityAudio,
    }
}

/// Countdown text; resting has no countdown.
pub fn countdown_text(display: &CurrentDisplay) -> String {
    match display.phase {
        Phase::Running => format_remaining(display.remaining_seconds),
        Phase::Resting => "--:--".to_string(),
    }
}

pub fn status_message(display: &CurrentDisplay) -> Message {
    Message::AgentStatus {
        phase: display.phase.to_string(),
        remaining: countdown_text(display),
        activity: activity_label(display.activity).to_string(),
    }
}

/// Prints the countdown whenever the displayed minute or the activity label
/// changes, so a one-second tick does not flood the terminal.
#[derive(Debug, Default)]
pub struct ConsoleUi {
    last_minute: Option<u32>,
    last_activity: Option<ActivityKind>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// The countdown line for `view`, or `None` when it would repeat the
    /// last printed minute and activity label.
    pub fn countdown_update(&mut self, view: &CurrentDisplay) -> Option<Message> {
        let minute = view.remaining_seconds / 60;
        if self.last_minute == Some(minute) && self.last_activity == Some(view.activity) {
            return None;
        }
        self.last_minute = Some(minute);
        self.last_activity = Some(view.activity);

        Some(Message::Countdown {
            remaining: countdown_text(view),
            activity: activity_label(view.activity).to_string(),
        })
    }

    fn forget(&mut self) {
        self.last_minute = None;
        self.last_activity = None;
    }
}

impl ReminderUi for ConsoleUi {
    fn render(&mut self, view: &CurrentDisplay) {
        if let Some(line) = self.countdown_update(view) {
            msg_print!(line);
        }
    }

    fn show_reminder(&mut self, _view: &CurrentDisplay) {
        self.forget();
        msg_print!(Message::ReminderDue(Local::now().format("%H:%M").to_string()), true);
    }

    fn phase_changed(&mut self, phase: Phase) {
        msg_debug!(Message::PhaseChanged(phase.to_string()));
    }

    fn restore_normal(&mut self, view: &CurrentDisplay) {
        self.forget();
        let remaining = countdown_text(view);
        msg_success!(Message::CountingResumed(remaining));
    }

    fn interval_changed(&mut self, minutes: u32) {
        self.forget();
        msg_success!(Message::ReminderIntervalChanged(minutes));
    }
}
