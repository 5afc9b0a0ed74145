//! Wiring between the accumulator and its side effects.
//!
//! The controller owns no state of its own. It forwards ticks and user
//! commands to the [`ActivityAccumulator`] and turns the resulting events
//! into UI updates and a notification sound.

use crate::libs::accumulator::{AccumulatorError, AccumulatorEvent, ActivityAccumulator, ActivitySource, CurrentDisplay, Phase};
use crate::libs::messages::Message;
use crate::libs::sound::NotificationSound;
use crate::msg_warning;

/// Commands the user can issue while the agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Resume,
    SetInterval(u32),
}

/// Presentation side of the agent.
pub trait ReminderUi: Send {
    /// Called on every sampled tick while running.
    fn render(&mut self, display: &CurrentDisplay);

    /// Surface the rest reminder.
    fn show_reminder(&mut self, display: &CurrentDisplay);

    fn phase_changed(&mut self, phase: Phase);

    /// Return to the normal countdown after a resume.
    fn restore_normal(&mut self, display: &CurrentDisplay);

    fn interval_changed(&mut self, minutes: u32);
}

pub struct ReminderController<U, S> {
    accumulator: ActivityAccumulator,
    ui: U,
    sound: S,
}

impl<U: ReminderUi, S: NotificationSound> ReminderController<U, S> {
    pub fn new(accumulator: ActivityAccumulator, ui: U, sound: S) -> Self {
        Self { accumulator, ui, sound }
    }

    pub fn accumulator(&self) -> &ActivityAccumulator {
        &self.accumulator
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn display(&self) -> CurrentDisplay {
        self.accumulator.display()
    }

    /// Runs one tick and dispatches whatever it produced.
    pub fn on_tick<A: ActivitySource + ?Sized>(&mut self, source: &mut A) -> Vec<AccumulatorEvent> {
        if self.accumulator.phase() == Phase::Resting {
            return Vec::new();
        }

        let events = self.accumulator.tick(source);
        let display = self.accumulator.display();

        if events.is_empty() {
            self.ui.render(&display);
        }
        self.dispatch(&events, &display);
        events
    }

    pub fn handle(&mut self, command: Command) -> Result<Vec<AccumulatorEvent>, AccumulatorError> {
        match command {
            Command::Resume => {
                let events = self.accumulator.resume();
                let display = self.accumulator.display();
                self.ui.restore_normal(&display);
                self.dispatch(&events, &display);
                Ok(events)
            }
            Command::SetInterval(minutes) => {
                self.accumulator.set_interval(minutes)?;
                self.ui.interval_changed(minutes);
                Ok(Vec::new())
            }
        }
    }

    fn dispatch(&mut self, events: &[AccumulatorEvent], display: &CurrentDisplay) {
        for event in events {
            match event {
                AccumulatorEvent::ReminderDue => {
                    self.ui.show_reminder(display);
                    if let Err(e) = self.sound.play() {
                        msg_warning!(Message::SoundFailed(e.to_string()));
                    }
                }
                AccumulatorEvent::PhaseChanged(phase) => self.ui.phase_changed(*phase),
            }
        }
    }
}
