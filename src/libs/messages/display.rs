//! Display implementation for eyerest messages.
//!
//! Every user-facing string lives here, so wording changes and a future
//! translation touch one file only.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration deleted, defaults will be used".to_string(),
            Message::ConfigSaveFailed(error) => format!("Failed to save configuration: {}", error),
            Message::ConfigModuleReminder => "Reminder settings".to_string(),
            Message::ConfigModuleSound => "Notification sound".to_string(),
            Message::PromptReminderInterval => "Remind me to rest after".to_string(),
            Message::ReminderIntervalOption(minutes) => format!("{} minutes of activity", minutes),
            Message::PromptSoundThreshold => "Audio peak level that counts as playback (0.0 - 1.0)".to_string(),
            Message::InvalidSoundThreshold(value) => format!("Threshold must be at least 0.0 and below 1.0, got {}", value),
            Message::PromptBellEnabled => "Ring the terminal bell on reminders?".to_string(),
            Message::PromptSoundCommand => "Sound command (leave empty for none)".to_string(),
            Message::InvalidReminderInterval(minutes) => format!("Invalid reminder interval: {} minutes. Must be at least 1", minutes),
            Message::ReminderIntervalSaved(minutes) => format!("Reminder interval set to {} minutes", minutes),
            Message::IntervalAppliesOnRestart(pid) => {
                format!("Agent (PID {}) is running; type 'interval' in its terminal or restart it to apply", pid)
            }

            // === REMINDER MESSAGES ===
            Message::Countdown { remaining, activity } => format!("⏳ {} until rest  [{}]", remaining, activity),
            Message::ReminderDue(time) => format!("👀 {} Time to rest your eyes. Look at something 20 feet away, then type 'resume'", time),
            Message::CountingResumed(remaining) => format!("Counting resumed, {} until the next rest", remaining),
            Message::ReminderIntervalChanged(minutes) => format!("Reminder interval changed to {} minutes", minutes),
            Message::PhaseChanged(phase) => format!("Phase changed to {}", phase),
            Message::ActivityIdle => "idle".to_string(),
            Message::ActivityInput => "input".to_string(),
            Message::ActivityAudio => "audio".to_string(),

            // === AGENT MESSAGES ===
            Message::AgentStarted {
                interval_minutes,
                sound_threshold,
            } => format!(
                "Eye rest agent started: reminder every {} minutes, audio threshold {}",
                interval_minutes, sound_threshold
            ),
            Message::AgentCommandsHint => "Commands: resume (r), interval <minutes> (i), status (s), quit (q)".to_string(),
            Message::AgentStatus { phase, remaining, activity } => {
                format!("Phase: {}, remaining: {}, activity: {}", phase, remaining, activity)
            }
            Message::AgentShuttingDown => "Shutting down eye rest agent...".to_string(),
            Message::AgentStopped => "Eye rest agent stopped".to_string(),
            Message::AgentError(error) => format!("Agent error: {}", error),
            Message::AgentAlreadyRunning(pid) => format!("Eye rest agent is already running (PID {})", pid),
            Message::StalePidFileReplaced(pid) => format!("Replacing stale PID file left by process {}", pid),
            Message::InvalidPidFileContent => "PID file is unreadable, replacing it".to_string(),
            Message::UnknownCommand(input) => format!("Unknown command: '{}'", input),
            Message::CommandRejected(error) => format!("Command rejected: {}", error),
            Message::StdinClosed => "Standard input closed, console commands disabled".to_string(),

            // === SIGNAL MESSAGES ===
            Message::ReceivedSigterm => "Received SIGTERM, shutting down gracefully...".to_string(),
            Message::ReceivedSigint => "Received SIGINT, shutting down gracefully...".to_string(),
            Message::ReceivedCtrlC => "Received Ctrl+C, shutting down gracefully...".to_string(),
            Message::SignalHandlerFailed(error) => format!("Failed to install signal handler: {}", error),
            Message::SignalHandlingNotSupported => "Signal handling not supported on this platform".to_string(),

            // === PROBE MESSAGES ===
            Message::ProbeHeader(count) => format!("Sampling activity probes {} times, once per second", count),
            Message::ProbeSample {
                idle_seconds,
                input_active,
                audio_active,
                activity,
            } => format!(
                "idle {:>4}s | input {:<5} | audio {:<5} | counts as {}",
                idle_seconds, input_active, audio_active, activity
            ),
            Message::ProbeWorkerStopped => "Probe worker stopped".to_string(),
            Message::ProbeTimedOut(millis) => format!("Audio probe did not answer within {} ms, counting audio as inactive", millis),
            Message::AudioProbeBusy => "Audio probe still busy with an earlier request, counting audio as inactive".to_string(),
            Message::ProbeWorkerDetached => "Audio probe worker did not stop in time, leaving it behind".to_string(),
            Message::InputListenerFailed(error) => format!("Input listener failed: {}", error),
            Message::InputListenerUnavailable => "Input listener unavailable, treating the user as always active".to_string(),

            // === AUDIO MESSAGES ===
            Message::AudioBackendUnavailable(reason) => format!("Audio detection unavailable: {}", reason),
            Message::AudioListenerRegistrationFailed(error) => format!("Failed to register default device listener: {}", error),
            Message::AudioProbeStarted => "Audio probe started".to_string(),
            Message::AudioProbeStopped => "Audio probe stopped".to_string(),
            Message::AudioDeviceChanged => "Default playback device changed".to_string(),
            Message::AudioDeviceInvalid => "Audio device handle is no longer active".to_string(),
            Message::AudioQueryFailed(error) => format!("Audio meter query failed: {}", error),
            Message::AudioReacquireDiscarded => "Another thread already reacquired the audio device".to_string(),
            Message::AudioDeviceAcquired(id) => format!("Acquired audio device {}", id),
            Message::AudioDeviceAcquisitionFailed(error) => format!("Failed to acquire audio device: {}", error),

            // === SOUND MESSAGES ===
            Message::SoundCommandEmpty => "Sound command is empty".to_string(),
            Message::SoundFailed(error) => format!("Failed to play notification sound: {}", error),
        };

        write!(f, "{}", text)
    }
}
