//! Persistent settings for the reminder agent.
//!
//! Settings live in a JSON file in the per-user data directory (see
//! [`DataStorage`]). Each section is optional so a missing or partial file
//! still yields a working agent with default behaviour.
//!
//! ## Configuration Structure
//!
//! - **Reminder**: interval length, audio threshold, UI language
//! - **Sound**: how the reminder is announced
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use eyerest::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.set_interval(30)?;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::accumulator::DEFAULT_INTERVAL_MINUTES;
use crate::libs::audio::DEFAULT_SOUND_THRESHOLD;
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_print};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Intervals offered by the setup wizard, in minutes.
pub const REMINDER_INTERVAL_CHOICES: [u32; 4] = [20, 30, 40, 50];

/// Whether `value` is usable as a peak threshold: `0.0 <= value < 1.0`.
/// NaN is rejected.
pub fn is_valid_sound_threshold(value: f32) -> bool {
    (0.0..1.0).contains(&value)
}

/// Reminder timing and detection settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReminderConfig {
    /// Minutes of accumulated activity before a rest reminder.
    pub interval_minutes: u32,

    /// Peak meter value (0.0 to 1.0) above which playback counts as activity.
    ///
    /// The default is low enough that any audible output qualifies while
    /// digital silence from an idle player does not.
    pub sound_threshold: f32,

    /// UI language code. Kept for the presentation layer only.
    pub language: String,
}

/// How a due reminder is announced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SoundConfig {
    /// Ring the terminal bell.
    pub bell: bool,

    /// External player command, program first. Takes precedence over the bell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<ReminderConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<SoundConfig>,
}

impl Default for ReminderConfig {
    /// 20 minutes, the interval of the 20-20-20 eye rest rule.
    fn default() -> Self {
        ReminderConfig {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            sound_threshold: DEFAULT_SOUND_THRESHOLD,
            language: "en".to_string(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig { bell: true, command: None }
    }
}

impl Config {
    /// Loads the configuration, or defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if it holds a sound threshold outside `[0.0, 1.0)`.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        if let Some(reminder) = &config.reminder {
            if !is_valid_sound_threshold(reminder.sound_threshold) {
                msg_bail_anyhow!(Message::InvalidSoundThreshold(reminder.sound_threshold.to_string()));
            }
        }
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file if present.
    pub fn delete() -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if config_file_path.exists() {
            fs::remove_file(config_file_path)?;
        }
        Ok(())
    }

    /// Reminder settings with defaults filled in.
    pub fn reminder_or_default(&self) -> ReminderConfig {
        self.reminder.clone().unwrap_or_default()
    }

    /// Sound settings with defaults filled in.
    pub fn sound_or_default(&self) -> SoundConfig {
        self.sound.clone().unwrap_or_default()
    }

    /// Validates and stores a new reminder interval.
    pub fn set_interval(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            msg_bail_anyhow!(Message::InvalidReminderInterval(minutes));
        }
        let mut reminder = self.reminder_or_default();
        reminder.interval_minutes = minutes;
        self.reminder = Some(reminder);
        Ok(())
    }

    /// Interactive setup wizard.
    ///
    /// Starts from the current settings, asks for the interval, threshold,
    /// and sound, and returns the result without saving it.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();
        let theme = ColorfulTheme::default();

        let reminder = config.reminder_or_default();
        msg_print!(Message::ConfigModuleReminder);

        let labels: Vec<String> = REMINDER_INTERVAL_CHOICES
            .iter()
            .map(|minutes| Message::ReminderIntervalOption(*minutes).to_string())
            .collect();
        let current = REMINDER_INTERVAL_CHOICES
            .iter()
            .position(|minutes| *minutes == reminder.interval_minutes)
            .unwrap_or(0);
        let selected = Select::with_theme(&theme)
            .with_prompt(Message::PromptReminderInterval.to_string())
            .items(&labels)
            .default(current)
            .interact()?;

        let sound_threshold: f32 = Input::with_theme(&theme)
            .with_prompt(Message::PromptSoundThreshold.to_string())
            .default(reminder.sound_threshold)
            .validate_with(|value: &f32| {
                if is_valid_sound_threshold(*value) {
                    Ok(())
                } else {
                    Err(Message::InvalidSoundThreshold(value.to_string()).to_string())
                }
            })
            .interact_text()?;

        config.reminder = Some(ReminderConfig {
            interval_minutes: REMINDER_INTERVAL_CHOICES[selected],
            sound_threshold,
            language: reminder.language,
        });

        let sound = config.sound_or_default();
        msg_print!(Message::ConfigModuleSound);

        let bell = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptBellEnabled.to_string())
            .default(sound.bell)
            .interact()?;

        let command: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptSoundCommand.to_string())
            .default(sound.command.map(|parts| parts.join(" ")).unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        let command: Vec<String> = command.split_whitespace().map(str::to_string).collect();

        config.sound = Some(SoundConfig {
            bell,
            command: if command.is_empty() { None } else { Some(command) },
        });

        Ok(config)
    }
}
