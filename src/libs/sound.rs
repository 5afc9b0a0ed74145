//! Notification sounds played when a reminder fires.
//!
//! Playback is fire-and-forget. A failure is reported back to the
//! controller, which logs it and carries on; it never affects the state
//! machine.

use crate::libs::config::SoundConfig;
use crate::libs::messages::Message;
use crate::msg_error_anyhow;
use anyhow::Result;
use std::io::Write;
use std::process::{Command, Stdio};

pub trait NotificationSound: Send {
    fn play(&self) -> Result<()>;
}

impl<T: NotificationSound + ?Sized> NotificationSound for Box<T> {
    fn play(&self) -> Result<()> {
        (**self).play()
    }
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl NotificationSound for TerminalBell {
    fn play(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Launches an external player, e.g. `["paplay", "/usr/share/sounds/bell.oga"]`.
///
/// `play` returns as soon as the player is launched.
#[derive(Debug, Clone)]
pub struct CommandSound {
    program: String,
    args: Vec<String>,
}

impl CommandSound {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| msg_error_anyhow!(Message::SoundCommandEmpty))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl NotificationSound for CommandSound {
    fn play(&self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Reap in the background so the player never becomes a zombie.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Silent;

impl NotificationSound for Silent {
    fn play(&self) -> Result<()> {
        Ok(())
    }
}

/// Picks the sound described by the configuration.
///
/// A configured command takes precedence over the bell. An unusable command
/// falls back to the bell (or silence when the bell is off).
pub fn sound_from_config(config: &SoundConfig) -> Box<dyn NotificationSound> {
    if let Some(command) = &config.command {
        match CommandSound::new(command) {
            Ok(sound) => return Box::new(sound),
            Err(e) => crate::msg_warning!(Message::SoundFailed(e.to_string())),
        }
    }
    if config.bell {
        Box::new(TerminalBell)
    } else {
        Box::new(Silent)
    }
}
