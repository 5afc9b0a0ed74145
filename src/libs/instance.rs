//! Single running agent per user.
//!
//! The agent records its PID in the data directory while it runs. A second
//! agent finds the file, checks whether that process is still alive, and
//! refuses to start if it is. A file left behind by a crashed agent is
//! simply replaced.

use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_debug};
use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use sysinfo::{Pid, ProcessesToUpdate, System};

pub const PID_FILE: &str = "eyerest.pid";

/// Whether a process with `pid` currently exists.
pub fn is_process_running(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}

/// PID of another live agent, if one is recorded.
pub fn running_instance() -> Result<Option<u32>> {
    let path = DataStorage::new().get_path(PID_FILE)?;
    if !path.exists() {
        return Ok(None);
    }
    let recorded = fs::read_to_string(&path)?.trim().parse::<u32>().ok();
    Ok(recorded.filter(|pid| *pid != std::process::id() && is_process_running(*pid)))
}

/// Holds the PID file for as long as the agent runs.
#[derive(Debug)]
pub struct InstanceGuard {
    path: PathBuf,
    pid: u32,
}

impl InstanceGuard {
    /// Claims the PID file.
    ///
    /// # Errors
    ///
    /// Fails if another live agent owns the file, or the file cannot be
    /// written.
    pub fn acquire() -> Result<Self> {
        let path = DataStorage::new().get_path(PID_FILE)?;

        if path.exists() {
            match fs::read_to_string(&path)?.trim().parse::<u32>() {
                Ok(pid) if pid != std::process::id() && is_process_running(pid) => {
                    msg_bail_anyhow!(Message::AgentAlreadyRunning(pid));
                }
                Ok(pid) => msg_debug!(Message::StalePidFileReplaced(pid)),
                Err(_) => msg_debug!(Message::InvalidPidFileContent),
            }
        }

        let pid = std::process::id();
        fs::write(&path, pid.to_string())?;
        Ok(Self { path, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        // Leave the file alone if someone else has claimed it meanwhile.
        let owned = fs::read_to_string(&self.path)
            .map(|content| content.trim() == self.pid.to_string())
            .unwrap_or(false);
        if owned {
            let _ = fs::remove_file(&self.path);
        }
    }
}
