//! Changes the persisted reminder interval.
//!
//! A running agent keeps its current interval; it can be changed live by
//! typing `interval <minutes>` in the agent's terminal.

use crate::{
    libs::{config::Config, instance::running_instance, messages::Message},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct IntervalArgs {
    /// Minutes of activity before a rest reminder
    minutes: u32,
}

pub fn cmd(args: IntervalArgs) -> Result<()> {
    let mut config = Config::read()?;
    config.set_interval(args.minutes)?;
    config.save()?;
    msg_success!(Message::ReminderIntervalSaved(args.minutes));

    if let Some(pid) = running_instance()? {
        msg_info!(Message::IntervalAppliesOnRestart(pid));
    }
    Ok(())
}
