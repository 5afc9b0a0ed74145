//! Diagnostic readout of the activity probes.

use crate::{
    libs::{
        accumulator::ActivitySource,
        audio::SoundThreshold,
        config::Config,
        console::activity_label,
        messages::Message,
        sampler::system_sampler,
    },
    msg_print,
};
use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Number of samples to take, one per second
    #[arg(short, long, default_value_t = 5)]
    count: u32,
}

pub fn cmd(args: ProbeArgs) -> Result<()> {
    let reminder = Config::read()?.reminder_or_default();
    let threshold = Arc::new(SoundThreshold::new(reminder.sound_threshold));
    let mut sampler = system_sampler(threshold)?;

    msg_print!(Message::ProbeHeader(args.count));
    for n in 0..args.count {
        if n > 0 {
            std::thread::sleep(Duration::from_secs(1));
        }
        let sample = sampler.sample();
        msg_print!(Message::ProbeSample {
            idle_seconds: sample.idle_seconds,
            input_active: sample.input_active(),
            audio_active: sample.audio_active,
            activity: activity_label(sample.kind()).to_string(),
        });
    }
    Ok(())
}
