//! Activity sampling with a bounded wait on the audio probe.
//!
//! Reading the idle time is a cheap system call and happens inline on the
//! tick. Audio metering can stall (a hung audio driver, a slow session
//! enumeration), so the audio probe lives on a dedicated thread owned by
//! [`AudioWorker`] and every answer is waited for at most a fixed timeout.
//! A late or missing answer reads as "no audio": a stalled driver can only
//! make the agent under-count activity, never invent it.
//!
//! Keeping the audio probe on one thread also means platform handles (COM
//! interfaces on Windows) never cross threads.

use crate::libs::accumulator::{ActivitySample, ActivitySource};
use crate::libs::audio::backend::system_backend;
use crate::libs::audio::{AudioActivityProbe, SoundThreshold};
use crate::libs::idle::{IdleTimeProbe, SystemIdleProbe};
use crate::libs::messages::Message;
use crate::msg_debug;
use anyhow::Result;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Longest a tick waits for the audio probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(750);

/// Answers whether audio is currently audible.
pub trait AudioSource {
    fn is_audio_active(&mut self) -> bool;
}

/// An [`AudioActivityProbe`] that is started on construction and stopped
/// on drop.
pub struct StartedAudioProbe(AudioActivityProbe);

impl StartedAudioProbe {
    pub fn new(probe: AudioActivityProbe) -> Self {
        probe.start();
        Self(probe)
    }

    pub fn probe(&self) -> &AudioActivityProbe {
        &self.0
    }
}

impl AudioSource for StartedAudioProbe {
    fn is_audio_active(&mut self) -> bool {
        self.0.is_audio_active()
    }
}

impl Drop for StartedAudioProbe {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// Runs an [`AudioSource`] on its own thread and queries it with a timeout.
///
/// At most one request is in flight. While the worker is still busy with an
/// earlier request, queries answer `false` at once instead of queueing.
pub struct AudioWorker {
    requests: Option<Sender<u64>>,
    replies: Receiver<(u64, bool)>,
    stopped: Receiver<()>,
    next_seq: u64,
    in_flight: Option<u64>,
    timeout: Duration,
    thread: Option<JoinHandle<()>>,
}

impl AudioWorker {
    /// Spawns the worker. `factory` runs on the worker thread, so the source
    /// it builds never needs to be `Send`.
    pub fn spawn<F, S>(factory: F, timeout: Duration) -> Result<Self>
    where
        F: FnOnce() -> S + Send + 'static,
        S: AudioSource + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<u64>();
        let (reply_tx, reply_rx) = mpsc::channel();
        let (stopped_tx, stopped_rx) = mpsc::channel();

        let thread = std::thread::Builder::new().name("eyerest-audio".into()).spawn(move || {
            {
                let mut source = factory();
                while let Ok(seq) = request_rx.recv() {
                    let active = source.is_audio_active();
                    if reply_tx.send((seq, active)).is_err() {
                        break;
                    }
                }
            }
            msg_debug!(Message::ProbeWorkerStopped);
            let _ = stopped_tx.send(());
        })?;

        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            stopped: stopped_rx,
            next_seq: 0,
            in_flight: None,
            timeout,
            thread: Some(thread),
        })
    }

    /// Whether audio is audible. `false` when the worker does not answer in
    /// time or is still stuck on an earlier request.
    pub fn is_audio_active(&mut self) -> bool {
        if let Some(pending) = self.in_flight {
            loop {
                match self.replies.try_recv() {
                    Ok((seq, _)) if seq == pending => {
                        self.in_flight = None;
                        break;
                    }
                    Ok(_) => continue,
                    Err(TryRecvError::Empty) => {
                        msg_debug!(Message::AudioProbeBusy);
                        return false;
                    }
                    Err(TryRecvError::Disconnected) => return false,
                }
            }
        }

        let Some(requests) = &self.requests else {
            return false;
        };
        self.next_seq += 1;
        let seq = self.next_seq;
        if requests.send(seq).is_err() {
            return false;
        }
        self.in_flight = Some(seq);

        let deadline = Instant::now() + self.timeout;
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(wait) {
                Ok((reply_seq, active)) if reply_seq == seq => {
                    self.in_flight = None;
                    return active;
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    msg_debug!(Message::ProbeTimedOut(self.timeout.as_millis() as u64));
                    return false;
                }
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        self.requests.take();
        let Some(thread) = self.thread.take() else {
            return;
        };
        // A worker stuck inside a platform call is left behind; it must not
        // hold up shutdown.
        match self.stopped.recv_timeout(self.timeout) {
            Err(RecvTimeoutError::Timeout) => msg_debug!(Message::ProbeWorkerDetached),
            _ => {
                let _ = thread.join();
            }
        }
    }
}

/// Idle time read inline plus audio from an [`AudioWorker`].
pub struct ActivitySampler {
    idle: Box<dyn IdleTimeProbe>,
    audio: AudioWorker,
}

impl ActivitySampler {
    pub fn new(idle: Box<dyn IdleTimeProbe>, audio: AudioWorker) -> Self {
        Self { idle, audio }
    }
}

impl ActivitySource for ActivitySampler {
    fn sample(&mut self) -> ActivitySample {
        let idle_seconds = self.idle.seconds_since_last_input();
        let audio_active = self.audio.is_audio_active();
        ActivitySample { idle_seconds, audio_active }
    }
}

/// Idle and audio probes for the running platform.
pub fn system_sampler(threshold: Arc<SoundThreshold>) -> Result<ActivitySampler> {
    let audio = AudioWorker::spawn(
        move || StartedAudioProbe::new(AudioActivityProbe::new(system_backend(), threshold)),
        PROBE_TIMEOUT,
    )?;
    Ok(ActivitySampler::new(Box::new(SystemIdleProbe::new()), audio))
}
