//! Audio activity detection for the default playback device.
//!
//! [`AudioActivityProbe`] answers a single question once per tick: is any
//! audio currently audible above the configured [`SoundThreshold`]? It owns
//! the handle to the default render device, re-acquires it whenever it goes
//! stale, and turns every platform failure into a plain `false` sample.
//!
//! ## Sampling Algorithm
//!
//! 1. Re-acquire the default render device if no handle is held, the handle
//!    is not `Active`, or a device-change notification arrived.
//! 2. Walk the active playback sessions; the first session whose peak meter
//!    exceeds the threshold makes the sample active.
//! 3. Otherwise read the device master peak meter.
//! 4. Any query failure drops the handle so the next sample re-acquires.
//!
//! ## Concurrency
//!
//! Handle replacement is serialized by one acquisition lock. Platform
//! notification callbacks never touch the handle directly: they arm a
//! single-slot [`DeviceChangeNotifier`] flag that the next sample consumes.

pub mod backend;

#[cfg(windows)]
pub mod wasapi;

use crate::libs::messages::Message;
use crate::msg_debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use backend::{AudioBackend, AudioDevice, UnsupportedAudioBackend};

/// Default peak value above which audio counts as audible.
pub const DEFAULT_SOUND_THRESHOLD: f32 = 0.001;

/// Recoverable failures raised by the platform probes.
///
/// None of these ever crosses into the accumulator; probes normalize them
/// to "inactive" (audio) or `0` seconds (idle).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeError {
    #[error("probe unavailable")]
    Unavailable,
    #[error("audio device acquisition failed: {0}")]
    DeviceAcquisition(String),
    #[error("audio device query failed: {0}")]
    DeviceQuery(String),
    #[error("unexpected probe failure: {0}")]
    Unexpected(String),
}

/// Liveness of an audio endpoint as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Active,
    Inactive,
    NotFound,
    Unplugged,
}

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFlow {
    Render,
    Capture,
    All,
}

/// Role an endpoint is the default for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    Console,
    Multimedia,
    Communications,
}

/// Peak threshold shared between configuration and the audio probe.
///
/// Stored as raw `f32` bits so a configuration change replaces the value
/// atomically and never tears an in-flight sample.
#[derive(Debug)]
pub struct SoundThreshold(AtomicU32);

impl SoundThreshold {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

impl Default for SoundThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_SOUND_THRESHOLD)
    }
}

/// Single-slot "default device changed" signal.
///
/// Clones share the same flag. Backends call [`notify`](Self::notify) from
/// whatever thread the platform delivers notifications on; the probe
/// consumes the flag on its next sample.
#[derive(Debug, Clone, Default)]
pub struct DeviceChangeNotifier {
    pending: Arc<AtomicBool>,
}

impl DeviceChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a default-device change. Only the render/multimedia default
    /// is of interest; every other flow/role pair is ignored.
    pub fn notify(&self, flow: DataFlow, role: DeviceRole) -> bool {
        if flow == DataFlow::Render && role == DeviceRole::Multimedia {
            self.pending.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// The currently held default render device.
///
/// Never mutated in place: re-acquisition drops the old handle and installs
/// a new one with a fresh generation number.
pub struct AudioDeviceHandle {
    id: String,
    generation: u64,
    device: Box<dyn AudioDevice>,
}

impl AudioDeviceHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> DeviceState {
        self.device.state()
    }
}

struct HandleSlot {
    handle: Option<AudioDeviceHandle>,
    generation: u64,
}

/// Reports whether audio is audible on the default render device.
pub struct AudioActivityProbe {
    // Declared before `backend` so device handles are released first.
    slot: Mutex<HandleSlot>,
    backend: Box<dyn AudioBackend>,
    threshold: Arc<SoundThreshold>,
    notifier: DeviceChangeNotifier,
    listening: AtomicBool,
}

impl AudioActivityProbe {
    pub fn new(backend: Box<dyn AudioBackend>, threshold: Arc<SoundThreshold>) -> Self {
        Self {
            slot: Mutex::new(HandleSlot { handle: None, generation: 0 }),
            backend,
            threshold,
            notifier: DeviceChangeNotifier::new(),
            listening: AtomicBool::new(false),
        }
    }

    /// The notifier handed to the backend's device-change listener.
    pub fn notifier(&self) -> DeviceChangeNotifier {
        self.notifier.clone()
    }

    /// Registers for device-change notifications and acquires the device.
    ///
    /// Safe to call repeatedly; a failed acquisition is retried on the next
    /// sample.
    pub fn start(&self) {
        if !self.listening.swap(true, Ordering::SeqCst) {
            if let Err(e) = self.backend.register_default_device_listener(self.notifier.clone()) {
                msg_debug!(Message::AudioListenerRegistrationFailed(e.to_string()));
                self.listening.store(false, Ordering::SeqCst);
            }
        }

        let observed = self.slot.lock().generation;
        self.reacquire(observed);
        msg_debug!(Message::AudioProbeStarted);
    }

    /// Unregisters the listener and releases the device handle.
    pub fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            self.backend.unregister_default_device_listener();
        }
        let mut slot = self.slot.lock();
        slot.handle = None;
        slot.generation += 1;
        msg_debug!(Message::AudioProbeStopped);
    }

    /// Liveness of the held handle; `NotFound` when none is held.
    pub fn device_state(&self) -> DeviceState {
        self.slot.lock().handle.as_ref().map_or(DeviceState::NotFound, AudioDeviceHandle::state)
    }

    /// Identifier of the held device, if any.
    pub fn device_id(&self) -> Option<String> {
        self.slot.lock().handle.as_ref().map(|h| h.id().to_string())
    }

    /// Generation of the most recently installed (or released) handle.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Samples the device once. Never fails: every error reads as silence.
    pub fn is_audio_active(&self) -> bool {
        if self.notifier.take() {
            msg_debug!(Message::AudioDeviceChanged);
            self.invalidate();
        }

        let observed = {
            let slot = self.slot.lock();
            match &slot.handle {
                Some(handle) if handle.state() == DeviceState::Active => None,
                _ => Some(slot.generation),
            }
        };

        if let Some(generation) = observed {
            msg_debug!(Message::AudioDeviceInvalid);
            if !self.reacquire(generation) {
                return false;
            }
        }

        let threshold = self.threshold.get();
        let mut slot = self.slot.lock();
        let Some(handle) = slot.handle.as_ref() else {
            return false;
        };

        match audible(handle.device.as_ref(), threshold) {
            Ok(active) => active,
            Err(e) => {
                msg_debug!(Message::AudioQueryFailed(e.to_string()));
                slot.handle = None;
                slot.generation += 1;
                false
            }
        }
    }

    /// Drops the held handle so the next sample re-acquires.
    fn invalidate(&self) {
        let mut slot = self.slot.lock();
        if slot.handle.take().is_some() {
            slot.generation += 1;
        }
    }

    /// Acquires the current default device and installs it, unless another
    /// path already replaced the handle since `observed_generation` was read.
    ///
    /// Returns `true` when a usable handle is installed afterwards.
    fn reacquire(&self, observed_generation: u64) -> bool {
        let acquired = self.backend.default_render_device();

        let mut slot = self.slot.lock();
        if slot.generation != observed_generation {
            // Lost the race; keep whatever the winner installed.
            msg_debug!(Message::AudioReacquireDiscarded);
            return slot.handle.as_ref().is_some_and(|h| h.state() == DeviceState::Active);
        }

        match acquired {
            Ok(device) if device.state() == DeviceState::Active => {
                slot.generation += 1;
                let id = device.id();
                msg_debug!(Message::AudioDeviceAcquired(id.clone()));
                slot.handle = Some(AudioDeviceHandle {
                    id,
                    generation: slot.generation,
                    device,
                });
                true
            }
            Ok(device) => {
                msg_debug!(Message::AudioDeviceAcquisitionFailed(format!("{} is {:?}", device.id(), device.state())));
                if slot.handle.take().is_some() {
                    slot.generation += 1;
                }
                false
            }
            Err(e) => {
                msg_debug!(Message::AudioDeviceAcquisitionFailed(e.to_string()));
                if slot.handle.take().is_some() {
                    slot.generation += 1;
                }
                false
            }
        }
    }
}

impl Drop for AudioActivityProbe {
    fn drop(&mut self) {
        if self.listening.load(Ordering::SeqCst) {
            self.backend.unregister_default_device_listener();
        }
    }
}

/// Session peaks first (first match wins), then the device master peak.
fn audible(device: &dyn AudioDevice, threshold: f32) -> Result<bool, ProbeError> {
    let sessions = device.session_count()?;
    for index in 0..sessions {
        if device.session_peak(index)? > threshold {
            return Ok(true);
        }
    }
    Ok(device.master_peak()? > threshold)
}
