//! Platform boundary for audio metering.
//!
//! These traits are the only OS dependencies of the audio probe. The
//! platform implementations live in sibling modules; tests provide fakes.

use super::{DeviceChangeNotifier, DeviceState, ProbeError};

/// An acquired default render endpoint.
pub trait AudioDevice {
    /// Stable identifier of the endpoint.
    fn id(&self) -> String;

    /// Current liveness as reported by the platform.
    fn state(&self) -> DeviceState;

    /// Number of playback sessions currently open on the endpoint.
    fn session_count(&self) -> Result<usize, ProbeError>;

    /// Peak meter value (0.0 to 1.0) of the session at `index`.
    fn session_peak(&self, index: usize) -> Result<f32, ProbeError>;

    /// Peak meter value of the endpoint itself.
    fn master_peak(&self) -> Result<f32, ProbeError>;
}

/// Enumerates endpoints and delivers default-device change notifications.
pub trait AudioBackend {
    /// Acquires the current default render/multimedia endpoint.
    fn default_render_device(&self) -> Result<Box<dyn AudioDevice>, ProbeError>;

    /// Starts delivering default-device changes to `notifier`.
    fn register_default_device_listener(&self, notifier: DeviceChangeNotifier) -> Result<(), ProbeError>;

    /// Stops delivering notifications. A no-op when nothing is registered.
    fn unregister_default_device_listener(&self);
}

/// Backend for platforms without per-process output metering.
///
/// Acquisition always fails, so the probe reports silence and the agent
/// counts keyboard and mouse input only.
#[derive(Debug, Default)]
pub struct UnsupportedAudioBackend;

impl AudioBackend for UnsupportedAudioBackend {
    fn default_render_device(&self) -> Result<Box<dyn AudioDevice>, ProbeError> {
        Err(ProbeError::DeviceAcquisition("output metering is not supported on this platform".to_string()))
    }

    fn register_default_device_listener(&self, _notifier: DeviceChangeNotifier) -> Result<(), ProbeError> {
        Err(ProbeError::Unavailable)
    }

    fn unregister_default_device_listener(&self) {}
}

/// The metering backend for the running platform.
pub fn system_backend() -> Box<dyn AudioBackend> {
    #[cfg(windows)]
    {
        match super::wasapi::WasapiBackend::new() {
            Ok(backend) => return Box::new(backend),
            Err(e) => {
                crate::msg_warning!(crate::libs::messages::Message::AudioBackendUnavailable(e.to_string()));
            }
        }
    }

    #[cfg(not(windows))]
    crate::msg_debug!(crate::libs::messages::Message::AudioBackendUnavailable(
        "output metering is not supported on this platform".to_string()
    ));

    Box::new(UnsupportedAudioBackend)
}
