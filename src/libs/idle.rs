//! Idle time detection: seconds elapsed since the last keyboard or mouse input.
//!
//! The probe never fails from the caller's point of view. Whenever the
//! platform query cannot answer, it reports `0` seconds, which the
//! accumulator reads as "possibly active".
//!
//! ## Platform Support
//!
//! - **Windows**: `GetLastInputInfo` compared against `GetTickCount`
//! - **macOS / Linux**: a global `rdev` listener that timestamps input events
//!
//! ## Usage
//!
//! ```rust,no_run
//! use eyerest::libs::idle::{is_input_active, IdleTimeProbe, SystemIdleProbe};
//!
//! let probe = SystemIdleProbe::new();
//! let idle = probe.seconds_since_last_input();
//! println!("idle for {}s, active: {}", idle, is_input_active(idle));
//! ```

/// Input seen within this many seconds counts as the user being active.
pub const INPUT_ACTIVE_THRESHOLD_SECS: u64 = 5;

/// Source of "seconds since last physical input", system-wide.
pub trait IdleTimeProbe {
    /// Returns whole seconds since the last keyboard/mouse event, or `0`
    /// when the platform cannot tell.
    fn seconds_since_last_input(&self) -> u64;
}

/// Whether an idle reading means the user is currently giving input.
///
/// The boundary is exclusive: exactly five idle seconds is not active.
pub fn is_input_active(idle_seconds: u64) -> bool {
    idle_seconds < INPUT_ACTIVE_THRESHOLD_SECS
}

/// Converts a pair of 32-bit millisecond tick counts into idle seconds.
///
/// Tick counters wrap roughly every 49.7 days, so the difference is taken as
/// a wrapping signed value. A non-positive difference (last input stamped
/// after the current tick was read) yields `0`.
pub fn idle_seconds_from_ticks(now_ms: u32, last_input_ms: u32) -> u64 {
    let elapsed = now_ms.wrapping_sub(last_input_ms) as i32;
    if elapsed > 0 {
        (elapsed / 1000) as u64
    } else {
        0
    }
}

#[cfg(windows)]
mod platform {
    use super::{idle_seconds_from_ticks, IdleTimeProbe};
    use windows::Win32::System::SystemInformation::GetTickCount;
    use windows::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

    /// Idle probe backed by `GetLastInputInfo`.
    #[derive(Debug, Default)]
    pub struct SystemIdleProbe;

    impl SystemIdleProbe {
        pub fn new() -> Self {
            Self
        }
    }

    impl IdleTimeProbe for SystemIdleProbe {
        fn seconds_since_last_input(&self) -> u64 {
            let mut info = LASTINPUTINFO {
                cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
                dwTime: 0,
            };

            // SAFETY: `info` is a properly sized LASTINPUTINFO owned by this frame.
            let ok = unsafe { GetLastInputInfo(&mut info) }.as_bool();
            if !ok {
                return 0;
            }

            // SAFETY: GetTickCount has no preconditions.
            let now = unsafe { GetTickCount() };
            idle_seconds_from_ticks(now, info.dwTime)
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use super::IdleTimeProbe;
    use crate::libs::messages::Message;
    use crate::{msg_debug, msg_warning};
    use parking_lot::Mutex;
    use rdev::{listen, Event, EventType};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// How many consecutive listener failures are tolerated before the probe
    /// gives up and fails open.
    const MAX_LISTENER_FAILURES: u32 = 5;

    /// Idle probe backed by a global input listener.
    ///
    /// A background thread runs `rdev::listen` and stamps the time of every
    /// key press, mouse button, wheel, or pointer movement. The listener is
    /// restarted after a short delay if it errors out.
    pub struct SystemIdleProbe {
        last_input: Arc<Mutex<Instant>>,
        listener_failed: Arc<AtomicBool>,
    }

    impl SystemIdleProbe {
        pub fn new() -> Self {
            let last_input = Arc::new(Mutex::new(Instant::now()));
            let listener_failed = Arc::new(AtomicBool::new(false));

            let shared_last_input = last_input.clone();
            let shared_failed = listener_failed.clone();
            let spawned = std::thread::Builder::new().name("eyerest-input".into()).spawn(move || {
                let mut failures = 0;
                loop {
                    let stamp = shared_last_input.clone();
                    let result = listen(move |event: Event| match event.event_type {
                        EventType::KeyPress(_) | EventType::ButtonPress(_) | EventType::Wheel { .. } | EventType::MouseMove { .. } => {
                            *stamp.lock() = Instant::now();
                        }
                        _ => {}
                    });

                    match result {
                        Ok(()) => break,
                        Err(e) => {
                            failures += 1;
                            msg_debug!(Message::InputListenerFailed(format!("{:?}", e)));
                            if failures >= MAX_LISTENER_FAILURES {
                                msg_warning!(Message::InputListenerUnavailable);
                                shared_failed.store(true, Ordering::SeqCst);
                                break;
                            }
                            std::thread::sleep(Duration::from_secs(1));
                        }
                    }
                }
            });

            if let Err(e) = spawned {
                msg_warning!(Message::InputListenerFailed(e.to_string()));
                listener_failed.store(true, Ordering::SeqCst);
            }

            Self { last_input, listener_failed }
        }
    }

    impl Default for SystemIdleProbe {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdleTimeProbe for SystemIdleProbe {
        fn seconds_since_last_input(&self) -> u64 {
            if self.listener_failed.load(Ordering::SeqCst) {
                return 0;
            }
            self.last_input.lock().elapsed().as_secs()
        }
    }
}

pub use platform::SystemIdleProbe;
