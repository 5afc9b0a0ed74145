//! WASAPI metering backend.
//!
//! Everything here must stay on the thread that created it: the COM
//! apartment is joined in [`WasapiBackend::new`] and left when the backend
//! drops. Notification callbacks arrive on a system thread and only touch
//! the shared [`DeviceChangeNotifier`].

use super::{AudioBackend, AudioDevice, DataFlow, DeviceChangeNotifier, DeviceRole, DeviceState, ProbeError};
use std::cell::RefCell;
use windows::core::{implement, Interface, PCWSTR};
use windows::Win32::Foundation::E_NOINTERFACE;
use windows::Win32::Media::Audio::Endpoints::IAudioMeterInformation;
use windows::Win32::Media::Audio::{
    eCapture, eCommunications, eConsole, eMultimedia, eRender, EDataFlow, ERole, IAudioSessionControl, IAudioSessionEnumerator,
    IAudioSessionManager2, IMMDevice, IMMDeviceEnumerator, IMMNotificationClient, IMMNotificationClient_Impl, MMDeviceEnumerator,
    AUDCLNT_E_DEVICE_INVALIDATED, DEVICE_STATE, DEVICE_STATE_ACTIVE, DEVICE_STATE_DISABLED, DEVICE_STATE_NOTPRESENT,
    DEVICE_STATE_UNPLUGGED,
};
use windows::Win32::System::Com::{CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, CLSCTX_ALL, COINIT_MULTITHREADED};
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

/// Leaves the COM apartment on drop. Must be the last field of its owner.
struct ComApartment;

impl ComApartment {
    fn join() -> Result<Self, ProbeError> {
        // SAFETY: balanced by CoUninitialize in Drop on the same thread.
        unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }
            .ok()
            .map_err(|e| ProbeError::Unexpected(e.message()))?;
        Ok(Self)
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        // SAFETY: paired with the successful CoInitializeEx in `join`.
        unsafe { CoUninitialize() };
    }
}

fn acquisition_error(e: windows::core::Error) -> ProbeError {
    ProbeError::DeviceAcquisition(e.message())
}

fn query_error(e: windows::core::Error) -> ProbeError {
    let code = e.code();
    if code == AUDCLNT_E_DEVICE_INVALIDATED || code == E_NOINTERFACE {
        ProbeError::DeviceQuery(e.message())
    } else {
        ProbeError::Unexpected(e.message())
    }
}

fn device_state(state: DEVICE_STATE) -> DeviceState {
    match state {
        DEVICE_STATE_ACTIVE => DeviceState::Active,
        DEVICE_STATE_DISABLED => DeviceState::Inactive,
        DEVICE_STATE_UNPLUGGED => DeviceState::Unplugged,
        DEVICE_STATE_NOTPRESENT => DeviceState::NotFound,
        _ => DeviceState::Inactive,
    }
}

fn data_flow(flow: EDataFlow) -> DataFlow {
    match flow {
        f if f == eRender => DataFlow::Render,
        f if f == eCapture => DataFlow::Capture,
        _ => DataFlow::All,
    }
}

fn device_role(role: ERole) -> DeviceRole {
    match role {
        r if r == eConsole => DeviceRole::Console,
        r if r == eMultimedia => DeviceRole::Multimedia,
        r if r == eCommunications => DeviceRole::Communications,
        _ => DeviceRole::Console,
    }
}

#[implement(IMMNotificationClient)]
struct DefaultDeviceListener {
    notifier: DeviceChangeNotifier,
}

impl IMMNotificationClient_Impl for DefaultDeviceListener_Impl {
    fn OnDeviceStateChanged(&self, _device_id: &PCWSTR, _new_state: DEVICE_STATE) -> windows::core::Result<()> {
        Ok(())
    }

    fn OnDeviceAdded(&self, _device_id: &PCWSTR) -> windows::core::Result<()> {
        Ok(())
    }

    fn OnDeviceRemoved(&self, _device_id: &PCWSTR) -> windows::core::Result<()> {
        Ok(())
    }

    fn OnDefaultDeviceChanged(&self, flow: EDataFlow, role: ERole, _default_device_id: &PCWSTR) -> windows::core::Result<()> {
        self.notifier.notify(data_flow(flow), device_role(role));
        Ok(())
    }

    fn OnPropertyValueChanged(&self, _device_id: &PCWSTR, _key: &PROPERTYKEY) -> windows::core::Result<()> {
        Ok(())
    }
}

/// Default render endpoint plus its meters.
struct WasapiDevice {
    id: String,
    device: IMMDevice,
    meter: IAudioMeterInformation,
    sessions: IAudioSessionManager2,
    // Refreshed by `session_count`, read by `session_peak`.
    snapshot: RefCell<Option<IAudioSessionEnumerator>>,
}

impl AudioDevice for WasapiDevice {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn state(&self) -> DeviceState {
        // SAFETY: plain COM call on an interface owned by this thread.
        match unsafe { self.device.GetState() } {
            Ok(state) => device_state(state),
            Err(_) => DeviceState::NotFound,
        }
    }

    fn session_count(&self) -> Result<usize, ProbeError> {
        // SAFETY: plain COM calls on interfaces owned by this thread.
        let enumerator = unsafe { self.sessions.GetSessionEnumerator() }.map_err(query_error)?;
        let count = unsafe { enumerator.GetCount() }.map_err(query_error)?;
        *self.snapshot.borrow_mut() = Some(enumerator);
        Ok(count.max(0) as usize)
    }

    fn session_peak(&self, index: usize) -> Result<f32, ProbeError> {
        let snapshot = self.snapshot.borrow();
        let enumerator = snapshot
            .as_ref()
            .ok_or_else(|| ProbeError::Unexpected("session snapshot missing".to_string()))?;
        // SAFETY: plain COM calls on interfaces owned by this thread.
        let session: IAudioSessionControl = unsafe { enumerator.GetSession(index as i32) }.map_err(query_error)?;
        let meter: IAudioMeterInformation = session.cast().map_err(query_error)?;
        unsafe { meter.GetPeakValue() }.map_err(query_error)
    }

    fn master_peak(&self) -> Result<f32, ProbeError> {
        // SAFETY: plain COM call on an interface owned by this thread.
        unsafe { self.meter.GetPeakValue() }.map_err(query_error)
    }
}

/// WASAPI endpoint enumeration and notifications.
pub struct WasapiBackend {
    enumerator: IMMDeviceEnumerator,
    listener: RefCell<Option<IMMNotificationClient>>,
    _apartment: ComApartment,
}

impl WasapiBackend {
    pub fn new() -> Result<Self, ProbeError> {
        let apartment = ComApartment::join()?;
        // SAFETY: COM is initialized on this thread by `apartment`.
        let enumerator: IMMDeviceEnumerator =
            unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) }.map_err(acquisition_error)?;
        Ok(Self {
            enumerator,
            listener: RefCell::new(None),
            _apartment: apartment,
        })
    }
}

impl AudioBackend for WasapiBackend {
    fn default_render_device(&self) -> Result<Box<dyn AudioDevice>, ProbeError> {
        // SAFETY: plain COM calls on interfaces owned by this thread; the id
        // string is freed with CoTaskMemFree as the API requires.
        unsafe {
            let device = self.enumerator.GetDefaultAudioEndpoint(eRender, eMultimedia).map_err(acquisition_error)?;
            let raw_id = device.GetId().map_err(acquisition_error)?;
            let id = raw_id.to_string().unwrap_or_default();
            CoTaskMemFree(Some(raw_id.0 as *const _));

            let meter: IAudioMeterInformation = device.Activate(CLSCTX_ALL, None).map_err(acquisition_error)?;
            let sessions: IAudioSessionManager2 = device.Activate(CLSCTX_ALL, None).map_err(acquisition_error)?;

            Ok(Box::new(WasapiDevice {
                id,
                device,
                meter,
                sessions,
                snapshot: RefCell::new(None),
            }))
        }
    }

    fn register_default_device_listener(&self, notifier: DeviceChangeNotifier) -> Result<(), ProbeError> {
        let client: IMMNotificationClient = DefaultDeviceListener { notifier }.into();
        // SAFETY: the client stays alive in `self.listener` until unregistered.
        unsafe { self.enumerator.RegisterEndpointNotificationCallback(&client) }.map_err(|e| ProbeError::Unexpected(e.message()))?;
        *self.listener.borrow_mut() = Some(client);
        Ok(())
    }

    fn unregister_default_device_listener(&self) {
        if let Some(client) = self.listener.borrow_mut().take() {
            // SAFETY: `client` was registered with this enumerator.
            let _ = unsafe { self.enumerator.UnregisterEndpointNotificationCallback(&client) };
        }
    }
}

impl Drop for WasapiBackend {
    fn drop(&mut self) {
        self.unregister_default_device_listener();
    }
}
