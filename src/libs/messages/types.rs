#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigSaveFailed(String),
    ConfigModuleReminder,
    ConfigModuleSound,
    PromptReminderInterval,
    ReminderIntervalOption(u32),
    PromptSoundThreshold,
    InvalidSoundThreshold(String),
    PromptBellEnabled,
    PromptSoundCommand,
    InvalidReminderInterval(u32),
    ReminderIntervalSaved(u32),
    IntervalAppliesOnRestart(u32), // pid of the running agent

    // === REMINDER MESSAGES ===
    Countdown {
        remaining: String,
        activity: String,
    },
    ReminderDue(String), // local time
    CountingResumed(String),
    ReminderIntervalChanged(u32),
    PhaseChanged(String),
    ActivityIdle,
    ActivityInput,
    ActivityAudio,

    // === AGENT MESSAGES ===
    AgentStarted {
        interval_minutes: u32,
        sound_threshold: f32,
    },
    AgentCommandsHint,
    AgentStatus {
        phase: String,
        remaining: String,
        activity: String,
    },
    AgentShuttingDown,
    AgentStopped,
    AgentError(String),
    AgentAlreadyRunning(u32),
    StalePidFileReplaced(u32),
    InvalidPidFileContent,
    UnknownCommand(String),
    CommandRejected(String),
    StdinClosed,

    // === SIGNAL MESSAGES ===
    ReceivedSigterm,
    ReceivedSigint,
    ReceivedCtrlC,
    SignalHandlerFailed(String),
    SignalHandlingNotSupported,

    // === PROBE MESSAGES ===
    ProbeHeader(u32),
    ProbeSample {
        idle_seconds: u64,
        input_active: bool,
        audio_active: bool,
        activity: String,
    },
    ProbeWorkerStopped,
    ProbeTimedOut(u64),
    AudioProbeBusy,
    ProbeWorkerDetached,
    InputListenerFailed(String),
    InputListenerUnavailable,

    // === AUDIO MESSAGES ===
    AudioBackendUnavailable(String),
    AudioListenerRegistrationFailed(String),
    AudioProbeStarted,
    AudioProbeStopped,
    AudioDeviceChanged,
    AudioDeviceInvalid,
    AudioQueryFailed(String),
    AudioReacquireDiscarded,
    AudioDeviceAcquired(String),
    AudioDeviceAcquisitionFailed(String),

    // === SOUND MESSAGES ===
    SoundCommandEmpty,
    SoundFailed(String),
}
