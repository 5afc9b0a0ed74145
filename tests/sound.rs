#[cfg(test)]
mod tests {
    use eyerest::libs::config::SoundConfig;
    use eyerest::libs::sound::{sound_from_config, CommandSound, NotificationSound, Silent};

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandSound::new(&[]).is_err());
    }

    #[test]
    fn test_missing_program_fails_to_play() {
        let sound = CommandSound::new(&["eyerest-no-such-player".to_string()]).unwrap();
        assert!(sound.play().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_sound_plays() {
        let sound = CommandSound::new(&["true".to_string(), "ignored-arg".to_string()]).unwrap();
        assert!(sound.play().is_ok());
    }

    #[test]
    fn test_silent_never_fails() {
        assert!(Silent.play().is_ok());
    }

    #[test]
    fn test_bad_command_falls_back() {
        let config = SoundConfig {
            bell: false,
            command: Some(Vec::new()),
        };
        // Falls back to silence, which always plays.
        assert!(sound_from_config(&config).play().is_ok());
    }
}
