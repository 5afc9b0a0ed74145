#[cfg(test)]
mod tests {
    use eyerest::libs::accumulator::{ActivityAccumulator, ActivitySample, ActivitySource, Phase};
    use eyerest::libs::agent::{parse_input, run_loop, ConsoleInput};
    use eyerest::libs::config::Config;
    use eyerest::libs::console::ConsoleUi;
    use eyerest::libs::controller::{Command, ReminderController};
    use eyerest::libs::sound::Silent;
    use std::sync::{Mutex, MutexGuard};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::{mpsc, oneshot};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TempHome {
        _temp_dir: TempDir,
        _env: MutexGuard<'static, ()>,
    }

    fn temp_home() -> TempHome {
        let env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", temp_dir.path());
        std::env::set_var("LOCALAPPDATA", temp_dir.path());
        TempHome {
            _temp_dir: temp_dir,
            _env: env,
        }
    }

    struct Busy;

    impl ActivitySource for Busy {
        fn sample(&mut self) -> ActivitySample {
            ActivitySample {
                idle_seconds: 0,
                audio_active: false,
            }
        }
    }

    fn controller(minutes: u32) -> ReminderController<ConsoleUi, Silent> {
        ReminderController::new(ActivityAccumulator::new(minutes).unwrap(), ConsoleUi::new(), Silent)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("resume"), Some(ConsoleInput::Command(Command::Resume)));
        assert_eq!(parse_input("  R "), Some(ConsoleInput::Command(Command::Resume)));
        assert_eq!(parse_input("interval 30"), Some(ConsoleInput::Command(Command::SetInterval(30))));
        assert_eq!(parse_input("i 45"), Some(ConsoleInput::Command(Command::SetInterval(45))));
        assert_eq!(parse_input("status"), Some(ConsoleInput::Status));
        assert_eq!(parse_input("s"), Some(ConsoleInput::Status));
        assert_eq!(parse_input("quit"), Some(ConsoleInput::Quit));
        assert_eq!(parse_input("q"), Some(ConsoleInput::Quit));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("interval"), None);
        assert_eq!(parse_input("interval soon"), None);
        assert_eq!(parse_input("interval -5"), None);
        assert_eq!(parse_input("dance"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loop_stops_on_quit() {
        let mut controller = controller(20);
        let (tx, rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();
        tx.send(ConsoleInput::Quit).unwrap();

        tokio::time::timeout(Duration::from_secs(5), run_loop(&mut controller, &mut Busy, rx, shutdown_rx))
            .await
            .expect("loop did not stop on quit");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loop_stops_on_shutdown_signal() {
        let mut controller = controller(20);
        let (_tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            let _ = shutdown_tx.send(());
        });

        tokio::time::timeout(Duration::from_secs(5), run_loop(&mut controller, &mut Busy, rx, shutdown_rx))
            .await
            .expect("loop did not stop on shutdown");

        assert!(controller.accumulator().accumulated_seconds() >= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loop_survives_closed_inputs_and_dropped_signal_handler() {
        let mut controller = controller(20);
        let (tx, rx) = mpsc::unbounded_channel::<ConsoleInput>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        drop(tx);
        drop(shutdown_tx);

        let finished = tokio::time::timeout(Duration::from_millis(1500), run_loop(&mut controller, &mut Busy, rx, shutdown_rx)).await;

        assert!(finished.is_err(), "loop must keep ticking");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_resume_command_restarts_cycle() {
        let mut controller = controller(1);
        let (tx, rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        let mut source = Busy;
        for _ in 0..60 {
            controller.on_tick(&mut source);
        }
        assert_eq!(controller.accumulator().phase(), Phase::Resting);

        tx.send(ConsoleInput::Command(Command::Resume)).unwrap();
        tx.send(ConsoleInput::Quit).unwrap();
        run_loop(&mut controller, &mut Busy, rx, shutdown_rx).await;

        assert_eq!(controller.accumulator().phase(), Phase::Running);
        assert!(controller.accumulator().accumulated_seconds() <= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_interval_command_is_persisted() {
        let _home = temp_home();
        let mut controller = controller(20);
        let (tx, rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        tx.send(ConsoleInput::Command(Command::SetInterval(30))).unwrap();
        tx.send(ConsoleInput::Status).unwrap();
        tx.send(ConsoleInput::Quit).unwrap();
        run_loop(&mut controller, &mut Busy, rx, shutdown_rx).await;

        assert_eq!(controller.accumulator().interval_seconds(), 1800);
        assert_eq!(Config::read().unwrap().reminder_or_default().interval_minutes, 30);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rejected_interval_is_not_persisted() {
        let _home = temp_home();
        let mut controller = controller(20);
        let (tx, rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        tx.send(ConsoleInput::Command(Command::SetInterval(0))).unwrap();
        tx.send(ConsoleInput::Quit).unwrap();
        run_loop(&mut controller, &mut Busy, rx, shutdown_rx).await;

        assert_eq!(controller.accumulator().interval_seconds(), 1200);
        assert!(Config::read().unwrap().reminder.is_none());
    }
}
