#[cfg(test)]
mod tests {
    use eyerest::libs::accumulator::{
        format_remaining, AccumulatorError, AccumulatorEvent, ActivityAccumulator, ActivityKind, ActivitySample, ActivitySource,
        Phase, GRACE_PERIOD_SECONDS,
    };
    use std::collections::VecDeque;
    use test_context::{test_context, TestContext};

    const ACTIVE_INPUT: ActivitySample = ActivitySample {
        idle_seconds: 0,
        audio_active: false,
    };
    const ACTIVE_AUDIO: ActivitySample = ActivitySample {
        idle_seconds: 60,
        audio_active: true,
    };
    const IDLE: ActivitySample = ActivitySample {
        idle_seconds: 60,
        audio_active: false,
    };

    /// Replays scripted samples and counts how often it was asked.
    #[derive(Default)]
    struct ScriptedSource {
        samples: VecDeque<ActivitySample>,
        fallback: Option<ActivitySample>,
        calls: usize,
    }

    impl ScriptedSource {
        fn always(sample: ActivitySample) -> Self {
            Self {
                fallback: Some(sample),
                ..Self::default()
            }
        }

        fn push(&mut self, sample: ActivitySample, times: usize) {
            self.samples.extend(std::iter::repeat(sample).take(times));
        }
    }

    impl ActivitySource for ScriptedSource {
        fn sample(&mut self) -> ActivitySample {
            self.calls += 1;
            self.samples
                .pop_front()
                .or(self.fallback)
                .expect("scripted source ran out of samples")
        }
    }

    struct AccumulatorTestContext {
        accumulator: ActivityAccumulator,
    }

    impl TestContext for AccumulatorTestContext {
        fn setup() -> Self {
            AccumulatorTestContext {
                accumulator: ActivityAccumulator::new(20).unwrap(),
            }
        }
    }

    fn run(accumulator: &mut ActivityAccumulator, source: &mut ScriptedSource, ticks: usize) -> Vec<AccumulatorEvent> {
        (0..ticks).flat_map(|_| accumulator.tick(source)).collect()
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_initial_state(ctx: &mut AccumulatorTestContext) {
        let acc = &ctx.accumulator;
        assert_eq!(acc.interval_seconds(), 1200);
        assert_eq!(acc.interval_minutes(), 20);
        assert_eq!(acc.accumulated_seconds(), 0);
        assert_eq!(acc.grace_counter(), 0);
        assert_eq!(acc.remaining_seconds(), 1200);
        assert_eq!(acc.phase(), Phase::Running);
        assert_eq!(acc.activity(), ActivityKind::Idle);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(ActivityAccumulator::new(0).unwrap_err(), AccumulatorError::InvalidInterval(0));
    }

    #[test]
    fn test_overflowing_interval_rejected() {
        assert!(ActivityAccumulator::new(u32::MAX).is_err());
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_active_tick_accumulates_and_resets_grace(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::default();
        source.push(IDLE, 3);
        source.push(ACTIVE_INPUT, 1);

        run(&mut ctx.accumulator, &mut source, 3);
        assert_eq!(ctx.accumulator.grace_counter(), 3);

        let events = ctx.accumulator.tick(&mut source);
        assert!(events.is_empty());
        assert_eq!(ctx.accumulator.accumulated_seconds(), 1);
        assert_eq!(ctx.accumulator.grace_counter(), 0);
        assert_eq!(ctx.accumulator.remaining_seconds(), 1199);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_audio_counts_like_input(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::always(ACTIVE_AUDIO);
        run(&mut ctx.accumulator, &mut source, 10);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 10);
        assert_eq!(ctx.accumulator.activity(), ActivityKind::Audio);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_idle_ticks_freeze_progress(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::default();
        source.push(ACTIVE_INPUT, 30);
        run(&mut ctx.accumulator, &mut source, 30);
        let remaining = ctx.accumulator.remaining_seconds();

        source.push(IDLE, 5);
        for expected_grace in 1..=5 {
            ctx.accumulator.tick(&mut source);
            assert_eq!(ctx.accumulator.grace_counter(), expected_grace);
            assert_eq!(ctx.accumulator.accumulated_seconds(), 30);
            assert_eq!(ctx.accumulator.remaining_seconds(), remaining);
        }
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_grace_counter_caps(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::default();
        source.push(ACTIVE_INPUT, 1);
        source.push(IDLE, 50);
        run(&mut ctx.accumulator, &mut source, 51);

        // Past the grace period the countdown stays paused; idleness never
        // eats into accumulated time.
        assert_eq!(ctx.accumulator.grace_counter(), GRACE_PERIOD_SECONDS);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 1);
        assert_eq!(ctx.accumulator.remaining_seconds(), 1199);
        assert_eq!(ctx.accumulator.phase(), Phase::Running);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_input_boundary(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::default();
        source.push(
            ActivitySample {
                idle_seconds: 4,
                audio_active: false,
            },
            1,
        );
        source.push(
            ActivitySample {
                idle_seconds: 5,
                audio_active: false,
            },
            1,
        );

        ctx.accumulator.tick(&mut source);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 1);
        assert_eq!(ctx.accumulator.activity(), ActivityKind::Input);

        ctx.accumulator.tick(&mut source);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 1);
        assert_eq!(ctx.accumulator.grace_counter(), 1);
        assert_eq!(ctx.accumulator.activity(), ActivityKind::Idle);
    }

    #[test]
    fn test_display_priority_prefers_input() {
        let both = ActivitySample {
            idle_seconds: 0,
            audio_active: true,
        };
        assert_eq!(both.kind(), ActivityKind::Input);
        assert_eq!(ACTIVE_AUDIO.kind(), ActivityKind::Audio);
        assert_eq!(IDLE.kind(), ActivityKind::Idle);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_reminder_fires_once_on_exact_tick(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::always(ACTIVE_INPUT);

        let before = run(&mut ctx.accumulator, &mut source, 1199);
        assert!(before.is_empty());
        assert_eq!(ctx.accumulator.remaining_seconds(), 1);
        assert_eq!(ctx.accumulator.phase(), Phase::Running);

        let events = ctx.accumulator.tick(&mut source);
        assert_eq!(events, vec![AccumulatorEvent::ReminderDue, AccumulatorEvent::PhaseChanged(Phase::Resting)]);
        assert_eq!(ctx.accumulator.phase(), Phase::Resting);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 1200);
        assert_eq!(ctx.accumulator.remaining_seconds(), 0);

        let calls = source.calls;
        let after = ctx.accumulator.tick(&mut source);
        assert!(after.is_empty());
        assert_eq!(source.calls, calls, "resting ticks must not sample");
        assert_eq!(ctx.accumulator.accumulated_seconds(), 1200);
        assert_eq!(ctx.accumulator.phase(), Phase::Resting);
    }

    #[test]
    fn test_reminder_counts_only_active_ticks() {
        let mut acc = ActivityAccumulator::new(1).unwrap();
        let mut source = ScriptedSource::default();
        for _ in 0..60 {
            source.push(ACTIVE_INPUT, 1);
            source.push(IDLE, 2);
        }

        let events = run(&mut acc, &mut source, 177);
        assert!(events.is_empty());
        assert_eq!(acc.accumulated_seconds(), 59);

        let events = run(&mut acc, &mut source, 3);
        assert_eq!(events.iter().filter(|e| **e == AccumulatorEvent::ReminderDue).count(), 1);
        assert_eq!(acc.phase(), Phase::Resting);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_resume_starts_fresh_cycle(ctx: &mut AccumulatorTestContext) {
        ctx.accumulator.set_interval(1).unwrap();
        let mut source = ScriptedSource::always(ACTIVE_INPUT);
        run(&mut ctx.accumulator, &mut source, 60);
        assert_eq!(ctx.accumulator.phase(), Phase::Resting);

        let events = ctx.accumulator.resume();
        assert_eq!(events, vec![AccumulatorEvent::PhaseChanged(Phase::Running)]);
        assert_eq!(ctx.accumulator.phase(), Phase::Running);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 0);
        assert_eq!(ctx.accumulator.grace_counter(), 0);
        assert_eq!(ctx.accumulator.remaining_seconds(), 60);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_resume_when_fresh_is_noop(ctx: &mut AccumulatorTestContext) {
        let before = ctx.accumulator.display();
        let events = ctx.accumulator.resume();
        assert!(events.is_empty());
        assert_eq!(ctx.accumulator.display(), before);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 0);
        assert_eq!(ctx.accumulator.grace_counter(), 0);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_set_interval_restarts_cycle(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::always(ACTIVE_INPUT);
        run(&mut ctx.accumulator, &mut source, 500);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 500);

        ctx.accumulator.set_interval(30).unwrap();
        assert_eq!(ctx.accumulator.accumulated_seconds(), 0);
        assert_eq!(ctx.accumulator.interval_seconds(), 1800);
        assert_eq!(ctx.accumulator.remaining_seconds(), 1800);
    }

    #[test_context(AccumulatorTestContext)]
    #[test]
    fn test_set_interval_invalid_keeps_state(ctx: &mut AccumulatorTestContext) {
        let mut source = ScriptedSource::always(ACTIVE_INPUT);
        run(&mut ctx.accumulator, &mut source, 10);

        assert!(ctx.accumulator.set_interval(0).is_err());
        assert_eq!(ctx.accumulator.interval_seconds(), 1200);
        assert_eq!(ctx.accumulator.accumulated_seconds(), 10);
    }

    #[test]
    fn test_set_interval_does_not_leave_resting() {
        let mut acc = ActivityAccumulator::new(1).unwrap();
        let mut source = ScriptedSource::always(ACTIVE_INPUT);
        run(&mut acc, &mut source, 60);
        assert_eq!(acc.phase(), Phase::Resting);

        acc.set_interval(40).unwrap();
        assert_eq!(acc.phase(), Phase::Resting);
        assert!(acc.tick(&mut source).is_empty());
        assert_eq!(acc.accumulated_seconds(), 0);

        acc.resume();
        acc.tick(&mut source);
        assert_eq!(acc.accumulated_seconds(), 1);
        assert_eq!(acc.remaining_seconds(), 2399);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(1200), "20:00");
        assert_eq!(format_remaining(3000), "50:00");
        assert_eq!(format_remaining(6001), "100:01");
    }
}
