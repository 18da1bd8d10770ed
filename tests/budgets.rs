use ballsim::core::{
    Budget, Engine, HaltAtTime, SceneConfig, SlipperyBoundary, StateSnapshot,
};
use ballsim::error::{Error, Result};
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn gas(num_balls: usize, seed: u64) -> Result<Engine<SlipperyBoundary>> {
    let scene = SceneConfig {
        num_balls,
        arena_size: [20.0, 20.0],
        radius: 0.3,
        mass: 1.0,
        max_speed: 1.0,
        seed: Some(seed),
    };
    Engine::new(SlipperyBoundary::new(scene.arena_size)?, scene.build()?)
}

fn collect(engine: &mut Engine<SlipperyBoundary>, budgets: &[Budget]) -> Result<Vec<StateSnapshot>> {
    let mut out = Vec::new();
    for &b in budgets {
        out.extend(engine.advance(b)?.snapshots);
    }
    Ok(out)
}

/// A step ceiling of k resolves exactly k more events.
#[test]
fn step_ceiling_is_exact() -> Result<()> {
    init_logging();
    let mut engine = gas(12, 1)?;
    for k in [0u64, 1, 5, 17] {
        let before = engine.step();
        let batch = engine.advance(Budget::unbounded().steps(k))?;
        assert_eq!(batch.snapshots.len() as u64, k);
        assert_eq!(engine.step(), before + k);
        assert_eq!(batch.progress, k as f64);
    }
    Ok(())
}

/// No step starts once the time ceiling is reached; only the step in flight may cross it.
#[test]
fn time_ceiling_is_not_overshot_by_new_steps() -> Result<()> {
    init_logging();
    let mut engine = gas(20, 2)?;
    let ceiling = 3.0;
    let batch = engine.advance(Budget::unbounded().until_time(ceiling))?;
    let (last, earlier) = batch.snapshots.split_last().expect("some events before t = 3");
    assert!(earlier.iter().all(|s| s.time() < ceiling));
    assert!(last.time() >= ceiling);
    assert_eq!(engine.time(), last.time());

    // Already past the ceiling: pause before doing anything.
    let again = engine.advance(Budget::unbounded().until_time(ceiling))?;
    assert!(again.snapshots.is_empty());
    assert_eq!(again.progress, 0.0);
    Ok(())
}

/// A zero wall-clock allowance returns at once without touching the state.
#[test]
fn zero_wall_clock_budget_pauses_immediately() -> Result<()> {
    init_logging();
    let mut engine = gas(8, 3)?;
    let batch = engine.advance(Budget::unbounded().wall_clock(Duration::ZERO))?;
    assert!(batch.snapshots.is_empty());
    assert_eq!(engine.step(), 0);
    assert_eq!(engine.time(), 0.0);
    Ok(())
}

/// A small wall-clock allowance ends an otherwise unbounded call.
#[test]
fn wall_clock_budget_bounds_an_open_call() -> Result<()> {
    init_logging();
    let mut engine = gas(8, 4)?;
    let batch = engine.advance(Budget::unbounded().wall_clock(Duration::from_millis(20)))?;
    assert!(!batch.finished);
    assert_eq!(batch.snapshots.len() as u64, engine.step());
    Ok(())
}

/// Splitting a run into many calls yields the same events as one call.
#[test]
fn split_calls_match_single_call() -> Result<()> {
    init_logging();
    let mut whole = gas(10, 5)?;
    let expected = collect(&mut whole, &[Budget::unbounded().steps(60)])?;

    let mut single_steps = gas(10, 5)?;
    let got = collect(&mut single_steps, &[Budget::unbounded().steps(1); 60])?;
    assert_eq!(got, expected);

    let mut uneven = gas(10, 5)?;
    let budgets = [
        Budget::unbounded().steps(7),
        Budget::unbounded().steps(0),
        Budget::unbounded().steps(13),
        Budget::unbounded().steps(40),
    ];
    assert_eq!(collect(&mut uneven, &budgets)?, expected);
    Ok(())
}

/// Advancing in time slices resolves the same events as one long call.
#[test]
fn time_sliced_calls_match_single_call() -> Result<()> {
    init_logging();
    let mut whole = gas(10, 6)?;
    let expected = collect(&mut whole, &[Budget::unbounded().until_time(5.0)])?;

    let mut sliced = gas(10, 6)?;
    let budgets: Vec<Budget> = (1..=10)
        .map(|i| Budget::unbounded().until_time(0.5 * i as f64))
        .collect();
    assert_eq!(collect(&mut sliced, &budgets)?, expected);
    Ok(())
}

/// Snapshots arrive in strict step order with non-decreasing time, across calls.
#[test]
fn snapshots_are_monotonic_across_calls() -> Result<()> {
    init_logging();
    let mut engine = gas(16, 7)?;
    let budgets: Vec<Budget> = (0..30).map(|i| Budget::unbounded().steps(i % 4 + 1)).collect();
    let snaps = collect(&mut engine, &budgets)?;
    for (i, s) in snaps.iter().enumerate() {
        assert_eq!(s.step(), i as u64 + 1);
        assert_eq!(s.balls().len(), 16);
    }
    for w in snaps.windows(2) {
        assert!(w[1].time() >= w[0].time());
    }
    Ok(())
}

/// Identical inputs give bit-identical histories.
#[test]
fn runs_are_deterministic() -> Result<()> {
    init_logging();
    let mut a = gas(24, 8)?;
    let mut b = gas(24, 8)?;
    let budget = [Budget::unbounded().steps(300)];
    assert_eq!(collect(&mut a, &budget)?, collect(&mut b, &budget)?);
    Ok(())
}

/// Elastic contacts and frictionless walls conserve kinetic energy.
#[test]
fn energy_is_conserved() -> Result<()> {
    init_logging();
    let mut engine = gas(32, 9)?;
    let e0 = engine.kinetic_energy();
    engine.advance(Budget::unbounded().steps(2000))?;
    let e1 = engine.kinetic_energy();
    let rel = ((e1 - e0) / e0).abs();
    assert!(rel < 1e-9, "relative energy drift {rel} too large (E0={e0}, E1={e1})");
    assert_eq!(engine.num_balls(), 32);
    Ok(())
}

/// A halt condition ends the run with a final batch; further calls are refused.
#[test]
fn halt_condition_finishes_run() -> Result<()> {
    init_logging();
    let mut engine = gas(24, 10)?.with_halt_condition(HaltAtTime(30.0));
    let mut snaps = Vec::new();
    let mut calls = 0;
    loop {
        calls += 1;
        let batch = engine.advance(Budget::unbounded().steps(3))?;
        snaps.extend(batch.snapshots);
        if batch.finished {
            assert_eq!(batch.progress.fract(), 0.0);
            break;
        }
    }
    assert!(calls > 1);
    assert!(engine.is_halted());

    let (last, earlier) = snaps.split_last().expect("events before t = 30");
    assert!(earlier.iter().all(|s| s.time() < 30.0));
    assert!(last.time() >= 30.0);

    assert!(matches!(
        engine.advance(Budget::unbounded()),
        Err(Error::ResumeAfterHalt)
    ));
    Ok(())
}

/// A NaN time ceiling is refused rather than read as unbounded.
#[test]
fn nan_time_ceiling_is_rejected() -> Result<()> {
    init_logging();
    let mut engine = gas(6, 11)?;
    let err = engine.advance(Budget::unbounded().until_time(f64::NAN)).unwrap_err();
    assert!(matches!(err, Error::InvalidParam(_)));
    assert_eq!(engine.step(), 0);
    assert!(!engine.is_halted());
    Ok(())
}
