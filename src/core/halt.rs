use crate::core::ball::Ball;
use crate::core::engine::SimClock;

/// Decides when a run is over. Evaluated once before each step, never mid-step.
pub trait HaltCondition {
    fn should_halt(&mut self, clock: &SimClock, balls: &[Ball]) -> bool;
}

/// Runs forever; callers bound the work with budgets instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverHalt;

impl HaltCondition for NeverHalt {
    fn should_halt(&mut self, _clock: &SimClock, _balls: &[Ball]) -> bool {
        false
    }
}

/// Halts once simulated time has reached the given instant.
#[derive(Debug, Clone, Copy)]
pub struct HaltAtTime(pub f64);

impl HaltCondition for HaltAtTime {
    fn should_halt(&mut self, clock: &SimClock, _balls: &[Ball]) -> bool {
        clock.time >= self.0
    }
}

/// Halts once the given number of events has been resolved.
#[derive(Debug, Clone, Copy)]
pub struct HaltAfterSteps(pub u64);

impl HaltCondition for HaltAfterSteps {
    fn should_halt(&mut self, clock: &SimClock, _balls: &[Ball]) -> bool {
        clock.step >= self.0
    }
}

impl<F> HaltCondition for F
where
    F: FnMut(&SimClock, &[Ball]) -> bool,
{
    fn should_halt(&mut self, clock: &SimClock, balls: &[Ball]) -> bool {
        self(clock, balls)
    }
}
