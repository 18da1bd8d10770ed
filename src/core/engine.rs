use crate::core::ball::Ball;
use crate::core::boundary::Boundary;
use crate::core::contact::{CollisionOracle, ElasticContact};
use crate::core::event::{Candidate, CollisionEvent, Interrupt};
use crate::core::halt::{HaltCondition, NeverHalt};
use crate::core::snapshot::StateSnapshot;
use crate::error::{Error, Result};
use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::fmt;
use std::mem;
use std::time::{Duration, Instant};

/// Simulated time and number of resolved events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub time: f64,
    pub step: u64,
}

/// Limits on how much work one `advance` call may do. Every limit defaults to unbounded.
///
/// - `time_ceiling`: absolute simulated time at which to pause
/// - `step_ceiling`: number of additional events to resolve in this call
/// - `wall_clock`: real time allowed for this call, measured from its start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub time_ceiling: f64,
    pub step_ceiling: Option<u64>,
    pub wall_clock: Option<Duration>,
}

impl Default for Budget {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Budget {
    /// No limits. Only a halt condition can end such a call.
    pub fn unbounded() -> Self {
        Self {
            time_ceiling: f64::INFINITY,
            step_ceiling: None,
            wall_clock: None,
        }
    }

    pub fn until_time(mut self, time: f64) -> Self {
        self.time_ceiling = time;
        self
    }

    pub fn steps(mut self, steps: u64) -> Self {
        self.step_ceiling = Some(steps);
        self
    }

    pub fn wall_clock(mut self, limit: Duration) -> Self {
        self.wall_clock = Some(limit);
        self
    }
}

/// Output of one `advance` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Snapshots resolved since the previous batch, oldest first.
    pub snapshots: Vec<StateSnapshot>,
    /// `snapshots.len()` plus the scanned fraction of the step in flight.
    pub progress: f64,
    /// True on the final batch, once the halt condition has fired.
    pub finished: bool,
}

/// Where the scan of the current step stands. Pauses only ever happen between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Halt condition not yet evaluated for this step.
    Pending,
    /// Top of the step, nothing scanned.
    Begin,
    /// Next evaluation is the pair (first, second).
    Pair { first: usize, second: usize },
    /// Next evaluation is the wall check for `first`.
    Wall { first: usize },
    /// Scan complete; pick and apply the earliest candidate.
    Resolve,
}

/// Event-driven simulation of hard discs inside a `Boundary`.
///
/// Each step scans every ball pair and every ball-wall combination for the earliest
/// collision, drifts all balls to that instant, resolves it and records a snapshot.
/// `advance` may stop mid-scan when its budget runs out; the next call resumes at the
/// same pair without repeating work.
pub struct Engine<B, O = ElasticContact> {
    boundary: B,
    oracle: O,
    halt: Box<dyn HaltCondition>,
    balls: Vec<Ball>,
    clock: SimClock,
    cursor: Cursor,
    candidates: Vec<Candidate>,
    pending: Vec<StateSnapshot>,
    halted: bool,
}

impl<B: Boundary> Engine<B, ElasticContact> {
    /// Create an engine with elastic ball contacts and no halt condition.
    ///
    /// Errors: `Error::InvalidParam` if two balls share an id or a ball has a
    /// non-positive radius or mass.
    pub fn new(boundary: B, balls: Vec<Ball>) -> Result<Self> {
        Self::with_oracle(boundary, ElasticContact, balls)
    }
}

impl<B: Boundary, O: CollisionOracle> Engine<B, O> {
    /// Create an engine using `oracle` for ball-ball contacts.
    pub fn with_oracle(boundary: B, oracle: O, balls: Vec<Ball>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(balls.len());
        for b in &balls {
            if !seen.insert(b.id) {
                return Err(Error::InvalidParam(format!("duplicate ball id {}", b.id)));
            }
            if !(b.radius.is_finite() && b.radius > 0.0) || !(b.mass.is_finite() && b.mass > 0.0) {
                return Err(Error::InvalidParam(format!(
                    "ball {} must have finite positive radius and mass",
                    b.id
                )));
            }
        }
        let capacity = balls.len() * (balls.len() + 1) / 2;
        Ok(Self {
            boundary,
            oracle,
            halt: Box::new(NeverHalt),
            balls,
            clock: SimClock::default(),
            cursor: Cursor::Pending,
            candidates: Vec::with_capacity(capacity),
            pending: Vec::new(),
            halted: false,
        })
    }

    /// Install the condition that ends the run.
    pub fn with_halt_condition(mut self, halt: impl HaltCondition + 'static) -> Self {
        self.halt = Box::new(halt);
        self
    }

    /// Run until the budget is exhausted or the halt condition fires.
    ///
    /// The budget is checked at the top of each step and before every pair and wall
    /// evaluation. A step that has been scanned is always fully applied, so a time
    /// ceiling can be overshot by at most the step that was already under way.
    ///
    /// Errors:
    /// - `Error::ResumeAfterHalt` if a previous call already returned the final batch
    /// - `Error::DegenerateStep` if a step has no finite collision candidate; snapshots
    ///   completed before it stay available through `take_pending`
    /// - `Error::InvalidParam` if the time ceiling is NaN
    /// - any error raised by the boundary or oracle while resolving an event; the failed
    ///   step is not counted and earlier snapshots stay available through `take_pending`
    pub fn advance(&mut self, budget: Budget) -> Result<Batch> {
        if budget.time_ceiling.is_nan() {
            return Err(Error::InvalidParam("time ceiling must not be NaN".into()));
        }
        let time_ceiling = budget.time_ceiling;
        let target_step = budget
            .step_ceiling
            .map(|k| self.clock.step.saturating_add(k));
        let deadline = budget
            .wall_clock
            .and_then(|d| Instant::now().checked_add(d));

        self.run(|clock| {
            clock.time >= time_ceiling
                || target_step.is_some_and(|s| clock.step >= s)
                || deadline.is_some_and(|d| Instant::now() >= d)
        })
    }

    /// Drive the scan state machine until `should_pause` returns true or the run halts.
    pub(crate) fn run(&mut self, mut should_pause: impl FnMut(&SimClock) -> bool) -> Result<Batch> {
        if self.halted {
            return Err(Error::ResumeAfterHalt);
        }
        let n = self.balls.len();

        loop {
            match self.cursor {
                Cursor::Pending => {
                    if self.halt.should_halt(&self.clock, &self.balls) {
                        self.halted = true;
                        info!(
                            "halt condition met at step {} (t = {})",
                            self.clock.step, self.clock.time
                        );
                        let snapshots = mem::take(&mut self.pending);
                        let progress = snapshots.len() as f64;
                        return Ok(Batch {
                            snapshots,
                            progress,
                            finished: true,
                        });
                    }
                    self.cursor = Cursor::Begin;
                }
                Cursor::Begin => {
                    if should_pause(&self.clock) {
                        return Ok(self.pause());
                    }
                    self.cursor = match n {
                        0 => Cursor::Resolve,
                        1 => Cursor::Wall { first: 0 },
                        _ => Cursor::Pair {
                            first: 0,
                            second: 1,
                        },
                    };
                }
                Cursor::Pair { first, second } => {
                    if should_pause(&self.clock) {
                        return Ok(self.pause());
                    }
                    if let Some(t) = self
                        .oracle
                        .time_to_contact(&self.balls[first], &self.balls[second])
                    {
                        self.push_candidate(t, Interrupt::Pair { first, second })?;
                    }
                    self.cursor = if second + 1 < n {
                        Cursor::Pair {
                            first,
                            second: second + 1,
                        }
                    } else {
                        Cursor::Wall { first }
                    };
                }
                Cursor::Wall { first } => {
                    if should_pause(&self.clock) {
                        return Ok(self.pause());
                    }
                    if let Some((t, wall)) = self.boundary.wall_collision(&self.balls[first]) {
                        self.push_candidate(t, Interrupt::Wall { ball: first, wall })?;
                    }
                    let next = first + 1;
                    self.cursor = if next + 1 < n {
                        Cursor::Pair {
                            first: next,
                            second: next + 1,
                        }
                    } else if next < n {
                        Cursor::Wall { first: next }
                    } else {
                        Cursor::Resolve
                    };
                }
                Cursor::Resolve => self.resolve_step()?,
            }
        }
    }

    /// Returns current simulated time.
    pub fn time(&self) -> f64 {
        self.clock.time
    }

    /// Number of events resolved so far.
    pub fn step(&self) -> u64 {
        self.clock.step
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn num_balls(&self) -> usize {
        self.balls.len()
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// True once the halt condition has fired. Never resets.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Total translational kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.balls.iter().map(|b| b.kinetic_energy()).sum()
    }

    /// Drain snapshots resolved but not yet returned, e.g. after `advance` failed.
    pub fn take_pending(&mut self) -> Vec<StateSnapshot> {
        mem::take(&mut self.pending)
    }

    // ============ Internal helpers ============

    fn push_candidate(&mut self, t: f64, interrupt: Interrupt) -> Result<()> {
        if !t.is_finite() || t < 0.0 {
            trace!("discarding candidate {interrupt:?} at dt = {t}");
            return Ok(());
        }
        let order = self.candidates.len() as u64;
        self.candidates.push(Candidate::new(t, order, interrupt)?);
        Ok(())
    }

    fn pause(&mut self) -> Batch {
        let snapshots = mem::take(&mut self.pending);
        let progress = snapshots.len() as f64 + self.scan_progress();
        debug!(
            "pausing at step {} (t = {}) with {} snapshots, cursor {:?}",
            self.clock.step,
            self.clock.time,
            snapshots.len(),
            self.cursor
        );
        Batch {
            snapshots,
            progress,
            finished: false,
        }
    }

    /// Fraction of the current step's scan already done, in [0, 1).
    fn scan_progress(&self) -> f64 {
        let n = self.balls.len() as f64;
        let row = |i: usize, j: f64| {
            let i = i as f64;
            i / n + (j - i) / ((n - i + 1.0) * n)
        };
        match self.cursor {
            Cursor::Pair { first, second } => row(first, second as f64),
            Cursor::Wall { first } => row(first, n),
            Cursor::Pending | Cursor::Begin | Cursor::Resolve => 0.0,
        }
    }

    /// Apply the earliest candidate: drift everyone, resolve, snapshot.
    ///
    /// The resolver works on drifted copies of the involved balls; nothing is committed
    /// unless it succeeds, so a failed step leaves the engine at the top of that step.
    fn resolve_step(&mut self) -> Result<()> {
        let Some(best) = self.candidates.iter().min().copied() else {
            // Halt was already evaluated for this step; a retry starts the scan over.
            self.cursor = Cursor::Begin;
            let step = self.clock.step + 1;
            warn!(
                "no collision candidate for step {step} among {} balls",
                self.balls.len()
            );
            return Err(Error::DegenerateStep {
                step,
                time: self.clock.time,
            });
        };
        self.candidates.clear();

        let dt = best.time_f64();
        let drifted = |b: &Ball| {
            let mut b = b.clone();
            b.linear_propagate(dt);
            b
        };
        let resolved = match best.interrupt {
            Interrupt::Pair { first, second } => {
                let mut a = drifted(&self.balls[first]);
                let mut b = drifted(&self.balls[second]);
                self.oracle
                    .resolve_contact(&mut a, &mut b)
                    .map(|()| {
                        let event = CollisionEvent::BallBall {
                            first: a.id,
                            second: b.id,
                        };
                        (event, (first, a), Some((second, b)))
                    })
            }
            Interrupt::Wall { ball, wall } => {
                let mut b = drifted(&self.balls[ball]);
                self.boundary
                    .resolve_wall_collision(&mut b, wall)
                    .map(|()| (CollisionEvent::BallWall { ball: b.id, wall }, (ball, b), None))
            }
        };
        let (event, (i, a), other) = match resolved {
            Ok(parts) => parts,
            Err(e) => {
                self.cursor = Cursor::Begin;
                warn!(
                    "resolving step {} at t = {} failed: {e}",
                    self.clock.step + 1,
                    self.clock.time + dt
                );
                return Err(e);
            }
        };

        for ball in &mut self.balls {
            ball.linear_propagate(dt);
        }
        self.balls[i] = a;
        if let Some((j, b)) = other {
            self.balls[j] = b;
        }
        self.clock.time += dt;
        self.clock.step += 1;
        self.cursor = Cursor::Pending;

        debug!(
            "step {} at t = {}: {}",
            self.clock.step, self.clock.time, event
        );
        self.pending
            .push(StateSnapshot::capture(&self.clock, event, &self.balls));
        Ok(())
    }
}

impl<B: fmt::Debug, O: fmt::Debug> fmt::Debug for Engine<B, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("boundary", &self.boundary)
            .field("oracle", &self.oracle)
            .field("clock", &self.clock)
            .field("num_balls", &self.balls.len())
            .field("cursor", &self.cursor)
            .field("pending", &self.pending.len())
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}
