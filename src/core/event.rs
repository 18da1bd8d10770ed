use crate::error::{Error, Result};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of an arena wall.
///
/// For axis k, `2*k` is the min wall and `2*k + 1` the max wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub u32);

impl WallId {
    /// The wall at coordinate 0 on `axis`.
    #[inline]
    pub fn min_of(axis: usize) -> Self {
        Self((2 * axis) as u32)
    }

    /// The wall at the far end of `axis`.
    #[inline]
    pub fn max_of(axis: usize) -> Self {
        Self((2 * axis + 1) as u32)
    }

    /// Returns `(axis, is_max)`.
    #[inline]
    pub fn axis_side(self) -> (usize, bool) {
        ((self.0 / 2) as usize, self.0 % 2 == 1)
    }
}

impl fmt::Display for WallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One object taking part in a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    /// A ball, by stable id.
    Ball(u32),
    /// An arena wall.
    Wall(WallId),
}

/// The event that ended a step.
///
/// Ball ids are the stable `Ball::id` values, not population indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// Contact between balls `first` and `second`.
    BallBall { first: u32, second: u32 },
    /// Ball `ball` reached wall `wall`.
    BallWall { ball: u32, wall: WallId },
}

impl CollisionEvent {
    /// Classify a loose participant list.
    ///
    /// Accepts exactly two participants: ball/ball, ball/wall or wall/ball (normalised so
    /// the ball comes first). Anything else is `Error::UnsupportedCollisionShape`.
    pub fn from_participants(participants: &[Participant]) -> Result<Self> {
        match *participants {
            [Participant::Ball(first), Participant::Ball(second)] => {
                Ok(CollisionEvent::BallBall { first, second })
            }
            [Participant::Ball(ball), Participant::Wall(wall)]
            | [Participant::Wall(wall), Participant::Ball(ball)] => {
                Ok(CollisionEvent::BallWall { ball, wall })
            }
            [Participant::Wall(_), Participant::Wall(_)] => Err(Error::UnsupportedCollisionShape(
                "wall/wall interaction has no ball participant".into(),
            )),
            _ => Err(Error::UnsupportedCollisionShape(format!(
                "expected exactly 2 participants, got {}",
                participants.len()
            ))),
        }
    }

    /// The two participants, ball first.
    pub fn participants(&self) -> [Participant; 2] {
        match *self {
            CollisionEvent::BallBall { first, second } => {
                [Participant::Ball(first), Participant::Ball(second)]
            }
            CollisionEvent::BallWall { ball, wall } => {
                [Participant::Ball(ball), Participant::Wall(wall)]
            }
        }
    }
}

impl fmt::Display for CollisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionEvent::BallBall { first, second } => {
                write!(f, "ball: {first} and ball: {second}")
            }
            CollisionEvent::BallWall { ball, wall } => write!(f, "ball: {ball} and wall: {wall}"),
        }
    }
}

/// Resolver selected by a candidate, addressed by population index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Pair { first: usize, second: usize },
    Wall { ball: usize, wall: WallId },
}

/// A possible next event found while scanning one step.
///
/// Ordered by `time`, then by `order` (the position in the scan where it was found), so
/// simultaneous events always resolve the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub time: NotNan<f64>,
    pub order: u64,
    pub interrupt: Interrupt,
}

impl Candidate {
    /// Create a candidate, validating that the time is finite and non-negative.
    pub fn new(time: f64, order: u64, interrupt: Interrupt) -> Result<Self> {
        if !time.is_finite() {
            return Err(Error::InvalidParam("event time must be finite".into()));
        }
        if time < 0.0 {
            return Err(Error::InvalidParam("event time cannot be negative".into()));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        Ok(Self {
            time,
            order,
            interrupt,
        })
    }

    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => self.order.cmp(&other.order),
            o => o,
        }
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
