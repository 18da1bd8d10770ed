//! Immutable per-event records of the whole ball population.

use crate::core::ball::{Ball, DIM};
use crate::core::engine::SimClock;
use crate::core::event::{CollisionEvent, Participant};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Kinematic copy of one ball at a snapshot instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub id: u32,
    pub position: [f64; DIM],
    pub velocity: [f64; DIM],
    pub angle: f64,
    pub angular_velocity: f64,
}

impl From<&Ball> for BallState {
    fn from(b: &Ball) -> Self {
        Self {
            id: b.id,
            position: b.r,
            velocity: b.v,
            angle: b.angle,
            angular_velocity: b.angular_velocity,
        }
    }
}

/// State of every ball right after one event was resolved.
///
/// Built by the engine once per step; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    time: f64,
    step: u64,
    event: CollisionEvent,
    balls: Vec<BallState>,
}

impl StateSnapshot {
    pub(crate) fn capture(clock: &SimClock, event: CollisionEvent, balls: &[Ball]) -> Self {
        Self {
            time: clock.time,
            step: clock.step,
            event,
            balls: balls.iter().map(BallState::from).collect(),
        }
    }

    /// Simulated time of the event.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Step index of the event (the first event is step 1).
    pub fn step(&self) -> u64 {
        self.step
    }

    /// The collision that produced this snapshot.
    pub fn event(&self) -> CollisionEvent {
        self.event
    }

    /// All balls, in population order.
    pub fn balls(&self) -> &[BallState] {
        &self.balls
    }

    /// Look up a ball by its stable id.
    pub fn ball(&self, id: u32) -> Option<&BallState> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.balls.iter().map(|b| b.position).collect()
    }

    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.balls.iter().map(|b| b.velocity).collect()
    }

    /// Human-readable description of the event, with its approximate location.
    pub fn description(&self) -> Result<String> {
        describe_collision(&self.event.participants(), self)
    }
}

/// Describe a collision between `participants`, locating them in `snapshot`.
///
/// Ball/ball contacts are located at the midpoint of the two centres, ball/wall contacts
/// at the ball's centre.
///
/// Errors: `Error::UnsupportedCollisionShape` unless the participants are exactly two and
/// form a ball/ball or ball/wall pair whose balls exist in `snapshot`.
pub fn describe_collision(participants: &[Participant], snapshot: &StateSnapshot) -> Result<String> {
    let event = CollisionEvent::from_participants(participants)?;
    let lookup = |id: u32| {
        snapshot.ball(id).ok_or_else(|| {
            Error::UnsupportedCollisionShape(format!("ball {id} is not part of the snapshot"))
        })
    };

    let location = match event {
        CollisionEvent::BallBall { first, second } => {
            let (a, b) = (lookup(first)?, lookup(second)?);
            let mut mid = [0.0_f64; DIM];
            for (k, m) in mid.iter_mut().enumerate() {
                *m = (a.position[k] + b.position[k]) / 2.0;
            }
            mid
        }
        CollisionEvent::BallWall { ball, .. } => lookup(ball)?.position,
    };

    Ok(format!(
        "interaction between {event}. at approximate coordinates: {location:?}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::WallId;

    fn two_ball_snapshot(event: CollisionEvent) -> Result<StateSnapshot> {
        let balls = [
            Ball::new(10, [1.0, 2.0], [1.0, 0.0], 0.5, 1.0)?,
            Ball::new(11, [3.0, 4.0], [0.0, -1.0], 0.5, 1.0)?,
        ];
        Ok(StateSnapshot::capture(
            &SimClock { time: 2.5, step: 3 },
            event,
            &balls,
        ))
    }

    #[test]
    fn capture_copies_every_ball() -> Result<()> {
        let snap = two_ball_snapshot(CollisionEvent::BallBall { first: 10, second: 11 })?;
        assert_eq!(snap.time(), 2.5);
        assert_eq!(snap.step(), 3);
        assert_eq!(snap.balls().len(), 2);
        assert_eq!(snap.positions(), vec![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(snap.velocities(), vec![[1.0, 0.0], [0.0, -1.0]]);
        Ok(())
    }

    #[test]
    fn ball_ball_description_uses_midpoint() -> Result<()> {
        let snap = two_ball_snapshot(CollisionEvent::BallBall { first: 10, second: 11 })?;
        let text = snap.description()?;
        assert_eq!(
            text,
            "interaction between ball: 10 and ball: 11. at approximate coordinates: [2.0, 3.0]"
        );
        Ok(())
    }

    #[test]
    fn ball_wall_description_uses_ball_position() -> Result<()> {
        let snap = two_ball_snapshot(CollisionEvent::BallWall { ball: 11, wall: WallId(3) })?;
        let text = snap.description()?;
        assert_eq!(
            text,
            "interaction between ball: 11 and wall: 3. at approximate coordinates: [3.0, 4.0]"
        );
        Ok(())
    }

    #[test]
    fn wall_first_participants_are_accepted() -> Result<()> {
        let snap = two_ball_snapshot(CollisionEvent::BallBall { first: 10, second: 11 })?;
        let text = describe_collision(&[Participant::Wall(WallId(0)), Participant::Ball(10)], &snap)?;
        assert!(text.contains("ball: 10 and wall: 0"));
        Ok(())
    }

    #[test]
    fn unsupported_shapes_are_errors() -> Result<()> {
        let snap = two_ball_snapshot(CollisionEvent::BallBall { first: 10, second: 11 })?;
        let three = [
            Participant::Ball(10),
            Participant::Ball(11),
            Participant::Wall(WallId(0)),
        ];
        assert!(matches!(
            describe_collision(&three, &snap),
            Err(Error::UnsupportedCollisionShape(_))
        ));
        assert!(matches!(
            describe_collision(&[Participant::Ball(10), Participant::Ball(99)], &snap),
            Err(Error::UnsupportedCollisionShape(_))
        ));
        Ok(())
    }
}
