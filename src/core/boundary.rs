//! Arena boundaries: wall-collision prediction and resolution.
//!
//! Walls of the rectangular arena `[0, Lx] x [0, Ly]` are numbered per axis:
//! `2*k` is the min wall on axis k and `2*k + 1` the max wall.

use crate::core::ball::{Ball, DIM};
use crate::core::event::WallId;
use crate::core::EPS_TIME;
use crate::error::{Error, Result};

/// Wall geometry and reflection rule of an arena.
///
/// The engine only ever calls these from its own scan; implementations should be
/// pure apart from the mutation performed in `resolve_wall_collision`.
pub trait Boundary {
    /// Time until `ball` next touches a wall, and which wall. `None` if it never does.
    fn wall_collision(&self, ball: &Ball) -> Option<(f64, WallId)>;

    /// Apply the wall interaction to `ball`, which has just reached `wall`.
    fn resolve_wall_collision(&self, ball: &mut Ball, wall: WallId) -> Result<()>;
}

impl<B: Boundary + ?Sized> Boundary for Box<B> {
    fn wall_collision(&self, ball: &Ball) -> Option<(f64, WallId)> {
        (**self).wall_collision(ball)
    }

    fn resolve_wall_collision(&self, ball: &mut Ball, wall: WallId) -> Result<()> {
        (**self).resolve_wall_collision(ball, wall)
    }
}

fn validate_size(size: [f64; DIM]) -> Result<()> {
    if !size.iter().all(|&l| l.is_finite() && l > 0.0) {
        return Err(Error::InvalidParam(
            "arena size components must be finite and > 0".into(),
        ));
    }
    Ok(())
}

/// Earliest crossing of the planes `lo` / `hi(k)` on any axis, for a point moving with `v`.
fn earliest_plane_hit(
    r: &[f64; DIM],
    v: &[f64; DIM],
    lo: f64,
    hi: impl Fn(usize) -> f64,
) -> Option<(f64, WallId)> {
    let mut best_t = f64::INFINITY;
    let mut best_wall: Option<WallId> = None;

    for (k, (&x, &vk)) in r.iter().zip(v.iter()).enumerate() {
        let (t_rel, wall) = if vk < -EPS_TIME {
            ((lo - x) / vk, WallId::min_of(k))
        } else if vk > EPS_TIME {
            ((hi(k) - x) / vk, WallId::max_of(k))
        } else {
            continue;
        };
        // Slightly negative times are round-off at the plane itself.
        let t_rel = t_rel.max(0.0);
        if t_rel < best_t {
            best_t = t_rel;
            best_wall = Some(wall);
        }
    }

    best_wall.map(|w| (best_t, w))
}

fn check_wall(wall: WallId) -> Result<(usize, bool)> {
    let (axis, is_max) = wall.axis_side();
    if axis >= DIM {
        return Err(Error::InvalidParam(format!("wall id {} out of range", wall.0)));
    }
    Ok((axis, is_max))
}

/// Periodic arena: a ball whose centre leaves through one edge re-enters through the opposite one.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclicBoundary {
    size: [f64; DIM],
}

impl CyclicBoundary {
    /// Create a periodic arena with edge lengths `size`.
    pub fn new(size: [f64; DIM]) -> Result<Self> {
        validate_size(size)?;
        Ok(Self { size })
    }

    /// Edge lengths of the arena.
    pub fn size(&self) -> [f64; DIM] {
        self.size
    }
}

impl Boundary for CyclicBoundary {
    fn wall_collision(&self, ball: &Ball) -> Option<(f64, WallId)> {
        earliest_plane_hit(&ball.r, &ball.v, 0.0, |k| self.size[k])
    }

    fn resolve_wall_collision(&self, ball: &mut Ball, wall: WallId) -> Result<()> {
        let (axis, is_max) = check_wall(wall)?;
        // Wrap to the opposite edge; velocity is unchanged.
        ball.r[axis] = if is_max { 0.0 } else { self.size[axis] };
        Ok(())
    }
}

/// Reflective arena without friction coupling.
///
/// On contact the normal velocity component is inverted and the tangential one is scaled
/// by `tangential_restitution` (1.0 keeps it, 0.0 removes it).
#[derive(Debug, Clone, PartialEq)]
pub struct SlipperyBoundary {
    size: [f64; DIM],
    tangential_restitution: f64,
}

impl SlipperyBoundary {
    /// Create a reflective arena that preserves tangential velocity.
    pub fn new(size: [f64; DIM]) -> Result<Self> {
        Self::with_tangential_restitution(size, 1.0)
    }

    /// Create a reflective arena that damps the tangential velocity component on each bounce.
    pub fn with_tangential_restitution(size: [f64; DIM], tangential_restitution: f64) -> Result<Self> {
        validate_size(size)?;
        if !(0.0..=1.0).contains(&tangential_restitution) {
            return Err(Error::InvalidParam(
                "tangential restitution must lie in [0, 1]".into(),
            ));
        }
        Ok(Self {
            size,
            tangential_restitution,
        })
    }

    /// Edge lengths of the arena.
    pub fn size(&self) -> [f64; DIM] {
        self.size
    }

    pub fn tangential_restitution(&self) -> f64 {
        self.tangential_restitution
    }
}

impl Boundary for SlipperyBoundary {
    fn wall_collision(&self, ball: &Ball) -> Option<(f64, WallId)> {
        // Contact when the rim touches the wall: x = radius or x = L - radius.
        earliest_plane_hit(&ball.r, &ball.v, ball.radius, |k| self.size[k] - ball.radius)
    }

    fn resolve_wall_collision(&self, ball: &mut Ball, wall: WallId) -> Result<()> {
        let (axis, is_max) = check_wall(wall)?;
        for k in 0..DIM {
            if k == axis {
                ball.v[k] = -ball.v[k];
            } else {
                ball.v[k] *= self.tangential_restitution;
            }
        }

        // Snap onto the contact plane
        ball.r[axis] = if is_max {
            self.size[axis] - ball.radius
        } else {
            ball.radius
        };
        Ok(())
    }
}
