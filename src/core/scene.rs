use crate::core::ball::{dot, Ball, DIM};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Parameters for a randomly populated arena of identical balls.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Number of balls to place.
    pub num_balls: usize,
    /// Arena edge lengths; must match the boundary the balls are simulated in.
    pub arena_size: [f64; DIM],
    pub radius: f64,
    pub mass: f64,
    /// Velocity components are sampled uniformly in [-max_speed, max_speed].
    pub max_speed: f64,
    /// RNG seed for reproducibility; `None` for nondeterministic placement.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            num_balls: 16,
            arena_size: [10.0, 10.0],
            radius: 0.2,
            mass: 1.0,
            max_speed: 1.0,
            seed: None,
        }
    }
}

impl SceneConfig {
    fn validate(&self) -> Result<()> {
        if !self.arena_size.iter().all(|&l| l.is_finite() && l > 0.0) {
            return Err(Error::InvalidParam(
                "arena_size components must be finite and > 0".into(),
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !self.max_speed.is_finite() || self.max_speed < 0.0 {
            return Err(Error::InvalidParam(
                "max_speed must be finite and >= 0".into(),
            ));
        }
        for &l in &self.arena_size {
            if l < 2.0 * self.radius {
                return Err(Error::InvalidParam(
                    "arena_size must be at least 2 * radius in every dimension".into(),
                ));
            }
        }
        Ok(())
    }

    /// Place `num_balls` non-overlapping balls with ids `0..num_balls`.
    ///
    /// Positions are rejection-sampled inside `[radius, L - radius]` on each axis.
    ///
    /// Errors: `Error::InvalidParam` on invalid parameters or if a ball cannot be placed
    /// without overlap.
    pub fn build(&self) -> Result<Vec<Ball>> {
        self.validate()?;

        let mut rng: StdRng = match self.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        let speed = self.max_speed;
        self.place(&mut rng, |rng| {
            [
                rng.random_range(-speed..=speed),
                rng.random_range(-speed..=speed),
            ]
        })
    }

    /// Draw centres until each fits, then give the ball a velocity from `velocity`.
    fn place<R: Rng>(
        &self,
        rng: &mut R,
        mut velocity: impl FnMut(&mut R) -> [f64; DIM],
    ) -> Result<Vec<Ball>> {
        let radius = self.radius;
        let mut balls: Vec<Ball> = Vec::with_capacity(self.num_balls);
        for id in 0..(self.num_balls as u32) {
            let r = (0..MAX_PLACEMENT_ATTEMPTS)
                .map(|_| {
                    std::array::from_fn::<f64, DIM, _>(|k| {
                        rng.random_range(radius..=self.arena_size[k] - radius)
                    })
                })
                .find(|r| !overlaps_existing(&balls, r, radius))
                .ok_or_else(|| {
                    Error::InvalidParam(format!(
                        "failed to place ball {id} without overlap; try fewer balls or a smaller radius"
                    ))
                })?;
            balls.push(Ball::new(id, r, velocity(rng), radius, self.mass)?);
        }
        Ok(balls)
    }
}

const MAX_PLACEMENT_ATTEMPTS: usize = 1_000_000;

fn overlaps_existing(existing: &[Ball], r: &[f64; DIM], radius: f64) -> bool {
    let min_sq = (2.0 * radius) * (2.0 * radius);
    existing.iter().any(|b| {
        let mut d = [0.0_f64; DIM];
        for ((dk, &rk), &bk) in d.iter_mut().zip(r.iter()).zip(b.r.iter()) {
            *dk = rk - bk;
        }
        dot(&d, &d) < min_sq
    })
}
