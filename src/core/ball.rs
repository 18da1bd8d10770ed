use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// A rigid disc moving in straight lines between collisions.
///
/// Fields:
/// - `id`: stable identifier, used in snapshots and descriptions
/// - `r`: centre position [x, y]
/// - `v`: velocity [vx, vy]
/// - `angle`: orientation in radians
/// - `angular_velocity`: rate of change of `angle`
/// - `radius`: disc radius (> 0)
/// - `mass`: disc mass (> 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Stable ball identifier.
    pub id: u32,
    /// Centre position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Orientation (radians).
    pub angle: f64,
    /// Angular velocity (radians per unit time).
    pub angular_velocity: f64,
    /// Disc radius (> 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
}

impl Ball {
    /// Create a new non-rotating ball after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(id: u32, r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            id,
            r,
            v,
            angle: 0.0,
            angular_velocity: 0.0,
            radius,
            mass,
        })
    }

    /// Set the initial orientation and spin (validated as finite).
    pub fn with_spin(mut self, angle: f64, angular_velocity: f64) -> Result<Self> {
        if !angle.is_finite() || !angular_velocity.is_finite() {
            return Err(Error::InvalidParam(
                "angle and angular velocity must be finite".into(),
            ));
        }
        self.angle = angle;
        self.angular_velocity = angular_velocity;
        Ok(self)
    }

    /// Move along the current straight line for `dt` and integrate the orientation.
    #[inline]
    pub fn linear_propagate(&mut self, dt: f64) {
        for (rk, &vk) in self.r.iter_mut().zip(self.v.iter()) {
            *rk += vk * dt;
        }
        self.angle += self.angular_velocity * dt;
    }

    /// Returns the ball's translational kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * dot(&self.v, &self.v)
    }

    /// Set position (validated as finite).
    pub fn set_position(&mut self, r: [f64; DIM]) -> Result<()> {
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        self.r = r;
        Ok(())
    }

    /// Set velocity (validated as finite).
    pub fn set_velocity(&mut self, v: [f64; DIM]) -> Result<()> {
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.v = v;
        Ok(())
    }
}

#[inline]
pub(crate) fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
