use crate::core::ball::{dot, Ball, DIM};
use crate::core::EPS_TIME;
use crate::error::{Error, Result};

/// Pairwise collision physics between two balls.
pub trait CollisionOracle {
    /// Time until `a` and `b` touch, assuming both keep their current straight-line paths.
    /// `None` if they never meet.
    fn time_to_contact(&self, a: &Ball, b: &Ball) -> Option<f64>;

    /// Apply the contact response to both balls, which are touching now.
    fn resolve_contact(&self, a: &mut Ball, b: &mut Ball) -> Result<()>;
}

/// Perfectly elastic, frictionless hard-disc contact.
///
/// Only the velocity components along the line of centres change; spin is left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElasticContact;

impl CollisionOracle for ElasticContact {
    fn time_to_contact(&self, a: &Ball, b: &Ball) -> Option<f64> {
        let mut d = [0.0_f64; DIM];
        let mut u = [0.0_f64; DIM];
        for (k, u_k) in u.iter_mut().enumerate() {
            d[k] = b.r[k] - a.r[k];
            *u_k = b.v[k] - a.v[k];
        }
        let qa = dot(&u, &u);
        if qa == 0.0 {
            return None; // No relative motion
        }
        let qb = 2.0 * dot(&d, &u);
        let r_sum = a.radius + b.radius;
        let qc = dot(&d, &d) - r_sum * r_sum;

        let disc = qb * qb - 4.0 * qa * qc;
        if disc <= 0.0 {
            return None;
        }

        // Earlier root; require approaching and not already past first contact
        let t_rel = (-qb - disc.sqrt()) / (2.0 * qa);
        if qb >= 0.0 || t_rel < 0.0 || !t_rel.is_finite() {
            return None;
        }
        Some(t_rel)
    }

    fn resolve_contact(&self, a: &mut Ball, b: &mut Ball) -> Result<()> {
        // Unit normal at contact from a -> b
        let mut n = [0.0_f64; DIM];
        for ((nk, &rb), &ra) in n.iter_mut().zip(b.r.iter()).zip(a.r.iter()) {
            *nk = rb - ra;
        }
        let dist = dot(&n, &n).sqrt();
        if dist <= EPS_TIME {
            return Err(Error::MathError(format!(
                "degenerate contact normal between balls {} and {}",
                a.id, b.id
            )));
        }
        for nk in &mut n {
            *nk /= dist;
        }

        let mut u = [0.0_f64; DIM];
        for ((uk, &vb), &va) in u.iter_mut().zip(b.v.iter()).zip(a.v.iter()) {
            *uk = vb - va;
        }
        let u_n = dot(&u, &n);

        let (ma, mb) = (a.mass, b.mass);
        let fa = (2.0 * mb / (ma + mb)) * u_n;
        let fb = (2.0 * ma / (ma + mb)) * u_n;
        for (k, &nk) in n.iter().enumerate() {
            a.v[k] += fa * nk;
            b.v[k] -= fb * nk;
        }
        Ok(())
    }
}
