//! Projectile ballistics
//!
//! Trajectory of a projectile with the y axis pointing down:
//! `y = y0 - d·tan(θ) + g·d² / (2·(v·cos θ)²)`, where `d` is horizontal
//! travel since launch. Straight-up shots (θ = 90) have no horizontal
//! component, so they run on decaying vertical velocity instead.

use glam::DVec2;
use serde::Serialize;

use crate::consts::*;
use crate::{cos_deg, tan_deg};

/// Vertical velocity lost per tick by a straight-up shot
pub const VERTICAL_DECAY: f64 = 2.0 * SHOT_SPEED / GRAVITY;

/// A shot in flight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shot {
    /// Launch point (turret end)
    pub origin: DVec2,
    /// Launch angle in degrees
    pub angle: i32,
    /// Launch power
    pub power: f64,
    /// Current vertical velocity, only used by straight-up shots
    pub velocity: f64,
    /// Signed horizontal travel since launch, excluding wind drift
    pub travel: f64,
    pub pos: DVec2,
}

impl Shot {
    pub fn launch(origin: DVec2, angle: i32, power: f64) -> Self {
        Self {
            origin,
            angle,
            power,
            velocity: power,
            travel: 0.0,
            pos: origin,
        }
    }

    /// Advance one tick. Wind drifts x only; it never feeds back into the arc.
    pub fn advance(&mut self, wind: f64) {
        if self.angle != 90 {
            self.advance_along_trajectory();
        } else {
            self.advance_vertically();
        }
        self.pos.x += wind;
    }

    fn advance_along_trajectory(&mut self) {
        let step = cos_deg(self.angle as f64) * SHOT_SPEED;
        self.travel += step;
        self.pos.x += step;
        self.pos.y = self.height_at(self.travel);
    }

    fn advance_vertically(&mut self) {
        let previous = self.velocity;
        self.velocity -= VERTICAL_DECAY;
        self.pos.y += (self.velocity.powi(2) - previous.powi(2)) / (2.0 * GRAVITY);
    }

    /// Analytic height after `travel` horizontal units
    pub fn height_at(&self, travel: f64) -> f64 {
        let theta = self.angle as f64;
        let horizontal_speed = self.power * cos_deg(theta);
        self.origin.y - travel * tan_deg(theta)
            + GRAVITY * travel * travel / (2.0 * horizontal_speed * horizontal_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_45_degree_closed_form() {
        let origin = DVec2::new(100.0, 400.0);
        let power = 50.0;
        let mut shot = Shot::launch(origin, 45, power);

        for _ in 0..40 {
            shot.advance(0.0);
            let d = shot.travel;
            let expected = origin.y - d + GRAVITY * d * d / (2.0 * (power * FRAC_1_SQRT_2).powi(2));
            assert!(
                (shot.pos.y - expected).abs() < 1e-9,
                "travel {d}: {} vs {expected}",
                shot.pos.y
            );
            assert!((shot.pos.x - (origin.x + d)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rises_then_falls() {
        let mut shot = Shot::launch(DVec2::new(100.0, 400.0), 60, 40.0);
        let mut peak = shot.pos.y;
        for _ in 0..20 {
            shot.advance(0.0);
            peak = peak.min(shot.pos.y);
        }
        assert!(peak < 400.0);

        for _ in 0..400 {
            shot.advance(0.0);
        }
        assert!(shot.pos.y > 400.0);
    }

    #[test]
    fn test_leftward_shot_mirrors_rightward() {
        let origin = DVec2::new(400.0, 300.0);
        let mut right = Shot::launch(origin, 50, 45.0);
        let mut left = Shot::launch(origin, 130, 45.0);
        for _ in 0..30 {
            right.advance(0.0);
            left.advance(0.0);
        }
        assert!((right.pos.x - origin.x + (left.pos.x - origin.x)).abs() < 1e-9);
        assert!((right.pos.y - left.pos.y).abs() < 1e-9);
    }

    #[test]
    fn test_wind_only_drifts_horizontally() {
        let origin = DVec2::new(400.0, 300.0);
        let mut calm = Shot::launch(origin, 70, 45.0);
        let mut windy = Shot::launch(origin, 70, 45.0);
        for _ in 0..25 {
            calm.advance(0.0);
            windy.advance(0.5);
        }
        assert!((windy.pos.x - calm.pos.x - 12.5).abs() < 1e-9);
        assert_eq!(windy.pos.y, calm.pos.y);
        assert_eq!(windy.travel, calm.travel);
    }

    #[test]
    fn test_straight_up_decays_and_returns() {
        let origin = DVec2::new(400.0, 300.0);
        let mut shot = Shot::launch(origin, 90, 30.0);

        shot.advance(0.0);
        assert!(shot.pos.y < origin.y);
        assert_eq!(shot.pos.x, origin.x);
        assert!((shot.velocity - (30.0 - VERTICAL_DECAY)).abs() < 1e-12);

        // Once velocity has flipped sign and grown past launch speed, it is below the origin
        let ticks = (2.0 * 30.0 / VERTICAL_DECAY).ceil() as usize + 2;
        for _ in 0..ticks {
            shot.advance(0.0);
        }
        assert!(shot.pos.y > origin.y);
    }
}
