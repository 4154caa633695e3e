//! Autonomous opponent
//!
//! A brain cycles WAITING -> THINKING -> READY. Thinking picks a target and
//! decides an angle and power; ready steps the turret and power one unit per
//! tick toward that decision and fires once both match. Each new think after
//! a shot corrects the aim from where the previous shot landed.
//!
//! References to the target and the last shot are plain ids and positions,
//! re-validated against the roster every think.

use glam::DVec2;
use rand::Rng;
use serde::Serialize;

use super::tank::{Tank, TankCommand, TankId};
use crate::consts::*;
use crate::sin_deg;

/// Horizontal distance bands for the opening angle guess
pub const LONG_RANGE: i32 = 200;
pub const MEDIUM_RANGE: i32 = 100;
/// Aim error beyond which one degree of angle is traded for it
pub const ANGLE_THRESHOLD: f64 = 120.0;
/// Distance kept from the legal angle limits
pub const ANGLE_SAFETY_MARGIN: i32 = 2;
/// Random spread on the opening angle guess, in degrees either way
pub const ANGLE_JITTER: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BrainState {
    /// One tick of deliberation delay before thinking
    #[default]
    Waiting,
    Thinking,
    /// Actuating toward the decided angle and power
    Ready,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Brain {
    pub state: BrainState,
    pub target: Option<TankId>,
    /// Where our previous shot came to rest
    pub last_shot: Option<DVec2>,
    pub target_angle: i32,
    pub target_power: i32,
}

impl Brain {
    /// Run one tick of the state machine for tank `me`
    ///
    /// Only call while the tank is settled and has no shot in flight.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        me: TankId,
        roster: &[Tank],
        wind: f64,
        rng: &mut R,
    ) -> Option<TankCommand> {
        match self.state {
            BrainState::Waiting => {
                self.state = BrainState::Thinking;
                None
            }
            BrainState::Thinking => {
                self.think(me, roster, wind, rng);
                self.state = BrainState::Ready;
                None
            }
            BrainState::Ready => self.act(&roster[me]),
        }
    }

    /// Decide target angle and power
    pub fn think<R: Rng + ?Sized>(&mut self, me: TankId, roster: &[Tank], wind: f64, rng: &mut R) {
        let tank = &roster[me];

        match self.live_target(roster) {
            None => {
                self.target = acquire_target(me, roster);
                if let Some(target) = self.target {
                    let dx = distance_x(tank, &roster[target]);
                    self.target_angle =
                        initial_angle(dx) + rng.random_range(-ANGLE_JITTER..=ANGLE_JITTER);
                    self.target_power = initial_power(dx, wind, self.target_angle);
                    log::debug!(
                        "{} targets {} at dx {}: angle {} power {}",
                        tank.name,
                        roster[target].name,
                        dx,
                        self.target_angle,
                        self.target_power
                    );
                }
            }
            Some(target) => {
                if let Some(shot) = self.last_shot {
                    self.adjust_aim(tank, &roster[target], shot);
                }
            }
        }

        self.clamp_targets(tank);
    }

    /// Current target if it still exists and is alive
    fn live_target(&self, roster: &[Tank]) -> Option<TankId> {
        self.target.filter(|&id| roster.get(id).is_some_and(|t| t.alive))
    }

    /// Correct the decision from the previous shot's resting point
    fn adjust_aim(&mut self, tank: &Tank, target: &Tank, shot: DVec2) {
        let mut error = aim_error(tank.pos, target.center(), shot);

        if error > ANGLE_THRESHOLD {
            if tank.turret_angle > 45 {
                error -= ANGLE_THRESHOLD;
                self.target_angle -= 1;
            } else if tank.turret_angle < 45 {
                error -= ANGLE_THRESHOLD;
                self.target_angle += 1;
            }
        }
        if error < -ANGLE_THRESHOLD {
            if tank.turret_angle > 135 {
                error += ANGLE_THRESHOLD;
                self.target_angle -= 1;
            } else if tank.turret_angle < 135 {
                error += ANGLE_THRESHOLD;
                self.target_angle += 1;
            }
        }

        let correction = error.abs().sqrt() as i32;
        if error > 0.0 {
            self.target_power += correction;
        } else {
            self.target_power -= correction;
        }

        log::debug!(
            "{} corrects aim: error {:.1}, angle {} power {}",
            tank.name,
            error,
            self.target_angle,
            self.target_power
        );
    }

    /// Keep decisions inside the tank's safe range
    pub fn clamp_targets(&mut self, tank: &Tank) {
        let (min_angle, max_angle) = tank.angle_bounds();
        self.target_angle = self
            .target_angle
            .clamp(min_angle + ANGLE_SAFETY_MARGIN, max_angle - ANGLE_SAFETY_MARGIN);
        let (min_power, max_power) = tank.power_bounds();
        self.target_power = self.target_power.clamp(min_power, max_power);
    }

    /// One unit of actuation toward the decision, or fire when it is reached
    fn act(&mut self, tank: &Tank) -> Option<TankCommand> {
        self.clamp_targets(tank);

        let command = if tank.turret_angle != self.target_angle {
            if tank.turret_angle > self.target_angle {
                TankCommand::RotateRight
            } else {
                TankCommand::RotateLeft
            }
        } else if tank.power != self.target_power {
            if tank.power > self.target_power {
                TankCommand::PowerDown
            } else {
                TankCommand::PowerUp
            }
        } else {
            self.state = BrainState::Waiting;
            TankCommand::Fire
        };
        Some(command)
    }
}

/// Signed horizontal distance from `from` to `to`, truncated to whole units
pub fn distance_x(from: &Tank, to: &Tank) -> i32 {
    (to.pos.x - from.pos.x) as i32
}

/// Closest living opponent by horizontal distance; first in roster order wins ties
pub fn acquire_target(me: TankId, roster: &[Tank]) -> Option<TankId> {
    let tank = &roster[me];
    let mut best: Option<(TankId, i32)> = None;

    for other in roster.iter().filter(|t| t.id != me && t.alive) {
        let d = distance_x(tank, other).abs();
        if best.is_none_or(|(_, closest)| d < closest) {
            best = Some((other.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Opening angle guess: shallow for far targets, steeper when close,
/// mirrored when the target is to the left
pub fn initial_angle(dx: i32) -> i32 {
    let near_side = match dx.abs() {
        d if d > LONG_RANGE => 55,
        d if d > MEDIUM_RANGE => 65,
        _ => 80,
    };
    if dx > 0 { near_side } else { 180 - near_side }
}

/// Opening power guess from distance, wind and angle
pub fn initial_power(dx: i32, wind: f64, angle: i32) -> i32 {
    let distance = wind_adjusted_distance(dx as f64, wind);
    let power = (8.0 * distance.abs()).sqrt() * angle_power_factor(angle);
    power as i32
}

/// A tailwind shortens the effective distance, a headwind stretches it
fn wind_adjusted_distance(d: f64, wind: f64) -> f64 {
    if (d + wind).abs() > d.abs() {
        d / (1.0 + wind.abs())
    } else {
        d * (1.0 + wind.abs())
    }
}

/// 1.0 straight up, rising to 1.5 at 45 and 135 degrees
fn angle_power_factor(angle: i32) -> f64 {
    let from_vertical = (angle - 90).abs().min(45);
    1.0 + sin_deg((2 * from_vertical) as f64) / 2.0
}

/// Signed aim error from the previous shot
///
/// Positive means the shot fell short (more power needed). A shot that lands
/// low also counts as short, at a quarter weight.
pub fn aim_error(source: DVec2, target: DVec2, shot: DVec2) -> f64 {
    let drop = (shot.y - target.y) / 4.0;
    if source.x < target.x {
        target.x - shot.x + drop
    } else if source.x > target.x {
        shot.x - target.x + drop
    } else {
        0.0
    }
}
