//! Tank entity: footprint geometry, settling and controls
//!
//! A tank body is a half-disc of radius `TANK_RADIUS` standing on its base
//! segment. `pos` is the midpoint of that base. Tilt rotates the base around
//! `pos`; the turret angle is absolute (90 = straight up) and is not affected
//! by tilt.

use glam::DVec2;
use serde::Serialize;

use super::brain::Brain;
use super::shot::Shot;
use super::terrain::Terrain;
use crate::consts::*;
use crate::{cos_deg, sin_deg};

/// Stable tank identifier (index into the roster)
pub type TankId = usize;

/// Call-signs for tanks that were not given a name
pub const CALL_SIGNS: [&str; 15] = [
    "SKYNET", "SMARTANK", "DUMBTANK", "TANKDUDE", "TANKGUY", "TANKETTE", "TANKGIRL", "TANKSTER",
    "FISH", "SEPTIC", "THOMAS", "AIMBOT", "PANZER", "SHERMAN", "ACAIN",
];

/// A single control step, from a human or from a brain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TankCommand {
    /// Turret angle +1 degree
    RotateLeft,
    /// Turret angle -1 degree
    RotateRight,
    PowerUp,
    PowerDown,
    Fire,
}

/// Which footprint points are touching the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroundContact {
    pub left: bool,
    pub mid: bool,
    pub right: bool,
}

impl GroundContact {
    pub fn any(&self) -> bool {
        self.left || self.mid || self.right
    }

    /// Resting on the left edge only
    pub fn only_left(&self) -> bool {
        self.left && !self.mid && !self.right
    }

    /// Resting on the right edge only
    pub fn only_right(&self) -> bool {
        self.right && !self.left && !self.mid
    }

    /// Fully grounded: midpoint down, or both edges down
    pub fn settled(&self) -> bool {
        self.mid || (self.left && self.right)
    }
}

/// A tank on the battlefield
#[derive(Debug, Clone, Serialize)]
pub struct Tank {
    pub id: TankId,
    pub name: String,
    /// Driven by a brain rather than by input events
    pub autonomous: bool,
    /// Base midpoint
    pub pos: DVec2,
    /// Degrees, 90 = straight up
    pub turret_angle: i32,
    /// Degrees; positive raises the left edge
    pub tilt: i32,
    pub power: i32,
    pub health: i32,
    /// Once false, never true again
    pub alive: bool,
    pub brain: Brain,
    /// Shot currently in flight
    pub shot: Option<Shot>,
}

impl Tank {
    pub fn new(id: TankId, name: impl Into<String>, autonomous: bool) -> Self {
        Self {
            id,
            name: name.into(),
            autonomous,
            pos: DVec2::ZERO,
            turret_angle: TANK_START_ANGLE,
            tilt: 0,
            power: TANK_START_POWER,
            health: TANK_MAX_HEALTH,
            alive: true,
            brain: Brain::default(),
            shot: None,
        }
    }

    /// Builder: place the base midpoint
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.pos = DVec2::new(x, y);
        self
    }

    /// Unit vector along the base, left to right
    #[inline]
    fn base_dir(&self) -> DVec2 {
        let tilt = self.tilt as f64;
        DVec2::new(cos_deg(tilt), sin_deg(tilt))
    }

    /// Unit vector perpendicular to the base, pointing out of the body
    #[inline]
    fn up_dir(&self) -> DVec2 {
        let tilt = self.tilt as f64;
        DVec2::new(sin_deg(tilt), -cos_deg(tilt))
    }

    pub fn left_base_point(&self) -> DVec2 {
        self.pos - self.base_dir() * TANK_RADIUS
    }

    pub fn mid_base_point(&self) -> DVec2 {
        self.pos
    }

    pub fn right_base_point(&self) -> DVec2 {
        self.pos + self.base_dir() * TANK_RADIUS
    }

    /// Center of the body, half a radius above the base
    pub fn center(&self) -> DVec2 {
        self.pos + self.up_dir() * (TANK_RADIUS / 2.0)
    }

    /// Muzzle position; shots start here
    pub fn turret_end(&self) -> DVec2 {
        let angle = self.turret_angle as f64;
        self.pos + DVec2::new(cos_deg(angle), -sin_deg(angle)) * TURRET_LENGTH
    }

    /// Point-in-footprint test
    pub fn contains_point(&self, point: DVec2) -> bool {
        let offset = point - self.pos;
        offset.dot(self.up_dir()) >= 0.0 && offset.length() <= TANK_RADIUS
    }

    /// Does a circle intersect the footprint?
    pub fn overlaps_circle(&self, center: DVec2, radius: f64) -> bool {
        let offset = center - self.pos;
        let local = DVec2::new(offset.dot(self.base_dir()), offset.dot(self.up_dir()));

        let closest = if local.y >= 0.0 {
            if local.length() <= TANK_RADIUS {
                local
            } else {
                local * (TANK_RADIUS / local.length())
            }
        } else {
            // Below the base: nearest point lies on the base segment
            DVec2::new(local.x.clamp(-TANK_RADIUS, TANK_RADIUS), 0.0)
        };

        local.distance(closest) <= radius
    }

    /// Legal turret range; tilting narrows it
    pub fn angle_bounds(&self) -> (i32, i32) {
        let narrowing = self.tilt.abs().min(MAX_TILT_NARROWING);
        (TANK_MIN_ANGLE + narrowing, TANK_MAX_ANGLE - narrowing)
    }

    pub fn power_bounds(&self) -> (i32, i32) {
        (TANK_MIN_POWER, TANK_MAX_POWER)
    }

    /// Pull angle and power back inside the legal bounds
    pub fn clamp_controls(&mut self) {
        let (min_angle, max_angle) = self.angle_bounds();
        self.turret_angle = self.turret_angle.clamp(min_angle, max_angle);
        let (min_power, max_power) = self.power_bounds();
        self.power = self.power.clamp(min_power, max_power);
    }

    /// Apply one control step. Returns the launched shot on `Fire`.
    pub fn apply(&mut self, command: TankCommand) -> Option<&Shot> {
        match command {
            TankCommand::RotateLeft => self.turret_angle += 1,
            TankCommand::RotateRight => self.turret_angle -= 1,
            TankCommand::PowerUp => self.power += 1,
            TankCommand::PowerDown => self.power -= 1,
            TankCommand::Fire => {
                self.clamp_controls();
                self.shot = Some(Shot::launch(
                    self.turret_end(),
                    self.turret_angle,
                    self.power as f64,
                ));
                return self.shot.as_ref();
            }
        }
        self.clamp_controls();
        None
    }

    /// Has a shot in flight
    #[inline]
    pub fn in_flight(&self) -> bool {
        self.shot.is_some()
    }

    pub fn ground_contact(&self, terrain: &Terrain) -> GroundContact {
        self.contact_at_tilt(terrain, self.tilt)
    }

    /// Ground contact the footprint would have at another tilt
    fn contact_at_tilt(&self, terrain: &Terrain, tilt: i32) -> GroundContact {
        let half_base = DVec2::new(cos_deg(tilt as f64), sin_deg(tilt as f64)) * TANK_RADIUS;
        GroundContact {
            left: terrain.is_ground(self.pos - half_base),
            mid: terrain.is_ground(self.pos),
            right: terrain.is_ground(self.pos + half_base),
        }
    }

    /// Resting on one edge with nowhere left to tip
    ///
    /// True when one more degree of leveling would only swap which edge
    /// touches, or when the tilt is already at its limit.
    pub fn is_wedged(&self, terrain: &Terrain) -> bool {
        let contact = self.ground_contact(terrain);
        if contact.only_left() {
            self.tilt >= MAX_TILT_NARROWING
                || self.contact_at_tilt(terrain, self.tilt + 1).only_right()
        } else if contact.only_right() {
            self.tilt <= -MAX_TILT_NARROWING
                || self.contact_at_tilt(terrain, self.tilt - 1).only_left()
        } else {
            false
        }
    }

    /// Not yet resting: airborne, or still tipping onto one edge
    pub fn is_falling(&self, terrain: &Terrain) -> bool {
        !self.ground_contact(terrain).settled() && !self.is_wedged(terrain)
    }

    /// One tick of falling and self-leveling
    pub fn settle(&mut self, terrain: &Terrain) {
        let floor = WORLD_HEIGHT as f64;
        if !self.ground_contact(terrain).any() && self.pos.y < floor {
            self.pos.y = (self.pos.y + FALL_STEP).min(floor);
        }

        if !self.is_wedged(terrain) {
            let contact = self.ground_contact(terrain);
            if contact.only_left() {
                self.tilt += 1;
            } else if contact.only_right() {
                self.tilt -= 1;
            }
        }

        self.clamp_controls();
    }

    /// Subtract health. Returns true if this hit destroyed the tank.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        if !self.alive || damage <= 0 {
            return false;
        }

        self.health = (self.health - damage).max(0);
        if self.health == 0 {
            self.alive = false;
            log::info!("{} destroyed", self.name);
            return true;
        }
        false
    }
}
