//! Explosion resolution: crater the terrain, then hurt nearby tanks

use glam::DVec2;

use super::tank::{Tank, TankId};
use super::terrain::Terrain;
use crate::consts::*;

/// What an explosion did to the roster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplosionReport {
    /// (tank, health lost) for every tank that took damage
    pub hits: Vec<(TankId, i32)>,
    /// Tanks destroyed by this explosion
    pub destroyed: Vec<TankId>,
}

/// Damage to a tank whose center is `distance` from an explosion of `radius`
///
/// Falls off linearly; zero once the explosion no longer reaches the body.
pub fn explosion_damage(distance: f64, radius: f64) -> i32 {
    let damage = (DAMAGE_FACTOR * (TANK_RADIUS + radius - distance)) as i32;
    damage.max(0)
}

/// Apply an explosion at `center`
pub fn resolve_explosion(
    terrain: &mut Terrain,
    tanks: &mut [Tank],
    center: DVec2,
    radius: f64,
) -> ExplosionReport {
    terrain.deform(center, radius);

    let mut report = ExplosionReport::default();
    for tank in tanks.iter_mut() {
        if !tank.alive || !tank.overlaps_circle(center, radius) {
            continue;
        }

        let damage = explosion_damage(center.distance(tank.center()), radius);
        if damage <= 0 {
            continue;
        }

        if tank.apply_damage(damage) {
            report.destroyed.push(tank.id);
        }
        report.hits.push((tank.id, damage));
        log::debug!("{} takes {} damage ({} left)", tank.name, damage, tank.health);
    }
    report
}
