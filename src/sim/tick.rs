//! Fixed timestep simulation tick
//!
//! Turn coordination. Every tick runs, in order: the active tank's controls
//! (brain or input), settling for every tank, the active shot, then wind.

use super::damage::resolve_explosion;
use super::state::{GameEvent, GameState, MatchStatus};
use super::tank::TankCommand;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
///
/// Only applied to a human-controlled active tank that is settled and has
/// no shot in flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Launch a shot with the current angle and power
    pub fire: bool,
    pub power_up: bool,
    pub power_down: bool,
    /// Turret one degree counter-clockwise
    pub rotate_left: bool,
    /// Turret one degree clockwise
    pub rotate_right: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Adjustments first, firing last
    fn commands(&self) -> impl Iterator<Item = TankCommand> {
        [
            (self.rotate_left, TankCommand::RotateLeft),
            (self.rotate_right, TankCommand::RotateRight),
            (self.power_up, TankCommand::PowerUp),
            (self.power_down, TankCommand::PowerDown),
            (self.fire, TankCommand::Fire),
        ]
        .into_iter()
        .filter_map(|(pressed, command)| pressed.then_some(command))
    }
}

/// How a shot stands after moving this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShotOutcome {
    InFlight,
    Impact,
    Missed,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if input.pause {
        match state.status {
            MatchStatus::InProgress => {
                state.status = MatchStatus::Paused;
                log::info!("Paused");
                return;
            }
            MatchStatus::Paused => {
                state.status = MatchStatus::InProgress;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    if state.status != MatchStatus::InProgress {
        return;
    }

    state.time_ticks += 1;

    drive_active_tank(state, input);

    for tank in &mut state.tanks {
        tank.settle(&state.terrain);
    }

    update_shot(state);

    state.perturb_wind();
}

/// Brain or input for the active tank, while it is settled and not shooting
fn drive_active_tank(state: &mut GameState, input: &TickInput) {
    let active = state.active;
    let tank = &state.tanks[active];
    if !tank.alive || tank.in_flight() || tank.is_falling(&state.terrain) {
        return;
    }

    if tank.autonomous {
        let mut brain = std::mem::take(&mut state.tanks[active].brain);
        let command = brain.step(active, &state.tanks, state.wind, &mut state.rng);
        state.tanks[active].brain = brain;
        if let Some(command) = command {
            state.command_active(command);
        }
    } else {
        for command in input.commands() {
            state.command_active(command);
        }
    }
}

fn update_shot(state: &mut GameState) {
    let active = state.active;
    let wind = state.wind;
    let Some(shot) = state.tanks[active].shot.as_mut() else {
        return;
    };
    shot.advance(wind);
    let pos = shot.pos;

    let outcome = if pos.x < 0.0 || pos.x >= WORLD_WIDTH as f64 {
        ShotOutcome::Missed
    } else if pos.y >= WORLD_HEIGHT as f64
        || state.terrain.is_ground(pos)
        || state.tanks.iter().any(|t| t.contains_point(pos))
    {
        ShotOutcome::Impact
    } else {
        ShotOutcome::InFlight
    };

    if outcome == ShotOutcome::InFlight {
        log::trace!("Shot at ({:.1}, {:.1})", pos.x, pos.y);
        return;
    }

    let shooter = &mut state.tanks[active];
    shooter.shot = None;
    shooter.brain.last_shot = Some(pos);

    if outcome == ShotOutcome::Impact {
        log::debug!("{} shot impacts at ({:.1}, {:.1})", shooter.name, pos.x, pos.y);
        state.events.push(GameEvent::Explosion {
            at: pos,
            radius: EXPLOSION_RADIUS,
        });

        let report =
            resolve_explosion(&mut state.terrain, &mut state.tanks, pos, EXPLOSION_RADIUS);
        for &(tank, damage) in &report.hits {
            state.events.push(GameEvent::TankHit { tank, damage });
        }
        for &tank in &report.destroyed {
            state.events.push(GameEvent::TankDestroyed { tank });
        }
    } else {
        log::debug!("{} shot leaves the field at x {:.1}", shooter.name, pos.x);
        state.events.push(GameEvent::ShotMissed { tank: active });
    }

    state.end_turn();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos_deg;
    use crate::sim::{Tank, Terrain};
    use proptest::prelude::*;

    fn humans(active: usize) -> GameState {
        let tanks = vec![
            Tank::new(0, "A", false).at(700.0, 400.0),
            Tank::new(1, "B", false).at(100.0, 400.0),
        ];
        GameState::from_layout(11, Terrain::flat(400), tanks, active).unwrap()
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_controls_move_one_unit() {
        let mut state = humans(0);
        let input = TickInput {
            rotate_left: true,
            power_up: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.tanks[0].turret_angle, TANK_START_ANGLE + 1);
        assert_eq!(state.tanks[0].power, TANK_START_POWER + 1);
        // Inactive tank ignores input
        assert_eq!(state.tanks[1].turret_angle, TANK_START_ANGLE);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_fire_launches_and_advances_same_tick() {
        let mut state = humans(0);
        state.tanks[0].turret_angle = 30;

        tick(&mut state, &fire());

        assert_eq!(state.shots_fired, 1);
        assert!(matches!(state.events[0], GameEvent::ShotFired { tank: 0, angle: 30, .. }));
        let shot = state.shot().unwrap();
        assert!((shot.travel - cos_deg(30.0) * SHOT_SPEED).abs() < 1e-9);

        // No second shot while one is in flight
        tick(&mut state, &fire());
        assert_eq!(state.shots_fired, 1);
    }

    #[test]
    fn test_miss_hands_turn_over() {
        let mut state = humans(0);
        state.tanks[0].turret_angle = 30;
        state.tanks[0].power = TANK_MAX_POWER;

        tick(&mut state, &fire());
        let mut ticks = 0;
        while state.active == 0 {
            tick(&mut state, &TickInput::default());
            ticks += 1;
            assert!(ticks < 1000, "shot never left the field");
        }

        assert!(state.events.contains(&GameEvent::ShotMissed { tank: 0 }));
        assert!(state.events.contains(&GameEvent::TurnChanged { tank: 1 }));
        assert!(state.shot().is_none());
        assert!(state.tanks[0].brain.last_shot.unwrap().x >= WORLD_WIDTH as f64);
        assert!(state.tanks.iter().all(|t| t.health == TANK_MAX_HEALTH));
    }

    #[test]
    fn test_shot_straight_up_lands_on_shooter() {
        let mut state = humans(0);
        state.tanks[0].power = TANK_MIN_POWER;

        tick(&mut state, &fire());
        for _ in 0..1000 {
            if state.is_over() {
                break;
            }
            tick(&mut state, &TickInput::default());
        }

        assert!(!state.tanks[0].alive);
        assert_eq!(state.status, MatchStatus::Won { winner: 1 });
        assert!(state.events.contains(&GameEvent::TankDestroyed { tank: 0 }));
        assert!(state.events.contains(&GameEvent::MatchWon { winner: 1 }));
        assert!(state.terrain.height_at(700) > 400);
    }

    #[test]
    fn test_wreck_stops_shots() {
        // Small mesa holding a destroyed tank just right of the shooter
        let mut heights = vec![400; WORLD_WIDTH];
        for h in &mut heights[123..=148] {
            *h = 388;
        }
        let terrain = Terrain::from_heights(heights).unwrap();
        let mut wreck = Tank::new(1, "W", false).at(135.6, 388.0);
        wreck.alive = false;
        wreck.health = 0;
        let tanks = vec![
            Tank::new(0, "A", false).at(100.0, 400.0),
            wreck,
            Tank::new(2, "B", false).at(700.0, 400.0),
        ];
        let mut state = GameState::from_layout(3, terrain, tanks, 0).unwrap();
        state.tanks[0].turret_angle = 30;
        state.tanks[0].power = TANK_MAX_POWER;

        tick(&mut state, &fire());
        for _ in 0..10 {
            if state.shot().is_none() {
                break;
            }
            tick(&mut state, &TickInput::default());
        }

        let at = state.tanks[0].brain.last_shot.unwrap();
        assert!(at.x < 140.0, "shot passed through the wreck to x {}", at.x);
        let explosions = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count();
        assert_eq!(explosions, 1);
        // Wrecks block shots but take no more damage
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::TankHit { tank: 1, .. }))
        );
        assert!(!state.tanks[1].alive);
        assert_eq!(state.tanks[2].health, TANK_MAX_HEALTH);
        assert_eq!(state.active, 2);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut state = humans(0);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut state, &pause);
        assert_eq!(state.status, MatchStatus::Paused);
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &fire());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.shots_fired, 0);

        tick(&mut state, &pause);
        assert_eq!(state.status, MatchStatus::InProgress);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_concluded_match_ignores_ticks() {
        let mut state = humans(0);
        state.tanks[1].alive = false;
        state.end_turn();
        let ticks = state.time_ticks;

        tick(&mut state, &fire());
        assert_eq!(state.time_ticks, ticks);
        assert!(state.shot().is_none());
    }

    #[test]
    fn test_spawned_tanks_fall_before_acting() {
        let mut state = GameState::initialize(21, &[true, true]).unwrap();
        assert!(state.tanks.iter().all(|t| t.pos.y == 0.0));

        for _ in 0..400 {
            tick(&mut state, &TickInput::default());
        }
        for tank in &state.tanks {
            assert!(tank.pos.y > 0.0 && tank.pos.y <= WORLD_HEIGHT as f64);
            assert!(tank.ground_contact(&state.terrain).any());
        }
    }

    #[test]
    fn test_ai_duel_terminates() {
        let tanks = vec![
            Tank::new(0, "A", true).at(300.0, 400.0),
            Tank::new(1, "B", true).at(450.0, 400.0),
        ];
        let mut state = GameState::from_layout(7, Terrain::flat(400), tanks, 0).unwrap();

        for _ in 0..50_000 {
            if state.is_over() {
                break;
            }
            tick(&mut state, &TickInput::default());
        }

        assert!(
            matches!(state.status, MatchStatus::Won { .. }),
            "status {:?} after {} ticks",
            state.status,
            state.time_ticks
        );
        assert_eq!(state.alive_count(), 1);
        assert!(state.shots_fired >= 1);
    }

    #[test]
    fn test_generated_matches_conclude() {
        for players in 2..=MAX_PLAYERS {
            for seed in 0..16 {
                let mut state = GameState::initialize(seed, &vec![true; players]).unwrap();
                while !state.is_over() && state.time_ticks < 100_000 {
                    tick(&mut state, &TickInput::default());
                }
                assert!(
                    state.is_over(),
                    "seed {seed} with {players} tanks still running, shots fired {}",
                    state.shots_fired
                );
                assert!(state.alive_count() <= 1);
            }
        }
    }

    #[test]
    fn test_same_seed_same_match() {
        let run = || {
            let mut state = GameState::initialize(99, &[true, true, true]).unwrap();
            for _ in 0..3000 {
                tick(&mut state, &TickInput::default());
            }
            serde_json::to_string(&state).unwrap()
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_wind_stays_bounded(seed in any::<u64>()) {
            let mut state = GameState::initialize(seed, &[true, true]).unwrap();
            for _ in 0..2000 {
                tick(&mut state, &TickInput::default());
                prop_assert!((-1.0..=1.0).contains(&state.wind));
            }
        }
    }
}
