//! Match state and lifecycle
//!
//! `GameState` is the whole simulation context: terrain, roster, wind, RNG
//! and turn ownership. Everything a presentation layer needs to draw the
//! match is a public field or a query here.

use anyhow::{bail, ensure};
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::shot::Shot;
use super::tank::{CALL_SIGNS, Tank, TankCommand, TankId};
use super::terrain::Terrain;
use crate::consts::*;
use crate::settings::{PlayerSettings, Settings};

/// Where the match stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    InProgress,
    /// Frozen until unpaused
    Paused,
    /// Exactly one tank left alive
    Won { winner: TankId },
    /// The last tanks died together
    Draw,
}

/// Things that happened during the last tick, for sounds and effects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    ShotFired { tank: TankId, angle: i32, power: i32 },
    Explosion { at: DVec2, radius: f64 },
    TankHit { tank: TankId, damage: i32 },
    TankDestroyed { tank: TankId },
    ShotMissed { tank: TankId },
    TurnChanged { tank: TankId },
    MatchWon { winner: TankId },
    MatchDrawn,
}

/// Per-tank line of the end-of-match summary
#[derive(Debug, Clone, Serialize)]
pub struct TankSummary {
    pub name: String,
    pub health: i32,
    pub alive: bool,
}

/// Compact result of a match
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub status: MatchStatus,
    pub winner: Option<String>,
    pub ticks: u64,
    pub shots_fired: u32,
    pub tanks: Vec<TankSummary>,
}

/// Complete match state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Seed the match was started with
    pub seed: u64,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub status: MatchStatus,
    pub terrain: Terrain,
    /// Roster in turn order; dead tanks stay
    pub tanks: Vec<Tank>,
    /// The one tank allowed to act
    pub active: TankId,
    /// Horizontal drift per tick, in [-1, 1]
    pub wind: f64,
    pub shots_fired: u32,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Seats used to rebuild the roster on reset
    players: Vec<PlayerSettings>,
}

impl GameState {
    /// Generate terrain, place the roster and pick a random first player
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let mut state = Self {
            seed: settings.seed,
            rng: Pcg32::seed_from_u64(settings.seed),
            time_ticks: 0,
            status: MatchStatus::InProgress,
            terrain: Terrain::flat(WORLD_HEIGHT),
            tanks: Vec::new(),
            active: 0,
            wind: 0.0,
            shots_fired: 0,
            events: Vec::new(),
            players: settings.players.clone(),
        };
        state.setup()?;
        Ok(state)
    }

    /// Roster of `autonomous.len()` tanks, each flagged human or AI
    pub fn initialize(seed: u64, autonomous: &[bool]) -> anyhow::Result<Self> {
        Self::new(&Settings::from_autonomy(seed, autonomous))
    }

    /// Fixed scenario: given terrain, pre-placed tanks and first player
    pub fn from_layout(
        seed: u64,
        terrain: Terrain,
        mut tanks: Vec<Tank>,
        active: TankId,
    ) -> anyhow::Result<Self> {
        ensure!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&tanks.len()),
            "roster needs {}..={} tanks, got {}",
            MIN_PLAYERS,
            MAX_PLAYERS,
            tanks.len()
        );
        ensure!(active < tanks.len(), "active tank {} not in roster", active);

        for (id, tank) in tanks.iter_mut().enumerate() {
            tank.id = id;
            tank.clamp_controls();
        }
        let players = tanks
            .iter()
            .map(|t| PlayerSettings {
                name: Some(t.name.clone()),
                autonomous: t.autonomous,
            })
            .collect();

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            status: MatchStatus::InProgress,
            terrain,
            tanks,
            active,
            wind: 0.0,
            shots_fired: 0,
            events: Vec::new(),
            players,
        })
    }

    /// Throw everything away and start a fresh match with the same seats
    ///
    /// The RNG carries on, so the new layout differs from the last one.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.time_ticks = 0;
        self.status = MatchStatus::InProgress;
        self.wind = 0.0;
        self.shots_fired = 0;
        self.events.clear();
        self.setup()
    }

    fn setup(&mut self) -> anyhow::Result<()> {
        self.terrain = Terrain::generate(&mut self.rng);

        let mut tanks = Vec::with_capacity(self.players.len());
        for (id, player) in self.players.iter().enumerate() {
            let name = match &player.name {
                Some(name) => name.clone(),
                None => {
                    let pick = self.rng.random_range(0..CALL_SIGNS.len());
                    CALL_SIGNS[pick].to_string()
                }
            };
            tanks.push(Tank::new(id, name, player.autonomous));
        }
        place_tanks(&mut self.rng, &mut tanks)?;
        self.tanks = tanks;

        self.active = self.rng.random_range(0..self.tanks.len());
        log::info!(
            "Match ready: {} tanks, {} goes first",
            self.tanks.len(),
            self.tanks[self.active].name
        );
        Ok(())
    }

    pub fn active_tank(&self) -> &Tank {
        &self.tanks[self.active]
    }

    /// Shot in flight, if any
    pub fn shot(&self) -> Option<&Shot> {
        self.active_tank().shot.as_ref()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, MatchStatus::Won { .. } | MatchStatus::Draw)
    }

    pub fn alive_count(&self) -> usize {
        self.tanks.iter().filter(|t| t.alive).count()
    }

    pub fn winner(&self) -> Option<&Tank> {
        match self.status {
            MatchStatus::Won { winner } => self.tanks.get(winner),
            _ => None,
        }
    }

    /// Apply a control step to the active tank
    pub(crate) fn command_active(&mut self, command: TankCommand) {
        let active = self.active;
        let tank = &mut self.tanks[active];
        if let Some(shot) = tank.apply(command) {
            let (angle, power) = (shot.angle, shot.power as i32);
            self.shots_fired += 1;
            self.events.push(GameEvent::ShotFired {
                tank: active,
                angle,
                power,
            });
            log::debug!("{} fires: angle {} power {}", tank.name, angle, power);
        }
    }

    /// Hand the turn to the next living tank, or conclude the match
    pub fn end_turn(&mut self) {
        let alive: Vec<TankId> = self
            .tanks
            .iter()
            .filter(|t| t.alive)
            .map(|t| t.id)
            .collect();

        match alive.as_slice() {
            [] => {
                self.status = MatchStatus::Draw;
                self.events.push(GameEvent::MatchDrawn);
                log::info!("Match drawn after {} ticks", self.time_ticks);
            }
            [winner] => {
                self.active = *winner;
                self.status = MatchStatus::Won { winner: *winner };
                self.events.push(GameEvent::MatchWon { winner: *winner });
                log::info!(
                    "{} wins after {} ticks",
                    self.tanks[*winner].name,
                    self.time_ticks
                );
            }
            _ => {
                let count = self.tanks.len();
                for step in 1..=count {
                    let next = (self.active + step) % count;
                    if self.tanks[next].alive {
                        self.active = next;
                        break;
                    }
                }
                self.events.push(GameEvent::TurnChanged { tank: self.active });
                log::info!("Turn: {}", self.tanks[self.active].name);
            }
        }
    }

    /// Slow random walk of the wind
    pub fn perturb_wind(&mut self) {
        let chance: f64 = self.rng.random();
        if chance < WIND_DECREASE_CHANCE {
            self.wind -= WIND_STEP;
        } else if chance < WIND_DECREASE_CHANCE + WIND_INCREASE_CHANCE {
            self.wind += WIND_STEP;
        }
        self.wind = self.wind.clamp(-1.0, 1.0);
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            seed: self.seed,
            status: self.status,
            winner: self.winner().map(|t| t.name.clone()),
            ticks: self.time_ticks,
            shots_fired: self.shots_fired,
            tanks: self
                .tanks
                .iter()
                .map(|t| TankSummary {
                    name: t.name.clone(),
                    health: t.health,
                    alive: t.alive,
                })
                .collect(),
        }
    }
}

/// Drop tanks at random columns, re-rolling until every pair is far enough apart
fn place_tanks<R: Rng + ?Sized>(rng: &mut R, tanks: &mut [Tank]) -> anyhow::Result<()> {
    let margin = 10.0 + TANK_RADIUS;
    let span = WORLD_WIDTH as f64 - 2.0 * margin;

    let mut placed = 0;
    let mut attempts = 0;
    while placed < tanks.len() {
        attempts += 1;
        if attempts > MAX_PLACEMENT_ATTEMPTS {
            bail!(
                "could not space {} tanks {} apart after {} attempts",
                tanks.len(),
                MIN_PLAYER_GAP,
                MAX_PLACEMENT_ATTEMPTS
            );
        }

        let x = margin + rng.random_range(0.0..span).floor();
        let too_close = tanks[..placed]
            .iter()
            .any(|other| (other.pos.x - x).abs() < MIN_PLAYER_GAP);
        if !too_close {
            tanks[placed].pos = DVec2::new(x, 0.0);
            placed += 1;
        }
    }
    log::debug!("Placed {} tanks in {} attempts", tanks.len(), attempts);
    Ok(())
}
