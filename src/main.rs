//! Tank Duel headless runner
//!
//! Plays one match with the built-in brains and prints the result as JSON.
//! Usage: `tank-duel [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use tank_duel::Settings;
    use tank_duel::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if !settings.all_autonomous() {
        log::warn!("No input source in headless mode; human seats will never fire");
    }

    let mut state = GameState::new(&settings)?;
    log::info!("Tank Duel starting (seed {})", settings.seed);

    let input = TickInput::default();
    while !state.is_over() && state.time_ticks < settings.max_ticks {
        tick(&mut state, &input);

        for event in &state.events {
            match event {
                GameEvent::TankHit { tank, damage } => {
                    log::info!("{} hit for {}", state.tanks[*tank].name, damage)
                }
                other => log::debug!("{:?}", other),
            }
        }
    }

    if !state.is_over() {
        log::warn!("No result after {} ticks", state.time_ticks);
    }

    let summary = serde_json::to_string_pretty(&state.summary())
        .context("failed to serialize summary")?;
    println!("{summary}");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
