//! Skein Runtime
//!
//! Boots a small skirmish on one map and drives the scheduler for the
//! configured number of ticks.

use anyhow::{Context, Result};
use skein_actions::{spawn_player, MoveTo, NormalAttack, Stats};
use skein_core::combat::Board;
use skein_core::grid::spawn_map;
use skein_core::sim::{GameState, SeededRandom, TracingLogger};
use skein_core::time::tick_duration;
use skein_services::Settings;
use std::path::PathBuf;

fn settings_path() -> PathBuf {
    std::env::var_os("SKEIN_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("skein.json"))
}

fn main() -> Result<()> {
    let path = settings_path();
    let settings = Settings::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    skein_services::init_logging(&settings.logging);

    tracing::info!("Skein v{}", skein_core::VERSION);

    let sim = &settings.simulation;
    let mut state = GameState::new(SeededRandom::new(sim.seed));
    state.add_logger(TracingLogger);

    let world = &settings.world;
    let map = spawn_map(&mut state.world, world.rows, world.cols, &world.map_name)?;
    let row = (world.rows / 2) as i32;
    let far = (world.cols.saturating_sub(1)).min(6) as i32;

    let ann = spawn_player(
        &mut state,
        "ann",
        Stats {
            strength: 10.0,
            constitution: 30.0,
            dexterity: 5.0,
            spirit: 2.0,
            ..Stats::default()
        },
        map,
        0,
        row,
    )?;
    let bob = spawn_player(
        &mut state,
        "bob",
        Stats {
            strength: 6.0,
            constitution: 40.0,
            dexterity: 8.0,
            spirit: 4.0,
            ..Stats::default()
        },
        map,
        far,
        row,
    )?;

    state.submit(MoveTo::new(ann, far - 2, row))?;
    tracing::info!(ticks = sim.ticks, rate = sim.tick_rate_hz, "simulation started");

    let pause = tick_duration(sim.tick_rate_hz);
    for _ in 0..sim.ticks {
        let bob_alive = state.world.get::<Board>(bob).is_some_and(|board| board.alive);
        let ann_alive = state.world.get::<Board>(ann).is_some_and(|board| board.alive);
        if !(bob_alive && ann_alive) {
            break;
        }
        state.submit(NormalAttack::new(ann, bob))?;
        state.submit(NormalAttack::new(bob, ann))?;

        if let Err(err) = state.advance() {
            tracing::error!(tick = state.tick(), error = %err, "effect failed");
        }
        for unit in [ann, bob] {
            if let Some(board) = state.world.get_mut::<Board>(unit) {
                board.refill_efforts();
            }
        }
        if sim.realtime {
            std::thread::sleep(pause);
        }
    }

    for unit in [ann, bob] {
        if let Some(board) = state.world.get::<Board>(unit) {
            tracing::info!(
                unit = %state.name_of(unit),
                hp = board.hp,
                alive = board.alive,
                "final state"
            );
        }
    }
    tracing::info!(tick = state.tick(), "simulation finished");
    Ok(())
}
