//! MetalMan Simulation Host
//!
//! Runs the action-RPG simulation headless for a fixed number of frames,
//! then saves the player and prints what happened.
//!
//! Run with: cargo run -p metal_runtime
//!       or: cargo run --bin metalman-sim

mod config;
mod game;
mod world;

use config::SimConfig;
use game::Simulation;

fn main() {
    // Config first: its debug flag picks the default log filter
    let config = match SimConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("metalman-sim: {}", e);
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    log::info!("MetalMan simulation v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let mut sim = Simulation::new(config);
    sim.run();
    let summary = sim.finish();

    match sim.save() {
        Ok(path) => log::info!("Saved slot '{}' to {}", sim.config().save_slot, path.display()),
        Err(e) => log::error!("Failed to save player: {}", e),
    }

    log::info!(
        "{} frames ({:.1}s): {} kills, {} xp, level {}, {} gold",
        summary.frames,
        summary.elapsed,
        summary.kills,
        summary.xp_earned,
        summary.final_level,
        summary.final_gold
    );
    log::info!(
        "Dealt {} damage, took {} ({} blocked), died {} times",
        summary.damage_dealt,
        summary.damage_taken,
        summary.blocks,
        summary.deaths
    );
    log::info!(
        "Looted {} corpses ({} items left behind), drank {} potions, bought {}",
        summary.corpses_looted,
        summary.items_left_behind,
        summary.potions_used,
        summary.purchases
    );
    log::info!("{} alerts, {} audio cues", summary.alerts, sim.audio.cues_played);
}
