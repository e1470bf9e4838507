//! Roadside - a first-person walk down a desert highway where things go wrong after dark.
//!
//! Runs a headless session: the scene, narrative systems and mini-games tick at
//! the fixed step while an autopilot walks the player through every location.

use anyhow::Result;
use engine_core::Time;
use rand::rngs::StdRng;
use rand::SeedableRng;

use game::autopilot::Autopilot;
use game::config::GameConfig;
use game::session::Session;

/// Frames between status lines.
const STATUS_EVERY: u64 = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    log::info!(
        "Roadside: {:.0}s session at {:.0} Hz, fov {:.0}, {} chips",
        config.session_seconds,
        config.fixed_rate,
        config.fov,
        config.starting_chips
    );

    let mut time = Time::new();
    time.set_fixed_rate(config.fixed_rate);
    let step = time.fixed_timestep();
    let dt = time.fixed_timestep_seconds();
    let session_seconds = config.session_seconds;

    let mut session = Session::new(config, StdRng::from_entropy())?;
    let areas: Vec<&str> = session.areas.areas().map(|a| a.config.name.as_str()).collect();
    log::info!("Liminal areas: {}", areas.join(", "));
    let mut pilot = Autopilot::roadside_tour();
    let mut last_prompt: Option<String> = None;

    while time.elapsed_seconds() < session_seconds {
        time.advance(step);
        while time.should_fixed_update() {
            let input = pilot.next_input(&session.world.player, dt);
            session.frame(dt, &input)?;
        }

        let prompt = session.prompt().map(|p| p.display_text());
        if prompt != last_prompt {
            if let Some(text) = &prompt {
                log::debug!("{}", text);
            }
            last_prompt = prompt;
        }

        if time.frame_count() % STATUS_EVERY == 0 {
            let player = &session.world.player;
            log::info!(
                "t={:.0}s pos=({:.1}, {:.1}) cat={:?} ghost={:?} area={} chips={}",
                time.elapsed_seconds(),
                player.position.x,
                player.position.z,
                session.cat.phase(),
                session.ghost.phase(),
                session.areas.current().map_or("-", |a| a.config.name.as_str()),
                session.world.inventory.chips
            );
        }
    }

    let world = &session.world;
    let items: Vec<String> = world.inventory.items.iter().map(|i| i.name()).collect();
    println!("Session over after {:.0}s ({} frames)", time.elapsed_seconds(), time.frame_count());
    println!("  cat:       {:?}", session.cat.phase());
    println!("  ghost:     {:?}", session.ghost.phase());
    println!("  carrying:  {}", if items.is_empty() { "nothing".to_string() } else { items.join(", ") });
    println!("  chips:     {}", world.inventory.chips);
    println!("  sounds:    {}", world.audio.fired.len());
    println!("  phone:     {}", if world.audio.has_played("phone_voice") { "answered" } else { "unanswered" });
    if let Some(last) = world.messages.latest() {
        println!("  last seen: {}", last);
    }
    if !pilot.is_done() {
        log::warn!("Autopilot still had steps left");
    }
    Ok(())
}
