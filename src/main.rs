//! Arcane Arena headless runner
//!
//! Drives the simulation natively with a scripted player: walk a square,
//! shoot at the closest enemy, and report what happened. In the browser the
//! library is driven through `platform::web` instead.
//!
//! Usage: `arcane-arena [seconds]` (config from `ARCANE_ARENA_CONFIG`)

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seconds: f32 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10.0);

    if let Err(e) = headless::run(seconds) {
        log::error!("simulation stopped: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::Cell;
    use std::rc::Rc;

    use arcane_arena::consts::SIM_DT;
    use arcane_arena::platform::FixedStepper;
    use arcane_arena::sim::{Action, EventTopic, GameEvent, Simulation};
    use arcane_arena::{SimConfig, SimResult};
    use glam::Vec2;

    /// Seconds spent walking each side of the square
    const LEG: f32 = 1.5;
    const SHOOT_EVERY: u64 = 30;

    pub fn run(seconds: f32) -> SimResult<()> {
        let config = SimConfig::load();
        let (width, height) = (config.world_width, config.world_height);
        let mut sim = Simulation::new(config);
        sim.set_world(width, height)?;

        let kills = Rc::new(Cell::new(0u32));
        let k = Rc::clone(&kills);
        sim.subscribe(EventTopic::EnemyDied, move |_| k.set(k.get() + 1));
        sim.subscribe(EventTopic::LevelUp, |e| {
            if let GameEvent::LevelUp { level, .. } = e {
                log::info!("level up -> {level}");
            }
        });
        let dead = Rc::new(Cell::new(false));
        let d = Rc::clone(&dead);
        sim.subscribe(EventTopic::PlayerDied, move |_| d.set(true));

        let mut stepper = FixedStepper::default();
        let frames = (seconds / SIM_DT).ceil() as u64;
        for frame in 0..frames {
            let elapsed = frame as f32 * SIM_DT;
            let mut actions = vec![leg(elapsed)];
            let target = closest_enemy(&sim);
            if frame % SHOOT_EVERY == 0 && target.is_some() {
                actions.push(Action::LeftClick);
            }
            sim.handle_player_interactions(&actions, target.unwrap_or(Vec2::ZERO))?;

            if let Some(summary) = stepper.advance(&mut sim, SIM_DT)? {
                if summary.tick % 60 == 0 {
                    log::info!(
                        "tick {}: {} entities, {} collisions",
                        summary.tick,
                        summary.entities,
                        summary.collisions
                    );
                }
            }
            if dead.get() {
                log::warn!("player died after {elapsed:.2}s");
                break;
            }
        }

        let state = sim.render_state()?;
        let hero = state.renderables.first();
        log::info!(
            "done after {} ticks: {} kills, level {}, {} entities left (seed {})",
            sim.tick(),
            kills.get(),
            hero.and_then(|h| h.level).unwrap_or(1),
            state.renderables.len(),
            sim.seed()
        );
        Ok(())
    }

    fn leg(elapsed: f32) -> Action {
        match (elapsed / LEG) as u32 % 4 {
            0 => Action::Right,
            1 => Action::Down,
            2 => Action::Left,
            _ => Action::Up,
        }
    }

    fn closest_enemy(sim: &Simulation) -> Option<Vec2> {
        let from = sim.player()?.center();
        sim.manager()
            .iter()
            .filter(|e| e.is_alive() && e.kind().is_enemy())
            .map(|e| e.center())
            .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    }
}
