//! JavaScript bindings
//!
//! `WebSimulation` wraps `Simulation` for the browser: frame times go
//! through a `FixedStepper`, render states and events cross as JSON.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::FixedStepper;
use crate::settings::SimConfig;
use crate::sim::{Action, EventTopic, Simulation};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Arcane Arena core loaded");
}

#[wasm_bindgen]
pub struct WebSimulation {
    sim: Simulation,
    stepper: FixedStepper,
}

#[wasm_bindgen]
impl WebSimulation {
    /// Build from a JSON config, or from the stored config when omitted
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebSimulation, JsError> {
        let config = match config_json {
            Some(json) => SimConfig::from_json(&json)?,
            None => SimConfig::load(),
        };
        Ok(Self {
            sim: Simulation::new(config),
            stepper: FixedStepper::default(),
        })
    }

    #[wasm_bindgen(js_name = setWorld)]
    pub fn set_world(&mut self, width: f32, height: f32) -> Result<(), JsError> {
        self.sim.set_world(width, height)?;
        Ok(())
    }

    /// `actions` are names like `"up"` or `"leftClick"`; unknown names are skipped
    #[wasm_bindgen(js_name = handlePlayerInteractions)]
    pub fn handle_player_interactions(&mut self, actions: Vec<String>, mouse_x: f32, mouse_y: f32) -> Result<(), JsError> {
        let parsed: Vec<Action> = actions
            .iter()
            .filter_map(|name| {
                let action = Action::from_name(name);
                if action.is_none() {
                    log::debug!("unknown action {name}");
                }
                action
            })
            .collect();
        self.sim
            .handle_player_interactions(&parsed, Vec2::new(mouse_x, mouse_y))?;
        Ok(())
    }

    /// Advance by a frame's worth of seconds. Returns the number of ticks run so far.
    pub fn update(&mut self, frame_dt: f32) -> Result<f64, JsError> {
        self.stepper.advance(&mut self.sim, frame_dt)?;
        Ok(self.sim.tick() as f64)
    }

    /// Render state as a JSON string
    #[wasm_bindgen(js_name = renderState)]
    pub fn render_state(&self) -> Result<String, JsError> {
        let state = self.sim.render_state()?;
        Ok(serde_json::to_string(&state)?)
    }

    /// Call `callback` with a JSON payload whenever an event of `topic` fires
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, topic: &str, callback: js_sys::Function) -> Result<(), JsError> {
        let topic = EventTopic::from_name(topic)
            .ok_or_else(|| JsError::new(&format!("unknown event topic {topic}")))?;
        self.sim.subscribe(topic, move |event| {
            let payload = match serde_json::to_string(&event.payload()) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("can't serialize event: {e}");
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
                log::warn!("event listener threw: {e:?}");
            }
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = setDebugHitboxes)]
    pub fn set_debug_hitboxes(&mut self, enabled: bool) {
        self.sim.set_debug_hitboxes(enabled);
    }

    /// Drop partial frame time, e.g. when the tab regains focus
    #[wasm_bindgen(js_name = resetClock)]
    pub fn reset_clock(&mut self) {
        self.stepper.reset();
    }

    #[wasm_bindgen(js_name = saveConfig)]
    pub fn save_config(&self) {
        self.sim.config().save();
    }

    pub fn seed(&self) -> f64 {
        self.sim.seed() as f64
    }
}
