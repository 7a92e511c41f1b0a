//! Player input vocabulary and dispatch

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::dice::Dice;
use super::entity::Entity;
use super::events::EventBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Shift,
    LeftClick,
    RightClick,
    ScrollClick,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Shift => "shift",
            Action::LeftClick => "leftClick",
            Action::RightClick => "rightClick",
            Action::ScrollClick => "scrollClick",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Action::Up),
            "down" => Some(Action::Down),
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "shift" => Some(Action::Shift),
            "leftClick" => Some(Action::LeftClick),
            "rightClick" => Some(Action::RightClick),
            "scrollClick" => Some(Action::ScrollClick),
            _ => None,
        }
    }
}

/// Routes actions to the player's callbacks, in the order given
pub struct ActionManager;

impl ActionManager {
    pub fn apply(player: &mut Entity, actions: &[Action], mouse: Vec2, bus: &mut EventBus, dice: &mut Dice) {
        for action in actions {
            match action {
                Action::Up => player.on_up_action(),
                Action::Down => player.on_down_action(),
                Action::Left => player.on_left_action(),
                Action::Right => player.on_right_action(),
                Action::Shift => {
                    player.on_shift_action();
                }
                Action::LeftClick => {
                    player.on_left_click_action(mouse, bus, dice);
                }
                Action::RightClick => player.on_right_click_action(mouse),
                Action::ScrollClick => log::trace!("scrollClick has no binding"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_ID;
    use crate::sim::events::EventTopic;
    use crate::sim::player;

    #[test]
    fn test_names_round_trip() {
        for action in [
            Action::Up,
            Action::Down,
            Action::Left,
            Action::Right,
            Action::Shift,
            Action::LeftClick,
            Action::RightClick,
            Action::ScrollClick,
        ] {
            assert_eq!(Action::from_name(action.as_str()), Some(action));
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
        assert_eq!(Action::from_name("jump"), None);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut dice = Dice::new(1);
        let mut bus = EventBus::new();
        let mut p = player::create(PLAYER_ID, Vec2::new(100.0, 100.0), 1, Default::default(), &mut dice);
        ActionManager::apply(&mut p, &[Action::Left, Action::Right, Action::Up], Vec2::ZERO, &mut bus, &mut dice);
        assert_eq!(p.direction, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_left_click_queues_spawn_and_scroll_is_ignored() {
        let mut dice = Dice::new(1);
        let mut bus = EventBus::new();
        let mut p = player::create(PLAYER_ID, Vec2::new(100.0, 100.0), 1, Default::default(), &mut dice);
        ActionManager::apply(
            &mut p,
            &[Action::ScrollClick, Action::LeftClick],
            Vec2::new(300.0, 108.0),
            &mut bus,
            &mut dice,
        );
        let topics: Vec<_> = bus.drain().iter().map(|e| e.topic()).collect();
        assert_eq!(topics, vec![EventTopic::Spawn]);
        assert_eq!(p.direction, Vec2::ZERO);
    }
}
