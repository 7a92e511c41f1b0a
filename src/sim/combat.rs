//! Attack resolution
//!
//! An attack is resolved once, when it's made: base damage plus the
//! attacker's relevant stat, with a crit roll against the attacker's crit
//! chance. The result travels as plain data (`AttackInfo`) inside a
//! projectile or a contact hit until it lands.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attributes::Attributes;
use super::dice::Dice;
use super::element::ElementId;
use super::vector::Vector2DExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageType {
    Physical,
    Magical,
}

/// A resolved hit, ready to be applied to a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackInfo {
    pub attacker_id: ElementId,
    pub total_damage: i32,
    pub damage_type: DamageType,
    pub is_critical: bool,
    /// Unit vector from attacker toward target, used for knockback
    pub direction: Vec2,
}

/// Outcome of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Survived,
    Defeated,
}

/// Roll an attack made by `attacker_id` with the given stats
pub fn resolve_attack(
    attacker_id: ElementId,
    attacker: &Attributes,
    base_damage: i32,
    damage_type: DamageType,
    direction: Vec2,
    dice: &mut Dice,
) -> AttackInfo {
    let is_critical = dice.chance(attacker.crit_chance());

    let stat_bonus = match damage_type {
        DamageType::Physical => attacker.stats().strength,
        DamageType::Magical => attacker.stats().intelligence,
    };
    let mut total = (base_damage + stat_bonus) as f32;
    if is_critical {
        total *= attacker.crit_damage() / 100.0;
    }

    AttackInfo {
        attacker_id,
        total_damage: total.floor() as i32,
        damage_type,
        is_critical,
        direction: direction.normalized(),
    }
}
