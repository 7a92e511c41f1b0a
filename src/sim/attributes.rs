//! Stat block, derived stats and the XP curve

use serde::{Deserialize, Serialize};

use super::dice::Dice;

/// The six primary stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryStats {
    pub strength: i32,
    pub constitution: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl PrimaryStats {
    /// Every stat set to the same value
    pub const fn uniform(value: i32) -> Self {
        Self {
            strength: value,
            constitution: value,
            dexterity: value,
            intelligence: value,
            wisdom: value,
            charisma: value,
        }
    }

    fn best(&self) -> i32 {
        [
            self.strength,
            self.constitution,
            self.dexterity,
            self.intelligence,
            self.wisdom,
            self.charisma,
        ]
        .into_iter()
        .fold(0, i32::max)
    }
}

impl Default for PrimaryStats {
    fn default() -> Self {
        Self::uniform(10)
    }
}

/// XP progression curve: `fixed_base * level_scale^(level - 1)` to leave `level`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpTable {
    /// XP needed to reach level 2
    pub fixed_base: f64,
    /// Multiplier for every following level
    pub level_scale: f64,
}

impl XpTable {
    pub fn threshold(&self, level: u32) -> f64 {
        self.fixed_base * self.level_scale.powi(level.saturating_sub(1) as i32)
    }
}

impl Default for XpTable {
    fn default() -> Self {
        Self {
            fixed_base: 100.0,
            level_scale: 1.2,
        }
    }
}

/// Derived stats that accept a bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusStat {
    Speed,
    CritDamage,
    CritChance,
    SplashDamage,
    Lucky,
    Piercing,
    Accuracy,
    Recharge,
    Tenacity,
    Vigor,
    Dodge,
    Insight,
}

#[derive(Debug, Clone, Default)]
struct Bonuses {
    speed: f32,
    crit_damage: f32,
    crit_chance: f32,
    splash_damage: f32,
    lucky: f32,
    piercing: f32,
    accuracy: f32,
    recharge: f32,
    tenacity: f32,
    vigor: f32,
    dodge: f32,
    insight: f32,
}

impl Bonuses {
    fn slot(&mut self, stat: BonusStat) -> &mut f32 {
        match stat {
            BonusStat::Speed => &mut self.speed,
            BonusStat::CritDamage => &mut self.crit_damage,
            BonusStat::CritChance => &mut self.crit_chance,
            BonusStat::SplashDamage => &mut self.splash_damage,
            BonusStat::Lucky => &mut self.lucky,
            BonusStat::Piercing => &mut self.piercing,
            BonusStat::Accuracy => &mut self.accuracy,
            BonusStat::Recharge => &mut self.recharge,
            BonusStat::Tenacity => &mut self.tenacity,
            BonusStat::Vigor => &mut self.vigor,
            BonusStat::Dodge => &mut self.dodge,
            BonusStat::Insight => &mut self.insight,
        }
    }
}

/// Stat block owned by exactly one entity.
///
/// Primary stats can be set freely. Derived stats are computed on read from
/// the primary stats plus a bonus that only moves by relative adjustment.
#[derive(Debug, Clone)]
pub struct Attributes {
    stats: PrimaryStats,
    level: u32,
    hp: i32,
    max_hp: i32,
    mana: f32,
    current_xp: f64,
    xp_to_next_level: f64,
    bonus: Bonuses,
}

impl Attributes {
    /// Roll `hp_dice_faces` dice of `hp_dice_faces` faces, scaled by level,
    /// for the starting (and maximum) hp. Mana starts full.
    pub fn new(hp_dice_faces: u32, level: u32, stats: PrimaryStats, dice: &mut Dice) -> Self {
        let level = level.max(1);
        let rolled = dice.roll_many(hp_dice_faces, hp_dice_faces).saturating_mul(level);
        let hp = i32::try_from(rolled).unwrap_or(i32::MAX);
        let mut attributes = Self {
            stats,
            level,
            hp,
            max_hp: hp,
            mana: 0.0,
            current_xp: 0.0,
            xp_to_next_level: 0.0,
            bonus: Bonuses::default(),
        };
        attributes.mana = attributes.max_mana();
        attributes
    }

    /// Fixed hp, for callers that don't want a roll
    pub fn with_hp(hp: i32, level: u32, stats: PrimaryStats) -> Self {
        let mut attributes = Self {
            stats,
            level: level.max(1),
            hp,
            max_hp: hp,
            mana: 0.0,
            current_xp: 0.0,
            xp_to_next_level: 0.0,
            bonus: Bonuses::default(),
        };
        attributes.mana = attributes.max_mana();
        attributes
    }

    /// Add experience (scaled by insight) and apply every level-up it pays for.
    /// Returns the number of levels gained.
    pub fn add_xp(&mut self, amount: f64, table: &XpTable) -> u32 {
        self.current_xp += amount * (1.0 + self.insight() as f64 / 100.0);

        if self.xp_to_next_level == 0.0 {
            self.xp_to_next_level = table.threshold(self.level);
        }

        let mut gained = 0;
        while self.xp_to_next_level > 0.0 && self.current_xp >= self.xp_to_next_level {
            self.current_xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = table.threshold(self.level);
            gained += 1;
        }
        gained
    }

    /// Relative hp change. Damage may push hp below zero; heals stop at max hp.
    pub fn adjust_hp(&mut self, delta: i32) {
        if delta >= 0 {
            self.hp = self.hp.saturating_add(delta).min(self.max_hp.max(self.hp));
        } else {
            self.hp = self.hp.saturating_add(delta);
        }
    }

    /// Relative mana change, clamped to [0, max_mana]
    pub fn adjust_mana(&mut self, delta: f32) {
        self.mana = (self.mana + delta).clamp(0.0, self.max_mana());
    }

    /// Relative bonus change on a derived stat
    pub fn adjust(&mut self, stat: BonusStat, delta: f32) {
        *self.bonus.slot(stat) += delta;
    }

    /// Passive regeneration over `dt` seconds
    pub fn regenerate(&mut self, dt: f32) {
        self.adjust_mana(self.mana_regen() * dt);
    }

    // --- state ---

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn mana(&self) -> f32 {
        self.mana
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn current_xp(&self) -> f64 {
        self.current_xp
    }

    /// XP still needed for the next level (0 until the first grant)
    pub fn xp_to_next_level(&self) -> f64 {
        self.xp_to_next_level
    }

    pub fn stats(&self) -> &PrimaryStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut PrimaryStats {
        &mut self.stats
    }

    // --- derived ---

    fn best(&self) -> f32 {
        self.stats.best() as f32
    }

    pub fn max_mana(&self) -> f32 {
        let s = &self.stats;
        (s.intelligence.max(s.wisdom).max(s.charisma) * 10) as f32
    }

    /// Damage cap
    pub fn defence(&self) -> f32 {
        self.stats.constitution as f32 / 10.0 + self.stats.dexterity as f32 / 10.0
    }

    /// Movement speed in units per second
    pub fn speed(&self) -> f32 {
        100.0 + self.stats.dexterity as f32 / 10.0 + self.bonus.speed
    }

    /// Crit damage multiplier in percent: x1.5 + x0.02 per point of the best stat
    pub fn crit_damage(&self) -> f32 {
        150.0 + self.best() * 2.0 + self.bonus.crit_damage
    }

    /// Crit probability in percent
    pub fn crit_chance(&self) -> f32 {
        3.0 + self.best() / 10.0 + self.lucky() + self.bonus.crit_chance
    }

    pub fn splash_damage(&self) -> f32 {
        self.best() * 0.2 + self.bonus.splash_damage
    }

    pub fn lucky(&self) -> f32 {
        let s = &self.stats;
        (((s.charisma + s.wisdom) as f32 / 2.0) / 10.0).floor() + self.bonus.lucky
    }

    /// Enemies a projectile can pass through
    pub fn piercing(&self) -> f32 {
        (self.stats.dexterity as f32 / 10.0).floor() + self.bonus.piercing
    }

    pub fn accuracy(&self) -> f32 {
        self.stats.dexterity as f32 * 0.5 + self.bonus.accuracy
    }

    /// Cooldown reduction in percent
    pub fn recharge(&self) -> f32 {
        self.stats.dexterity as f32 * 0.25 + self.bonus.recharge
    }

    pub fn tenacity(&self) -> f32 {
        let s = &self.stats;
        s.constitution.max(s.wisdom).max(s.intelligence) as f32 * 0.5 + self.bonus.tenacity
    }

    pub fn vigor(&self) -> f32 {
        self.stats.constitution as f32 * 0.5 + self.bonus.vigor
    }

    pub fn dodge(&self) -> f32 {
        self.stats.dexterity as f32 * 0.2 + self.bonus.dodge
    }

    pub fn mana_regen(&self) -> f32 {
        self.stats.intelligence as f32 * 0.1
    }

    pub fn hp_regen(&self) -> f32 {
        self.stats.constitution as f32 * 0.5
    }

    /// XP bonus in percent
    pub fn insight(&self) -> f32 {
        self.stats.wisdom as f32 / 10.0 + self.bonus.insight
    }
}
