use schema::{CharacterId, CombatStats, SkillId, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a unit within one battle. Assigned by the battle when the
/// unit is added and never reused within that battle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// A character's in-battle state. Base stats stay behind the stat provider;
/// the unit only carries what combat mutates: position, HP/MP, per-turn
/// flags, and skill cooldowns. Buffs live in the battle's effect engine,
/// keyed by this unit's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub character: CharacterId,
    pub team: Team,
    pub x: i32,
    pub y: i32,
    pub current_hp: i32,
    pub current_mp: i32,
    /// Maximums are snapshotted at creation; nothing in the effect kind set
    /// alters them mid-battle.
    pub max_hp: i32,
    pub max_mp: i32,
    pub has_acted: bool,
    pub has_moved: bool,
    cooldowns: HashMap<SkillId, u8>,
}

impl Unit {
    pub fn new(id: UnitId, character: CharacterId, team: Team, x: i32, y: i32, stats: &CombatStats) -> Self {
        Self {
            id,
            character,
            team,
            x,
            y,
            current_hp: stats.max_hp,
            current_mp: stats.max_mp,
            max_hp: stats.max_hp,
            max_mp: stats.max_mp,
            has_acted: false,
            has_moved: false,
            cooldowns: HashMap::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Subtracts HP, clamped at 0. Returns true if this killed the unit.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.current_hp = (self.current_hp - amount.max(0)).max(0);
        was_alive && !self.is_alive()
    }

    /// Restores HP up to the maximum. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp);
        self.current_hp - before
    }

    /// Spends MP, clamped at 0. Affordability is checked by the resolver
    /// before the command is issued.
    pub fn spend_mp(&mut self, amount: i32) {
        self.current_mp = (self.current_mp - amount.max(0)).max(0);
    }

    pub fn cooldown_remaining(&self, skill: SkillId) -> u8 {
        self.cooldowns.get(&skill).copied().unwrap_or(0)
    }

    pub fn start_cooldown(&mut self, skill: SkillId, turns: u8) {
        if turns > 0 {
            self.cooldowns.insert(skill, turns);
        }
    }

    /// Ticks every running cooldown down by one turn. Called when this unit
    /// becomes the current actor.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    pub fn reset_turn_flags(&mut self) {
        self.has_acted = false;
        self.has_moved = false;
    }
}
