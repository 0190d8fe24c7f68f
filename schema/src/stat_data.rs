use serde::{Deserialize, Serialize};

/// Base attributes of a character sheet, as authored by the progression
/// system. The engine never reads these directly in combat math; it works on
/// the derived [`CombatStats`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub strength: i32,
    pub intelligence: i32,
    pub constitution: i32,
    pub agility: i32,
    pub luck: i32,
    pub max_hp: i32,
    pub max_mp: i32,
    pub movement: i32,
    pub attack_range: i32,
}

/// Derived combat snapshot. Recomputed after any state-changing call and
/// never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub physical_attack: i32,
    pub magical_attack: i32,
    pub physical_defense: i32,
    pub magical_defense: i32,
    pub hit: i32,
    pub evasion: i32,
    /// Critical hit chance, percent out of 100.
    pub crit_chance: i32,
    /// Critical hit damage, percent of base magnitude (150 = x1.5).
    pub crit_damage: i32,
    pub speed: i32,
    pub movement: i32,
    pub attack_range: i32,
    pub max_hp: i32,
    pub max_mp: i32,
}

impl CombatStats {
    /// Standard derivation from base attributes:
    /// physical attack 2xSTR, magical attack 2xINT, physical defense CON,
    /// magical defense INT/2, crit chance 5 + LUK/5.
    pub fn from_base(base: &BaseStats) -> Self {
        Self {
            physical_attack: base.strength * 2,
            magical_attack: base.intelligence * 2,
            physical_defense: base.constitution,
            magical_defense: base.intelligence / 2,
            hit: 90 + base.luck / 10,
            evasion: base.agility / 2,
            crit_chance: 5 + base.luck / 5,
            crit_damage: 150,
            speed: base.agility,
            movement: base.movement,
            attack_range: base.attack_range,
            max_hp: base.max_hp,
            max_mp: base.max_mp,
        }
    }
}
