use crate::{EffectDuration, EffectKind};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Which units a skill may affect, relative to the caster's team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TargetPolicy {
    Enemies,
    Allies,
    SelfOnly,
    Any,
}

/// What a skill does to each valid target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Damage mitigated by the target's physical defense.
    PhysicalDamage,
    /// Damage mitigated by the target's magical defense.
    MagicalDamage,
    /// Restores HP, clamped to the target's maximum.
    Heal,
    /// Installs a status effect on each valid target.
    ApplyEffect {
        effect: EffectKind,
        duration: EffectDuration,
        max_stacks: u8,
    },
}

/// Skill template, looked up by id from an external registry. The engine
/// treats this as read-only content; authoring lives outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillData {
    pub name: String,
    pub kind: SkillKind,
    pub target_policy: TargetPolicy,
    /// Maximum Manhattan distance from caster to target cell.
    pub range: i32,
    /// Manhattan radius of the affected area around the target cell.
    pub area: i32,
    pub mp_cost: i32,
    /// Turns before the caster may use this skill again. 0 = no cooldown.
    pub cooldown: u8,
    pub base_power: i32,
}
