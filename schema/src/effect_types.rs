use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Broad grouping of status effects. The (category, kind) pair is the
/// identity used for non-stackable replacement and for dispel targeting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum EffectCategory {
    Positive,
    Negative,
    Control,
    DamageOverTime,
    HealOverTime,
    Special,
}

/// Concrete status effect kinds. This set is design-fixed: new kinds extend
/// the enum and the behavior tables in the effect engine, not a class chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum EffectKind {
    AttackUp,
    DefenseUp,
    Haste,
    AttackDown,
    DefenseDown,
    Slow,
    Stun,
    Root,
    Sleep,
    Freeze,
    Poison,
    Burn,
    Regeneration,
    Shield,
    Invulnerable,
}

impl EffectKind {
    /// Category a kind belongs to. Derived, never stored separately.
    pub fn category(self) -> EffectCategory {
        match self {
            EffectKind::AttackUp | EffectKind::DefenseUp | EffectKind::Haste => {
                EffectCategory::Positive
            }
            EffectKind::AttackDown | EffectKind::DefenseDown | EffectKind::Slow => {
                EffectCategory::Negative
            }
            EffectKind::Stun | EffectKind::Root | EffectKind::Sleep | EffectKind::Freeze => {
                EffectCategory::Control
            }
            EffectKind::Poison | EffectKind::Burn => EffectCategory::DamageOverTime,
            EffectKind::Regeneration => EffectCategory::HealOverTime,
            EffectKind::Shield | EffectKind::Invulnerable => EffectCategory::Special,
        }
    }

    /// Kinds that prevent their bearer from moving.
    pub fn blocks_movement(self) -> bool {
        matches!(
            self,
            EffectKind::Stun | EffectKind::Root | EffectKind::Sleep | EffectKind::Freeze
        )
    }

    /// Kinds that prevent their bearer from acting (attack or skill).
    /// Root pins a unit in place but leaves its hands free.
    pub fn blocks_action(self) -> bool {
        matches!(self, EffectKind::Stun | EffectKind::Sleep | EffectKind::Freeze)
    }

    /// Kinds where several independent instances may coexist on one unit.
    /// Shields from different sources keep separate pools and are consumed
    /// strongest-first; everything else follows the one-instance-per-kind
    /// rule.
    pub fn allows_multiple_instances(self) -> bool {
        matches!(self, EffectKind::Shield)
    }
}

/// How long an effect lasts. `Turns` counts the bearer's turn-ends;
/// `Permanent` effects only end via explicit removal (dispel, death,
/// shield depletion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectDuration {
    Turns(u8),
    Permanent,
}

impl EffectDuration {
    pub fn turns(self) -> Option<u8> {
        match self {
            EffectDuration::Turns(n) => Some(n),
            EffectDuration::Permanent => None,
        }
    }
}
