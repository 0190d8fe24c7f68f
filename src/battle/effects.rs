use crate::battle::state::{BattleEvent, EventBus};
use crate::unit::UnitId;
use schema::{EffectCategory, EffectDuration, EffectKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One active timed modifier on a unit.
///
/// Caster is a lookup-only reference: the caster leaving the battle never
/// invalidates an already-applied effect, a miss at hook time just means
/// "no caster modifier applies".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusEffect {
    pub id: u32,
    pub kind: EffectKind,
    pub duration: EffectDuration,
    /// Turns left before expiry; `None` for permanent effects.
    pub remaining: Option<u8>,
    pub magnitude: i32,
    pub stacks: u8,
    pub max_stacks: u8,
    pub stackable: bool,
    pub caster: Option<UnitId>,
    pub hidden: bool,
}

impl StatusEffect {
    pub fn category(&self) -> EffectCategory {
        self.kind.category()
    }

    /// Effective strength: per-tick damage/heal and shield capacity all
    /// scale linearly with stack count.
    pub fn total_magnitude(&self) -> i32 {
        self.magnitude * self.stacks as i32
    }
}

/// Template for installing an effect. Skills and tests build these; the
/// engine turns them into [`StatusEffect`] instances.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub duration: EffectDuration,
    pub magnitude: i32,
    pub max_stacks: u8,
    pub caster: Option<UnitId>,
    pub hidden: bool,
}

impl EffectSpec {
    pub fn new(kind: EffectKind, duration: EffectDuration, magnitude: i32) -> Self {
        Self {
            kind,
            duration,
            magnitude,
            max_stacks: 1,
            caster: None,
            hidden: false,
        }
    }

    /// Effects with more than one allowed stack stack instead of replacing.
    pub fn with_max_stacks(mut self, max_stacks: u8) -> Self {
        self.max_stacks = max_stacks.max(1);
        self
    }

    pub fn with_caster(mut self, caster: UnitId) -> Self {
        self.caster = Some(caster);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// One shield's share of an incoming hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldHit {
    pub instance: u32,
    pub absorbed: i32,
    pub depleted: bool,
}

/// Pure plan for routing incoming damage through the bearer's effects.
/// Computed against the pre-hit state; the resolver turns it into commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagePlan {
    pub incoming: i32,
    /// What actually reaches HP after invulnerability and shields.
    pub final_damage: i32,
    pub shield_hits: Vec<ShieldHit>,
    pub invulnerable: bool,
    pub breaks_sleep: bool,
}

/// Periodic end-of-turn effect output (poison ticks, regeneration).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTick {
    pub kind: EffectKind,
    pub amount: i32,
    pub healing: bool,
}

/// Stat deltas contributed by active effects, applied on top of the
/// provider snapshot by `battle::stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatAdjustments {
    pub defense: i32,
    pub speed: i32,
    pub movement: i32,
}

/// Owner of every active status effect, keyed by unit id. Units never own
/// their buffs. All operations report success or absence; nothing here
/// panics on a missing unit or effect.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EffectEngine {
    active: BTreeMap<UnitId, Vec<StatusEffect>>,
    next_id: u32,
}

impl EffectEngine {
    pub fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn effects(&self, unit: UnitId) -> &[StatusEffect] {
        self.active.get(&unit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, unit: UnitId, kind: EffectKind) -> bool {
        self.effects(unit).iter().any(|e| e.kind == kind)
    }

    /// Installs an effect. A non-stackable effect of the same
    /// (category, kind) is removed first; last-applied wins. A stackable
    /// one gains a stack (capped at max) and has its duration refreshed.
    /// Returns the id of the live instance.
    pub fn apply(&mut self, target: UnitId, spec: EffectSpec, bus: &mut EventBus) -> u32 {
        let entries = self.active.entry(target).or_default();

        if let Some(existing) = entries
            .iter_mut()
            .find(|e| e.kind == spec.kind && !e.kind.allows_multiple_instances())
        {
            if existing.stackable {
                existing.stacks = existing.stacks.saturating_add(1).min(existing.max_stacks);
                existing.duration = spec.duration;
                existing.remaining = spec.duration.turns();
                bus.push(BattleEvent::EffectRefreshed {
                    target,
                    kind: existing.kind,
                    stacks: existing.stacks,
                });
                return existing.id;
            }
            let stale = existing.kind;
            entries.retain(|e| e.kind != stale);
            bus.push(BattleEvent::EffectRemoved {
                target,
                kind: stale,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        let effect = StatusEffect {
            id,
            kind: spec.kind,
            duration: spec.duration,
            remaining: spec.duration.turns(),
            magnitude: spec.magnitude,
            stacks: 1,
            max_stacks: spec.max_stacks.max(1),
            stackable: spec.max_stacks > 1,
            caster: spec.caster,
            hidden: spec.hidden,
        };
        // entry may have been invalidated by the retain above
        self.active.entry(target).or_default().push(effect);
        bus.push(BattleEvent::EffectApplied {
            target,
            kind: spec.kind,
        });
        id
    }

    /// Removes the effect of the given kind. Returns false when absent.
    pub fn remove_kind(&mut self, target: UnitId, kind: EffectKind, bus: &mut EventBus) -> bool {
        let Some(entries) = self.active.get_mut(&target) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.kind != kind);
        let removed = entries.len() < before;
        if removed {
            bus.push(BattleEvent::EffectRemoved { target, kind });
        }
        removed
    }

    /// Dispels a single instance by id. Returns false when absent.
    pub fn remove_instance(&mut self, target: UnitId, id: u32, bus: &mut EventBus) -> bool {
        let Some(entries) = self.active.get_mut(&target) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let kind = entries.remove(pos).kind;
        bus.push(BattleEvent::EffectRemoved { target, kind });
        true
    }

    /// Drops every effect of a unit, silently. Used on unit removal and
    /// battle teardown.
    pub fn remove_all(&mut self, target: UnitId) {
        self.active.remove(&target);
    }

    // ------------------------------------------------------------------
    // Hook points. The combat resolver and turn scheduler call these at
    // the six fixed places; nothing else observes effect state mid-turn.
    // ------------------------------------------------------------------

    /// OnTurnStart. No kind in the current behavior table reacts here; the
    /// hook stays so new kinds can join without touching call sites.
    pub fn on_turn_start(&mut self, _unit: UnitId, _bus: &mut EventBus) {}

    /// OnBeforeMove: control-impairing kinds veto movement. Returns the
    /// vetoing kind, if any.
    pub fn movement_veto(&self, unit: UnitId) -> Option<EffectKind> {
        self.effects(unit)
            .iter()
            .map(|e| e.kind)
            .find(|k| k.blocks_movement())
    }

    /// Kinds that also forbid acting (attack or skill use).
    pub fn action_veto(&self, unit: UnitId) -> Option<EffectKind> {
        self.effects(unit)
            .iter()
            .map(|e| e.kind)
            .find(|k| k.blocks_action())
    }

    /// OnAfterMove. No kind in the current behavior table reacts here.
    pub fn on_after_move(&mut self, _unit: UnitId, _bus: &mut EventBus) {}

    /// OnDamageDealt: positive-category attack buffs scale outgoing damage
    /// up one percent per magnitude point (times stacks); negative-category
    /// attack debuffs scale it down. Never below zero.
    pub fn scale_outgoing(&self, unit: UnitId, amount: i32) -> i32 {
        let mut percent = 100i32;
        for effect in self.effects(unit) {
            match effect.kind {
                EffectKind::AttackUp => percent += effect.total_magnitude(),
                EffectKind::AttackDown => percent -= effect.total_magnitude(),
                _ => {}
            }
        }
        (amount * percent.max(0)) / 100
    }

    /// OnDamageTaken, planning half: invulnerability zeroes the hit and
    /// short-circuits; otherwise shields absorb strongest-first and the
    /// remainder passes to HP. Sleep breaks the moment any damage actually
    /// lands, regardless of the effect's duration.
    pub fn plan_damage_taken(&self, unit: UnitId, amount: i32) -> DamagePlan {
        let incoming = amount.max(0);

        if self.has(unit, EffectKind::Invulnerable) {
            return DamagePlan {
                incoming,
                final_damage: 0,
                shield_hits: Vec::new(),
                invulnerable: true,
                breaks_sleep: false,
            };
        }

        let mut shields: Vec<&StatusEffect> = self
            .effects(unit)
            .iter()
            .filter(|e| e.kind == EffectKind::Shield)
            .collect();
        // Strongest first; instance id breaks ties deterministically
        shields.sort_by_key(|e| (std::cmp::Reverse(e.total_magnitude()), e.id));

        let mut remaining = incoming;
        let mut shield_hits = Vec::new();
        for shield in shields {
            if remaining == 0 {
                break;
            }
            let capacity = shield.total_magnitude();
            let absorbed = remaining.min(capacity);
            if absorbed > 0 {
                shield_hits.push(ShieldHit {
                    instance: shield.id,
                    absorbed,
                    depleted: absorbed == capacity,
                });
                remaining -= absorbed;
            }
        }

        DamagePlan {
            incoming,
            final_damage: remaining,
            shield_hits,
            invulnerable: false,
            breaks_sleep: remaining > 0 && self.has(unit, EffectKind::Sleep),
        }
    }

    /// OnDamageTaken, mutation half: charges one shield instance for its
    /// planned share. A depleted shield is removed; a partial hit shrinks
    /// the instance but keeps it.
    pub fn consume_shield(
        &mut self,
        target: UnitId,
        instance: u32,
        amount: i32,
        bus: &mut EventBus,
    ) -> bool {
        let Some(entries) = self.active.get_mut(&target) else {
            return false;
        };
        let Some(pos) = entries
            .iter()
            .position(|e| e.id == instance && e.kind == EffectKind::Shield)
        else {
            return false;
        };

        let total = entries[pos].total_magnitude();
        if amount >= total {
            entries.remove(pos);
            bus.push(BattleEvent::EffectRemoved {
                target,
                kind: EffectKind::Shield,
            });
        } else {
            // Collapse stacks into a single remaining-capacity magnitude
            entries[pos].magnitude = total - amount;
            entries[pos].stacks = 1;
        }
        true
    }

    /// OnTurnEnd, reading half: periodic damage and healing owed by the
    /// bearer's effects, at `magnitude x stacks` per tick.
    pub fn periodic_ticks(&self, unit: UnitId) -> Vec<PeriodicTick> {
        self.effects(unit)
            .iter()
            .filter_map(|e| match e.category() {
                EffectCategory::DamageOverTime => Some(PeriodicTick {
                    kind: e.kind,
                    amount: e.total_magnitude(),
                    healing: false,
                }),
                EffectCategory::HealOverTime => Some(PeriodicTick {
                    kind: e.kind,
                    amount: e.total_magnitude(),
                    healing: true,
                }),
                _ => None,
            })
            .collect()
    }

    /// OnTurnEnd, mutation half: ticks down non-permanent durations and
    /// removes whatever expired. Permanent effects only leave via explicit
    /// removal.
    pub fn tick_durations(&mut self, unit: UnitId, bus: &mut EventBus) {
        let Some(entries) = self.active.get_mut(&unit) else {
            return;
        };
        let mut expired = Vec::new();
        entries.retain_mut(|effect| {
            let Some(remaining) = effect.remaining.as_mut() else {
                return true;
            };
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                expired.push(effect.kind);
                false
            } else {
                true
            }
        });
        for kind in expired {
            bus.push(BattleEvent::EffectRemoved { target: unit, kind });
        }
    }

    /// Stat deltas from defense and tempo effects. Attack scaling lives in
    /// `scale_outgoing` instead, so nothing is counted twice.
    pub fn stat_adjustments(&self, unit: UnitId) -> StatAdjustments {
        let mut adjust = StatAdjustments::default();
        for effect in self.effects(unit) {
            match effect.kind {
                EffectKind::DefenseUp => adjust.defense += effect.total_magnitude(),
                EffectKind::DefenseDown => adjust.defense -= effect.total_magnitude(),
                EffectKind::Haste => {
                    adjust.speed += effect.total_magnitude();
                    adjust.movement += effect.total_magnitude();
                }
                EffectKind::Slow => {
                    adjust.speed -= effect.total_magnitude();
                    adjust.movement -= effect.total_magnitude();
                }
                _ => {}
            }
        }
        adjust
    }
}
