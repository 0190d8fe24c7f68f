use crate::battle::effects::EffectEngine;
use crate::unit::{Unit, UnitId};
use schema::{CharacterId, CombatStats, EffectKind, SkillId, Team};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Battle lifecycle. `Victory` and `Defeat` are terminal: every mutating
/// call afterwards is rejected with `ActionFailureReason::NotInProgress`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Copy)]
pub enum GameState {
    NotStarted,
    InProgress,
    Victory(Team),
    Defeat,
}

/// Why a mutating call was rejected. These are expected gameplay outcomes,
/// reported in the result record rather than thrown.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    NotInProgress,
    AlreadyStarted,
    NoUnits,
    UnknownUnit,
    UnknownSkill,
    UnknownCharacter,
    NotCurrentActor,
    AlreadyActed,
    AlreadyMoved,
    MovementImpaired,
    ActionImpaired,
    OutOfRange,
    OutOfBounds,
    DestinationOccupied,
    InsufficientMp,
    SkillOnCooldown,
    TargetNotAlive,
}

/// Per-target line of a combat result record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetOutcome {
    pub unit: UnitId,
    /// Damage dealt or HP restored, after the full modifier pipeline.
    pub amount: i32,
    pub crit: bool,
    pub killed: bool,
}

/// Result record returned by every mutating engine call: a success flag
/// plus whatever targets the action touched. Expected failures carry a
/// reason; they are never errors.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub failure: Option<ActionFailureReason>,
    pub targets: Vec<TargetOutcome>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            failure: None,
            targets: Vec::new(),
        }
    }

    pub fn with_targets(targets: Vec<TargetOutcome>) -> Self {
        Self {
            success: true,
            failure: None,
            targets,
        }
    }

    pub fn fail(reason: ActionFailureReason) -> Self {
        Self {
            success: false,
            failure: Some(reason),
            targets: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Battle / turn flow
    BattleStarted {
        unit_count: usize,
    },
    RoundStarted {
        turn_number: u32,
    },
    TurnStarted {
        unit: UnitId,
        turn_number: u32,
    },
    TurnEnded {
        unit: UnitId,
    },
    BattleEnded {
        result: GameState,
    },

    // Movement
    UnitMoved {
        unit: UnitId,
        from: (i32, i32),
        to: (i32, i32),
    },

    // Combat
    AttackHit {
        attacker: UnitId,
        target: UnitId,
    },
    SkillUsed {
        caster: UnitId,
        skill: SkillId,
        target_cell: (i32, i32),
    },
    CriticalHit {
        attacker: UnitId,
        target: UnitId,
    },
    DamageDealt {
        target: UnitId,
        amount: i32,
        remaining_hp: i32,
    },
    DamageAbsorbed {
        target: UnitId,
        amount: i32,
    },
    UnitHealed {
        target: UnitId,
        amount: i32,
        new_hp: i32,
    },
    MpSpent {
        unit: UnitId,
        amount: i32,
        remaining_mp: i32,
    },
    CooldownStarted {
        unit: UnitId,
        skill: SkillId,
        turns: u8,
    },

    // Status effects
    EffectApplied {
        target: UnitId,
        kind: EffectKind,
    },
    EffectRefreshed {
        target: UnitId,
        kind: EffectKind,
        stacks: u8,
    },
    EffectRemoved {
        target: UnitId,
        kind: EffectKind,
    },
    EffectTick {
        target: UnitId,
        kind: EffectKind,
        amount: i32,
    },
    SleepBroken {
        target: UnitId,
    },

    // Roster
    UnitDefeated {
        unit: UnitId,
    },
    UnitRemoved {
        unit: UnitId,
    },

    // Failures
    ActionFailed {
        reason: ActionFailureReason,
    },
}

/// Ordered list of everything that happened during one engine call. The
/// caller drains it; no observer ever hooks into the middle of resolution,
/// which keeps hook ordering deterministic and testable.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print all events in debug format with a custom prefix message.
    pub fn print_debug_with_message(&self, message: &str) {
        println!("{}", message);
        self.print_debug();
    }
}

/// Deterministic RNG oracle for one engine call. Rolls are pre-drawn so
/// tests can script every outcome; `next_outcome` panics with its reason
/// string if a test under-provisions it.
#[derive(Debug, Clone)]
pub struct TurnRng {
    outcomes: Vec<u8>,
    index: usize,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self { outcomes, index: 0 }
    }

    pub fn new_random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        // Pre-generate enough values for a battle start plus a full turn
        let outcomes: Vec<u8> = (0..100).map(|_| rng.random_range(1..=100)).collect();
        Self { outcomes, index: 0 }
    }

    /// Next roll in 1..=100.
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        if self.index >= self.outcomes.len() {
            panic!(
                "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];

        #[cfg(test)]
        println!("[RNG] Consumed {} for: {}", outcome, reason);

        self.index += 1;
        outcome
    }
}

/// The battle aggregate: exclusive owner of its units, turn order, and
/// status effects. All mutation flows through the engine façade; the
/// methods here are read-only queries or pre-battle setup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Battle {
    pub battle_id: String,
    pub name: String,
    units: BTreeMap<UnitId, Unit>,
    /// Insertion order, used to seed the turn order deterministically.
    spawn_order: Vec<UnitId>,
    pub turn_order: Vec<UnitId>,
    pub current_index: usize,
    pub turn_number: u32,
    pub game_state: GameState,
    pub effects: EffectEngine,
    next_unit_id: u32,
}

impl Battle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            battle_id: id.into(),
            name: name.into(),
            units: BTreeMap::new(),
            spawn_order: Vec::new(),
            turn_order: Vec::new(),
            current_index: 0,
            turn_number: 0,
            game_state: GameState::NotStarted,
            effects: EffectEngine::new(),
            next_unit_id: 1,
        }
    }

    /// Adds a unit to the roster. Only legal before the battle starts;
    /// returns `None` afterwards.
    pub fn add_unit(
        &mut self,
        character: CharacterId,
        team: Team,
        x: i32,
        y: i32,
        stats: &CombatStats,
    ) -> Option<UnitId> {
        if self.game_state != GameState::NotStarted {
            return None;
        }
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units
            .insert(id, Unit::new(id, character, team, x, y, stats));
        self.spawn_order.push(id);
        Some(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Roster of one team in insertion order. This ordering seeds the
    /// turn-order sort, so it must be stable across runs.
    pub fn roster(&self, team: Team) -> Vec<UnitId> {
        self.spawn_order
            .iter()
            .copied()
            .filter(|id| self.units.get(id).map(|u| u.team) == Some(team))
            .collect()
    }

    /// The living unit standing on a cell, if any. Dead units do not
    /// occupy cells.
    pub fn living_unit_at(&self, x: i32, y: i32) -> Option<&Unit> {
        self.units
            .values()
            .find(|u| u.is_alive() && u.x == x && u.y == y)
    }

    pub fn is_cell_occupied(&self, x: i32, y: i32) -> bool {
        self.living_unit_at(x, y).is_some()
    }

    pub fn team_has_living_units(&self, team: Team) -> bool {
        self.units.values().any(|u| u.team == team && u.is_alive())
    }

    /// The unit whose turn it is. `None` unless the battle is in progress.
    pub fn current_actor(&self) -> Option<UnitId> {
        if self.game_state != GameState::InProgress {
            return None;
        }
        self.turn_order.get(self.current_index).copied()
    }

    /// Clears every unit's per-turn flags. Runs when a round wraps.
    pub(crate) fn reset_turn_flags_all(&mut self) {
        for unit in self.units.values_mut() {
            unit.reset_turn_flags();
        }
    }

    /// Removes a unit from the arena, spawn order, and turn order, keeping
    /// `current_index` pointed at the same actor when possible. Scheduler
    /// consequences (ending the removed actor's turn, victory recheck) are
    /// the engine's job.
    pub(crate) fn detach_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        self.spawn_order.retain(|u| *u != id);
        if let Some(pos) = self.turn_order.iter().position(|u| *u == id) {
            self.turn_order.remove(pos);
            if pos < self.current_index {
                self.current_index -= 1;
            }
        }
        self.effects.remove_all(id);
        Some(unit)
    }
}
