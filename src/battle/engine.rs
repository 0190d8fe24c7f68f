use crate::battle::commands::{execute_command_batch, BattleCommand};
use crate::battle::range;
use crate::battle::resolver::{calculate_attack, calculate_skill, push_damage_commands};
use crate::battle::state::{
    ActionFailureReason, ActionOutcome, Battle, BattleEvent, EventBus, GameState, TurnRng,
};
use crate::battle::stats::{effective_movement, effective_speed, effective_stats};
use crate::grid::GridQuery;
use crate::skills::SkillRegistry;
use crate::stats::StatProvider;
use crate::unit::UnitId;
use ordered_float::OrderedFloat;
use schema::{CombatStats, SkillId, Team};
use std::cmp::Reverse;

/// Tuning knobs for the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Turn-order jitter factor: each unit's sort key is
    /// `speed + uniform(-speed * factor, +speed * factor)`. Zero makes the
    /// order fully deterministic for equal inputs.
    pub turn_order_jitter: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_order_jitter: 0.05,
        }
    }
}

/// Façade over one battle: turn scheduling, movement, and combat
/// resolution, composed from the collaborator traits. The engine holds no
/// battle state of its own, so one engine can drive any number of battles,
/// as long as each battle is mutated by a single control flow at a time.
pub struct BattleEngine<'a> {
    grid: &'a dyn GridQuery,
    stats: &'a dyn StatProvider,
    skills: &'a dyn SkillRegistry,
    config: EngineConfig,
}

impl<'a> BattleEngine<'a> {
    pub fn new(
        grid: &'a dyn GridQuery,
        stats: &'a dyn StatProvider,
        skills: &'a dyn SkillRegistry,
    ) -> Self {
        Self::with_config(grid, stats, skills, EngineConfig::default())
    }

    pub fn with_config(
        grid: &'a dyn GridQuery,
        stats: &'a dyn StatProvider,
        skills: &'a dyn SkillRegistry,
        config: EngineConfig,
    ) -> Self {
        Self {
            grid,
            stats,
            skills,
            config,
        }
    }

    fn reject(&self, reason: ActionFailureReason, bus: &mut EventBus) -> ActionOutcome {
        bus.push(BattleEvent::ActionFailed { reason });
        ActionOutcome::fail(reason)
    }

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    /// Starts the battle: builds the turn order from unit speed plus
    /// bounded jitter, resets flags, and opens the first actor's turn.
    pub fn start_battle(
        &self,
        battle: &mut Battle,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) -> ActionOutcome {
        if battle.game_state != GameState::NotStarted {
            return self.reject(ActionFailureReason::AlreadyStarted, bus);
        }
        if battle.unit_count() == 0 {
            return self.reject(ActionFailureReason::NoUnits, bus);
        }

        let mut roster = battle.roster(Team::Player);
        roster.extend(battle.roster(Team::Enemy));

        let factor = self.config.turn_order_jitter;
        let mut keyed: Vec<(f32, UnitId)> = roster
            .into_iter()
            .map(|id| {
                let speed = effective_speed(battle, self.stats, id) as f32;
                let jitter = if factor > 0.0 {
                    // Roll 1..=100 mapped onto [-1, 1]
                    let roll = rng.next_outcome("turn order jitter") as f32;
                    speed * factor * ((roll - 50.5) / 49.5)
                } else {
                    0.0
                };
                (speed + jitter, id)
            })
            .collect();
        // Stable sort: insertion order breaks ties deterministically
        keyed.sort_by_key(|(key, _)| Reverse(OrderedFloat(*key)));

        battle.turn_order = keyed.into_iter().map(|(_, id)| id).collect();
        battle.game_state = GameState::InProgress;
        battle.turn_number = 1;
        battle.current_index = 0;
        battle.reset_turn_flags_all();

        bus.push(BattleEvent::BattleStarted {
            unit_count: battle.unit_count(),
        });
        bus.push(BattleEvent::RoundStarted { turn_number: 1 });
        self.begin_turn(battle, bus);
        ActionOutcome::ok()
    }

    /// Ends the current actor's turn (running its turn-end effect ticks)
    /// and hands control to the next living unit in the order. Wrapping
    /// past the end of the order starts a new round: the turn counter
    /// increments and every unit's flags reset.
    pub fn advance_turn(&self, battle: &mut Battle, bus: &mut EventBus) -> ActionOutcome {
        if battle.game_state != GameState::InProgress {
            return self.reject(ActionFailureReason::NotInProgress, bus);
        }

        if let Some(actor) = battle.current_actor() {
            bus.push(BattleEvent::TurnEnded { unit: actor });
            self.tick_turn_end(battle, actor, bus);
            if battle.game_state != GameState::InProgress {
                // A poison tick just decided the battle
                return ActionOutcome::ok();
            }
        }

        self.step_forward(battle, bus);
        self.begin_turn(battle, bus);
        ActionOutcome::ok()
    }

    /// Marks the current actor as having acted and moved. Does not advance
    /// the scheduler; a no-op without a current actor.
    pub fn end_current_actor_turn(&self, battle: &mut Battle, bus: &mut EventBus) -> ActionOutcome {
        if battle.game_state != GameState::InProgress {
            return self.reject(ActionFailureReason::NotInProgress, bus);
        }
        if let Some(actor) = battle.current_actor() {
            if let Some(unit) = battle.unit_mut(actor) {
                unit.has_acted = true;
                unit.has_moved = true;
            }
        }
        ActionOutcome::ok()
    }

    /// Opens the current actor's turn: cooldowns tick, then the
    /// OnTurnStart hook runs.
    fn begin_turn(&self, battle: &mut Battle, bus: &mut EventBus) {
        let Some(actor) = battle.current_actor() else {
            return;
        };
        if let Some(unit) = battle.unit_mut(actor) {
            unit.tick_cooldowns();
        }
        bus.push(BattleEvent::TurnStarted {
            unit: actor,
            turn_number: battle.turn_number,
        });
        battle.effects.on_turn_start(actor, bus);
    }

    /// Advances `current_index` to the next living unit, handling round
    /// wrap bookkeeping. While the battle is in progress at least one unit
    /// per team is alive, so this terminates within one lap.
    fn step_forward(&self, battle: &mut Battle, bus: &mut EventBus) {
        let len = battle.turn_order.len();
        if len == 0 {
            return;
        }
        for _ in 0..len {
            battle.current_index += 1;
            if battle.current_index >= len {
                battle.current_index = 0;
                battle.turn_number += 1;
                battle.reset_turn_flags_all();
                bus.push(BattleEvent::RoundStarted {
                    turn_number: battle.turn_number,
                });
            }
            let id = battle.turn_order[battle.current_index];
            if battle.unit(id).map(|u| u.is_alive()).unwrap_or(false) {
                return;
            }
        }
    }

    /// OnTurnEnd for one unit: periodic damage and healing are applied
    /// through the normal damage pipeline, then durations tick and expired
    /// effects fall off. Each tick is executed before the next is planned;
    /// planning them all up front would let two damage-over-time effects
    /// absorb out of the same shield capacity. A lethal tick stops further
    /// ticking and triggers the battle-end check.
    fn tick_turn_end(&self, battle: &mut Battle, actor: UnitId, bus: &mut EventBus) {
        for tick in battle.effects.periodic_ticks(actor) {
            let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::EffectTick {
                target: actor,
                kind: tick.kind,
                amount: tick.amount,
            })];
            if tick.healing {
                commands.push(BattleCommand::HealUnit {
                    target: actor,
                    amount: tick.amount,
                });
            } else {
                push_damage_commands(battle, actor, tick.amount, &mut commands);
            }
            let _ = execute_command_batch(commands, battle, bus);
            if !battle.unit(actor).map(|u| u.is_alive()).unwrap_or(false) {
                break;
            }
        }

        battle.effects.tick_durations(actor, bus);
        self.check_battle_end(battle, bus);
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Moves the current actor to a cell inside its movement range. The
    /// move does not end the turn; acting stays available.
    pub fn move_unit(
        &self,
        battle: &mut Battle,
        unit: UnitId,
        x: i32,
        y: i32,
        bus: &mut EventBus,
    ) -> ActionOutcome {
        if battle.game_state != GameState::InProgress {
            return self.reject(ActionFailureReason::NotInProgress, bus);
        }
        let Some(state) = battle.unit(unit) else {
            return self.reject(ActionFailureReason::UnknownUnit, bus);
        };
        if battle.current_actor() != Some(unit) {
            return self.reject(ActionFailureReason::NotCurrentActor, bus);
        }
        if state.has_moved {
            return self.reject(ActionFailureReason::AlreadyMoved, bus);
        }
        if battle.effects.movement_veto(unit).is_some() {
            return self.reject(ActionFailureReason::MovementImpaired, bus);
        }
        if battle.is_cell_occupied(x, y) {
            return self.reject(ActionFailureReason::DestinationOccupied, bus);
        }
        let from = state.position();
        if !self.movement_range(battle, unit).contains(&(x, y)) {
            return self.reject(ActionFailureReason::OutOfRange, bus);
        }

        let commands = vec![
            BattleCommand::EmitEvent(BattleEvent::UnitMoved {
                unit,
                from,
                to: (x, y),
            }),
            BattleCommand::SetPosition { unit, x, y },
            BattleCommand::MarkMoved { unit },
        ];
        let _ = execute_command_batch(commands, battle, bus);
        battle.effects.on_after_move(unit, bus);
        ActionOutcome::ok()
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Removes a unit from the battle entirely: roster, turn order, and
    /// effects. Removing the current actor ends its turn on the spot and
    /// opens the next actor's. Victory is always rechecked afterwards.
    pub fn remove_unit(&self, battle: &mut Battle, unit: UnitId, bus: &mut EventBus) -> ActionOutcome {
        let was_current = battle.current_actor() == Some(unit);
        if battle.detach_unit(unit).is_none() {
            return self.reject(ActionFailureReason::UnknownUnit, bus);
        }
        bus.push(BattleEvent::UnitRemoved { unit });

        if battle.game_state == GameState::InProgress {
            self.check_battle_end(battle, bus);
        }
        if battle.game_state == GameState::InProgress && was_current {
            // The next unit slid into the removed actor's slot
            let len = battle.turn_order.len();
            if len > 0 {
                if battle.current_index >= len {
                    battle.current_index = 0;
                    battle.turn_number += 1;
                    battle.reset_turn_flags_all();
                    bus.push(BattleEvent::RoundStarted {
                        turn_number: battle.turn_number,
                    });
                }
                let id = battle.turn_order[battle.current_index];
                if !battle.unit(id).map(|u| u.is_alive()).unwrap_or(false) {
                    self.step_forward(battle, bus);
                }
                self.begin_turn(battle, bus);
            }
        }
        ActionOutcome::ok()
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    /// Basic attack by the current actor. See
    /// [`crate::battle::resolver::calculate_attack`] for the combat math.
    pub fn resolve_attack(
        &self,
        battle: &mut Battle,
        attacker: UnitId,
        target: UnitId,
        bus: &mut EventBus,
    ) -> ActionOutcome {
        if battle.game_state != GameState::InProgress {
            return self.reject(ActionFailureReason::NotInProgress, bus);
        }
        if battle.current_actor() != Some(attacker) {
            return self.reject(ActionFailureReason::NotCurrentActor, bus);
        }

        let (commands, outcome) = calculate_attack(battle, self.stats, attacker, target);
        let _ = execute_command_batch(commands, battle, bus);
        if outcome.success {
            self.check_battle_end(battle, bus);
        }
        outcome
    }

    /// Skill cast by the current actor at a target cell. See
    /// [`crate::battle::resolver::calculate_skill`] for validation order
    /// and per-target math.
    pub fn resolve_skill(
        &self,
        battle: &mut Battle,
        caster: UnitId,
        skill: SkillId,
        target_x: i32,
        target_y: i32,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) -> ActionOutcome {
        if battle.game_state != GameState::InProgress {
            return self.reject(ActionFailureReason::NotInProgress, bus);
        }
        if battle.current_actor() != Some(caster) {
            return self.reject(ActionFailureReason::NotCurrentActor, bus);
        }

        let (commands, outcome) = calculate_skill(
            battle,
            self.grid,
            self.stats,
            self.skills,
            caster,
            skill,
            target_x,
            target_y,
            rng,
        );
        let _ = execute_command_batch(commands, battle, bus);
        if outcome.success {
            self.check_battle_end(battle, bus);
        }
        outcome
    }

    /// Absorbing victory check, run after every removal or HP-zero event.
    /// The enemy roster is checked before the player roster, so a
    /// simultaneous double wipe resolves to a player victory.
    pub fn check_battle_end(&self, battle: &mut Battle, bus: &mut EventBus) -> bool {
        if battle.game_state != GameState::InProgress {
            return battle.game_state != GameState::NotStarted;
        }
        let result = if !battle.team_has_living_units(Team::Enemy) {
            GameState::Victory(Team::Player)
        } else if !battle.team_has_living_units(Team::Player) {
            GameState::Defeat
        } else {
            return false;
        };
        battle.game_state = result;
        bus.push(BattleEvent::BattleEnded { result });
        true
    }

    // ------------------------------------------------------------------
    // Read-only queries (safe to interleave with each other)
    // ------------------------------------------------------------------

    /// Cells the unit can move to this turn.
    pub fn movement_range(&self, battle: &Battle, unit: UnitId) -> Vec<(i32, i32)> {
        let budget = effective_movement(battle, self.stats, unit);
        range::movement_range(battle, self.grid, unit, budget)
    }

    /// Cells the unit can currently strike.
    pub fn attack_range(&self, battle: &Battle, unit: UnitId) -> Vec<(i32, i32)> {
        let Some(state) = battle.unit(unit) else {
            return Vec::new();
        };
        let reach = effective_stats(battle, self.stats, unit)
            .ok()
            .flatten()
            .map(|s| s.attack_range)
            .unwrap_or(0);
        range::attack_range(self.grid, state.position(), reach)
    }

    /// Cells covered by an ability centered on an arbitrary point.
    pub fn ability_area(&self, center: (i32, i32), radius: i32) -> Vec<(i32, i32)> {
        range::ability_area(self.grid, center, radius)
    }

    /// Effective stat snapshot for AI/UI consumers. `None` when the unit
    /// or its character sheet is missing.
    pub fn unit_stats(&self, battle: &Battle, unit: UnitId) -> Option<CombatStats> {
        effective_stats(battle, self.stats, unit).ok().flatten()
    }
}
