use crate::battle::effects::EffectSpec;
use crate::battle::state::{Battle, BattleEvent, EventBus};
use crate::errors::BattleStateError;
use crate::unit::UnitId;
use schema::{EffectKind, SkillId};

/// Atomic commands representing final state changes. Calculators produce
/// these from a read-only view of the battle; only the executor below
/// mutates. Commands carry post-pipeline amounts; shields and scaling have
/// already been decided by the time a `DealDamage` exists.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Unit modifications
    DealDamage {
        target: UnitId,
        amount: i32,
    },
    HealUnit {
        target: UnitId,
        amount: i32,
    },
    SpendMp {
        unit: UnitId,
        amount: i32,
    },
    StartCooldown {
        unit: UnitId,
        skill: SkillId,
        turns: u8,
    },
    MarkActed {
        unit: UnitId,
    },
    MarkMoved {
        unit: UnitId,
    },
    SetPosition {
        unit: UnitId,
        x: i32,
        y: i32,
    },

    // Status effects
    ApplyEffect {
        target: UnitId,
        spec: EffectSpec,
    },
    RemoveEffect {
        target: UnitId,
        kind: EffectKind,
    },
    ConsumeShield {
        target: UnitId,
        instance: u32,
        amount: i32,
    },

    // Battle flow
    EmitEvent(BattleEvent),
}

/// Execute a batch of commands in order. The batch is built against the
/// same state it mutates within one resolution, so a lookup failure here
/// is a programming error, not a gameplay outcome.
pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    battle: &mut Battle,
    bus: &mut EventBus,
) -> Result<(), BattleStateError> {
    for command in commands {
        execute_command(command, battle, bus)?;
    }
    Ok(())
}

fn execute_command(
    command: BattleCommand,
    battle: &mut Battle,
    bus: &mut EventBus,
) -> Result<(), BattleStateError> {
    match command {
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
            Ok(())
        }
        BattleCommand::DealDamage { target, amount } => {
            let unit = battle
                .unit_mut(target)
                .ok_or(BattleStateError::UnknownUnit(target))?;
            let died = unit.take_damage(amount);
            bus.push(BattleEvent::DamageDealt {
                target,
                amount,
                remaining_hp: unit.current_hp,
            });
            if died {
                bus.push(BattleEvent::UnitDefeated { unit: target });
            }
            Ok(())
        }
        BattleCommand::HealUnit { target, amount } => {
            let unit = battle
                .unit_mut(target)
                .ok_or(BattleStateError::UnknownUnit(target))?;
            let healed = unit.heal(amount);
            if healed > 0 {
                bus.push(BattleEvent::UnitHealed {
                    target,
                    amount: healed,
                    new_hp: unit.current_hp,
                });
            }
            Ok(())
        }
        BattleCommand::SpendMp { unit, amount } => {
            let state = battle
                .unit_mut(unit)
                .ok_or(BattleStateError::UnknownUnit(unit))?;
            state.spend_mp(amount);
            bus.push(BattleEvent::MpSpent {
                unit,
                amount,
                remaining_mp: state.current_mp,
            });
            Ok(())
        }
        BattleCommand::StartCooldown { unit, skill, turns } => {
            let state = battle
                .unit_mut(unit)
                .ok_or(BattleStateError::UnknownUnit(unit))?;
            state.start_cooldown(skill, turns);
            if turns > 0 {
                bus.push(BattleEvent::CooldownStarted { unit, skill, turns });
            }
            Ok(())
        }
        BattleCommand::MarkActed { unit } => {
            let state = battle
                .unit_mut(unit)
                .ok_or(BattleStateError::UnknownUnit(unit))?;
            state.has_acted = true;
            Ok(())
        }
        BattleCommand::MarkMoved { unit } => {
            let state = battle
                .unit_mut(unit)
                .ok_or(BattleStateError::UnknownUnit(unit))?;
            state.has_moved = true;
            Ok(())
        }
        BattleCommand::SetPosition { unit, x, y } => {
            let state = battle
                .unit_mut(unit)
                .ok_or(BattleStateError::UnknownUnit(unit))?;
            state.x = x;
            state.y = y;
            Ok(())
        }
        BattleCommand::ApplyEffect { target, spec } => {
            battle.effects.apply(target, spec, bus);
            Ok(())
        }
        BattleCommand::RemoveEffect { target, kind } => {
            // Absence is fine: the effect may have expired mid-batch
            battle.effects.remove_kind(target, kind, bus);
            Ok(())
        }
        BattleCommand::ConsumeShield {
            target,
            instance,
            amount,
        } => {
            battle.effects.consume_shield(target, instance, amount, bus);
            Ok(())
        }
    }
}
