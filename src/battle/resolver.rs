use crate::battle::commands::BattleCommand;
use crate::battle::range::{ability_area, manhattan_distance};
use crate::battle::state::{
    ActionFailureReason, ActionOutcome, Battle, BattleEvent, TargetOutcome, TurnRng,
};
use crate::battle::stats::effective_stats;
use crate::battle::effects::EffectSpec;
use crate::grid::GridQuery;
use crate::skills::{lookup_skill, SkillRegistry};
use crate::stats::StatProvider;
use crate::unit::UnitId;
use schema::{SkillId, SkillKind, TargetPolicy};

/// The calculators here are the pure half of combat resolution: they read
/// the battle, decide everything (mitigation, crits, shields, kills), and
/// hand back commands plus the result record. Execution is mechanical and
/// happens in `commands::execute_command_batch`.
///
/// A precondition failure produces a single `ActionFailed` event command
/// and a failing outcome; nothing is thrown for expected rejections.
fn rejection(reason: ActionFailureReason) -> (Vec<BattleCommand>, ActionOutcome) {
    (
        vec![BattleCommand::EmitEvent(BattleEvent::ActionFailed { reason })],
        ActionOutcome::fail(reason),
    )
}

/// Routes raw damage through the target's damage-taken pipeline and appends
/// the resulting commands. Returns the damage that reaches HP and whether
/// it kills. The plan is computed against the battle as it stands when
/// called: a caller issuing several plans for the same target must execute
/// each batch before planning the next, or they will draw on the same
/// shield capacity twice.
pub(crate) fn push_damage_commands(
    battle: &Battle,
    target: UnitId,
    raw: i32,
    commands: &mut Vec<BattleCommand>,
) -> (i32, bool) {
    let plan = battle.effects.plan_damage_taken(target, raw);

    if plan.invulnerable {
        commands.push(BattleCommand::EmitEvent(BattleEvent::DamageAbsorbed {
            target,
            amount: plan.incoming,
        }));
        return (0, false);
    }

    for hit in &plan.shield_hits {
        commands.push(BattleCommand::ConsumeShield {
            target,
            instance: hit.instance,
            amount: hit.absorbed,
        });
        commands.push(BattleCommand::EmitEvent(BattleEvent::DamageAbsorbed {
            target,
            amount: hit.absorbed,
        }));
    }

    let mut killed = false;
    if plan.final_damage > 0 {
        commands.push(BattleCommand::DealDamage {
            target,
            amount: plan.final_damage,
        });
        let hp = battle.unit(target).map(|u| u.current_hp).unwrap_or(0);
        killed = plan.final_damage >= hp;
    }

    if plan.breaks_sleep {
        commands.push(BattleCommand::RemoveEffect {
            target,
            kind: schema::EffectKind::Sleep,
        });
        commands.push(BattleCommand::EmitEvent(BattleEvent::SleepBroken { target }));
    }

    (plan.final_damage, killed)
}

/// Basic attack: physical attack vs physical defense, floored at 1, then
/// the dealt/taken pipelines. Marks the attacker acted. The engine façade
/// has already verified that the attacker is the current actor.
pub fn calculate_attack(
    battle: &Battle,
    provider: &dyn StatProvider,
    attacker: UnitId,
    target: UnitId,
) -> (Vec<BattleCommand>, ActionOutcome) {
    let Some(attacker_unit) = battle.unit(attacker) else {
        return rejection(ActionFailureReason::UnknownUnit);
    };
    let Some(target_unit) = battle.unit(target) else {
        return rejection(ActionFailureReason::UnknownUnit);
    };
    if attacker_unit.has_acted {
        return rejection(ActionFailureReason::AlreadyActed);
    }
    if battle.effects.action_veto(attacker).is_some() {
        return rejection(ActionFailureReason::ActionImpaired);
    }
    if !target_unit.is_alive() {
        return rejection(ActionFailureReason::TargetNotAlive);
    }

    let (Ok(Some(attacker_stats)), Ok(Some(target_stats))) = (
        effective_stats(battle, provider, attacker),
        effective_stats(battle, provider, target),
    ) else {
        return rejection(ActionFailureReason::UnknownCharacter);
    };

    let distance = manhattan_distance(attacker_unit.position(), target_unit.position());
    if distance > attacker_stats.attack_range {
        return rejection(ActionFailureReason::OutOfRange);
    }

    let base = (attacker_stats.physical_attack - target_stats.physical_defense).max(1);
    let outgoing = battle.effects.scale_outgoing(attacker, base);

    let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::AttackHit {
        attacker,
        target,
    })];
    let (dealt, killed) = push_damage_commands(battle, target, outgoing, &mut commands);
    commands.push(BattleCommand::MarkActed { unit: attacker });

    let outcome = ActionOutcome::with_targets(vec![TargetOutcome {
        unit: target,
        amount: dealt,
        crit: false,
        killed,
    }]);
    (commands, outcome)
}

/// True when `unit` is a legal target for the skill relative to the caster.
fn passes_policy(policy: TargetPolicy, caster: UnitId, caster_team: schema::Team, unit: &crate::unit::Unit) -> bool {
    match policy {
        TargetPolicy::Enemies => unit.team != caster_team,
        TargetPolicy::Allies => unit.team == caster_team,
        TargetPolicy::SelfOnly => unit.id == caster,
        TargetPolicy::Any => true,
    }
}

/// Skill cast: validates affordability, cooldown, and range; snapshots the
/// affected targets once; then applies the skill's effect to each with an
/// independent crit roll. MP and cooldown are charged exactly once per
/// cast, even when the area catches nobody.
pub fn calculate_skill(
    battle: &Battle,
    grid: &dyn GridQuery,
    provider: &dyn StatProvider,
    registry: &dyn SkillRegistry,
    caster: UnitId,
    skill_id: SkillId,
    target_x: i32,
    target_y: i32,
    rng: &mut TurnRng,
) -> (Vec<BattleCommand>, ActionOutcome) {
    let Some(caster_unit) = battle.unit(caster) else {
        return rejection(ActionFailureReason::UnknownUnit);
    };
    if !caster_unit.is_alive() {
        return rejection(ActionFailureReason::TargetNotAlive);
    }
    if caster_unit.has_acted {
        return rejection(ActionFailureReason::AlreadyActed);
    }
    if battle.effects.action_veto(caster).is_some() {
        return rejection(ActionFailureReason::ActionImpaired);
    }
    let Ok(skill) = lookup_skill(registry, skill_id) else {
        return rejection(ActionFailureReason::UnknownSkill);
    };
    let Ok(Some(caster_stats)) = effective_stats(battle, provider, caster) else {
        return rejection(ActionFailureReason::UnknownCharacter);
    };
    if caster_unit.current_mp < skill.mp_cost {
        return rejection(ActionFailureReason::InsufficientMp);
    }
    if caster_unit.cooldown_remaining(skill_id) > 0 {
        return rejection(ActionFailureReason::SkillOnCooldown);
    }
    if !grid.is_in_bounds(target_x, target_y) {
        return rejection(ActionFailureReason::OutOfBounds);
    }
    if manhattan_distance(caster_unit.position(), (target_x, target_y)) > skill.range {
        return rejection(ActionFailureReason::OutOfRange);
    }

    // Affected-target set is snapshotted once, before any effect applies.
    // A death mid-resolution never adds or drops a later target.
    let caster_team = caster_unit.team;
    let affected: Vec<UnitId> = ability_area(grid, (target_x, target_y), skill.area)
        .into_iter()
        .filter_map(|(x, y)| battle.living_unit_at(x, y))
        .filter(|u| passes_policy(skill.target_policy, caster, caster_team, u))
        .map(|u| u.id)
        .collect();

    let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::SkillUsed {
        caster,
        skill: skill_id,
        target_cell: (target_x, target_y),
    })];
    if skill.mp_cost > 0 {
        commands.push(BattleCommand::SpendMp {
            unit: caster,
            amount: skill.mp_cost,
        });
    }
    commands.push(BattleCommand::StartCooldown {
        unit: caster,
        skill: skill_id,
        turns: skill.cooldown,
    });

    let mut targets = Vec::new();
    for target in affected {
        let Some(target_unit) = battle.unit(target) else {
            continue;
        };
        let Ok(Some(target_stats)) = effective_stats(battle, provider, target) else {
            continue;
        };

        let base = match &skill.kind {
            SkillKind::PhysicalDamage => {
                skill.base_power + caster_stats.physical_attack - target_stats.physical_defense
            }
            SkillKind::MagicalDamage => {
                skill.base_power + caster_stats.magical_attack - target_stats.magical_defense
            }
            SkillKind::Heal => skill.base_power + caster_stats.magical_attack,
            SkillKind::ApplyEffect { .. } => skill.base_power,
        };
        let mut magnitude = base.max(1);

        // Status applications do not crit; damage and heals roll per target
        let mut crit = false;
        if !matches!(skill.kind, SkillKind::ApplyEffect { .. }) {
            let roll = rng.next_outcome("crit check") as i32;
            if roll <= caster_stats.crit_chance {
                crit = true;
                magnitude = magnitude * caster_stats.crit_damage / 100;
                commands.push(BattleCommand::EmitEvent(BattleEvent::CriticalHit {
                    attacker: caster,
                    target,
                }));
            }
        }

        match &skill.kind {
            SkillKind::PhysicalDamage | SkillKind::MagicalDamage => {
                let outgoing = battle.effects.scale_outgoing(caster, magnitude);
                let (dealt, killed) =
                    push_damage_commands(battle, target, outgoing, &mut commands);
                targets.push(TargetOutcome {
                    unit: target,
                    amount: dealt,
                    crit,
                    killed,
                });
            }
            SkillKind::Heal => {
                let healed = magnitude.min(target_unit.max_hp - target_unit.current_hp);
                commands.push(BattleCommand::HealUnit {
                    target,
                    amount: magnitude,
                });
                targets.push(TargetOutcome {
                    unit: target,
                    amount: healed,
                    crit,
                    killed: false,
                });
            }
            SkillKind::ApplyEffect {
                effect,
                duration,
                max_stacks,
            } => {
                let spec = EffectSpec::new(*effect, *duration, magnitude)
                    .with_max_stacks(*max_stacks)
                    .with_caster(caster);
                commands.push(BattleCommand::ApplyEffect { target, spec });
                targets.push(TargetOutcome {
                    unit: target,
                    amount: magnitude,
                    crit,
                    killed: false,
                });
            }
        }
    }

    commands.push(BattleCommand::MarkActed { unit: caster });
    (commands, ActionOutcome::with_targets(targets))
}
