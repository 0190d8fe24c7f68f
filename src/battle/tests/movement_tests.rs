//! Movement ranges and the move action: budgeted flood fill, occupancy,
//! terrain costs, and the per-turn move flag.

use super::common::*;
use crate::battle::effects::EffectSpec;
use crate::battle::state::{ActionFailureReason, BattleEvent, EventBus};
use pretty_assertions::assert_eq;
use schema::{EffectDuration, EffectKind};

#[test]
fn movement_range_excludes_start_and_occupied_cells() {
    let world = TestWorld::new();
    let mut sk = world.skirmish();
    start(&world, &mut sk.battle);

    let range = world.engine().movement_range(&sk.battle, sk.fighter);

    assert!(!range.contains(&(0, 0)), "own cell is never a destination");
    assert!(!range.contains(&(0, 1)), "ally-occupied cell is excluded");
    assert!(!range.contains(&(4, 0)), "enemy-occupied cell is excluded");
    assert!(range.contains(&(1, 0)));
    // Around the blocked ally: budget 4 still reaches (0,2)
    assert!(range.contains(&(0, 2)));
}

#[test]
fn movement_range_is_repeatable() {
    let world = TestWorld::new();
    let mut sk = world.skirmish();
    start(&world, &mut sk.battle);

    let engine = world.engine();
    let first = engine.movement_range(&sk.battle, sk.fighter);
    let second = engine.movement_range(&sk.battle, sk.fighter);
    assert_eq!(first, second);
}

#[test]
fn terrain_cost_shrinks_reach() {
    let mut world = TestWorld::new();
    // A swamp column east of the fighter at (2,2)
    world.grid.set_cost(3, 2, 3);
    let mut duel = world.lone_fighter();
    start(&world, &mut duel.battle);

    let range = world.engine().movement_range(&duel.battle, duel.fighter);

    // Budget 4: entering the swamp costs 3, one more step costs 1
    assert!(range.contains(&(3, 2)));
    assert!(range.contains(&(4, 2)));
    assert!(!range.contains(&(5, 2)));
    // The cheap detour around still works within budget
    assert!(range.contains(&(2, 4)));
}

#[test]
fn move_updates_position_without_ending_the_turn() {
    let world = TestWorld::new();
    let mut duel = world.duel();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    let engine = world.engine();
    let outcome = engine.move_unit(&mut duel.battle, duel.fighter, 0, 2, &mut bus);

    assert!(outcome.success);
    assert_eq!(duel.battle.unit(duel.fighter).unwrap().position(), (0, 2));
    assert!(duel.battle.unit(duel.fighter).unwrap().has_moved);
    assert!(bus.events().contains(&BattleEvent::UnitMoved {
        unit: duel.fighter,
        from: (0, 0),
        to: (0, 2),
    }));

    // Acting is still available after the move. The bruiser is now 3 cells
    // away, past basic attack reach, so act with a ranged skill.
    let outcome = engine.resolve_skill(
        &mut duel.battle,
        duel.fighter,
        STRIKE,
        1,
        0,
        &mut mid_rng(),
        &mut bus,
    );
    assert!(outcome.success);
}

#[test]
fn second_move_in_one_turn_is_rejected() {
    let world = TestWorld::new();
    let mut duel = world.duel();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    let engine = world.engine();
    assert!(
        engine
            .move_unit(&mut duel.battle, duel.fighter, 0, 1, &mut bus)
            .success
    );
    let second = engine.move_unit(&mut duel.battle, duel.fighter, 0, 2, &mut bus);

    assert_eq!(second.failure, Some(ActionFailureReason::AlreadyMoved));
    assert_eq!(duel.battle.unit(duel.fighter).unwrap().position(), (0, 1));
}

#[test]
fn occupied_destination_is_rejected() {
    let world = TestWorld::new();
    let mut duel = world.duel();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    let outcome = world
        .engine()
        .move_unit(&mut duel.battle, duel.fighter, 1, 0, &mut bus);

    assert_eq!(
        outcome.failure,
        Some(ActionFailureReason::DestinationOccupied)
    );
}

#[test]
fn destination_outside_budget_is_rejected() {
    let world = TestWorld::new();
    let mut duel = world.duel();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    let outcome = world
        .engine()
        .move_unit(&mut duel.battle, duel.fighter, 0, 5, &mut bus);

    assert_eq!(outcome.failure, Some(ActionFailureReason::OutOfRange));
    assert_eq!(duel.battle.unit(duel.fighter).unwrap().position(), (0, 0));
}

#[test]
fn only_the_current_actor_may_move() {
    let world = TestWorld::new();
    let mut duel = world.duel();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    let outcome = world
        .engine()
        .move_unit(&mut duel.battle, duel.bruiser, 2, 0, &mut bus);

    assert_eq!(outcome.failure, Some(ActionFailureReason::NotCurrentActor));
}

#[test]
fn root_pins_the_unit_but_leaves_its_action() {
    let world = TestWorld::new();
    let mut duel = world.duel();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    duel.battle.effects.apply(
        duel.fighter,
        EffectSpec::new(EffectKind::Root, EffectDuration::Turns(2), 0),
        &mut bus,
    );

    let engine = world.engine();
    let moved = engine.move_unit(&mut duel.battle, duel.fighter, 0, 1, &mut bus);
    assert_eq!(moved.failure, Some(ActionFailureReason::MovementImpaired));

    let attacked = engine.resolve_attack(&mut duel.battle, duel.fighter, duel.bruiser, &mut bus);
    assert!(attacked.success);
}

#[test]
fn slow_reduces_the_movement_budget() {
    let world = TestWorld::new();
    let mut duel = world.lone_fighter();
    start(&world, &mut duel.battle);

    let mut bus = EventBus::new();
    duel.battle.effects.apply(
        duel.fighter,
        EffectSpec::new(EffectKind::Slow, EffectDuration::Turns(2), 2),
        &mut bus,
    );

    let range = world.engine().movement_range(&duel.battle, duel.fighter);
    // Budget 4 - 2: two steps out, no more
    assert!(range.contains(&(4, 2)));
    assert!(!range.contains(&(5, 2)));
}
