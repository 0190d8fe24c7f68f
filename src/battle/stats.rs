use crate::battle::state::Battle;
use crate::errors::StatDataResult;
use crate::stats::{lookup_stats, StatProvider};
use crate::unit::UnitId;
use schema::CombatStats;

/// Effective combat snapshot for a unit: the provider's derived stats with
/// the unit's active effect adjustments layered on top. Recomputed on every
/// call; nothing here is cached, so a stat query after any mutation always
/// reflects the new state.
pub fn effective_stats(
    battle: &Battle,
    provider: &dyn StatProvider,
    unit: UnitId,
) -> StatDataResult<Option<CombatStats>> {
    let Some(unit_state) = battle.unit(unit) else {
        return Ok(None);
    };
    let mut stats = lookup_stats(provider, unit_state.character)?;
    let adjust = battle.effects.stat_adjustments(unit);

    stats.physical_defense = (stats.physical_defense + adjust.defense).max(0);
    stats.magical_defense = (stats.magical_defense + adjust.defense).max(0);
    stats.speed = (stats.speed + adjust.speed).max(0);
    stats.movement = (stats.movement + adjust.movement).max(0);

    Ok(Some(stats))
}

/// Effective speed, used for turn ordering. Missing sheets count as speed 0
/// rather than failing the whole sort.
pub fn effective_speed(battle: &Battle, provider: &dyn StatProvider, unit: UnitId) -> i32 {
    effective_stats(battle, provider, unit)
        .ok()
        .flatten()
        .map(|s| s.speed)
        .unwrap_or(0)
}

/// Effective movement budget for the range calculator.
pub fn effective_movement(battle: &Battle, provider: &dyn StatProvider, unit: UnitId) -> i32 {
    effective_stats(battle, provider, unit)
        .ok()
        .flatten()
        .map(|s| s.movement)
        .unwrap_or(0)
}
