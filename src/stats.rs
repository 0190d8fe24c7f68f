use crate::errors::{StatDataError, StatDataResult};
use schema::{BaseStats, CharacterId, CombatStats};
use std::collections::HashMap;

/// External source of combat stat snapshots (progression + equipment live
/// behind this boundary). The snapshot is opaque to the engine and must be
/// re-fetched after any invalidating state change; the engine never caches
/// it across calls.
pub trait StatProvider {
    fn combat_stats(&self, character: CharacterId) -> Option<CombatStats>;
}

/// Map-backed provider deriving snapshots from authored base stats.
/// Suitable for tests and headless simulations.
#[derive(Debug, Clone, Default)]
pub struct FixedStatProvider {
    sheets: HashMap<CharacterId, BaseStats>,
}

impl FixedStatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: CharacterId, base: BaseStats) {
        self.sheets.insert(character, base);
    }

    pub fn base_stats(&self, character: CharacterId) -> Option<&BaseStats> {
        self.sheets.get(&character)
    }
}

impl StatProvider for FixedStatProvider {
    fn combat_stats(&self, character: CharacterId) -> Option<CombatStats> {
        self.sheets.get(&character).map(CombatStats::from_base)
    }
}

/// Lookup that promotes a missing sheet to a typed error for callers that
/// treat the absence as a programming mistake rather than a removal race.
pub fn lookup_stats(
    provider: &dyn StatProvider,
    character: CharacterId,
) -> StatDataResult<CombatStats> {
    provider
        .combat_stats(character)
        .ok_or(StatDataError::CharacterNotFound(character))
}
