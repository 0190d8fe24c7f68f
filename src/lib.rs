// In: src/lib.rs

//! Tactics Engine
//!
//! The combat simulation core of a turn-based tactical RPG: turn ordering,
//! grid movement and attack ranges, attack/skill resolution through a
//! stacking modifier pipeline, and timed status effects. Deterministic by
//! construction: all randomness flows through an injectable roll oracle.

// --- MODULE DECLARATIONS ---
// This declares the module hierarchy for the crate.
pub mod battle;
pub mod errors;
pub mod grid;
pub mod skills;
pub mod stats;
pub mod unit;

// --- PUBLIC API RE-EXPORTS ---
// This section defines the public-facing API of the `tactics-engine` crate,
// making it easy for users to import the most important types directly.

// --- From the `schema` crate ---
// Re-export all core data definitions and static enums.
pub use schema::{
    BaseStats,
    CharacterId,
    CombatStats,
    EffectCategory,
    EffectDuration,
    EffectKind,
    SkillData,
    SkillId,
    SkillKind,
    TargetPolicy,
    Team,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine and scheduler.
pub use battle::engine::{BattleEngine, EngineConfig};
pub use battle::state::{
    ActionFailureReason, ActionOutcome, Battle, BattleEvent, EventBus, GameState, TargetOutcome,
    TurnRng,
};

// Status effects.
pub use battle::effects::{EffectEngine, EffectSpec, StatusEffect};

// Range queries.
pub use battle::range::{ability_area, attack_range, manhattan_distance, movement_range};

// Core runtime types for a battle.
pub use unit::{Unit, UnitId};

// External collaborator contracts and their in-memory implementations.
pub use grid::{GridQuery, MapGrid};
pub use skills::{InMemorySkillRegistry, SkillRegistry};
pub use stats::{FixedStatProvider, StatProvider};

// Crate-specific error and result types.
pub use errors::{
    BattleResult, BattleStateError, EngineError, SkillDataError, SkillDataResult, StatDataError,
    StatDataResult,
};
