use crate::unit::UnitId;
use schema::{CharacterId, SkillId};
use std::fmt;

/// Main error type for the tactics battle engine.
///
/// These are programmer-level faults (dangling ids handed to an executor,
/// missing content at wiring time). Expected gameplay rejections (wrong
/// turn, out of range, insufficient MP) are not errors; they surface as
/// [`crate::battle::state::ActionOutcome`] failure records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Error related to skill template lookup
    SkillData(SkillDataError),
    /// Error related to stat snapshot lookup
    StatData(StatDataError),
    /// Error related to inconsistent battle state
    BattleState(BattleStateError),
}

/// Errors related to skill template lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillDataError {
    /// The specified skill was not found in the registry
    SkillNotFound(SkillId),
}

/// Errors related to stat provider lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatDataError {
    /// The specified character sheet was not found in the provider
    CharacterNotFound(CharacterId),
}

/// Errors related to battle state consistency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleStateError {
    /// A command referenced a unit that is not in the battle
    UnknownUnit(UnitId),
}

pub type BattleResult<T> = Result<T, EngineError>;
pub type SkillDataResult<T> = Result<T, SkillDataError>;
pub type StatDataResult<T> = Result<T, StatDataError>;

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::SkillData(e) => write!(f, "skill data error: {}", e),
            EngineError::StatData(e) => write!(f, "stat data error: {}", e),
            EngineError::BattleState(e) => write!(f, "battle state error: {}", e),
        }
    }
}

impl fmt::Display for SkillDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillDataError::SkillNotFound(id) => write!(f, "{} not found in registry", id),
        }
    }
}

impl fmt::Display for StatDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatDataError::CharacterNotFound(id) => write!(f, "{} not found in provider", id),
        }
    }
}

impl fmt::Display for BattleStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleStateError::UnknownUnit(id) => write!(f, "{} is not in this battle", id),
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for SkillDataError {}
impl std::error::Error for StatDataError {}
impl std::error::Error for BattleStateError {}

impl From<SkillDataError> for EngineError {
    fn from(e: SkillDataError) -> Self {
        EngineError::SkillData(e)
    }
}

impl From<StatDataError> for EngineError {
    fn from(e: StatDataError) -> Self {
        EngineError::StatData(e)
    }
}

impl From<BattleStateError> for EngineError {
    fn from(e: BattleStateError) -> Self {
        EngineError::BattleState(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_errors_roll_up_into_engine_error() {
        let err: EngineError = SkillDataError::SkillNotFound(SkillId(3)).into();
        assert_eq!(
            err.to_string(),
            "skill data error: skill#3 not found in registry"
        );

        let err: EngineError = StatDataError::CharacterNotFound(CharacterId(9)).into();
        assert_eq!(
            err.to_string(),
            "stat data error: character#9 not found in provider"
        );

        let err: EngineError = BattleStateError::UnknownUnit(UnitId(4)).into();
        assert_eq!(
            err.to_string(),
            "battle state error: unit#4 is not in this battle"
        );
    }

    #[test]
    fn battle_result_propagates_with_question_mark() {
        fn failing_lookup() -> BattleResult<()> {
            let missing: SkillDataResult<()> = Err(SkillDataError::SkillNotFound(SkillId(1)));
            missing?;
            Ok(())
        }
        assert!(matches!(failing_lookup(), Err(EngineError::SkillData(_))));
    }
}
