use crate::errors::{SkillDataError, SkillDataResult};
use schema::{SkillData, SkillId};
use std::collections::HashMap;

/// External skill template registry. The engine only reads templates; skill
/// authoring and persistence live outside the core.
pub trait SkillRegistry {
    fn skill(&self, id: SkillId) -> Option<&SkillData>;
}

/// Map-backed registry for tests and headless simulations.
#[derive(Debug, Clone, Default)]
pub struct InMemorySkillRegistry {
    skills: HashMap<SkillId, SkillData>,
}

impl InMemorySkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SkillId, data: SkillData) {
        self.skills.insert(id, data);
    }
}

impl SkillRegistry for InMemorySkillRegistry {
    fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.skills.get(&id)
    }
}

/// Lookup that promotes a missing template to a typed error.
pub fn lookup_skill(registry: &dyn SkillRegistry, id: SkillId) -> SkillDataResult<&SkillData> {
    registry.skill(id).ok_or(SkillDataError::SkillNotFound(id))
}
