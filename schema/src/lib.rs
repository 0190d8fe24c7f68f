// Tactics Engine Schema - Shared type definitions
// This crate contains the data-side vocabulary of the battle engine: team
// and effect enums, base/derived stat blocks, and skill templates. It holds
// no battle logic, so both the engine and external content tooling can
// depend on it without pulling in the simulation itself.

// Re-export the main types
pub use effect_types::*;
pub use ids::*;
pub use skill_data::*;
pub use stat_data::*;
pub use team::*;

pub mod effect_types;
pub mod ids;
pub mod skill_data;
pub mod stat_data;
pub mod team;
