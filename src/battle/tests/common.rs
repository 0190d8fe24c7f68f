//! Shared fixtures: a small roster of character sheets, a handful of skill
//! templates, and battle builders. Every test starts from these so the
//! derived numbers (attack 20 vs defense 4, and so on) stay consistent
//! across files.

use crate::battle::engine::{BattleEngine, EngineConfig};
use crate::battle::state::{Battle, EventBus, TurnRng};
use crate::grid::MapGrid;
use crate::skills::InMemorySkillRegistry;
use crate::stats::{FixedStatProvider, StatProvider};
use crate::unit::UnitId;
use schema::{
    BaseStats, CharacterId, EffectDuration, EffectKind, SkillData, SkillId, SkillKind,
    TargetPolicy, Team,
};

pub const FIGHTER: CharacterId = CharacterId(1);
pub const MAGE: CharacterId = CharacterId(2);
pub const BRUISER: CharacterId = CharacterId(3);
pub const TANK: CharacterId = CharacterId(4);

pub const STRIKE: SkillId = SkillId(1);
pub const FIREBALL: SkillId = SkillId(2);
pub const MEND: SkillId = SkillId(3);
pub const POISON_DART: SkillId = SkillId(4);

/// Owns the collaborators a [`BattleEngine`] borrows. Battles are built
/// separately so the engine's shared borrow never fights the battle's
/// exclusive one.
pub struct TestWorld {
    pub grid: MapGrid,
    pub provider: FixedStatProvider,
    pub registry: InMemorySkillRegistry,
}

pub struct Duel {
    pub battle: Battle,
    pub fighter: UnitId,
    pub bruiser: UnitId,
}

pub struct Skirmish {
    pub battle: Battle,
    pub fighter: UnitId,
    pub mage: UnitId,
    pub bruiser: UnitId,
    pub tank: UnitId,
}

impl TestWorld {
    pub fn new() -> Self {
        let mut provider = FixedStatProvider::new();
        // Fighter: attack 20, defense 4, speed 8, crit 6%
        provider.insert(
            FIGHTER,
            BaseStats {
                strength: 10,
                intelligence: 4,
                constitution: 4,
                agility: 8,
                luck: 5,
                max_hp: 40,
                max_mp: 20,
                movement: 4,
                attack_range: 1,
            },
        );
        // Mage: magical attack 24, speed 6, crit 7%
        provider.insert(
            MAGE,
            BaseStats {
                strength: 3,
                intelligence: 12,
                constitution: 3,
                agility: 6,
                luck: 10,
                max_hp: 30,
                max_mp: 40,
                movement: 3,
                attack_range: 1,
            },
        );
        // Bruiser: defense 4, speed 5, magical defense 1
        provider.insert(
            BRUISER,
            BaseStats {
                strength: 7,
                intelligence: 2,
                constitution: 4,
                agility: 5,
                luck: 0,
                max_hp: 36,
                max_mp: 10,
                movement: 3,
                attack_range: 1,
            },
        );
        // Tank: defense 30, speed 2
        provider.insert(
            TANK,
            BaseStats {
                strength: 5,
                intelligence: 2,
                constitution: 30,
                agility: 2,
                luck: 0,
                max_hp: 60,
                max_mp: 0,
                movement: 2,
                attack_range: 1,
            },
        );

        let mut registry = InMemorySkillRegistry::new();
        registry.insert(
            STRIKE,
            SkillData {
                name: "Strike".to_string(),
                kind: SkillKind::PhysicalDamage,
                target_policy: TargetPolicy::Enemies,
                range: 3,
                area: 0,
                mp_cost: 5,
                cooldown: 0,
                base_power: 10,
            },
        );
        registry.insert(
            FIREBALL,
            SkillData {
                name: "Fireball".to_string(),
                kind: SkillKind::MagicalDamage,
                target_policy: TargetPolicy::Enemies,
                range: 5,
                area: 1,
                mp_cost: 8,
                cooldown: 2,
                base_power: 12,
            },
        );
        registry.insert(
            MEND,
            SkillData {
                name: "Mend".to_string(),
                kind: SkillKind::Heal,
                target_policy: TargetPolicy::Allies,
                range: 4,
                area: 0,
                mp_cost: 6,
                cooldown: 0,
                base_power: 10,
            },
        );
        registry.insert(
            POISON_DART,
            SkillData {
                name: "Poison Dart".to_string(),
                kind: SkillKind::ApplyEffect {
                    effect: EffectKind::Poison,
                    duration: EffectDuration::Turns(3),
                    max_stacks: 3,
                },
                target_policy: TargetPolicy::Enemies,
                range: 6,
                area: 0,
                mp_cost: 4,
                cooldown: 0,
                base_power: 2,
            },
        );

        Self {
            grid: MapGrid::new(10, 10),
            provider,
            registry,
        }
    }

    /// Engine with jitter disabled, so turn order is a pure speed sort and
    /// battle start consumes no rolls. Jitter-specific tests opt back in.
    pub fn engine(&self) -> BattleEngine<'_> {
        BattleEngine::with_config(
            &self.grid,
            &self.provider,
            &self.registry,
            EngineConfig {
                turn_order_jitter: 0.0,
            },
        )
    }

    pub fn engine_with_jitter(&self, factor: f32) -> BattleEngine<'_> {
        BattleEngine::with_config(
            &self.grid,
            &self.provider,
            &self.registry,
            EngineConfig {
                turn_order_jitter: factor,
            },
        )
    }

    fn add(&self, battle: &mut Battle, character: CharacterId, team: Team, x: i32, y: i32) -> UnitId {
        let stats = self
            .provider
            .combat_stats(character)
            .expect("fixture character missing");
        battle
            .add_unit(character, team, x, y, &stats)
            .expect("battle already started")
    }

    /// Fighter (0,0) vs bruiser (1,0), adjacent. Fighter acts first.
    pub fn duel(&self) -> Duel {
        let mut battle = Battle::new("duel", "Duel");
        let fighter = self.add(&mut battle, FIGHTER, Team::Player, 0, 0);
        let bruiser = self.add(&mut battle, BRUISER, Team::Enemy, 1, 0);
        Duel {
            battle,
            fighter,
            bruiser,
        }
    }

    /// Fighter (0,0) vs tank (1,0), for minimum-damage cases.
    pub fn duel_against_tank(&self) -> Duel {
        let mut battle = Battle::new("duel-tank", "Duel");
        let fighter = self.add(&mut battle, FIGHTER, Team::Player, 0, 0);
        let bruiser = self.add(&mut battle, TANK, Team::Enemy, 1, 0);
        Duel {
            battle,
            fighter,
            bruiser,
        }
    }

    /// Fighter at (2,2) with the obligatory opponent far away, for movement
    /// range tests that need open terrain around the mover.
    pub fn lone_fighter(&self) -> Duel {
        let mut battle = Battle::new("open-field", "Open Field");
        let fighter = self.add(&mut battle, FIGHTER, Team::Player, 2, 2);
        let bruiser = self.add(&mut battle, BRUISER, Team::Enemy, 9, 9);
        Duel {
            battle,
            fighter,
            bruiser,
        }
    }

    /// Mirror match: the same character on both sides, equal speed. Jitter
    /// tie-break tests live on this.
    pub fn mirror_duel(&self) -> Duel {
        let mut battle = Battle::new("mirror", "Mirror");
        let fighter = self.add(&mut battle, FIGHTER, Team::Player, 0, 0);
        let bruiser = self.add(&mut battle, FIGHTER, Team::Enemy, 3, 0);
        Duel {
            battle,
            fighter,
            bruiser,
        }
    }

    /// 2v2: fighter (0,0) + mage (0,1) vs bruiser (4,0) + tank (4,1).
    /// Speed order: fighter 8, mage 6, bruiser 5, tank 2.
    pub fn skirmish(&self) -> Skirmish {
        let mut battle = Battle::new("skirmish", "Skirmish");
        let fighter = self.add(&mut battle, FIGHTER, Team::Player, 0, 0);
        let mage = self.add(&mut battle, MAGE, Team::Player, 0, 1);
        let bruiser = self.add(&mut battle, BRUISER, Team::Enemy, 4, 0);
        let tank = self.add(&mut battle, TANK, Team::Enemy, 4, 1);
        Skirmish {
            battle,
            fighter,
            mage,
            bruiser,
            tank,
        }
    }
}

/// Rolls that never crit against any fixture character.
pub fn mid_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 32])
}

/// An RNG that panics on first use. Handing this to a code path asserts
/// that the path draws no rolls.
pub fn silent_rng() -> TurnRng {
    TurnRng::new_for_test(Vec::new())
}

/// Starts the battle and asserts it came up. Returns the bus with the
/// start events still in it.
pub fn start(world: &TestWorld, battle: &mut Battle) -> EventBus {
    let mut bus = EventBus::new();
    let mut rng = silent_rng();
    let outcome = world.engine().start_battle(battle, &mut rng, &mut bus);
    assert!(outcome.success, "battle failed to start: {:?}", outcome);
    bus
}

pub fn hp(battle: &Battle, unit: UnitId) -> i32 {
    battle.unit(unit).map(|u| u.current_hp).unwrap_or(-1)
}
