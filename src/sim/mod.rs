//! Deterministic simulation module
//!
//! All duel logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, owned by the match
//! - Fixed update order within a step
//! - No rendering or platform dependencies

pub mod arena;
pub mod body;
pub mod collision;
pub mod fighter;
pub mod state;
pub mod tick;

pub use arena::{Arena, WallBounce};
pub use body::{Body, BodySpec, Health};
pub use collision::{
    CollisionGeometry, CollisionTuning, Contact, DamageModel, HitTarget, classify_hit,
    resolve_pair,
};
pub use fighter::{CombatRole, Fighter, Side};
pub use state::{FighterSnapshot, MatchPhase, MatchSnapshot, MatchState, MatchStats, Outcome};
pub use tick::{MatchInput, apply_input, step};
