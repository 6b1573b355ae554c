//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod commissions;
pub mod entities;
pub mod error;
pub mod levels;
pub mod money;

pub use arena::{MemberData, RecruitArena, TreeNode, TreeRender};
pub use commissions::{CommissionLine, CommissionPlan};
pub use entities::*;
pub use error::DomainError;
pub use levels::{
    capacity, compute_completed_levels, evaluate_arena, evaluate_levels, LevelReport,
    LevelResult, DEFAULT_MAX_LEVEL,
};
pub use money::Money;
