//! Pyramid level evaluation.
//!
//! Level `n` below a member holds `3^n` recruits. Levels are filled top-down
//! in backend order; a level that falls short may pull recruits up from the
//! pool of the level right below it. Counting stops at the first level that
//! cannot be filled, so the result is always an unbroken run starting at 1.

use std::collections::{HashSet, VecDeque};

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{MemberData, RecruitArena};
use crate::domain::entities::RecruitNode;

/// Depth of the commission plan.
pub const DEFAULT_MAX_LEVEL: u32 = 12;

/// Members required to complete `level` (`3^level`), saturating at `usize::MAX`.
pub fn capacity(level: u32) -> usize {
    3usize.checked_pow(level).unwrap_or(usize::MAX)
}

/// Accounting for one evaluated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelReport {
    pub level: u32,
    /// Capacity of the level
    pub expected: usize,
    /// Members in the pool before borrowing
    pub natural: usize,
    /// Members pulled up from the next level's pool
    pub borrowed: usize,
    /// Members counted toward the level (`natural + borrowed`)
    pub assigned: usize,
    pub complete: bool,
}

impl LevelReport {
    /// Members still needed, zero once complete.
    pub fn missing(&self) -> usize {
        self.expected.saturating_sub(self.assigned)
    }
}

/// Outcome of an evaluation.
///
/// `levels` holds every completed level plus, when evaluation stopped early,
/// the first incomplete one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelResult {
    pub completed_levels: u32,
    pub levels: Vec<LevelReport>,
}

impl LevelResult {
    pub fn is_complete(&self, level: u32) -> bool {
        level >= 1 && level <= self.completed_levels
    }

    /// The level currently being worked on, if evaluation stopped short.
    pub fn next_level(&self) -> Option<&LevelReport> {
        self.levels.iter().find(|report| !report.complete)
    }
}

/// Number of consecutive completed levels under a member.
///
/// `root_children` are the member's direct recruits; the member is not counted.
pub fn compute_completed_levels(root_children: &[RecruitNode], max_level: u32) -> u32 {
    evaluate_levels(root_children, max_level).completed_levels
}

/// Same as [`compute_completed_levels`], with per-level accounting.
pub fn evaluate_levels(root_children: &[RecruitNode], max_level: u32) -> LevelResult {
    let arena = RecruitArena::from_root_children(MemberData::new("", ""), root_children);
    evaluate_arena(&arena, max_level)
}

/// Evaluate levels over an already-built arena.
///
/// A member counts toward exactly one level: recruits borrowed into level `n`
/// are removed from level `n + 1`, whose pool is the flattened children of
/// level `n`'s (augmented) pool.
#[instrument(level = "debug", skip(arena), fields(members = arena.len()))]
pub fn evaluate_arena(arena: &RecruitArena, max_level: u32) -> LevelResult {
    let mut result = LevelResult::default();
    let mut assigned: HashSet<Index> = HashSet::new();
    let mut pool = arena.root_children();

    for level in 1..=max_level {
        let expected = capacity(level);
        let natural = pool.len();
        let mut borrowed = 0;

        if pool.len() < expected {
            let mut next: VecDeque<Index> = arena.children_of(&pool).into();
            while pool.len() < expected {
                match next.pop_front() {
                    Some(idx) => {
                        pool.push(idx);
                        borrowed += 1;
                    }
                    None => break,
                }
            }
        }

        let report = LevelReport {
            level,
            expected,
            natural,
            borrowed,
            assigned: pool.len(),
            complete: pool.len() >= expected,
        };
        trace!(?report, "level evaluated");
        result.levels.push(report);

        if !report.complete {
            break;
        }
        result.completed_levels += 1;

        assigned.extend(pool.iter().copied());
        pool = arena
            .children_of(&pool)
            .into_iter()
            .filter(|idx| !assigned.contains(idx))
            .collect();
    }

    debug!(completed = result.completed_levels, "pyramid evaluated");
    result
}
