//! Commission plan: what each completed pyramid level pays.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::entities::Commission;
use crate::domain::levels::LevelResult;
use crate::domain::money::Money;

/// One row of a commission breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionLine {
    pub level: u32,
    pub amount: Money,
    pub complete: bool,
}

/// Commission amounts keyed by pyramid level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommissionPlan {
    amounts: BTreeMap<u32, Money>,
}

impl CommissionPlan {
    /// Build a plan from backend rows. A repeated level keeps the last amount.
    pub fn new(rows: impl IntoIterator<Item = Commission>) -> Self {
        let mut amounts = BTreeMap::new();
        for row in rows {
            if let Some(previous) = amounts.insert(row.level, row.amount) {
                warn!(
                    level = row.level,
                    %previous,
                    current = %row.amount,
                    "duplicate commission level, keeping last"
                );
            }
        }
        Self { amounts }
    }

    pub fn amount_for(&self, level: u32) -> Option<Money> {
        self.amounts.get(&level).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Total paid for the completed levels of `result`.
    pub fn earned(&self, result: &LevelResult) -> Money {
        self.amounts
            .iter()
            .filter(|(level, _)| result.is_complete(**level))
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// Every level of the plan, in order, flagged with its completion.
    pub fn breakdown(&self, result: &LevelResult) -> Vec<CommissionLine> {
        self.amounts
            .iter()
            .map(|(&level, &amount)| CommissionLine {
                level,
                amount,
                complete: result.is_complete(level),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> CommissionPlan {
        CommissionPlan::new(vec![
            Commission {
                level: 2,
                amount: Money::from_cents(9000),
            },
            Commission {
                level: 1,
                amount: Money::from_cents(3000),
            },
            Commission {
                level: 3,
                amount: Money::from_cents(27000),
            },
        ])
    }

    fn completed(levels: u32) -> LevelResult {
        LevelResult {
            completed_levels: levels,
            levels: Vec::new(),
        }
    }

    #[test]
    fn given_two_completed_levels_when_computing_earned_then_sums_first_two() {
        assert_eq!(plan().earned(&completed(2)), Money::from_cents(12000));
    }

    #[test]
    fn given_no_completed_levels_when_computing_earned_then_zero() {
        assert!(plan().earned(&completed(0)).is_zero());
    }

    #[test]
    fn given_plan_when_breaking_down_then_sorted_by_level_with_flags() {
        let lines = plan().breakdown(&completed(1));

        let summary: Vec<_> = lines.iter().map(|l| (l.level, l.complete)).collect();
        assert_eq!(summary, vec![(1, true), (2, false), (3, false)]);
    }

    #[test]
    fn given_duplicate_level_when_building_plan_then_last_wins() {
        let plan = CommissionPlan::new(vec![
            Commission {
                level: 1,
                amount: Money::from_cents(100),
            },
            Commission {
                level: 1,
                amount: Money::from_cents(250),
            },
        ]);

        assert_eq!(plan.amount_for(1), Some(Money::from_cents(250)));
        assert_eq!(plan.amount_for(2), None);
    }
}
