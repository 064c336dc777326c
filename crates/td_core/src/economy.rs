//! Player budget ledger.
//!
//! A plain integer balance. `spend` and `earn` never refuse: callers that
//! must not overdraw check [`BudgetManager::can_afford`] first.

use serde::{Deserialize, Serialize};

/// The player's money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BudgetManager {
    budget: i32,
}

impl BudgetManager {
    /// Create a ledger holding `initial` money.
    #[must_use]
    pub const fn new(initial: i32) -> Self {
        Self { budget: initial }
    }

    /// Current balance.
    #[must_use]
    pub const fn budget(&self) -> i32 {
        self.budget
    }

    /// Overwrite the balance.
    pub fn set_budget(&mut self, budget: i32) {
        self.budget = budget;
    }

    /// Deduct `amount`. May leave the balance negative.
    ///
    /// Saturates at `i32::MIN` instead of wrapping; inside the `i32` range
    /// this is a plain subtraction.
    pub fn spend(&mut self, amount: i32) {
        self.budget = self.budget.saturating_sub(amount);
    }

    /// Add `amount`. Saturates at `i32::MAX` instead of wrapping.
    pub fn earn(&mut self, amount: i32) {
        self.budget = self.budget.saturating_add(amount);
    }

    /// True iff spending `amount` keeps the balance non-negative.
    #[must_use]
    pub const fn can_afford(&self, amount: i32) -> bool {
        self.budget.saturating_sub(amount) >= 0
    }
}
