//! XP currency ledger

use serde::{Deserialize, Serialize};

use mindbuddy_core::EconomyError;

/// A single non-negative XP balance.
///
/// Non-negativity holds by construction: the balance is unsigned and
/// every debit is checked before it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XpLedger(u32);

impl XpLedger {
    pub fn new(balance: u32) -> Self {
        Self(balance)
    }

    pub fn balance(&self) -> u32 {
        self.0
    }

    /// Credit XP to the balance
    pub fn credit(&mut self, amount: u32) {
        self.0 = self.0.saturating_add(amount);
    }

    /// Debit XP, rejecting the whole operation if the balance is short
    pub fn debit(&mut self, price: u32) -> Result<(), EconomyError> {
        if self.0 < price {
            return Err(EconomyError::InsufficientFunds {
                balance: self.0,
                price,
            });
        }
        self.0 -= price;
        Ok(())
    }
}
