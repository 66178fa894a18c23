//! TransactionType - Cause of a balance change

use serde::{Deserialize, Serialize};

/// Transaction type recorded on every ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Usage charge for a completed call
    CallCharge,
    /// Manual top-up by an administrator
    AdminCredit,
    /// Manual deduction by an administrator
    AdminDebit,
    Adjustment,
    Deposit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CallCharge => "call_charge",
            TransactionType::AdminCredit => "admin_credit",
            TransactionType::AdminDebit => "admin_debit",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Deposit => "deposit",
        }
    }

    /// Whether entries of this type reduce the balance
    pub fn is_debit(&self) -> bool {
        matches!(self, TransactionType::CallCharge | TransactionType::AdminDebit)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call_charge" => Ok(TransactionType::CallCharge),
            "admin_credit" => Ok(TransactionType::AdminCredit),
            "admin_debit" => Ok(TransactionType::AdminDebit),
            "adjustment" => Ok(TransactionType::Adjustment),
            "deposit" => Ok(TransactionType::Deposit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}
