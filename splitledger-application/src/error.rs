use splitledger_domain::{BalanceError, GroupId, MemberId, Money, MoneyParseError, SplitError};
use thiserror::Error;

/// Failures reported by the persistence collaborator behind the ports.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Failures turning a user-entered expense draft into a domain expense.
/// All of these are input errors the API layer maps to validation messages.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("unknown split strategy `{0}`")]
    UnknownStrategy(String),
    #[error("unknown currency `{0}`")]
    UnknownCurrency(String),
    #[error(transparent)]
    Amount(#[from] MoneyParseError),
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// Failures in the settle-up flow. `Balance` wraps the engine's internal
/// invariant errors; callers should treat those as fatal and surface a
/// generic failure while the logs carry the detail.
#[derive(Debug, Error)]
pub enum SettleUpError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("a settlement transfer must be positive (got {0} minor units)")]
    NonPositiveTransfer(Money),
    #[error("member {0} cannot settle up with themselves")]
    SelfTransfer(MemberId),
}
