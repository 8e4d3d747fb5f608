use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::{MemberId, Money, SplitStrategy};

/// Input errors: the caller's fault, recoverable by correcting the input.
/// The API layer above the engine translates these into user-facing
/// validation messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("at least one participant is required")]
    NoParticipants,
    #[error("expense total must be positive (got {0} minor units)")]
    NonPositiveAmount(Money),
    #[error("participant {member} has no valid {field} for a {strategy} split")]
    InvalidParticipantInput {
        member: MemberId,
        strategy: SplitStrategy,
        field: &'static str,
    },
    #[error("participant {0} appears more than once")]
    DuplicateParticipant(MemberId),
    #[error("split amounts sum to {actual} minor units, expected {expected}")]
    SplitSumMismatch { expected: Money, actual: Money },
    #[error("percentages sum to {actual}, expected 100")]
    PercentageSumMismatch { actual: Decimal },
    #[error("every share count must be greater than zero")]
    InvalidShares,
}

/// Internal invariant errors: money was created or destroyed somewhere
/// upstream. Never recoverable by the caller and never silently corrected;
/// the aggregation and settlement layers log these loudly before returning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("member balances do not sum to zero (residual {0} minor units)")]
    ConservationViolation(Money),
    #[error("settlement input is unbalanced (residual {0} minor units)")]
    UnbalancedInput(Money),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("`{0}` is not a decimal amount")]
    InvalidDecimal(String),
    #[error("amount has more than {scale} decimal places")]
    SubMinorUnit { scale: u32 },
    #[error("amount does not fit in minor units")]
    OutOfRange,
    #[error("currency scale {scale} exceeds the supported maximum of {max_supported}")]
    UnsupportedScale { scale: u32, max_supported: u32 },
}
