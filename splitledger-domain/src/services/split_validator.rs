use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    error::SplitError,
    model::{Money, ParticipantInput, SplitStrategy},
};

/// Tolerance for user-entered percentages: callers round decimals in forms,
/// so the sum check accepts up to 0.01 off 100. The calculator still
/// reconciles the resulting amounts to the minor unit regardless.
const PERCENTAGE_EPSILON: Decimal = dec!(0.01);

/// Consistency checks for user-supplied (not calculator-derived) split data,
/// run before anything is persisted. Exact splits get no tolerance window:
/// both sides are already fixed-point integers.
pub struct SplitValidator;

impl SplitValidator {
    pub fn validate(
        &self,
        strategy: SplitStrategy,
        participants: &[ParticipantInput],
        total: Money,
    ) -> Result<(), SplitError> {
        if participants.is_empty() {
            return Err(SplitError::NoParticipants);
        }

        match strategy {
            SplitStrategy::Equal => Ok(()),
            SplitStrategy::Exact => {
                let actual: Money = participants
                    .iter()
                    .map(|participant| participant.amount.unwrap_or_else(Money::zero))
                    .sum();
                if actual != total {
                    return Err(SplitError::SplitSumMismatch {
                        expected: total,
                        actual,
                    });
                }
                Ok(())
            }
            SplitStrategy::Percentage => {
                for participant in participants {
                    if participant
                        .percentage
                        .is_some_and(|pct| pct > Decimal::ONE_HUNDRED)
                    {
                        return Err(SplitError::InvalidParticipantInput {
                            member: participant.member,
                            strategy: SplitStrategy::Percentage,
                            field: "percentage",
                        });
                    }
                }
                let actual: Decimal = participants
                    .iter()
                    .filter_map(|participant| participant.percentage)
                    .sum();
                if (actual - Decimal::ONE_HUNDRED).abs() > PERCENTAGE_EPSILON {
                    return Err(SplitError::PercentageSumMismatch { actual });
                }
                Ok(())
            }
            SplitStrategy::Shares => {
                if participants
                    .iter()
                    .any(|participant| participant.shares.is_none_or(|shares| shares == 0))
                {
                    return Err(SplitError::InvalidShares);
                }
                Ok(())
            }
        }
    }
}
