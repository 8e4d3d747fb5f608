use fxhash::FxHashSet;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::{
    error::SplitError,
    model::{MemberId, Money, ParticipantInput, Split, SplitStrategy},
};

/// Turns (total, strategy, participant inputs) into per-participant owed
/// amounts. Pure and deterministic: identical input always yields identical
/// splits, and the splits always sum to the total exactly in minor units.
pub struct SplitCalculator;

impl SplitCalculator {
    pub fn compute(
        &self,
        total: Money,
        strategy: SplitStrategy,
        participants: &[ParticipantInput],
    ) -> Result<Vec<Split>, SplitError> {
        if participants.is_empty() {
            return Err(SplitError::NoParticipants);
        }
        if total.signum() <= 0 {
            return Err(SplitError::NonPositiveAmount(total));
        }

        let mut seen: FxHashSet<MemberId> = FxHashSet::default();
        for participant in participants {
            if !seen.insert(participant.member) {
                return Err(SplitError::DuplicateParticipant(participant.member));
            }
        }

        let splits = match strategy {
            SplitStrategy::Equal => equal_split(total, participants),
            SplitStrategy::Exact => exact_split(total, participants)?,
            SplitStrategy::Percentage => percentage_split(total, participants)?,
            SplitStrategy::Shares => shares_split(total, participants)?,
        };

        debug_assert_eq!(
            splits.iter().map(|split| split.owed).sum::<Money>(),
            total
        );
        debug_assert!(splits.iter().filter(|split| split.rounding_adjustment).count() <= 1);
        Ok(splits)
    }
}

/// Integer division in minor units; the remainder goes one unit at a time to
/// the first `remainder` participants in input order. The last participant to
/// receive an extra unit carries the rounding flag.
fn equal_split(total: Money, participants: &[ParticipantInput]) -> Vec<Split> {
    let count = participants.len() as i64;
    let base = total.amount() / count;
    let remainder = (total.amount() % count) as usize;

    participants
        .iter()
        .enumerate()
        .map(|(idx, participant)| Split {
            member: participant.member,
            owed: Money::from_i64(base + i64::from(idx < remainder)),
            rounding_adjustment: remainder > 0 && idx + 1 == remainder,
        })
        .collect()
}

/// Amounts taken verbatim; the only computation is checking they reconcile.
/// No rounding adjustment is possible by construction.
fn exact_split(total: Money, participants: &[ParticipantInput]) -> Result<Vec<Split>, SplitError> {
    let mut splits = Vec::with_capacity(participants.len());
    let mut actual = Money::zero();
    for participant in participants {
        let owed = participant
            .amount
            .filter(|amount| amount.signum() > 0)
            .ok_or(SplitError::InvalidParticipantInput {
                member: participant.member,
                strategy: SplitStrategy::Exact,
                field: "amount",
            })?;
        actual += owed;
        splits.push(Split {
            member: participant.member,
            owed,
            rounding_adjustment: false,
        });
    }
    if actual != total {
        return Err(SplitError::SplitSumMismatch {
            expected: total,
            actual,
        });
    }
    Ok(splits)
}

fn percentage_split(
    total: Money,
    participants: &[ParticipantInput],
) -> Result<Vec<Split>, SplitError> {
    let mut splits = Vec::with_capacity(participants.len());
    let mut allocated = Money::zero();
    for participant in participants {
        let invalid = SplitError::InvalidParticipantInput {
            member: participant.member,
            strategy: SplitStrategy::Percentage,
            field: "percentage",
        };
        let percentage = participant
            .percentage
            .filter(|pct| *pct > Decimal::ZERO && *pct <= Decimal::ONE_HUNDRED)
            .ok_or(invalid.clone())?;
        let owed = round_proportion(total, percentage, Decimal::ONE_HUNDRED).ok_or(invalid)?;
        allocated += owed;
        splits.push(Split {
            member: participant.member,
            owed,
            rounding_adjustment: false,
        });
    }
    reconcile_residual(total, allocated, &mut splits);
    Ok(splits)
}

fn shares_split(total: Money, participants: &[ParticipantInput]) -> Result<Vec<Split>, SplitError> {
    let mut counts = Vec::with_capacity(participants.len());
    let mut total_shares = 0_u64;
    for participant in participants {
        let shares = participant.shares.filter(|shares| *shares > 0).ok_or(
            SplitError::InvalidParticipantInput {
                member: participant.member,
                strategy: SplitStrategy::Shares,
                field: "shares",
            },
        )?;
        total_shares += u64::from(shares);
        counts.push((participant.member, shares));
    }

    let mut splits = Vec::with_capacity(participants.len());
    let mut allocated = Money::zero();
    for (member, shares) in counts {
        let owed = round_proportion(total, Decimal::from(shares), Decimal::from(total_shares))
            .ok_or(SplitError::InvalidParticipantInput {
                member,
                strategy: SplitStrategy::Shares,
                field: "shares",
            })?;
        allocated += owed;
        splits.push(Split {
            member,
            owed,
            rounding_adjustment: false,
        });
    }
    reconcile_residual(total, allocated, &mut splits);
    Ok(splits)
}

/// `round-half-up(total * numerator / denominator)` in minor units.
fn round_proportion(total: Money, numerator: Decimal, denominator: Decimal) -> Option<Money> {
    let exact = Decimal::from(total.amount())
        .checked_mul(numerator)?
        .checked_div(denominator)?;
    exact
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Money::from_i64)
}

/// Forces exact reconciliation to the total: the rounding residual is spread
/// one minor unit at a time across participants in input order, the same
/// distribution rule the equal split uses. A negative residual skips
/// participants already at zero, so no share can go below zero. The last
/// adjusted split carries the rounding flag.
fn reconcile_residual(total: Money, allocated: Money, splits: &mut [Split]) {
    let mut residual = (total - allocated).amount();
    if residual == 0 || splits.is_empty() {
        return;
    }
    let step = residual.signum();
    let mut idx = 0;
    let mut flagged = 0;
    // A positive total keeps the running sum above zero, so when the residual
    // is negative there is always a positive share left to decrement.
    while residual != 0 {
        if step > 0 || splits[idx].owed.signum() > 0 {
            splits[idx].owed += Money::from_i64(step);
            residual -= step;
            flagged = idx;
        }
        idx = (idx + 1) % splits.len();
    }
    splits[flagged].rounding_adjustment = true;
}
