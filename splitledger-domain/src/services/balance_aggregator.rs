use crate::{
    error::BalanceError,
    model::{Expense, ExpensePosition, MemberBalances, MemberId, Money, Settlement},
};

/// Folds a group's expense and settlement history into one net balance per
/// member. Positive = the group owes the member, negative = the member owes
/// the group. Derived on demand, never stored, and pure over its inputs.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Every listed group member starts at zero; IDs appearing in the history
    /// but not in `members` are inserted at zero on first touch. The payer of
    /// an expense is credited the total and debited their own split, so a
    /// payer-participant nets the difference naturally.
    ///
    /// Returns `ConservationViolation` if the resulting balances do not sum
    /// to zero. That means money was created or destroyed upstream (a split
    /// integrity bug), so it is surfaced loudly instead of being corrected.
    pub fn aggregate(
        &self,
        expenses: &[Expense],
        settlements: &[Settlement],
        members: &[MemberId],
    ) -> Result<MemberBalances, BalanceError> {
        let mut balances: MemberBalances = members
            .iter()
            .copied()
            .map(|member| (member, Money::zero()))
            .collect();

        for expense in expenses {
            *balances.entry(expense.payer).or_insert_with(Money::zero) += expense.total;
            for split in &expense.splits {
                *balances.entry(split.member).or_insert_with(Money::zero) -= split.owed;
            }
        }

        for settlement in settlements {
            let outstanding = balances
                .get(&settlement.from)
                .copied()
                .unwrap_or_else(Money::zero);
            // A payment larger than the debtor's outstanding debt is legal
            // (partial and advance payments exist); it is the caller's policy
            // question, so it only gets a warning here.
            if (outstanding + settlement.amount).signum() > 0 {
                tracing::warn!(
                    from = settlement.from.0,
                    to = settlement.to.0,
                    amount = settlement.amount.amount(),
                    outstanding = outstanding.amount(),
                    "Recorded settlement exceeds the debtor's outstanding balance"
                );
            }
            *balances.entry(settlement.from).or_insert_with(Money::zero) += settlement.amount;
            *balances.entry(settlement.to).or_insert_with(Money::zero) -= settlement.amount;
        }

        let residual: Money = balances.values().copied().sum();
        if !residual.is_zero() {
            tracing::error!(
                residual = residual.amount(),
                expense_count = expenses.len(),
                settlement_count = settlements.len(),
                member_count = balances.len(),
                "Aggregated balances violate the zero-sum conservation invariant"
            );
            return Err(BalanceError::ConservationViolation(residual));
        }

        Ok(balances)
    }

    /// What a single expense did to one member: how much they paid, their
    /// split share, and the lent/borrowed difference. One audited place for
    /// the view layer to ask, instead of re-deriving it per call site.
    pub fn expense_position(&self, expense: &Expense, member: MemberId) -> ExpensePosition {
        let paid = if expense.payer == member {
            expense.total
        } else {
            Money::zero()
        };
        let share = expense
            .splits
            .iter()
            .find(|split| split.member == member)
            .map(|split| split.owed)
            .unwrap_or_else(Money::zero);

        ExpensePosition {
            paid,
            share,
            lent: Money::from_i64((paid.amount() - share.amount()).max(0)),
            borrowed: Money::from_i64((share.amount() - paid.amount()).max(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Currency, ExpenseId, GroupId, Split, SplitStrategy};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn aggregator() -> BalanceAggregator {
        BalanceAggregator
    }

    fn expense(id: u64, payer: u64, total: i64, shares: &[(u64, i64)]) -> Expense {
        Expense {
            id: ExpenseId(id),
            group: GroupId(1),
            payer: MemberId(payer),
            total: Money::from_i64(total),
            currency: Currency::inr(),
            date: Utc::now(),
            strategy: SplitStrategy::Exact,
            splits: shares
                .iter()
                .map(|(member, owed)| Split {
                    member: MemberId(*member),
                    owed: Money::from_i64(*owed),
                    rounding_adjustment: false,
                })
                .collect(),
        }
    }

    fn settlement(from: u64, to: u64, amount: i64) -> Settlement {
        Settlement {
            from: MemberId(from),
            to: MemberId(to),
            amount: Money::from_i64(amount),
            settled_at: Utc::now(),
            notes: None,
        }
    }

    #[rstest]
    fn payer_is_credited_and_participants_debited(aggregator: BalanceAggregator) {
        let expenses = [expense(1, 1, 9_000, &[(1, 3_000), (2, 3_000), (3, 3_000)])];
        let members = [MemberId(1), MemberId(2), MemberId(3)];

        let balances = aggregator
            .aggregate(&expenses, &[], &members)
            .expect("aggregation should succeed");

        assert_eq!(balances[&MemberId(1)], Money::from_i64(6_000));
        assert_eq!(balances[&MemberId(2)], Money::from_i64(-3_000));
        assert_eq!(balances[&MemberId(3)], Money::from_i64(-3_000));
    }

    #[rstest]
    fn settlements_pull_both_parties_toward_zero(aggregator: BalanceAggregator) {
        let expenses = [expense(1, 1, 9_000, &[(1, 3_000), (2, 3_000), (3, 3_000)])];
        let settlements = [settlement(2, 1, 3_000)];
        let members = [MemberId(1), MemberId(2), MemberId(3)];

        let balances = aggregator
            .aggregate(&expenses, &settlements, &members)
            .expect("aggregation should succeed");

        assert_eq!(balances[&MemberId(1)], Money::from_i64(3_000));
        assert_eq!(balances[&MemberId(2)], Money::zero());
        assert_eq!(balances[&MemberId(3)], Money::from_i64(-3_000));
    }

    #[rstest]
    fn overpayment_is_kept_not_clamped(aggregator: BalanceAggregator) {
        let expenses = [expense(1, 1, 1_000, &[(1, 500), (2, 500)])];
        // Member 2 owes 500 but pays 800: an advance of 300.
        let settlements = [settlement(2, 1, 800)];
        let members = [MemberId(1), MemberId(2)];

        let balances = aggregator
            .aggregate(&expenses, &settlements, &members)
            .expect("aggregation should succeed");

        assert_eq!(balances[&MemberId(1)], Money::from_i64(-300));
        assert_eq!(balances[&MemberId(2)], Money::from_i64(300));
    }

    #[rstest]
    fn members_without_history_stay_at_zero(aggregator: BalanceAggregator) {
        let expenses = [expense(1, 1, 600, &[(1, 300), (2, 300)])];
        let members = [MemberId(1), MemberId(2), MemberId(9)];

        let balances = aggregator
            .aggregate(&expenses, &[], &members)
            .expect("aggregation should succeed");

        assert_eq!(balances[&MemberId(9)], Money::zero());
        assert_eq!(balances.len(), 3);
    }

    #[rstest]
    fn corrupt_splits_fail_the_conservation_check(aggregator: BalanceAggregator) {
        // Splits sum to 900 against a 1000 total: 100 minor units vanished.
        let expenses = [expense(1, 1, 1_000, &[(1, 450), (2, 450)])];
        let members = [MemberId(1), MemberId(2)];

        assert_eq!(
            aggregator.aggregate(&expenses, &[], &members),
            Err(BalanceError::ConservationViolation(Money::from_i64(100)))
        );
    }

    #[rstest]
    fn aggregation_is_idempotent(aggregator: BalanceAggregator) {
        let expenses = [
            expense(1, 1, 9_000, &[(1, 3_000), (2, 3_000), (3, 3_000)]),
            expense(2, 2, 1_200, &[(2, 600), (3, 600)]),
        ];
        let settlements = [settlement(3, 1, 1_000)];
        let members = [MemberId(1), MemberId(2), MemberId(3)];

        let first = aggregator
            .aggregate(&expenses, &settlements, &members)
            .expect("aggregation should succeed");
        let second = aggregator
            .aggregate(&expenses, &settlements, &members)
            .expect("aggregation should succeed");
        assert_eq!(first, second);
    }

    #[rstest]
    fn expense_position_reports_lent_and_borrowed(aggregator: BalanceAggregator) {
        let paid_by_one = expense(1, 1, 9_000, &[(1, 3_000), (2, 3_000), (3, 3_000)]);

        let payer = aggregator.expense_position(&paid_by_one, MemberId(1));
        assert_eq!(payer.paid, Money::from_i64(9_000));
        assert_eq!(payer.share, Money::from_i64(3_000));
        assert_eq!(payer.lent, Money::from_i64(6_000));
        assert_eq!(payer.borrowed, Money::zero());

        let participant = aggregator.expense_position(&paid_by_one, MemberId(2));
        assert_eq!(participant.paid, Money::zero());
        assert_eq!(participant.borrowed, Money::from_i64(3_000));

        let bystander = aggregator.expense_position(&paid_by_one, MemberId(9));
        assert_eq!(bystander, ExpensePosition::default());
    }
}
