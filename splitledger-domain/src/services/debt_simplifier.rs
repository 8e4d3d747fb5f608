use crate::{
    error::BalanceError,
    model::{MemberBalances, MemberId, Money, Transfer},
};

/// Turns a zero-sum balance table into a short list of pairwise transfers
/// that settles every debt.
///
/// Greedy largest-magnitude matching: repeatedly pair the biggest debtor with
/// the biggest creditor. Deterministic and near-optimal; not guaranteed
/// globally minimal, which is an accepted trade-off for stability and
/// simplicity.
pub struct DebtSimplifier;

impl DebtSimplifier {
    pub fn simplify(&self, balances: &MemberBalances) -> Result<Vec<Transfer>, BalanceError> {
        let residual: Money = balances.values().copied().sum();
        if !residual.is_zero() {
            // Also covers the only-debtors / only-creditors case: a partial
            // plan over unbalanced input would be nonsense, so fail fast.
            tracing::error!(
                residual = residual.amount(),
                member_count = balances.len(),
                "Refusing to build a settlement plan from unbalanced input"
            );
            return Err(BalanceError::UnbalancedInput(residual));
        }

        // Amounts are integer minor units, so "below the settled threshold"
        // is exactly zero; members already at zero never enter the plan.
        let mut debtors: Vec<(MemberId, Money)> = balances
            .iter()
            .filter(|(_, balance)| balance.signum() < 0)
            .map(|(member, balance)| (*member, *balance))
            .collect();
        let mut creditors: Vec<(MemberId, Money)> = balances
            .iter()
            .filter(|(_, balance)| balance.signum() > 0)
            .map(|(member, balance)| (*member, *balance))
            .collect();

        // Most negative / most positive first; member ID breaks exact ties.
        debtors.sort_by(|(id_a, a), (id_b, b)| a.cmp(b).then_with(|| id_a.cmp(id_b)));
        creditors.sort_by(|(id_a, a), (id_b, b)| b.cmp(a).then_with(|| id_a.cmp(id_b)));

        let mut transfers = Vec::with_capacity(debtors.len().max(creditors.len()));
        let mut debtor_idx = 0;
        let mut creditor_idx = 0;
        while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
            let owed = debtors[debtor_idx].1.abs();
            let due = creditors[creditor_idx].1;
            let amount = owed.min(due);

            transfers.push(Transfer {
                from: debtors[debtor_idx].0,
                to: creditors[creditor_idx].0,
                amount,
            });

            debtors[debtor_idx].1 += amount;
            creditors[creditor_idx].1 -= amount;
            if debtors[debtor_idx].1.is_zero() {
                debtor_idx += 1;
            }
            if creditors[creditor_idx].1.is_zero() {
                creditor_idx += 1;
            }
        }

        // Zero-sum input guarantees both sides drain together.
        debug_assert_eq!(debtor_idx, debtors.len());
        debug_assert_eq!(creditor_idx, creditors.len());

        tracing::debug!(
            transfer_count = transfers.len(),
            member_count = balances.len(),
            "Settlement plan constructed"
        );
        Ok(transfers)
    }
}

/// Applies a settlement plan to a balance table: each transfer moves the
/// debtor up and the creditor down by the transferred amount. Applying a
/// complete plan from [`DebtSimplifier::simplify`] zeroes every entry.
pub fn apply_transfers(balances: &MemberBalances, transfers: &[Transfer]) -> MemberBalances {
    let mut settled = balances.clone();
    for transfer in transfers {
        *settled.entry(transfer.from).or_insert_with(Money::zero) += transfer.amount;
        *settled.entry(transfer.to).or_insert_with(Money::zero) -= transfer.amount;
    }
    settled
}
