use chrono::Utc;
use splitledger_domain::{BalanceAggregator, DebtSimplifier, GroupId, Settlement, Transfer};

use crate::error::SettleUpError;
use crate::model::SettlementPlan;
use crate::ports::{LedgerSource, SettlementRecorder};

/// Settle-up use case: propose a minimal transfer plan for a group and
/// record the transfers members actually confirm.
///
/// The plan is advisory. Members may pay any amount they like; `confirm`
/// only insists the transfer is positive and between distinct members,
/// everything else is re-derived from the ledger on the next `plan` call.
pub struct SettleUpService<L, R> {
    ledger: L,
    recorder: R,
}

impl<L, R> SettleUpService<L, R>
where
    L: LedgerSource,
    R: SettlementRecorder,
{
    pub fn new(ledger: L, recorder: R) -> Self {
        Self { ledger, recorder }
    }

    /// Computes current net balances and a transfer plan that would zero
    /// them. A group where everyone is even yields an empty plan.
    pub fn plan(&self, group: GroupId) -> Result<SettlementPlan, SettleUpError> {
        let snapshot = self.ledger.snapshot(group)?;
        let balances = BalanceAggregator.aggregate(
            &snapshot.expenses,
            &snapshot.settlements,
            &snapshot.members,
        )?;
        let transfers = DebtSimplifier.simplify(&balances)?;

        tracing::debug!(
            %group,
            member_count = balances.len(),
            transfer_count = transfers.len(),
            "settlement plan computed"
        );

        Ok(SettlementPlan {
            balances,
            transfers,
        })
    }

    /// Records one confirmed repayment against the ledger.
    pub fn confirm(
        &self,
        group: GroupId,
        transfer: Transfer,
        notes: Option<String>,
    ) -> Result<(), SettleUpError> {
        if transfer.from == transfer.to {
            return Err(SettleUpError::SelfTransfer(transfer.from));
        }
        if transfer.amount.signum() <= 0 {
            return Err(SettleUpError::NonPositiveTransfer(transfer.amount));
        }

        let settlement = Settlement {
            from: transfer.from,
            to: transfer.to,
            amount: transfer.amount,
            settled_at: Utc::now(),
            notes,
        };
        self.recorder.record(group, settlement)?;

        tracing::info!(
            %group,
            from = %transfer.from,
            to = %transfer.to,
            amount = %transfer.amount,
            "settlement recorded"
        );
        Ok(())
    }
}
