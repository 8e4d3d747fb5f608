use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use splitledger_domain::{
    Currency, Expense, ExpenseId, GroupId, MemberBalances, MemberId, Money, MoneyParseError,
    ParticipantInput, Settlement, SplitCalculator, SplitStrategy, SplitValidator, Transfer,
};

use crate::error::DraftError;

/// One participant's row in an expense-entry form. Amounts and percentages
/// arrive as decimal strings and are converted to fixed point exactly once,
/// here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantDraft {
    pub member: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u32>,
}

impl ParticipantDraft {
    fn to_input(&self, scale: u32) -> Result<ParticipantInput, DraftError> {
        let amount = self
            .amount
            .as_deref()
            .map(|raw| Money::parse_decimal_str(raw, scale))
            .transpose()?;
        let percentage = self
            .percentage
            .as_deref()
            .map(|raw| {
                Decimal::from_str(raw.trim())
                    .map_err(|_| MoneyParseError::InvalidDecimal(raw.to_owned()))
            })
            .transpose()?;

        Ok(ParticipantInput {
            member: MemberId(self.member),
            amount,
            percentage,
            shares: self.shares,
        })
    }
}

/// A user-entered shared expense as it crosses the API boundary.
///
/// Editing an expense means submitting a fresh draft: `into_expense` derives
/// the full split list in one step, so the persistence layer can swap the
/// replacement in atomically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub group: u64,
    pub payer: u64,
    pub total: String,
    pub currency: String,
    pub date: DateTime<Utc>,
    pub strategy: String,
    pub participants: Vec<ParticipantDraft>,
}

impl ExpenseDraft {
    /// Validates the user-supplied split and computes the authoritative
    /// per-participant amounts. Rejects inconsistent input before anything
    /// reaches storage.
    pub fn into_expense(self, id: ExpenseId) -> Result<Expense, DraftError> {
        let strategy = SplitStrategy::parse(&self.strategy)
            .ok_or_else(|| DraftError::UnknownStrategy(self.strategy.clone()))?;
        let currency = Currency::from_code(&self.currency)
            .ok_or_else(|| DraftError::UnknownCurrency(self.currency.clone()))?;
        let total = Money::parse_decimal_str(&self.total, currency.scale())?;

        let participants: Vec<ParticipantInput> = self
            .participants
            .iter()
            .map(|draft| draft.to_input(currency.scale()))
            .collect::<Result<_, _>>()?;

        SplitValidator.validate(strategy, &participants, total)?;
        let splits = SplitCalculator.compute(total, strategy, &participants)?;

        Ok(Expense {
            id,
            group: GroupId(self.group),
            payer: MemberId(self.payer),
            total,
            currency,
            date: self.date,
            strategy,
            splits,
        })
    }
}

/// A consistent view of one group's history in one currency, as handed over
/// by the persistence collaborator. Snapshot consistency (transaction or
/// read-lock) is that collaborator's responsibility.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LedgerSnapshot {
    pub members: Vec<MemberId>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

/// What the settle-up UI presents: current net balances and the proposed
/// transfers that would zero them.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementPlan {
    pub balances: MemberBalances,
    pub transfers: Vec<Transfer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitledger_domain::SplitError;

    fn draft(strategy: &str, participants: Vec<ParticipantDraft>) -> ExpenseDraft {
        ExpenseDraft {
            group: 1,
            payer: 1,
            total: "100.00".to_owned(),
            currency: "INR".to_owned(),
            date: Utc::now(),
            strategy: strategy.to_owned(),
            participants,
        }
    }

    fn bare(member: u64) -> ParticipantDraft {
        ParticipantDraft {
            member,
            amount: None,
            percentage: None,
            shares: None,
        }
    }

    #[test]
    fn equal_draft_becomes_expense_with_reconciled_splits() {
        let expense = draft("equal", vec![bare(1), bare(2), bare(3)])
            .into_expense(ExpenseId(1))
            .expect("draft should convert");

        assert_eq!(expense.total, Money::from_i64(10_000));
        let allocated: Money = expense.splits.iter().map(|split| split.owed).sum();
        assert_eq!(allocated, expense.total);
        // 10000 / 3 leaves a one-unit remainder on the first participant.
        assert_eq!(expense.splits[0].owed, Money::from_i64(3_334));
    }

    #[test]
    fn exact_draft_is_validated_before_calculation() {
        let mut first = bare(1);
        first.amount = Some("40.00".to_owned());
        let mut second = bare(2);
        second.amount = Some("40.00".to_owned());

        let err = draft("exact", vec![first, second])
            .into_expense(ExpenseId(1))
            .expect_err("mismatched exact split must be rejected");

        assert!(matches!(
            err,
            DraftError::Split(SplitError::SplitSumMismatch {
                expected,
                actual,
            }) if expected == Money::from_i64(10_000) && actual == Money::from_i64(8_000)
        ));
    }

    #[test]
    fn percentage_strings_are_parsed_exactly() {
        let mut first = bare(1);
        first.percentage = Some("60".to_owned());
        let mut second = bare(2);
        second.percentage = Some("40".to_owned());

        let expense = draft("percentage", vec![first, second])
            .into_expense(ExpenseId(1))
            .expect("draft should convert");
        assert_eq!(expense.splits[0].owed, Money::from_i64(6_000));
        assert_eq!(expense.splits[1].owed, Money::from_i64(4_000));
    }

    #[test]
    fn unknown_strategy_and_currency_are_rejected() {
        let err = draft("weighted", vec![bare(1)])
            .into_expense(ExpenseId(1))
            .expect_err("unknown strategy must be rejected");
        assert!(matches!(err, DraftError::UnknownStrategy(name) if name == "weighted"));

        let mut bad_currency = draft("equal", vec![bare(1)]);
        bad_currency.currency = "XAU".to_owned();
        let err = bad_currency
            .into_expense(ExpenseId(1))
            .expect_err("unknown currency must be rejected");
        assert!(matches!(err, DraftError::UnknownCurrency(code) if code == "XAU"));
    }

    #[test]
    fn sub_minor_unit_amounts_are_rejected_at_the_boundary() {
        let mut only = bare(1);
        only.amount = Some("100.005".to_owned());
        let mut draft = draft("exact", vec![only]);
        draft.total = "100.005".to_owned();

        let err = draft
            .into_expense(ExpenseId(1))
            .expect_err("sub-minor-unit amount must be rejected");
        assert!(matches!(
            err,
            DraftError::Amount(MoneyParseError::SubMinorUnit { scale: 2 })
        ));
    }
}
