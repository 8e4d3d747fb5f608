#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{BalanceError, MoneyParseError, SplitError};
pub use model::{
    Currency, Expense, ExpenseId, ExpensePosition, GroupId, MemberBalances, MemberId, Money,
    ParticipantInput, Settlement, Split, SplitStrategy, Transfer,
};
pub use services::{
    apply_transfers, BalanceAggregator, DebtSimplifier, SplitCalculator, SplitValidator,
};
