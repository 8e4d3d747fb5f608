pub mod balance_aggregator;
pub mod debt_simplifier;
pub mod split_calculator;
pub mod split_validator;

pub use balance_aggregator::BalanceAggregator;
pub use debt_simplifier::{apply_transfers, DebtSimplifier};
pub use split_calculator::SplitCalculator;
pub use split_validator::SplitValidator;
