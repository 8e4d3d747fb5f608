#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod settle_up;

pub use error::{DraftError, LedgerError, SettleUpError};
pub use model::{ExpenseDraft, LedgerSnapshot, ParticipantDraft, SettlementPlan};
pub use ports::{LedgerSource, SettlementRecorder};
pub use settle_up::SettleUpService;
