use splitledger_domain::{GroupId, Settlement};

use crate::error::LedgerError;
use crate::model::LedgerSnapshot;

/// Read side of persistence. Implementations must return an internally
/// consistent snapshot, typically by reading inside one transaction.
pub trait LedgerSource: Send + Sync {
    fn snapshot(&self, group: GroupId) -> Result<LedgerSnapshot, LedgerError>;
}

/// Write side of persistence for confirmed settlements. Recording must be
/// atomic so a later snapshot either contains the settlement or does not.
pub trait SettlementRecorder: Send + Sync {
    fn record(&self, group: GroupId, settlement: Settlement) -> Result<(), LedgerError>;
}
