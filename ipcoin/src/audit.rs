//! Typed Audit Log
//!
//! Every mutating core operation appends exactly one record. Records carry a
//! deterministic blake3 id so external log consumers can deduplicate across
//! replays.

use serde::{Deserialize, Serialize};

use lib_compliance::FlagKind;
use lib_types::{Address, Amount, RoundId, Timestamp};

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    ContractPaused,
    ContractUnpaused,
    WhitelistModeSet {
        enabled: bool,
    },
    FlagSet {
        address: Address,
        kind: FlagKind,
        value: bool,
    },
    FlagsBatchSet {
        addresses: Vec<Address>,
        kind: FlagKind,
        value: bool,
    },
    TokensMinted {
        to: Address,
        amount: Amount,
    },
    TokensBurned {
        from: Address,
        amount: Amount,
    },
    TokensTransferred {
        from: Address,
        to: Address,
        amount: Amount,
    },
    DailyLimitsSet {
        mint_limit: Amount,
        burn_limit: Amount,
    },
    PatentAdded {
        id: String,
    },
    PatentUpdated {
        id: String,
    },
    PatentDeactivated {
        id: String,
    },
    ReserveSet {
        asset_ref: String,
    },
    ReserveRemoved {
        asset_ref: String,
    },
    RevenueDistributed {
        round_id: RoundId,
        total_amount: Amount,
        revenue_token: Address,
        total_supply_snapshot: Amount,
    },
    RevenueClaimed {
        round_id: RoundId,
        account: Address,
        amount: Amount,
    },
    RedemptionRequested {
        id: u64,
        account: Address,
        amount: Amount,
        asset_ref: String,
    },
    RedemptionSettled {
        id: u64,
        value_usd: u128,
    },
    RedemptionCancelled {
        id: u64,
    },
}

/// One audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, starting at 0
    pub seq: u64,
    pub timestamp: Timestamp,
    /// Who performed the operation
    pub actor: Address,
    pub event: AuditEvent,
}

impl AuditRecord {
    /// Deterministic record identifier.
    pub fn record_id(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();

        // Domain separator for audit record ids
        hasher.update(b"IPCOIN_AUDIT_V1");
        hasher.update(&self.seq.to_le_bytes());
        hasher.update(&self.timestamp.to_le_bytes());
        hasher.update(self.actor.as_bytes());

        let event_bytes =
            bincode::serialize(&self.event).expect("AuditEvent must be serializable");
        hasher.update(&event_bytes);

        *hasher.finalize().as_bytes()
    }
}

/// Append-only audit log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn record(&mut self, timestamp: Timestamp, actor: Address, event: AuditEvent) {
        let seq = self.records.len() as u64;
        tracing::debug!(seq, %actor, ?event, "audit");
        self.records.push(AuditRecord {
            seq,
            timestamp,
            actor,
            event,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter()
    }

    /// Most recent record, if any
    pub fn latest(&self) -> Option<&AuditRecord> {
        self.records.last()
    }
}
