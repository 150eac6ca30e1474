//! Events recorded by a vault for every committed state change.

use crate::config::FeeMode;
use clmm_vault_domain::{Address, TickRange};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Type of vault event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEventType {
    Deposit,
    Withdraw,
    Rebalance,
    FeesDistributed,
    /// An owner setter or ownership transfer.
    ParameterChanged,
}

/// A vault event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultEvent {
    /// Event ID.
    pub id: String,
    pub event_type: VaultEventType,
    /// Vault that emitted the event.
    pub vault: Address,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Event-specific data.
    pub data: EventData,
}

impl VaultEvent {
    /// Creates a new event; the type follows from the payload.
    pub fn new(vault: Address, data: EventData) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: data.event_type(),
            vault,
            timestamp: chrono::Utc::now(),
            data,
        }
    }
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventData {
    Deposit(DepositData),
    Withdraw(WithdrawData),
    Rebalance(RebalanceData),
    FeesDistributed(FeesDistributedData),
    DepositMax { deposit_max0: U256, deposit_max1: U256 },
    MaxTotalSupply { max_total_supply: U256 },
    Affiliate { affiliate: Option<Address> },
    FeeRecipient { fee_recipient: Address },
    BaseFee { base_fee: u8 },
    BaseFeeSplit { base_fee_split: u8 },
    FeeMode { fee_mode: FeeMode },
    OwnershipTransferred { previous: Address, new: Address },
}

impl EventData {
    pub fn event_type(&self) -> VaultEventType {
        match self {
            EventData::Deposit(_) => VaultEventType::Deposit,
            EventData::Withdraw(_) => VaultEventType::Withdraw,
            EventData::Rebalance(_) => VaultEventType::Rebalance,
            EventData::FeesDistributed(_) => VaultEventType::FeesDistributed,
            _ => VaultEventType::ParameterChanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositData {
    pub sender: Address,
    pub to: Address,
    pub shares: U256,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawData {
    pub sender: Address,
    pub to: Address,
    pub shares: U256,
    pub amount0: U256,
    pub amount1: U256,
}

/// Data for a rebalance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceData {
    /// Pool tick after the optional swap.
    pub tick: i32,
    pub base: TickRange,
    pub limit: TickRange,
    pub base_liquidity: u128,
    pub limit_liquidity: u128,
    /// Fees harvested from both positions.
    pub fee0: U256,
    pub fee1: U256,
    /// Vault holdings once redeployed.
    pub total_amount0: U256,
    pub total_amount1: U256,
    pub total_supply: U256,
}

/// Data for a fee distribution event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesDistributedData {
    pub fee_recipient: Address,
    pub recipient_fee0: U256,
    pub recipient_fee1: U256,
    pub affiliate: Option<Address>,
    pub affiliate_fee0: U256,
    pub affiliate_fee1: U256,
    pub retained_fee0: U256,
    pub retained_fee1: U256,
}

/// Append-only event log of one vault.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<VaultEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    #[must_use]
    pub fn last(&self) -> Option<&VaultEvent> {
        self.events.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns events of a specific type.
    #[must_use]
    pub fn events_of_type(&self, event_type: VaultEventType) -> Vec<&VaultEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    #[must_use]
    pub fn count_by_type(&self, event_type: VaultEventType) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Drops events recorded after the first `len`; used when a call
    /// fails part way.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_event_log_record_and_query() {
        let mut log = EventLog::new();
        let vault = addr(0x77);

        log.record(VaultEvent::new(
            vault,
            EventData::Deposit(DepositData {
                sender: addr(1),
                to: addr(1),
                shares: U256::from(2000u64),
                amount0: U256::from(1000u64),
                amount1: U256::from(1000u64),
            }),
        ));
        log.record(VaultEvent::new(vault, EventData::BaseFee { base_fee: 20 }));
        log.record(VaultEvent::new(
            vault,
            EventData::BaseFeeSplit { base_fee_split: 30 },
        ));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_by_type(VaultEventType::ParameterChanged), 2);
        assert_eq!(log.events_of_type(VaultEventType::Deposit).len(), 1);

        log.truncate(1);
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.last().map(|e| e.event_type),
            Some(VaultEventType::Deposit)
        );
    }

    #[test]
    fn test_events_serialize() {
        let mut log = EventLog::new();
        log.record(VaultEvent::new(
            addr(0x77),
            EventData::Affiliate {
                affiliate: Some(addr(5)),
            },
        ));
        let json = log.to_json().unwrap();
        assert!(json.contains("ParameterChanged"));
        assert!(json.contains("Affiliate"));

        let back: Vec<VaultEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0].data, log.events()[0].data);
        assert_eq!(back[0].id, log.events()[0].id);
    }
}
