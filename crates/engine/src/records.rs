//! Purchase and donation records, the rows of the ledger history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Amount;

/// Note stored on purchases recorded through the guided flow.
pub const REGULAR_PURCHASE_NOTE: &str = "Regular purchase flow";
/// Note stored on manual purchases entered without a note.
pub const MANUAL_PURCHASE_NOTE: &str = "Manual entry";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub date: DateTime<Utc>,
    pub amount: Amount,
    pub note: String,
}

impl PurchaseRecord {
    pub fn new(date: DateTime<Utc>, amount: Amount, note: impl Into<String>) -> Self {
        Self {
            date,
            amount,
            note: note.into(),
        }
    }
}

/// Which entry path produced a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationSource {
    #[serde(rename = "Regular flow")]
    RegularFlow,
    #[serde(rename = "Manual entry")]
    ManualEntry,
}

impl DonationSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::RegularFlow => "Regular flow",
            Self::ManualEntry => "Manual entry",
        }
    }
}

impl std::fmt::Display for DonationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub date: DateTime<Utc>,
    pub amount: Amount,
    pub campaign: String,
    pub source: DonationSource,
}

impl DonationRecord {
    pub fn new(
        date: DateTime<Utc>,
        amount: Amount,
        campaign: impl Into<String>,
        source: DonationSource,
    ) -> Self {
        Self {
            date,
            amount,
            campaign: campaign.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn donation_serializes_with_source_label() {
        let record = DonationRecord::new(
            "2024-10-01T12:00:00Z".parse().unwrap(),
            Amount::new(dec!(20)),
            "Fair Fight",
            DonationSource::RegularFlow,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source"], "Regular flow");
        assert_eq!(json["campaign"], "Fair Fight");
        assert_eq!(json["amount"], "20");
        assert_eq!(json["date"], "2024-10-01T12:00:00Z");
    }

    #[test]
    fn purchase_accepts_numeric_amounts() {
        let raw = r#"{"date":"2024-10-01T12:00:00.000Z","amount":12.5,"note":"Manual entry"}"#;
        let record: PurchaseRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.amount.value(), dec!(12.5));
        assert_eq!(record.note, MANUAL_PURCHASE_NOTE);
    }
}
