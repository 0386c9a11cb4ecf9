//! In-memory ledger: running totals and append-only histories.

use crate::{Amount, DonationRecord, EntryError, PurchaseRecord};

/// Totals and histories for purchases and donations.
///
/// Fields are private so the totals can only move together with their
/// history: every total is the exact sum of its history at all times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    total_purchases: Amount,
    total_donations: Amount,
    purchase_history: Vec<PurchaseRecord>,
    donation_history: Vec<DonationRecord>,
}

impl LedgerState {
    /// Rebuilds a ledger from histories, deriving both totals. Fails when a
    /// total does not fit in a decimal.
    pub fn from_histories(
        purchase_history: Vec<PurchaseRecord>,
        donation_history: Vec<DonationRecord>,
    ) -> Result<Self, EntryError> {
        let total_purchases = Amount::checked_sum(purchase_history.iter().map(|p| p.amount))
            .ok_or_else(|| total_overflow("purchase"))?;
        let total_donations = Amount::checked_sum(donation_history.iter().map(|d| d.amount))
            .ok_or_else(|| total_overflow("donation"))?;
        Ok(Self {
            total_purchases,
            total_donations,
            purchase_history,
            donation_history,
        })
    }

    pub fn total_purchases(&self) -> Amount {
        self.total_purchases
    }

    pub fn total_donations(&self) -> Amount {
        self.total_donations
    }

    pub fn purchase_history(&self) -> &[PurchaseRecord] {
        &self.purchase_history
    }

    pub fn donation_history(&self) -> &[DonationRecord] {
        &self.donation_history
    }

    pub fn is_empty(&self) -> bool {
        self.purchase_history.is_empty() && self.donation_history.is_empty()
    }

    /// Appends a purchase. Refused, with the ledger untouched, when the total
    /// would overflow.
    pub(crate) fn record_purchase(
        &mut self,
        record: PurchaseRecord,
    ) -> Result<&PurchaseRecord, EntryError> {
        self.total_purchases = self
            .total_purchases
            .checked_add(record.amount)
            .ok_or_else(|| total_overflow("purchase"))?;
        self.purchase_history.push(record);
        Ok(&self.purchase_history[self.purchase_history.len() - 1])
    }

    /// Appends a donation. Refused, with the ledger untouched, when the total
    /// would overflow.
    pub(crate) fn record_donation(
        &mut self,
        record: DonationRecord,
    ) -> Result<&DonationRecord, EntryError> {
        self.total_donations = self
            .total_donations
            .checked_add(record.amount)
            .ok_or_else(|| total_overflow("donation"))?;
        self.donation_history.push(record);
        Ok(&self.donation_history[self.donation_history.len() - 1])
    }
}

fn total_overflow(kind: &str) -> EntryError {
    EntryError::InvalidAmount(format!("{kind} total would exceed the supported range"))
}
