use chrono::Utc;

use crate::{
    Amount, CampaignChoice, CampaignDirectory, DonationRecord, DonationSource, EntryError,
    FlowError, LedgerState, LedgerStore, ManualEntry, PurchaseRecord,
    encouragement::EncouragementTicket,
    flow::{Flow, FlowState, FlowStep},
    records::{MANUAL_PURCHASE_NOTE, REGULAR_PURCHASE_NOTE},
    validation::{parse_positive_amount, resolve_campaign},
};

/// Owns the ledger and everything that mutates it: the guided flow, the
/// manual entry form and the store every mutation is mirrored to.
///
/// Persistence is best-effort. A failed write is logged and exposed through
/// [`persistence_warning`](Self::persistence_warning); the in-memory ledger is
/// kept either way and stays the source of truth for the session.
#[derive(Debug)]
pub struct Tracker<S: LedgerStore> {
    store: S,
    ledger: LedgerState,
    flow: Flow,
    manual: ManualEntry,
    directory: CampaignDirectory,
    persistence_warning: Option<String>,
}

impl<S: LedgerStore> Tracker<S> {
    /// Loads the ledger from `store`. Unreadable storage starts an empty
    /// ledger and sets the persistence warning.
    pub fn open(store: S, directory: CampaignDirectory) -> Self {
        let (ledger, persistence_warning) = match store.load() {
            Ok(ledger) => (ledger, None),
            Err(err) => {
                tracing::warn!("failed to load ledger, starting empty: {err}");
                (
                    LedgerState::default(),
                    Some(format!("saved data could not be read: {err}")),
                )
            }
        };
        tracing::info!(
            "ledger loaded: {} purchases ({}), {} donations ({})",
            ledger.purchase_history().len(),
            ledger.total_purchases(),
            ledger.donation_history().len(),
            ledger.total_donations(),
        );

        Self {
            store,
            ledger,
            flow: Flow::default(),
            manual: ManualEntry::default(),
            directory,
            persistence_warning,
        }
    }

    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn state(&self) -> &FlowState {
        self.flow.state()
    }

    pub fn step(&self) -> FlowStep {
        self.flow.step()
    }

    pub fn directory(&self) -> &CampaignDirectory {
        &self.directory
    }

    pub fn manual(&self) -> &ManualEntry {
        &self.manual
    }

    pub fn manual_mut(&mut self) -> &mut ManualEntry {
        &mut self.manual
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last persistence failure, cleared by the next successful write.
    pub fn persistence_warning(&self) -> Option<&str> {
        self.persistence_warning.as_deref()
    }

    fn persist(&mut self) {
        match self.store.save(&self.ledger) {
            Ok(()) => self.persistence_warning = None,
            Err(err) => {
                tracing::warn!("failed to save ledger, keeping in-memory state: {err}");
                self.persistence_warning = Some(format!("changes were not saved: {err}"));
            }
        }
    }

    fn record_purchase(
        &mut self,
        amount: Amount,
        note: &str,
    ) -> Result<PurchaseRecord, EntryError> {
        let record = self
            .ledger
            .record_purchase(PurchaseRecord::new(Utc::now(), amount, note))?
            .clone();
        tracing::info!("purchase recorded: {amount} ({note})");
        self.persist();
        Ok(record)
    }

    fn record_donation(
        &mut self,
        amount: Amount,
        campaign: String,
        source: DonationSource,
    ) -> Result<DonationRecord, EntryError> {
        let record = self
            .ledger
            .record_donation(DonationRecord::new(Utc::now(), amount, campaign, source))?
            .clone();
        tracing::info!("donation recorded: {amount} to {} ({source})", record.campaign);
        self.persist();
        Ok(record)
    }

    // Guided flow.

    pub fn answer_yes(&mut self) -> Result<(), FlowError> {
        self.flow.answer_yes()
    }

    pub fn answer_no(&mut self) -> Result<EncouragementTicket, FlowError> {
        self.flow.answer_no()
    }

    pub fn expire_encouragement(&mut self, ticket: EncouragementTicket) -> bool {
        self.flow.expire_encouragement(ticket)
    }

    pub fn set_purchase_input(&mut self, input: &str) -> Result<(), FlowError> {
        self.flow.set_amount_input(input)
    }

    /// Records the entered purchase, then moves to the donation step. A
    /// refused purchase leaves the flow on the amount step.
    pub fn submit_purchase(&mut self) -> Result<PurchaseRecord, FlowError> {
        let amount = self.flow.pending_amount()?;
        let record = self.record_purchase(amount, REGULAR_PURCHASE_NOTE)?;
        self.flow.submit_amount()?;
        Ok(record)
    }

    /// Shortcut for [`set_purchase_input`](Self::set_purchase_input) followed
    /// by [`submit_purchase`](Self::submit_purchase).
    pub fn enter_purchase(&mut self, input: &str) -> Result<PurchaseRecord, FlowError> {
        self.set_purchase_input(input)?;
        self.submit_purchase()
    }

    pub fn select_campaign(&mut self, choice: CampaignChoice) -> Result<(), FlowError> {
        self.flow.select_campaign(choice)
    }

    pub fn set_other_campaign_name(&mut self, name: &str) -> Result<(), FlowError> {
        self.flow.set_other_name(name)
    }

    pub fn can_confirm_donation(&self) -> bool {
        self.flow.can_confirm(&self.directory)
    }

    /// Records the suggested donation, then completes the round. A refused
    /// donation leaves the flow on the donation step.
    pub fn confirm_donation(&mut self) -> Result<DonationRecord, FlowError> {
        let (amount, campaign) = self.flow.pending_donation(&self.directory)?;
        let record = self.record_donation(amount, campaign, DonationSource::RegularFlow)?;
        self.flow.confirm_donation(&self.directory)?;
        Ok(record)
    }

    // Manual entry.

    pub fn add_manual_purchase(
        &mut self,
        amount: &str,
        note: Option<&str>,
    ) -> Result<PurchaseRecord, EntryError> {
        let amount = parse_positive_amount(amount)?;
        let note = note
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .unwrap_or(MANUAL_PURCHASE_NOTE)
            .to_string();
        self.record_purchase(amount, &note)
    }

    pub fn add_manual_donation(
        &mut self,
        amount: &str,
        selection: Option<&CampaignChoice>,
        other_name: Option<&str>,
    ) -> Result<DonationRecord, EntryError> {
        let amount = parse_positive_amount(amount)?;
        let campaign = resolve_campaign(&self.directory, selection, other_name)?;
        self.record_donation(amount, campaign, DonationSource::ManualEntry)
    }

    /// Submits the purchase half of the manual form, clearing it on success.
    pub fn submit_manual_purchase(&mut self) -> Result<PurchaseRecord, EntryError> {
        let ManualEntry {
            purchase_amount,
            purchase_note,
            ..
        } = self.manual.clone();
        let record = self.add_manual_purchase(&purchase_amount, Some(&purchase_note))?;
        self.manual.clear_purchase();
        Ok(record)
    }

    /// Submits the donation half of the manual form, clearing it on success.
    pub fn submit_manual_donation(&mut self) -> Result<DonationRecord, EntryError> {
        let ManualEntry {
            donation_amount,
            donation_campaign,
            donation_other_name,
            ..
        } = self.manual.clone();
        let record = self.add_manual_donation(
            &donation_amount,
            donation_campaign.as_ref(),
            Some(&donation_other_name),
        )?;
        self.manual.clear_donation();
        Ok(record)
    }

    // Reset / clear.

    /// Back to the first question. The ledger is untouched.
    pub fn reset_flow(&mut self) {
        self.flow.reset();
    }

    /// Wipes persisted and in-memory data and restarts the flow.
    pub fn clear_all_data(&mut self) {
        match self.store.clear() {
            Ok(()) => self.persistence_warning = None,
            Err(err) => {
                tracing::warn!("failed to clear stored ledger: {err}");
                self.persistence_warning = Some(format!("saved data was not erased: {err}"));
            }
        }
        self.ledger = LedgerState::default();
        self.manual = ManualEntry::default();
        self.flow.reset();
        tracing::info!("all data cleared");
    }
}
