//! Ledger engine for tracking discretionary purchases and the donations they
//! inspire.
//!
//! The entry point is [`Tracker`], which owns:
//!
//! - the [`LedgerState`] (totals and append-only histories),
//! - the guided [`Flow`] (ask → amount → donate → complete),
//! - the [`ManualEntry`] form,
//! - a [`LedgerStore`] every ledger mutation is mirrored to.
//!
//! ```rust
//! use engine::{CampaignChoice, CampaignDirectory, FlowStep, MemoryStore, Tracker};
//!
//! let mut tracker = Tracker::open(MemoryStore::new(), CampaignDirectory::default());
//! tracker.answer_yes().unwrap();
//! tracker.enter_purchase("40").unwrap();
//! tracker
//!     .select_campaign(CampaignChoice::Listed("Fair Fight".to_string()))
//!     .unwrap();
//! let donation = tracker.confirm_donation().unwrap();
//!
//! assert_eq!(donation.amount.fixed(), "20.00");
//! assert_eq!(tracker.step(), FlowStep::Complete);
//! assert_eq!(tracker.ledger().total_donations().to_string(), "$20.00");
//! ```

pub use campaigns::{Campaign, CampaignChoice, CampaignDirectory, OTHER_CAMPAIGN};
pub use encouragement::{ENCOURAGEMENT_DURATION, Encouragement, EncouragementTicket};
pub use error::{DirectoryError, EntryError, FlowError, StoreError};
pub use flow::{DonationPrompt, Flow, FlowState, FlowStep};
pub use ledger::LedgerState;
pub use manual::ManualEntry;
pub use money::Amount;
pub use records::{
    DonationRecord, DonationSource, MANUAL_PURCHASE_NOTE, PurchaseRecord, REGULAR_PURCHASE_NOTE,
};
pub use store::{FileStore, LedgerStore, MemoryStore};
pub use tracker::Tracker;

mod campaigns;
mod encouragement;
mod error;
mod flow;
mod ledger;
mod manual;
mod money;
mod records;
pub mod store;
mod tracker;
pub mod validation;
