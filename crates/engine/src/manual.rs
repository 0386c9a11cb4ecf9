//! Manual entry form: purchase and donation fields filled outside the guided
//! flow.
//!
//! The form only holds input. Submitting goes through
//! [`Tracker::submit_manual_purchase`](crate::Tracker::submit_manual_purchase)
//! and [`Tracker::submit_manual_donation`](crate::Tracker::submit_manual_donation),
//! which clear the submitted half of the form on success.

use crate::{
    CampaignChoice, CampaignDirectory,
    validation::{parse_positive_amount, resolve_campaign},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntry {
    pub purchase_amount: String,
    pub purchase_note: String,
    pub donation_amount: String,
    pub donation_campaign: Option<CampaignChoice>,
    pub donation_other_name: String,
}

impl ManualEntry {
    pub fn can_submit_purchase(&self) -> bool {
        parse_positive_amount(&self.purchase_amount).is_ok()
    }

    pub fn can_submit_donation(&self, directory: &CampaignDirectory) -> bool {
        parse_positive_amount(&self.donation_amount).is_ok()
            && resolve_campaign(
                directory,
                self.donation_campaign.as_ref(),
                Some(self.donation_other_name.as_str()),
            )
            .is_ok()
    }

    pub(crate) fn clear_purchase(&mut self) {
        self.purchase_amount.clear();
        self.purchase_note.clear();
    }

    pub(crate) fn clear_donation(&mut self) {
        self.donation_amount.clear();
        self.donation_campaign = None;
        self.donation_other_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_predicates_follow_validation() {
        let directory = CampaignDirectory::default();
        let mut form = ManualEntry::default();
        assert!(!form.can_submit_purchase());
        assert!(!form.can_submit_donation(&directory));

        form.purchase_amount = "12".to_string();
        assert!(form.can_submit_purchase());

        form.donation_amount = "5".to_string();
        assert!(!form.can_submit_donation(&directory));
        form.donation_campaign = Some(CampaignChoice::Other);
        assert!(!form.can_submit_donation(&directory));
        form.donation_other_name = "Local PAC".to_string();
        assert!(form.can_submit_donation(&directory));

        form.donation_amount = "0".to_string();
        assert!(!form.can_submit_donation(&directory));
    }

    #[test]
    fn clearing_one_half_keeps_the_other() {
        let mut form = ManualEntry {
            purchase_amount: "3".to_string(),
            purchase_note: "Book".to_string(),
            donation_amount: "4".to_string(),
            donation_campaign: Some(CampaignChoice::Other),
            donation_other_name: "Local PAC".to_string(),
        };
        form.clear_purchase();
        assert!(form.purchase_amount.is_empty() && form.purchase_note.is_empty());
        assert_eq!(form.donation_amount, "4");

        form.clear_donation();
        assert_eq!(form, ManualEntry::default());
    }
}
