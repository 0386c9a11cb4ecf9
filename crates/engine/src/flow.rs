//! Guided purchase → donation flow.
//!
//! ```text
//! AskPurchase --yes--> EnterAmount --submit--> ShowDonation --confirm--> Complete
//!      ^  |no (encouragement)                                               |
//!      +--+------------------------------ reset ----------------------------+
//! ```
//!
//! The flow only decides transitions. Recording the purchase and the donation
//! in the ledger is done by [`Tracker`](crate::Tracker): it reads the pending
//! value, records it, and only then takes the transition.

use std::fmt;

use crate::{
    Amount, CampaignChoice, CampaignDirectory, FlowError,
    encouragement::{Encouragement, EncouragementTicket},
    validation::{parse_positive_amount, resolve_campaign},
};

/// Step of the guided flow, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStep {
    AskPurchase,
    EnterAmount,
    ShowDonation,
    Complete,
}

impl FlowStep {
    pub fn label(self) -> &'static str {
        match self {
            Self::AskPurchase => "AskPurchase",
            Self::EnterAmount => "EnterAmount",
            Self::ShowDonation => "ShowDonation",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Donation step data: the suggested amount and the campaign being picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationPrompt {
    pub purchase: Amount,
    pub suggested: Amount,
    pub selection: Option<CampaignChoice>,
    pub other_name: String,
}

impl DonationPrompt {
    /// `true` when "other" is selected, so the free-text name is required.
    pub fn needs_other_name(&self) -> bool {
        self.selection.as_ref().is_some_and(CampaignChoice::is_other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    AskPurchase,
    EnterAmount {
        input: String,
    },
    ShowDonation(DonationPrompt),
    Complete {
        donation: Amount,
        campaign: String,
    },
}

impl FlowState {
    pub fn step(&self) -> FlowStep {
        match self {
            Self::AskPurchase => FlowStep::AskPurchase,
            Self::EnterAmount { .. } => FlowStep::EnterAmount,
            Self::ShowDonation(_) => FlowStep::ShowDonation,
            Self::Complete { .. } => FlowStep::Complete,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flow {
    state: FlowState,
    encouragement: Encouragement,
}

impl Flow {
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn step(&self) -> FlowStep {
        self.state.step()
    }

    pub fn encouragement(&self) -> &Encouragement {
        &self.encouragement
    }

    pub fn encouragement_shown(&self) -> bool {
        self.encouragement.is_shown()
    }

    fn expect_step(&self, expected: FlowStep) -> Result<(), FlowError> {
        let actual = self.step();
        if actual != expected {
            return Err(FlowError::UnexpectedState { expected, actual });
        }
        Ok(())
    }

    /// "Yes, I made a purchase": starts a new round.
    pub fn answer_yes(&mut self) -> Result<(), FlowError> {
        self.expect_step(FlowStep::AskPurchase)?;
        self.encouragement.cancel();
        self.state = FlowState::EnterAmount {
            input: String::new(),
        };
        tracing::debug!("flow: AskPurchase -> EnterAmount");
        Ok(())
    }

    /// "No purchase": stays on the question and shows the encouragement.
    pub fn answer_no(&mut self) -> Result<EncouragementTicket, FlowError> {
        self.expect_step(FlowStep::AskPurchase)?;
        let ticket = self.encouragement.show();
        tracing::debug!("flow: encouragement shown ({ticket:?})");
        Ok(ticket)
    }

    /// Timer callback for [`answer_no`](Self::answer_no). Stale tickets are
    /// ignored.
    pub fn expire_encouragement(&mut self, ticket: EncouragementTicket) -> bool {
        self.encouragement.expire(ticket)
    }

    pub fn set_amount_input(&mut self, value: &str) -> Result<(), FlowError> {
        match &mut self.state {
            FlowState::EnterAmount { input } => {
                value.clone_into(input);
                Ok(())
            }
            other => Err(FlowError::UnexpectedState {
                expected: FlowStep::EnterAmount,
                actual: other.step(),
            }),
        }
    }

    /// Whether the amount step can be submitted as it stands.
    pub fn can_submit_amount(&self) -> bool {
        self.pending_amount().is_ok()
    }

    /// Parses the entered amount without leaving the step.
    pub fn pending_amount(&self) -> Result<Amount, FlowError> {
        let FlowState::EnterAmount { input } = &self.state else {
            return Err(FlowError::UnexpectedState {
                expected: FlowStep::EnterAmount,
                actual: self.step(),
            });
        };
        Ok(parse_positive_amount(input)?)
    }

    /// Submits the entered amount. On success the flow moves to the donation
    /// step with half of the amount suggested, and the purchase amount is
    /// returned.
    pub fn submit_amount(&mut self) -> Result<Amount, FlowError> {
        let purchase = self.pending_amount()?;
        let suggested = purchase.half();
        self.state = FlowState::ShowDonation(DonationPrompt {
            purchase,
            suggested,
            selection: None,
            other_name: String::new(),
        });
        tracing::debug!("flow: EnterAmount -> ShowDonation (suggested {suggested})");
        Ok(purchase)
    }

    fn prompt_mut(&mut self) -> Result<&mut DonationPrompt, FlowError> {
        match &mut self.state {
            FlowState::ShowDonation(prompt) => Ok(prompt),
            other => Err(FlowError::UnexpectedState {
                expected: FlowStep::ShowDonation,
                actual: other.step(),
            }),
        }
    }

    /// Picks a campaign. Selection only: nothing is recorded yet.
    pub fn select_campaign(&mut self, choice: CampaignChoice) -> Result<(), FlowError> {
        let prompt = self.prompt_mut()?;
        prompt.selection = Some(choice);
        Ok(())
    }

    /// Sets the free-text name used when "other" is selected.
    pub fn set_other_name(&mut self, name: &str) -> Result<(), FlowError> {
        let prompt = self.prompt_mut()?;
        name.clone_into(&mut prompt.other_name);
        Ok(())
    }

    /// Whether the donation step can be confirmed as it stands.
    pub fn can_confirm(&self, directory: &CampaignDirectory) -> bool {
        self.pending_donation(directory).is_ok()
    }

    /// The donation a confirm would make (amount and resolved campaign name),
    /// without leaving the step.
    pub fn pending_donation(
        &self,
        directory: &CampaignDirectory,
    ) -> Result<(Amount, String), FlowError> {
        let FlowState::ShowDonation(prompt) = &self.state else {
            return Err(FlowError::UnexpectedState {
                expected: FlowStep::ShowDonation,
                actual: self.step(),
            });
        };
        let campaign = resolve_campaign(
            directory,
            prompt.selection.as_ref(),
            Some(prompt.other_name.as_str()),
        )?;
        Ok((prompt.suggested, campaign))
    }

    /// Confirms the suggested donation. Returns the amount and the resolved
    /// campaign name; the flow moves to `Complete`.
    pub fn confirm_donation(
        &mut self,
        directory: &CampaignDirectory,
    ) -> Result<(Amount, String), FlowError> {
        let (donation, campaign) = self.pending_donation(directory)?;
        self.state = FlowState::Complete {
            donation,
            campaign: campaign.clone(),
        };
        tracing::debug!("flow: ShowDonation -> Complete ({donation} to {campaign})");
        Ok((donation, campaign))
    }

    /// Back to the first question, dropping every in-flow field. Safe to
    /// call from any step and idempotent.
    pub fn reset(&mut self) {
        self.encouragement.cancel();
        if self.state != FlowState::AskPurchase {
            tracing::debug!("flow: {} -> AskPurchase (reset)", self.step());
        }
        self.state = FlowState::AskPurchase;
    }
}
