//! Entry validation shared by the guided flow and manual entry.
//!
//! Both entry paths go through these two functions, so an amount or campaign
//! accepted by one path is accepted by the other.

use crate::{Amount, CampaignChoice, CampaignDirectory, EntryError, campaigns::normalize_display};

/// Parses user input into a finite, strictly positive amount.
pub fn parse_positive_amount(input: &str) -> Result<Amount, EntryError> {
    let amount: Amount = input.parse()?;
    if !amount.is_positive() {
        return Err(EntryError::InvalidAmount(format!(
            "amount must be > 0, got {}",
            amount.value()
        )));
    }
    Ok(amount)
}

/// Resolves a selector choice to the campaign name stored on the donation.
///
/// A listed choice must exist in `directory` (the canonical name is
/// returned). The sentinel needs a non-blank `other_name`, returned trimmed.
pub fn resolve_campaign(
    directory: &CampaignDirectory,
    selection: Option<&CampaignChoice>,
    other_name: Option<&str>,
) -> Result<String, EntryError> {
    match selection {
        None => Err(EntryError::MissingCampaign),
        Some(CampaignChoice::Listed(name)) => directory
            .find(name)
            .map(|campaign| campaign.name.clone())
            .ok_or_else(|| EntryError::UnknownCampaign(name.clone())),
        Some(CampaignChoice::Other) => other_name
            .and_then(normalize_display)
            .ok_or(EntryError::MissingCampaign),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn positive_amounts_pass() {
        assert_eq!(parse_positive_amount("40").unwrap().value(), dec!(40));
        assert_eq!(parse_positive_amount("0.01").unwrap().value(), dec!(0.01));
    }

    #[test]
    fn zero_negative_and_garbage_fail() {
        for input in ["0", "0.00", "-5", "", "abc"] {
            assert!(
                matches!(parse_positive_amount(input), Err(EntryError::InvalidAmount(_))),
                "{input:?} should be refused"
            );
        }
    }

    #[test]
    fn resolves_listed_and_other() {
        let directory = CampaignDirectory::default();
        let listed = CampaignChoice::Listed("fair fight".to_string());
        assert_eq!(
            resolve_campaign(&directory, Some(&listed), None).unwrap(),
            "Fair Fight"
        );
        assert_eq!(
            resolve_campaign(&directory, Some(&CampaignChoice::Other), Some("  Local PAC ")).unwrap(),
            "Local PAC"
        );
    }

    #[test]
    fn unresolved_campaigns_fail() {
        let directory = CampaignDirectory::default();
        assert_eq!(
            resolve_campaign(&directory, None, Some("Local PAC")),
            Err(EntryError::MissingCampaign)
        );
        assert_eq!(
            resolve_campaign(&directory, Some(&CampaignChoice::Other), Some("   ")),
            Err(EntryError::MissingCampaign)
        );
        assert_eq!(
            resolve_campaign(&directory, Some(&CampaignChoice::Other), None),
            Err(EntryError::MissingCampaign)
        );
        let unknown = CampaignChoice::Listed("Nope".to_string());
        assert_eq!(
            resolve_campaign(&directory, Some(&unknown), None),
            Err(EntryError::UnknownCampaign("Nope".to_string()))
        );
    }
}
