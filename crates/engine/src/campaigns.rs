//! Campaign directory: the read-only list of campaigns a donation can go to.
//!
//! The directory is built once and never mutated. It always ends with the
//! [`OTHER_CAMPAIGN`] sentinel, which stands for a campaign that is not
//! listed and needs a free-text name when selected.

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::DirectoryError;

/// Display name of the "other/unlisted campaign" sentinel.
pub const OTHER_CAMPAIGN: &str = "Other";
const OTHER_DESCRIPTION: &str = "Support a campaign that is not listed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
}

impl Campaign {
    pub fn new(name: &str, description: &str, website: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            website: website.map(ToString::to_string),
        }
    }
}

/// What the user picked in a campaign selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignChoice {
    /// A campaign from the directory, by name.
    Listed(String),
    /// The sentinel: the actual name comes from a separate text field.
    Other,
}

impl CampaignChoice {
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignDirectory {
    campaigns: Vec<Campaign>,
    other: Campaign,
}

impl Default for CampaignDirectory {
    fn default() -> Self {
        Self {
            campaigns: builtin_campaigns(),
            other: other_campaign(),
        }
    }
}

impl CampaignDirectory {
    /// Builds a directory from listed campaigns. The sentinel is appended
    /// automatically and must not be part of `campaigns`.
    pub fn new(campaigns: Vec<Campaign>) -> Result<Self, DirectoryError> {
        let other_key = normalize_key(OTHER_CAMPAIGN);
        let mut seen: Vec<String> = Vec::with_capacity(campaigns.len());
        let mut cleaned = Vec::with_capacity(campaigns.len());

        for campaign in campaigns {
            let name = normalize_display(&campaign.name).ok_or(DirectoryError::EmptyName)?;
            let key = normalize_key(&name).ok_or(DirectoryError::EmptyName)?;
            if Some(&key) == other_key.as_ref() {
                return Err(DirectoryError::ReservedName(name));
            }
            if seen.contains(&key) {
                return Err(DirectoryError::DuplicateName(name));
            }
            seen.push(key);
            cleaned.push(Campaign {
                name,
                description: campaign.description.trim().to_string(),
                website: campaign
                    .website
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty()),
            });
        }

        Ok(Self {
            campaigns: cleaned,
            other: other_campaign(),
        })
    }

    /// Listed campaigns, in display order, without the sentinel.
    pub fn listed(&self) -> &[Campaign] {
        &self.campaigns
    }

    /// The "other" sentinel entry.
    pub fn other(&self) -> &Campaign {
        &self.other
    }

    /// Every entry in selector order: listed campaigns, then the sentinel.
    pub fn entries(&self) -> impl Iterator<Item = &Campaign> {
        self.campaigns.iter().chain(std::iter::once(&self.other))
    }

    /// Number of selectable entries, sentinel included.
    pub fn len(&self) -> usize {
        self.campaigns.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Finds a listed campaign by name, ignoring case, accents and
    /// punctuation differences.
    pub fn find(&self, name: &str) -> Option<&Campaign> {
        let key = normalize_key(name)?;
        self.campaigns
            .iter()
            .find(|campaign| normalize_key(&campaign.name).as_ref() == Some(&key))
    }

    /// Turns free text into a selector choice (sentinel name included).
    pub fn choice_for(&self, name: &str) -> Option<CampaignChoice> {
        if normalize_key(name) == normalize_key(OTHER_CAMPAIGN) {
            return Some(CampaignChoice::Other);
        }
        self.find(name)
            .map(|campaign| CampaignChoice::Listed(campaign.name.clone()))
    }

    /// Selector choice for the entry at `index` in [`entries`](Self::entries)
    /// order.
    pub fn choice_at(&self, index: usize) -> Option<CampaignChoice> {
        match self.campaigns.get(index) {
            Some(campaign) => Some(CampaignChoice::Listed(campaign.name.clone())),
            None if index == self.campaigns.len() => Some(CampaignChoice::Other),
            None => None,
        }
    }
}

fn builtin_campaigns() -> Vec<Campaign> {
    vec![
        Campaign::new(
            "Harris-Walz 2024",
            "Support the presidential campaign",
            Some("https://example.com/harris-walz"),
        ),
        Campaign::new(
            "Fair Fight",
            "Fighting for free and fair elections",
            Some("https://example.com/fair-fight"),
        ),
        Campaign::new(
            "Working Families Party",
            "Building progressive political power",
            Some("https://example.com/wfp"),
        ),
        Campaign::new(
            "Common Defense",
            "Progressive veterans advocating for democracy",
            Some("https://example.com/common-defense"),
        ),
    ]
}

fn other_campaign() -> Campaign {
    Campaign::new(OTHER_CAMPAIGN, OTHER_DESCRIPTION, None)
}

/// Trims and collapses inner whitespace. `None` when nothing is left.
pub(crate) fn normalize_display(input: &str) -> Option<String> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Comparison key: NFKD, combining marks dropped, lowercase, runs of
/// non-alphanumerics collapsed to one space.
fn normalize_key(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut prev_space = false;
    for ch in trimmed.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}
