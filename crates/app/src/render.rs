//! Plain-text views of the ledger and the campaign directory.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{CampaignDirectory, LedgerState};

use crate::settings::HistoryKind;

/// `Oct 19, 2026` in the given timezone.
pub fn format_date(date: &DateTime<Utc>, timezone: Tz) -> String {
    date.with_timezone(&timezone).format("%b %-d, %Y").to_string()
}

pub fn totals(ledger: &LedgerState) -> String {
    format!(
        "Total purchases: {}\nTotal donations: {}",
        ledger.total_purchases(),
        ledger.total_donations()
    )
}

pub fn history(ledger: &LedgerState, kind: HistoryKind, timezone: Tz) -> String {
    let mut sections = Vec::new();
    if kind != HistoryKind::Purchases {
        sections.push(donations(ledger, timezone));
    }
    if kind != HistoryKind::Donations {
        sections.push(purchases(ledger, timezone));
    }
    sections.join("\n\n")
}

fn donations(ledger: &LedgerState, timezone: Tz) -> String {
    let mut out = String::from("Donations");
    if ledger.donation_history().is_empty() {
        out.push_str("\n  No donations recorded yet");
    }
    for donation in ledger.donation_history() {
        out.push_str(&format!(
            "\n  {:>10}  {:<28} {}  ({})",
            donation.amount.to_string(),
            donation.campaign,
            format_date(&donation.date, timezone),
            donation.source,
        ));
    }
    out
}

fn purchases(ledger: &LedgerState, timezone: Tz) -> String {
    let mut out = String::from("Purchases");
    if ledger.purchase_history().is_empty() {
        out.push_str("\n  No purchases recorded yet");
    }
    for purchase in ledger.purchase_history() {
        out.push_str(&format!(
            "\n  {:>10}  {:<28} {}",
            purchase.amount.to_string(),
            purchase.note,
            format_date(&purchase.date, timezone),
        ));
    }
    out
}

pub fn campaigns(directory: &CampaignDirectory) -> String {
    directory
        .entries()
        .enumerate()
        .map(|(index, campaign)| {
            let mut line = format!("{:>2}. {}", index + 1, campaign.name);
            if !campaign.description.is_empty() {
                line.push_str(&format!("\n    {}", campaign.description));
            }
            if let Some(website) = &campaign.website {
                line.push_str(&format!("\n    Learn more: {website}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use engine::{Amount, DonationRecord, DonationSource, PurchaseRecord};
    use rust_decimal_macros::dec;

    use super::*;

    fn ledger() -> LedgerState {
        let date: DateTime<Utc> = "2024-11-06T02:30:00Z".parse().unwrap();
        LedgerState::from_histories(
            vec![PurchaseRecord::new(date, Amount::new(dec!(40)), "Regular purchase flow")],
            vec![DonationRecord::new(
                date,
                Amount::new(dec!(20)),
                "Fair Fight",
                DonationSource::RegularFlow,
            )],
        )
        .unwrap()
    }

    #[test]
    fn dates_follow_the_timezone() {
        let date: DateTime<Utc> = "2024-11-06T02:30:00Z".parse().unwrap();
        assert_eq!(format_date(&date, chrono_tz::UTC), "Nov 6, 2024");
        assert_eq!(
            format_date(&date, chrono_tz::America::New_York),
            "Nov 5, 2024"
        );
    }

    #[test]
    fn totals_show_two_decimals() {
        assert_eq!(
            totals(&ledger()),
            "Total purchases: $40.00\nTotal donations: $20.00"
        );
    }

    #[test]
    fn history_lists_requested_sections() {
        let all = history(&ledger(), HistoryKind::All, chrono_tz::UTC);
        assert!(all.starts_with("Donations"));
        assert!(all.contains("Fair Fight"));
        assert!(all.contains("Regular purchase flow"));

        let only_purchases = history(&ledger(), HistoryKind::Purchases, chrono_tz::UTC);
        assert!(!only_purchases.contains("Fair Fight"));

        let empty = history(&LedgerState::default(), HistoryKind::All, chrono_tz::UTC);
        assert!(empty.contains("No donations recorded yet"));
        assert!(empty.contains("No purchases recorded yet"));
    }

    #[test]
    fn campaigns_are_numbered_with_sentinel_last() {
        let text = campaigns(&CampaignDirectory::default());
        assert!(text.starts_with(" 1. Harris-Walz 2024"));
        assert!(text.contains("Learn more: https://example.com/fair-fight"));
        assert!(text.contains(" 5. Other"));
    }
}
