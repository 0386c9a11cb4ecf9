//! One-shot subcommands: record an entry or print a view, then exit.

use std::process::ExitCode;

use chrono_tz::Tz;
use engine::{CampaignChoice, LedgerStore, Tracker};

use crate::{render, settings::Command};

/// Runs everything except [`Command::Flow`], which needs a terminal session.
pub fn run<S: LedgerStore>(tracker: &mut Tracker<S>, command: Command, timezone: Tz) -> ExitCode {
    let outcome = match command {
        Command::Flow => Err("the guided flow is interactive".to_string()),
        Command::Purchase { amount, note } => tracker
            .add_manual_purchase(&amount, note.as_deref())
            .map(|purchase| format!("Recorded purchase of {} ({}).", purchase.amount, purchase.note))
            .map_err(|err| err.to_string()),
        Command::Donate {
            amount,
            campaign,
            other,
        } => {
            let choice = tracker
                .directory()
                .choice_for(&campaign)
                .unwrap_or(CampaignChoice::Listed(campaign));
            tracker
                .add_manual_donation(&amount, Some(&choice), other.as_deref())
                .map(|donation| {
                    format!(
                        "Recorded donation of {} to {}.",
                        donation.amount, donation.campaign
                    )
                })
                .map_err(|err| err.to_string())
        }
        Command::Totals => Ok(render::totals(tracker.ledger())),
        Command::History { kind } => Ok(render::history(tracker.ledger(), kind, timezone)),
        Command::Campaigns => Ok(render::campaigns(tracker.directory())),
        Command::Clear { yes: false } => {
            Err("refusing to erase all data without --yes".to_string())
        }
        Command::Clear { yes: true } => {
            tracker.clear_all_data();
            Ok("All data cleared.".to_string())
        }
    };

    if let Some(warning) = tracker.persistence_warning() {
        eprintln!("warning: {warning}");
    }

    match outcome {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
