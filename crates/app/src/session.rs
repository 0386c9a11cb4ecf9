//! Interactive guided flow on a line-oriented terminal.
//!
//! [`Session`] maps one input line to tracker calls and returns what to
//! print; [`run`] feeds it from stdin and delivers encouragement expiries
//! from a timer task in the same `select!` loop.

use chrono_tz::Tz;
use engine::{
    CampaignChoice, ENCOURAGEMENT_DURATION, EncouragementTicket, FlowState, LedgerStore, Tracker,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    task::JoinHandle,
};

use crate::{error::Result, render, settings::HistoryKind};

const ENCOURAGEMENT: &str =
    "Great job avoiding unnecessary purchases! Consider making a donation anyway?";
const HELP: &str = "Commands: :totals  :history [purchases|donations]  :campaigns  :reset  :clear  :help  :quit";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn say(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            quit: false,
        }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

pub struct Session<S: LedgerStore> {
    tracker: Tracker<S>,
    timezone: Tz,
    confirming_clear: bool,
}

impl<S: LedgerStore> Session<S> {
    pub fn new(tracker: Tracker<S>, timezone: Tz) -> Self {
        Self {
            tracker,
            timezone,
            confirming_clear: false,
        }
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub fn expire_encouragement(&mut self, ticket: EncouragementTicket) -> bool {
        self.tracker.expire_encouragement(ticket)
    }

    /// What to show before reading the next line.
    pub fn prompt(&self) -> String {
        let mut lines = Vec::new();
        if let Some(warning) = self.tracker.persistence_warning() {
            lines.push(format!("warning: {warning}"));
        }
        match self.tracker.state() {
            FlowState::AskPurchase => {
                lines.push(render::totals(self.tracker.ledger()));
                lines.push("Did you make a non-essential purchase today? [y/n]".to_string());
            }
            FlowState::EnterAmount { .. } => {
                lines.push("Enter your purchase amount:".to_string());
            }
            FlowState::ShowDonation(prompt) => {
                lines.push(format!("Suggested donation: {}", prompt.suggested));
                lines.push("Select a campaign to support:".to_string());
                for (index, campaign) in self.tracker.directory().entries().enumerate() {
                    let selected = match &prompt.selection {
                        Some(CampaignChoice::Listed(name)) => *name == campaign.name,
                        Some(CampaignChoice::Other) => {
                            index + 1 == self.tracker.directory().len()
                        }
                        None => false,
                    };
                    let marker = if selected { '*' } else { ' ' };
                    lines.push(format!("{marker} {}. {}", index + 1, campaign.name));
                }
                if prompt.needs_other_name() {
                    if prompt.other_name.trim().is_empty() {
                        lines.push("Type the campaign name, or a listed number:".to_string());
                    } else {
                        lines.push(format!("Campaign name: {}", prompt.other_name.trim()));
                    }
                }
                if self.tracker.can_confirm_donation() {
                    lines.push("Type 'c' to confirm the donation.".to_string());
                }
            }
            FlowState::Complete { donation, campaign } => {
                lines.push(format!(
                    "Thank you for your donation of {donation} to {campaign}!"
                ));
                lines.push("Press Enter to start a new purchase.".to_string());
            }
        }
        lines.join("\n")
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        let input = line.trim();

        if self.confirming_clear {
            self.confirming_clear = false;
            if input.eq_ignore_ascii_case("yes") {
                self.tracker.clear_all_data();
                return Reply::say("All data cleared.");
            }
            return Reply::say("Nothing was erased.");
        }

        if let Some(command) = input.strip_prefix(':') {
            return self.handle_command(command.trim());
        }

        match self.tracker.state() {
            FlowState::AskPurchase => self.handle_answer(input),
            FlowState::EnterAmount { .. } => match self.tracker.enter_purchase(input) {
                Ok(purchase) => Reply::say(format!("Recorded purchase of {}.", purchase.amount)),
                Err(err) => Reply::say(err.to_string()),
            },
            FlowState::ShowDonation(_) => self.handle_donation(input),
            FlowState::Complete { .. } => {
                self.tracker.reset_flow();
                Reply::default()
            }
        }
    }

    fn handle_answer(&mut self, input: &str) -> Reply {
        let result = match input.to_ascii_lowercase().as_str() {
            "y" | "yes" => self.tracker.answer_yes().map(|()| Reply::default()),
            "n" | "no" => self.tracker.answer_no().map(|_| Reply::say(ENCOURAGEMENT)),
            _ => return Reply::say("Please answer y or n."),
        };
        result.unwrap_or_else(|err| Reply::say(err.to_string()))
    }

    fn handle_donation(&mut self, input: &str) -> Reply {
        if input.eq_ignore_ascii_case("c") || input.eq_ignore_ascii_case("confirm") {
            return match self.tracker.confirm_donation() {
                Ok(_) => Reply::default(),
                Err(err) => Reply::say(err.to_string()),
            };
        }

        let directory = self.tracker.directory();
        let choice = match input.parse::<usize>() {
            Ok(number) => number
                .checked_sub(1)
                .and_then(|index| directory.choice_at(index)),
            Err(_) => None,
        };
        if let Some(choice) = choice {
            return self.select(choice);
        }

        let needs_other_name = matches!(
            self.tracker.state(),
            FlowState::ShowDonation(prompt) if prompt.needs_other_name()
        );
        if needs_other_name {
            return match self.tracker.set_other_campaign_name(input) {
                Ok(()) => Reply::default(),
                Err(err) => Reply::say(err.to_string()),
            };
        }

        match self.tracker.directory().choice_for(input) {
            Some(choice) => self.select(choice),
            None => Reply::say(format!(
                "Pick a campaign between 1 and {}.",
                self.tracker.directory().len()
            )),
        }
    }

    fn select(&mut self, choice: CampaignChoice) -> Reply {
        match self.tracker.select_campaign(choice) {
            Ok(()) => Reply::default(),
            Err(err) => Reply::say(err.to_string()),
        }
    }

    fn handle_command(&mut self, command: &str) -> Reply {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or("").to_ascii_lowercase();
        let argument = parts.next().map(str::to_ascii_lowercase);

        match name.as_str() {
            "totals" => Reply::say(render::totals(self.tracker.ledger())),
            "history" => {
                let kind = match argument.as_deref() {
                    Some("purchases") => HistoryKind::Purchases,
                    Some("donations") => HistoryKind::Donations,
                    _ => HistoryKind::All,
                };
                Reply::say(render::history(self.tracker.ledger(), kind, self.timezone))
            }
            "campaigns" => Reply::say(render::campaigns(self.tracker.directory())),
            "reset" => {
                self.tracker.reset_flow();
                Reply::say("Flow reset.")
            }
            "clear" => {
                self.confirming_clear = true;
                Reply::say("Erase all purchases and donations? Type 'yes' to confirm.")
            }
            "quit" | "q" | "exit" => Reply {
                lines: Vec::new(),
                quit: true,
            },
            "help" => Reply::say(HELP),
            _ => {
                let mut reply = Reply::say(format!("Unknown command ':{command}'."));
                reply.push(HELP);
                reply
            }
        }
    }
}

/// Keeps at most one expiry task, armed for the tracker's current ticket.
pub struct EncouragementTimer {
    armed: Option<(EncouragementTicket, JoinHandle<()>)>,
    sender: mpsc::UnboundedSender<EncouragementTicket>,
}

impl EncouragementTimer {
    pub fn new(sender: mpsc::UnboundedSender<EncouragementTicket>) -> Self {
        Self {
            armed: None,
            sender,
        }
    }

    /// Aborts a timer for a superseded ticket and arms one for `active`.
    pub fn sync(&mut self, active: Option<EncouragementTicket>) {
        if self.armed.as_ref().map(|(ticket, _)| *ticket) == active {
            return;
        }
        if let Some((ticket, handle)) = self.armed.take() {
            handle.abort();
            tracing::debug!("encouragement timer cancelled ({ticket:?})");
        }
        if let Some(ticket) = active {
            let sender = self.sender.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(ENCOURAGEMENT_DURATION).await;
                let _ = sender.send(ticket);
            });
            self.armed = Some((ticket, handle));
        }
    }
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

/// Runs the session until `:quit` or end of input.
pub async fn run<S, R, W>(mut session: Session<S>, input: R, mut output: W) -> Result<()>
where
    S: LedgerStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (sender, mut expiries) = mpsc::unbounded_channel();
    let mut timer = EncouragementTimer::new(sender);
    let mut lines = input.lines();

    tracing::info!("guided flow started");
    write_block(&mut output, &session.prompt()).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let reply = session.handle_line(&line);
                timer.sync(session.tracker().flow().encouragement().active());
                write_block(&mut output, &reply.lines.join("\n")).await?;
                if reply.quit {
                    break;
                }
                write_block(&mut output, &session.prompt()).await?;
            }
            Some(ticket) = expiries.recv() => {
                if session.expire_encouragement(ticket) {
                    tracing::debug!("encouragement expired ({ticket:?})");
                }
                timer.sync(session.tracker().flow().encouragement().active());
            }
        }
    }

    timer.sync(None);
    tracing::info!("guided flow stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use engine::{CampaignDirectory, DonationSource, FlowStep, MemoryStore};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    use super::*;

    fn session() -> Session<MemoryStore> {
        Session::new(
            Tracker::open(MemoryStore::new(), CampaignDirectory::default()),
            chrono_tz::UTC,
        )
    }

    fn feed(session: &mut Session<MemoryStore>, lines: &[&str]) -> Vec<Reply> {
        lines.iter().map(|line| session.handle_line(line)).collect()
    }

    #[test]
    fn full_round_records_purchase_and_half_donation() {
        let mut session = session();
        feed(&mut session, &["y", "40"]);
        assert!(session.prompt().contains("Suggested donation: $20.00"));

        feed(&mut session, &["2"]);
        assert!(session.prompt().contains("* 2. Fair Fight"));
        feed(&mut session, &["c"]);

        let ledger = session.tracker().ledger();
        assert_eq!(ledger.total_purchases().value(), dec!(40));
        assert_eq!(ledger.total_donations().value(), dec!(20));
        assert_eq!(ledger.donation_history()[0].source, DonationSource::RegularFlow);
        assert!(
            session
                .prompt()
                .contains("Thank you for your donation of $20.00 to Fair Fight!")
        );

        feed(&mut session, &[""]);
        assert_eq!(session.tracker().step(), FlowStep::AskPurchase);
    }

    #[test]
    fn other_campaign_takes_typed_name() {
        let mut session = session();
        let replies = feed(&mut session, &["yes", "10", "5", "c"]);
        assert!(!replies[3].lines.is_empty());
        assert_eq!(session.tracker().step(), FlowStep::ShowDonation);

        feed(&mut session, &["Local PAC", "c"]);
        assert_eq!(
            session.tracker().ledger().donation_history()[0].campaign,
            "Local PAC"
        );
    }

    #[test]
    fn digits_become_the_other_name_unless_they_pick_an_entry() {
        let mut session = session();
        feed(&mut session, &["y", "10", "5", "527", "c"]);
        assert_eq!(
            session.tracker().ledger().donation_history()[0].campaign,
            "527"
        );

        feed(&mut session, &["", "y", "10", "5", "2", "c"]);
        assert_eq!(
            session.tracker().ledger().donation_history()[1].campaign,
            "Fair Fight"
        );
    }

    #[test]
    fn campaign_can_be_picked_by_name() {
        let mut session = session();
        feed(&mut session, &["y", "8", "common defense", "confirm"]);
        assert_eq!(
            session.tracker().ledger().donation_history()[0].campaign,
            "Common Defense"
        );
    }

    #[test]
    fn bad_input_is_refused_without_recording() {
        let mut session = session();
        let replies = feed(&mut session, &["maybe", "y", "-5", "abc", "9"]);
        assert_eq!(replies[0].lines, ["Please answer y or n."]);
        assert!(replies[2].lines[0].starts_with("Invalid amount"));
        assert_eq!(session.tracker().step(), FlowStep::ShowDonation);

        let replies = feed(&mut session, &["42", "Nobody"]);
        assert!(replies[0].lines[0].starts_with("Pick a campaign"));
        assert!(replies[1].lines[0].starts_with("Pick a campaign"));
        assert!(session.tracker().ledger().donation_history().is_empty());
    }

    #[test]
    fn no_shows_encouragement() {
        let mut session = session();
        let replies = feed(&mut session, &["n"]);
        assert_eq!(replies[0].lines, [ENCOURAGEMENT]);
        assert!(session.tracker().flow().encouragement_shown());
        assert_eq!(session.tracker().step(), FlowStep::AskPurchase);
    }

    #[test]
    fn clear_needs_confirmation() {
        let mut session = session();
        feed(&mut session, &["y", "10", ":clear", "no"]);
        assert_eq!(session.tracker().ledger().purchase_history().len(), 1);
        assert_eq!(session.tracker().step(), FlowStep::ShowDonation);

        feed(&mut session, &[":clear", "yes"]);
        assert!(session.tracker().ledger().is_empty());
        assert_eq!(session.tracker().step(), FlowStep::AskPurchase);
    }

    #[test]
    fn commands_work_in_any_step() {
        let mut session = session();
        feed(&mut session, &["y"]);
        let replies = feed(&mut session, &[":totals", ":campaigns", ":bogus", ":quit"]);
        assert!(replies[0].lines[0].contains("Total purchases: $0.00"));
        assert!(replies[1].lines[0].contains("Working Families Party"));
        assert!(replies[2].lines[0].starts_with("Unknown command"));
        assert!(replies[3].quit);
        assert_eq!(session.tracker().step(), FlowStep::EnterAmount);

        feed(&mut session, &[":reset"]);
        assert_eq!(session.tracker().step(), FlowStep::AskPurchase);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_delivers_only_the_current_ticket() {
        let mut session = session();
        let (sender, mut expiries) = mpsc::unbounded_channel();
        let mut timer = EncouragementTimer::new(sender);

        session.handle_line("n");
        let first = session.tracker().flow().encouragement().active();
        timer.sync(first);

        tokio::time::sleep(Duration::from_secs(1)).await;
        session.handle_line("n");
        let second = session.tracker().flow().encouragement().active();
        timer.sync(second);
        assert_ne!(first, second);

        tokio::time::sleep(ENCOURAGEMENT_DURATION).await;
        let delivered = expiries.recv().await.unwrap();
        assert_eq!(Some(delivered), second);
        assert!(expiries.try_recv().is_err());

        assert!(session.expire_encouragement(delivered));
        assert!(!session.tracker().flow().encouragement_shown());
    }

    #[tokio::test(start_paused = true)]
    async fn answering_yes_cancels_the_timer() {
        let mut session = session();
        let (sender, mut expiries) = mpsc::unbounded_channel();
        let mut timer = EncouragementTimer::new(sender);

        session.handle_line("n");
        timer.sync(session.tracker().flow().encouragement().active());
        session.handle_line("y");
        timer.sync(session.tracker().flow().encouragement().active());

        tokio::time::sleep(ENCOURAGEMENT_DURATION * 2).await;
        assert!(expiries.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_drives_a_scripted_session() {
        let script: &[u8] = b"y\n40\n2\nc\n\n:quit\n";
        let mut output = Vec::new();
        let store = MemoryStore::new();
        let session = Session::new(
            Tracker::open(store.clone(), CampaignDirectory::default()),
            chrono_tz::UTC,
        );

        run(session, script, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Recorded purchase of $40.00."));
        assert!(text.contains("Thank you for your donation of $20.00 to Fair Fight!"));
        let reopened = Tracker::open(store, CampaignDirectory::default());
        assert_eq!(reopened.ledger().total_donations().value(), dec!(20));
    }
}
