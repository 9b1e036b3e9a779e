//! # Actions
//!
//! Everything that can happen in Evagent becomes an `Action`.
//! User submits the company form? That's `Action::SubmitProfile(profile)`.
//! Backend responds? That's `Action::ProfileSubmitted(result)`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state and returns an `Effect` describing the I/O the
//! adapter should start next. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Backend failures arrive as `Err(String)`: the adapter has already logged
//! the full `BackendError` by the time the action is dispatched.

use std::path::PathBuf;

use log::{debug, error, info, warn};

use crate::core::profile::{
    CompanyProfile, FilteredClient, InviteeProfile, client_emails, compose_email_prompt,
    merge_potential_clients,
};
use crate::core::state::App;
use crate::core::wizard::{Trigger, WizardStep};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,

    // Connection gate
    ConnectionStatusChecked(bool),
    SubmitConnection(String),
    ConnectionTested(bool),
    ConnectionSaved(Result<(), String>),

    // Wizard
    SubmitProfile(CompanyProfile),
    ProfileSubmitted(Result<String, String>),
    UploadSpreadsheet(PathBuf),
    SpreadsheetUploaded(Result<Vec<InviteeProfile>, String>),
    ProcessInvitees,
    InviteesProcessed(Result<Vec<FilteredClient>, String>),
    GenerateEmails,
    EmailsGenerated(Result<String, String>),
    SendEmails,
    EmailsSent(Result<usize, String>),

    // Chat
    SubmitChat(String),
    ChatReplied {
        ticket: u64,
        result: Result<String, String>,
    },
    TypingElapsed(u64),
}

/// I/O the adapter must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    TestConnection(String),
    SaveConnection(String),
    /// Post the composed profile message to the chat endpoint.
    SendProfile(String),
    UploadSpreadsheet(PathBuf),
    ProcessInvitees(Vec<String>),
    /// Post the composed email prompt to the chat endpoint.
    GenerateEmails(String),
    SendEmails(Vec<String>),
    /// Post a chat message and arm the typing timer for `ticket`.
    SendChat { ticket: u64, message: String },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,

        Action::ConnectionStatusChecked(connected) => {
            if connected && !app.gate.is_connected() {
                info!("Backend already connected, skipping connection setup");
                app.gate.already_connected();
                app.status_message = "Connected".to_string();
            }
            Effect::None
        }
        Action::SubmitConnection(connection_string) => match app.gate.submit(&connection_string) {
            Some(cs) => {
                app.status_message = "Testing connection...".to_string();
                Effect::TestConnection(cs)
            }
            None => Effect::None,
        },
        Action::ConnectionTested(ok) => match app.gate.tested(ok) {
            Some(cs) => {
                app.status_message = "Saving connection...".to_string();
                Effect::SaveConnection(cs)
            }
            None => {
                if !ok {
                    warn!("Connection string rejected by backend");
                    app.status_message = "Connection failed".to_string();
                }
                Effect::None
            }
        },
        Action::ConnectionSaved(result) => {
            let ok = result.is_ok();
            if let Err(e) = result {
                error!("Failed to save connection: {}", e);
            }
            app.gate.saved(ok);
            if app.gate.is_connected() {
                app.status_message = "Connected".to_string();
            }
            Effect::None
        }

        Action::SubmitProfile(profile) => {
            if !profile.is_complete() {
                app.status_message =
                    "Please fill in the company name, description and ideal profile".to_string();
                return Effect::None;
            }
            if !begin_step(app, WizardStep::Description) {
                return Effect::None;
            }
            let message = profile.to_agent_message();
            app.profile = profile;
            app.status_message = "Sending company profile...".to_string();
            Effect::SendProfile(message)
        }
        Action::ProfileSubmitted(result) => {
            match result {
                Ok(reply) => {
                    if complete_step(app, WizardStep::Description) {
                        app.profile_reply = Some(reply);
                        app.status_message = "Company profile saved".to_string();
                    }
                }
                Err(e) => {
                    error!("Company profile submission failed: {}", e);
                    fail_step(app, WizardStep::Description, &e);
                }
            }
            Effect::None
        }

        Action::UploadSpreadsheet(path) => {
            if path.as_os_str().is_empty() {
                app.status_message = "Enter the path of the spreadsheet to upload".to_string();
                return Effect::None;
            }
            if !begin_step(app, WizardStep::File) {
                return Effect::None;
            }
            app.status_message = format!("Uploading {}...", path.display());
            Effect::UploadSpreadsheet(path)
        }
        Action::SpreadsheetUploaded(result) => {
            match result {
                Ok(invitees) => {
                    if complete_step(app, WizardStep::File) {
                        info!("Loaded {} LinkedIn URLs", invitees.len());
                        app.status_message = format!("Loaded {} LinkedIn URLs", invitees.len());
                        app.invitees = invitees;
                    }
                }
                Err(e) => {
                    error!("Spreadsheet upload failed: {}", e);
                    fail_step(app, WizardStep::File, &e);
                }
            }
            Effect::None
        }

        Action::ProcessInvitees => {
            if app.invitees.is_empty() {
                app.status_message = "No LinkedIn URLs to process".to_string();
                return Effect::None;
            }
            if !begin_step(app, WizardStep::Process) {
                return Effect::None;
            }
            app.status_message = format!("Processing {} profiles...", app.invitees.len());
            Effect::ProcessInvitees(app.linkedin_urls())
        }
        Action::InviteesProcessed(result) => {
            match result {
                Ok(results) => {
                    if complete_step(app, WizardStep::Process) {
                        app.clients = merge_potential_clients(&app.invitees, &results);
                        info!(
                            "{} of {} invitees are potential clients",
                            app.clients.len(),
                            app.invitees.len()
                        );
                        app.status_message =
                            format!("Found {} potential clients", app.clients.len());
                    }
                }
                Err(e) => {
                    error!("Processing invitees failed: {}", e);
                    fail_step(app, WizardStep::Process, &e);
                }
            }
            Effect::None
        }

        Action::GenerateEmails => {
            if app.clients.is_empty() {
                app.status_message = "No potential clients to write to".to_string();
                return Effect::None;
            }
            if !begin_step(app, WizardStep::Emails) {
                return Effect::None;
            }
            app.status_message = "Generating emails...".to_string();
            Effect::GenerateEmails(compose_email_prompt(&app.profile, &app.clients))
        }
        Action::EmailsGenerated(result) => {
            match result {
                Ok(draft) => {
                    if complete_step(app, WizardStep::Emails) {
                        app.email_draft = Some(draft);
                        app.status_message = "Emails generated".to_string();
                    }
                }
                Err(e) => {
                    error!("Email generation failed: {}", e);
                    fail_step(app, WizardStep::Emails, &e);
                }
            }
            Effect::None
        }

        Action::SendEmails => {
            if app.wizard.step() != WizardStep::Emails || app.sending_emails {
                return Effect::None;
            }
            let emails = client_emails(&app.clients);
            if emails.is_empty() {
                app.status_message = "None of the potential clients has an email address".to_string();
                return Effect::None;
            }
            app.sending_emails = true;
            app.status_message = format!("Sending {} emails...", emails.len());
            Effect::SendEmails(emails)
        }
        Action::EmailsSent(result) => {
            app.sending_emails = false;
            match result {
                Ok(1) => app.status_message = "Sent 1 email".to_string(),
                Ok(count) => app.status_message = format!("Sent {} emails", count),
                Err(e) => {
                    error!("Sending emails failed: {}", e);
                    app.status_message = format!("Sending emails failed: {}", e);
                }
            }
            Effect::None
        }

        Action::SubmitChat(text) => {
            if text.trim().is_empty() {
                return Effect::None;
            }
            let ticket = app.chat.begin_send(text.clone());
            debug!("Chat message queued (ticket={})", ticket);
            Effect::SendChat {
                ticket,
                message: text,
            }
        }
        Action::ChatReplied { ticket, result } => {
            match result {
                Ok(reply) => {
                    if !app.chat.confirm(ticket, reply) {
                        debug!("Ignoring reply for settled ticket {}", ticket);
                    }
                }
                Err(e) => {
                    error!("Chat message failed (ticket={}): {}", ticket, e);
                    app.chat.fail(ticket);
                    app.status_message = "Message not delivered".to_string();
                }
            }
            Effect::None
        }
        Action::TypingElapsed(ticket) => {
            app.chat.typing_elapsed(ticket);
            Effect::None
        }
    }
}

/// Moves the step's trigger to in-flight, reporting rejections in the status bar.
fn begin_step(app: &mut App, step: WizardStep) -> bool {
    match app.wizard.begin(step) {
        Ok(()) => true,
        Err(e) => {
            debug!("Rejected {:?} trigger: {}", step, e);
            app.status_message = format!("{}: {}", step.label(), e);
            false
        }
    }
}

/// Completes the in-flight step. Returns false for a stale completion.
fn complete_step(app: &mut App, step: WizardStep) -> bool {
    match app.wizard.succeed(step) {
        Ok(now) => {
            info!("Wizard step {:?} completed, now at {:?}", step, now);
            true
        }
        Err(e) => {
            warn!("Ignoring stale completion for {:?}: {}", step, e);
            false
        }
    }
}

fn fail_step(app: &mut App, step: WizardStep, reason: &str) {
    match app.wizard.fail(step) {
        Ok(Trigger::Locked) => {
            app.status_message = format!("{} failed: {} (disabled)", step.label(), reason);
        }
        Ok(_) => {
            app.status_message = format!("{} failed: {}", step.label(), reason);
        }
        Err(e) => warn!("Ignoring stale failure for {:?}: {}", step, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::{Delivery, Sender};
    use crate::core::gate::INVALID_CONNECTION_ERROR;
    use crate::core::wizard::FailurePolicy;
    use crate::test_support::{test_app, test_app_with_policy};

    fn acme() -> CompanyProfile {
        CompanyProfile {
            name: "Acme".to_string(),
            description: "...".to_string(),
            ideal_profile: "...".to_string(),
        }
    }

    fn invitee(url: &str) -> InviteeProfile {
        InviteeProfile {
            linkedin_url: url.to_string(),
            name: None,
            email: None,
        }
    }

    fn matched(url: &str, reason: &str) -> FilteredClient {
        FilteredClient {
            url: url.to_string(),
            match_reason: Some(reason.to_string()),
            recommendations: None,
            analysis: None,
        }
    }

    /// Drives the app to the given step through successful calls.
    fn advance_to(app: &mut App, step: WizardStep) {
        if step > WizardStep::Description {
            update(app, Action::SubmitProfile(acme()));
            update(app, Action::ProfileSubmitted(Ok("noted".to_string())));
        }
        if step > WizardStep::File {
            update(app, Action::UploadSpreadsheet(PathBuf::from("guests.xlsx")));
            update(
                app,
                Action::SpreadsheetUploaded(Ok(vec![invitee("https://linkedin.com/in/a")])),
            );
        }
        if step > WizardStep::Process {
            update(app, Action::ProcessInvitees);
            update(
                app,
                Action::InviteesProcessed(Ok(vec![matched("https://linkedin.com/in/a", "fits ICP")])),
            );
        }
        assert_eq!(app.wizard.step(), step);
    }

    // ==========================================================================
    // Connection gate
    // ==========================================================================

    #[test]
    fn test_connection_happy_path() {
        let mut app = test_app();
        let effect = update(&mut app, Action::SubmitConnection("conn".to_string()));
        assert_eq!(effect, Effect::TestConnection("conn".to_string()));

        let effect = update(&mut app, Action::ConnectionTested(true));
        assert_eq!(effect, Effect::SaveConnection("conn".to_string()));

        assert_eq!(update(&mut app, Action::ConnectionSaved(Ok(()))), Effect::None);
        assert!(app.gate.is_connected());
    }

    #[test]
    fn test_connection_rejected_keeps_gate_mounted() {
        let mut app = test_app();
        update(&mut app, Action::SubmitConnection("bad".to_string()));
        let effect = update(&mut app, Action::ConnectionTested(false));
        assert_eq!(effect, Effect::None);
        assert!(!app.gate.is_connected());
        assert_eq!(app.gate.error.as_deref(), Some(INVALID_CONNECTION_ERROR));
    }

    #[test]
    fn test_blank_connection_makes_no_request() {
        let mut app = test_app();
        assert_eq!(
            update(&mut app, Action::SubmitConnection("  ".to_string())),
            Effect::None
        );
        assert!(app.gate.error.is_some());
    }

    #[test]
    fn test_connection_status_skips_gate() {
        let mut app = test_app();
        update(&mut app, Action::ConnectionStatusChecked(true));
        assert!(app.gate.is_connected());

        let mut app = test_app();
        update(&mut app, Action::ConnectionStatusChecked(false));
        assert!(!app.gate.is_connected());
    }

    // ==========================================================================
    // Wizard scenarios
    // ==========================================================================

    #[test]
    fn test_submit_profile_moves_to_file() {
        let mut app = test_app();
        let effect = update(&mut app, Action::SubmitProfile(acme()));
        match effect {
            Effect::SendProfile(msg) => assert!(msg.contains("Acme")),
            other => panic!("expected SendProfile, got {other:?}"),
        }
        // Not advanced until the call succeeds
        assert_eq!(app.wizard.step(), WizardStep::Description);

        update(&mut app, Action::ProfileSubmitted(Ok("Got it".to_string())));
        assert_eq!(app.wizard.step(), WizardStep::File);
        assert_eq!(app.profile.name, "Acme");
        assert_eq!(app.profile_reply.as_deref(), Some("Got it"));
    }

    #[test]
    fn test_incomplete_profile_is_not_sent() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::SubmitProfile(CompanyProfile {
                name: "Acme".to_string(),
                ..Default::default()
            }),
        );
        assert_eq!(effect, Effect::None);
        assert!(app.wizard.can_begin());
    }

    #[test]
    fn test_duplicate_profile_submit_while_in_flight() {
        let mut app = test_app();
        update(&mut app, Action::SubmitProfile(acme()));
        assert_eq!(update(&mut app, Action::SubmitProfile(acme())), Effect::None);
    }

    #[test]
    fn test_upload_populates_urls_and_moves_to_process() {
        let mut app = test_app();
        advance_to(&mut app, WizardStep::File);

        let effect = update(&mut app, Action::UploadSpreadsheet(PathBuf::from("guests.xlsx")));
        assert_eq!(effect, Effect::UploadSpreadsheet(PathBuf::from("guests.xlsx")));

        update(
            &mut app,
            Action::SpreadsheetUploaded(Ok(vec![invitee("https://linkedin.com/in/a")])),
        );
        assert_eq!(app.linkedin_urls(), vec!["https://linkedin.com/in/a"]);
        assert_eq!(app.wizard.step(), WizardStep::Process);
    }

    #[test]
    fn test_process_filters_and_moves_to_emails() {
        let mut app = test_app();
        advance_to(&mut app, WizardStep::Process);

        let effect = update(&mut app, Action::ProcessInvitees);
        assert_eq!(
            effect,
            Effect::ProcessInvitees(vec!["https://linkedin.com/in/a".to_string()])
        );

        update(
            &mut app,
            Action::InviteesProcessed(Ok(vec![matched("https://linkedin.com/in/a", "fits ICP")])),
        );
        assert_eq!(app.clients.len(), 1);
        assert_eq!(app.clients[0].invitee.linkedin_url, "https://linkedin.com/in/a");
        assert_eq!(app.wizard.step(), WizardStep::Emails);
    }

    #[test]
    fn test_generate_emails_stores_draft_verbatim() {
        let mut app = test_app();
        advance_to(&mut app, WizardStep::Emails);

        match update(&mut app, Action::GenerateEmails) {
            Effect::GenerateEmails(prompt) => {
                assert!(prompt.contains("Acme"));
                assert!(prompt.contains("https://linkedin.com/in/a"));
            }
            other => panic!("expected GenerateEmails, got {other:?}"),
        }

        let draft = "Dear A,\n\nHello.\n".to_string();
        update(&mut app, Action::EmailsGenerated(Ok(draft.clone())));
        assert_eq!(app.email_draft, Some(draft));
        assert_eq!(app.wizard.step(), WizardStep::Emails);

        // Regeneration is allowed
        assert_ne!(update(&mut app, Action::GenerateEmails), Effect::None);
    }

    #[test]
    fn test_failed_step_keeps_step_and_reenables() {
        let mut app = test_app_with_policy(FailurePolicy::Reenable);
        update(&mut app, Action::SubmitProfile(acme()));
        update(&mut app, Action::ProfileSubmitted(Err("boom".to_string())));
        assert_eq!(app.wizard.step(), WizardStep::Description);
        assert!(app.status_message.contains("boom"));
        assert_ne!(update(&mut app, Action::SubmitProfile(acme())), Effect::None);
    }

    #[test]
    fn test_failed_step_with_lockout_stays_disabled() {
        let mut app = test_app_with_policy(FailurePolicy::Lockout);
        update(&mut app, Action::SubmitProfile(acme()));
        update(&mut app, Action::ProfileSubmitted(Err("boom".to_string())));
        assert_eq!(app.wizard.trigger(), Trigger::Locked);
        assert_eq!(update(&mut app, Action::SubmitProfile(acme())), Effect::None);
        assert_eq!(app.wizard.step(), WizardStep::Description);
    }

    #[test]
    fn test_step_never_decreases() {
        let mut app = test_app();
        advance_to(&mut app, WizardStep::Emails);

        // Late or out-of-order completions for earlier steps are ignored
        update(&mut app, Action::ProfileSubmitted(Ok("late".to_string())));
        update(&mut app, Action::SpreadsheetUploaded(Err("late".to_string())));
        update(&mut app, Action::InviteesProcessed(Ok(vec![])));
        assert_eq!(app.wizard.step(), WizardStep::Emails);
        assert_eq!(app.clients.len(), 1);
    }

    #[test]
    fn test_process_without_invitees_is_rejected() {
        let mut app = test_app();
        advance_to(&mut app, WizardStep::Process);
        app.invitees.clear();
        assert_eq!(update(&mut app, Action::ProcessInvitees), Effect::None);
    }

    #[test]
    fn test_send_emails_requires_addresses() {
        let mut app = test_app();
        advance_to(&mut app, WizardStep::Emails);
        assert_eq!(update(&mut app, Action::SendEmails), Effect::None);

        app.clients[0].invitee.email = Some("a@example.com".to_string());
        assert_eq!(
            update(&mut app, Action::SendEmails),
            Effect::SendEmails(vec!["a@example.com".to_string()])
        );
        // Gated while in flight
        assert_eq!(update(&mut app, Action::SendEmails), Effect::None);

        update(&mut app, Action::EmailsSent(Ok(1)));
        assert!(!app.sending_emails);
        assert_eq!(app.status_message, "Sent 1 email");
    }

    #[test]
    fn test_emails_sent_status_pluralizes() {
        let mut app = test_app();
        update(&mut app, Action::EmailsSent(Ok(3)));
        assert_eq!(app.status_message, "Sent 3 emails");
        update(&mut app, Action::EmailsSent(Ok(0)));
        assert_eq!(app.status_message, "Sent 0 emails");
    }

    // ==========================================================================
    // Chat
    // ==========================================================================

    #[test]
    fn test_chat_round_trip() {
        let mut app = test_app();
        let initial = app.chat.len();

        let effect = update(&mut app, Action::SubmitChat("hello".to_string()));
        let Effect::SendChat { ticket, message } = effect else {
            panic!("expected SendChat");
        };
        assert_eq!(message, "hello");
        assert!(app.chat.is_typing());

        update(
            &mut app,
            Action::ChatReplied {
                ticket,
                result: Ok("hi there".to_string()),
            },
        );
        assert_eq!(app.chat.len(), initial + 2);
        assert!(!app.chat.is_typing());
        let last = app.chat.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "hi there");
    }

    #[test]
    fn test_overlapping_chat_replies_follow_their_messages() {
        let mut app = test_app();
        let submit = |app: &mut App, text: &str| match update(
            app,
            Action::SubmitChat(text.to_string()),
        ) {
            Effect::SendChat { ticket, .. } => ticket,
            other => panic!("expected SendChat, got {:?}", other),
        };
        let first = submit(&mut app, "q1");
        let second = submit(&mut app, "q2");

        for (ticket, reply) in [(first, "a1"), (second, "a2")] {
            update(
                &mut app,
                Action::ChatReplied {
                    ticket,
                    result: Ok(reply.to_string()),
                },
            );
        }

        let texts: Vec<&str> = app.chat.messages()[1..]
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["q1", "a1", "q2", "a2"]);
        assert!(!app.chat.is_typing());
    }

    #[test]
    fn test_chat_failure_marks_message() {
        let mut app = test_app();
        let Effect::SendChat { ticket, .. } =
            update(&mut app, Action::SubmitChat("hello".to_string()))
        else {
            panic!("expected SendChat");
        };
        update(
            &mut app,
            Action::ChatReplied {
                ticket,
                result: Err("refused".to_string()),
            },
        );
        assert_eq!(app.chat.get(ticket).unwrap().delivery, Delivery::Failed);
        assert_eq!(app.chat.messages().last().unwrap().sender, Sender::User);
    }

    #[test]
    fn test_blank_chat_is_ignored() {
        let mut app = test_app();
        let initial = app.chat.len();
        assert_eq!(update(&mut app, Action::SubmitChat("  ".to_string())), Effect::None);
        assert_eq!(app.chat.len(), initial);
    }

    #[test]
    fn test_typing_elapsed_clears_indicator() {
        let mut app = test_app();
        let Effect::SendChat { ticket, .. } =
            update(&mut app, Action::SubmitChat("hello".to_string()))
        else {
            panic!("expected SendChat");
        };
        update(&mut app, Action::TypingElapsed(ticket));
        assert!(!app.chat.is_typing());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
