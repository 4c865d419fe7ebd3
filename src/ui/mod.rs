pub mod commands;
pub mod render;

use std::io::{self, BufRead, Write};

use log::info;

use crate::api::client::ApiClient;
use crate::api::models::{FollowUpUpdate, MessageKind};
use crate::config::Config;
use crate::session::Session;
use commands::{Command, HELP, parse_command};

/// The shared-password gate. Three attempts, then the program exits. An
/// empty configured password disables the gate entirely.
pub fn password_gate(cfg: &Config) -> bool {
    if cfg.password.is_empty() {
        return true;
    }
    let stdin = io::stdin();
    for _ in 0..3 {
        print!("password: ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            return false;
        }
        if line.trim() == cfg.password {
            return true;
        }
        println!("wrong password");
    }
    false
}

pub async fn run(client: &ApiClient, session: &mut Session) {
    println!("{HELP}");
    session.refresh_contacts(client).await;
    println!("{}", render::render_contacts(session));
    for warning in session.warnings.drain(..) {
        println!("warning: {warning}");
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => dispatch(client, session, command).await,
            Err(message) => println!("{message}"),
        }
        for warning in session.warnings.drain(..) {
            println!("warning: {warning}");
        }
    }
    info!("session closed");
}

async fn dispatch(client: &ApiClient, session: &mut Session, command: Command) {
    match command {
        Command::Contacts => {
            session.refresh_contacts(client).await;
            println!("{}", render::render_contacts(session));
        }
        Command::FollowUpOnly(only) => {
            session.contact_filter.follow_up_only = only;
            session.refresh_contacts(client).await;
            println!("{}", render::render_contacts(session));
        }
        Command::PhoneQuery(query) => {
            session.contact_filter.phone_query = query;
            println!("{}", render::render_contacts(session));
        }
        Command::NameQuery(query) => {
            session.contact_filter.name_query = query;
            println!("{}", render::render_contacts(session));
        }
        Command::Open(phone) => {
            session.select(client, &phone).await;
            let automated = client.automation_status(&phone).await;
            println!("{}", render::render_conversation(session));
            println!("automation: {}", if automated { "on" } else { "off" });
        }
        Command::Next => {
            session.next_page(client).await;
            println!("{}", render::render_conversation(session));
        }
        Command::Prev => {
            session.prev_page(client).await;
            println!("{}", render::render_conversation(session));
        }
        Command::DateFilter(date) => {
            session.message_filter.date = date;
            println!("{}", render::render_conversation(session));
        }
        Command::TimeFilter(window) => {
            match window {
                Some((from, to)) => {
                    session.message_filter.time_from = Some(from);
                    session.message_filter.time_to = Some(to);
                }
                None => {
                    session.message_filter.time_from = None;
                    session.message_filter.time_to = None;
                }
            }
            println!("{}", render::render_conversation(session));
        }
        Command::Send(text) => {
            session.draft = text;
            if session.send_draft(client, MessageKind::Text, None).await {
                println!("{}", render::render_conversation(session));
            }
        }
        Command::Template(name) => {
            session.draft.clear();
            if session
                .send_draft(client, MessageKind::Template, Some(&name))
                .await
            {
                println!("{}", render::render_conversation(session));
            }
        }
        Command::Flag { id, needed, note } => {
            let update = FollowUpUpdate {
                follow_up_needed: needed,
                notes: note,
                handled_by: Some("Dashboard User".to_string()),
            };
            if session.update_follow_up(client, id, update).await {
                println!("{}", render::render_conversation(session));
            }
        }
        Command::DeleteMessage(id) => {
            if session.remove_message(client, id).await {
                println!("{}", render::render_conversation(session));
            }
        }
        Command::Purge => {
            if session.clear_conversation(client).await {
                println!("conversation cleared");
            }
        }
        Command::Automation(enable) => {
            if session.set_automation(client, enable).await {
                println!("automation: {}", if enable { "on" } else { "off" });
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
