use chrono::NaiveDate;

use crate::api::models::Direction;
use crate::filter::match_spans;
use crate::session::Session;
use crate::timeutil;

/// Wraps every match of `query` in brackets so it stands out on a plain
/// terminal.
pub fn highlight(text: &str, query: &str) -> String {
    let spans = match_spans(text, query);
    if spans.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + spans.len() * 2);
    let mut cursor = 0;
    for (start, end) in spans {
        out.push_str(&text[cursor..start]);
        out.push('[');
        out.push_str(&text[start..end]);
        out.push(']');
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

pub fn render_contacts(session: &Session) -> String {
    let visible = session.visible_contacts();
    if visible.is_empty() {
        return "no contacts".to_string();
    }
    let mut out = String::new();
    for contact in visible {
        let marker = if contact.follow_up_open { "!" } else { " " };
        let name = highlight(contact.display_name(), &session.contact_filter.name_query);
        let phone = highlight(&contact.phone, &session.contact_filter.phone_query);
        out.push_str(&format!("{marker} {name}  <{phone}>\n"));
    }
    out.push_str(&format!("{} contact(s)", session.visible_contacts().len()));
    out
}

pub fn render_conversation(session: &Session) -> String {
    let Some(phone) = session.selected_phone() else {
        return "no conversation open".to_string();
    };
    let today = timeutil::now_ist().date_naive();
    let mut out = format!("conversation with {phone}\n");
    let visible = session.visible_messages();
    let mut last_day: Option<NaiveDate> = None;
    for message in &visible {
        let local = message.local_time();
        if last_day != Some(local.date_naive()) {
            out.push_str(&format!("--- {} ---\n", timeutil::day_label(local, today)));
            last_day = Some(local.date_naive());
        }
        let arrow = match message.direction {
            Direction::Incoming => "<<",
            Direction::Outgoing => ">>",
        };
        let flag = if message.follow_up_needed { " [follow-up]" } else { "" };
        out.push_str(&format!(
            "{arrow} #{} {} {}{flag}\n",
            message.id,
            timeutil::clock(local),
            message.message,
        ));
        if let Some(notes) = message.notes.as_deref().filter(|n| !n.is_empty()) {
            out.push_str(&format!("      note: {notes}\n"));
        }
    }
    match session
        .pager
        .as_ref()
        .and_then(|p| p.range(session.messages.len()))
    {
        Some((from, to)) => out.push_str(&format!("showing {from}-{to} of messages")),
        None => out.push_str("no messages on this page"),
    }
    if session.message_filter.is_active() && visible.len() != session.messages.len() {
        out.push_str(&format!(" ({} after filters)", visible.len()));
    }
    out
}
