use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Contacts,
    FollowUpOnly(bool),
    PhoneQuery(String),
    NameQuery(String),
    Open(String),
    Next,
    Prev,
    DateFilter(Option<NaiveDate>),
    TimeFilter(Option<(NaiveTime, NaiveTime)>),
    Send(String),
    Template(String),
    Flag {
        id: i64,
        needed: bool,
        note: Option<String>,
    },
    DeleteMessage(i64),
    Purge,
    Automation(bool),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match head {
        "contacts" | "ls" => Ok(Command::Contacts),
        "fu" => on_off(rest).map(Command::FollowUpOnly),
        "phone" => Ok(Command::PhoneQuery(rest.to_string())),
        "name" => Ok(Command::NameQuery(rest.to_string())),
        "open" if !rest.is_empty() => Ok(Command::Open(rest.to_string())),
        "open" => Err("usage: open <phone>".into()),
        "next" | "n" => Ok(Command::Next),
        "prev" | "p" => Ok(Command::Prev),
        "date" => {
            if rest.is_empty() || rest == "clear" {
                Ok(Command::DateFilter(None))
            } else {
                NaiveDate::parse_from_str(rest, "%Y-%m-%d")
                    .map(|d| Command::DateFilter(Some(d)))
                    .map_err(|_| "usage: date YYYY-MM-DD | date clear".to_string())
            }
        }
        "time" => {
            if rest.is_empty() || rest == "clear" {
                return Ok(Command::TimeFilter(None));
            }
            let mut parts = rest.split_whitespace();
            let window = match (parts.next(), parts.next()) {
                (Some(from), Some(to)) => {
                    let from = NaiveTime::parse_from_str(from, "%H:%M").ok();
                    let to = NaiveTime::parse_from_str(to, "%H:%M").ok();
                    from.zip(to)
                }
                _ => None,
            };
            window
                .map(|w| Command::TimeFilter(Some(w)))
                .ok_or_else(|| "usage: time HH:MM HH:MM | time clear".to_string())
        }
        "send" if !rest.is_empty() => Ok(Command::Send(rest.to_string())),
        "send" => Err("usage: send <text>".into()),
        "template" if !rest.is_empty() => Ok(Command::Template(rest.to_string())),
        "template" => Err("usage: template <name>".into()),
        "flag" => {
            let mut parts = rest.splitn(3, ' ');
            let id = parts.next().and_then(|s| s.parse::<i64>().ok());
            let needed = parts.next().map(|s| on_off(s)).transpose()?;
            match (id, needed) {
                (Some(id), Some(needed)) => Ok(Command::Flag {
                    id,
                    needed,
                    note: parts.next().map(|s| s.trim().to_string()),
                }),
                _ => Err("usage: flag <id> on|off [note]".into()),
            }
        }
        "delete" => rest
            .parse::<i64>()
            .map(Command::DeleteMessage)
            .map_err(|_| "usage: delete <message id>".to_string()),
        "purge" => Ok(Command::Purge),
        "auto" => on_off(rest).map(Command::Automation),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command {other:?}, try 'help'")),
    }
}

fn on_off(raw: &str) -> Result<bool, String> {
    match raw {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err("expected 'on' or 'off'".to_string()),
    }
}

pub const HELP: &str = "\
commands:
  contacts            refresh and list contacts
  fu on|off           only contacts with an open follow-up
  phone <text>        filter contacts by phone substring
  name <text>         filter contacts by name substring
  open <phone>        open a conversation
  next / prev         page through the conversation
  date YYYY-MM-DD     only messages on that day (IST); 'date clear' resets
  time HH:MM HH:MM    only messages in that window; 'time clear' resets
  send <text>         send a text message
  template <name>     send a template message
  flag <id> on|off [note]   set follow-up on a message
  delete <id>         delete one message
  purge               delete the whole conversation
  auto on|off         toggle the automation bot for this contact
  quit";
