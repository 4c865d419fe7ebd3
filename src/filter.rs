use chrono::{NaiveDate, NaiveTime};

use crate::api::models::{Contact, Message};
use crate::timeutil;

/// Narrows one conversation page by calendar date and/or time of day, both
/// evaluated in IST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub date: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
}

impl MessageFilter {
    pub fn is_active(&self) -> bool {
        self.date.is_some() || self.window().is_some()
    }

    /// The time window only exists when both bounds are set; the filter form
    /// always submits them as a pair, so a lone bound is ignored.
    fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.time_from, self.time_to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }

    pub fn apply<'a>(&self, messages: &'a [Message]) -> Vec<&'a Message> {
        if !self.is_active() {
            // deliberate bypass: with nothing set, the page passes untouched
            return messages.iter().collect();
        }
        messages.iter().filter(|m| self.keeps(m)).collect()
    }

    pub fn keeps(&self, message: &Message) -> bool {
        let local = timeutil::normalize(&message.timestamp);
        if let Some(date) = self.date {
            if local.date_naive() != date {
                return false;
            }
        }
        if let Some((from, to)) = self.window() {
            let tod = local.time();
            // closed interval: a message exactly at either bound stays
            if tod < from || tod > to {
                return false;
            }
        }
        true
    }
}

/// Contact-level narrowing. Substring matches are case-insensitive and make
/// no attempt to normalize phone formats: searching "+91" will not find a
/// contact stored without the prefix. That mirrors how the numbers are
/// stored upstream and is kept as documented behavior.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub phone_query: String,
    pub name_query: String,
    pub follow_up_only: bool,
}

impl ContactFilter {
    pub fn keeps(&self, contact: &Contact) -> bool {
        if self.follow_up_only && !contact.follow_up_open {
            return false;
        }
        if !self.phone_query.is_empty() && !contains_ci(&contact.phone, &self.phone_query) {
            return false;
        }
        if !self.name_query.is_empty() {
            match contact.client_name.as_deref() {
                Some(name) if contains_ci(name, &self.name_query) => {}
                _ => return false,
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Byte ranges of every case-insensitive occurrence of `query` in `text`,
/// for highlight rendering. ASCII-folded so the ranges stay valid offsets
/// into the original text.
pub fn match_spans(text: &str, query: &str) -> Vec<(usize, usize)> {
    if query.is_empty() {
        return Vec::new();
    }
    let hay = text.to_ascii_lowercase();
    let needle = query.to_ascii_lowercase();
    let mut spans = Vec::new();
    let mut start = 0;
    while let Some(pos) = hay[start..].find(&needle) {
        let begin = start + pos;
        spans.push((begin, begin + needle.len()));
        start = begin + needle.len();
    }
    spans
}
