use crate::api::client::ApiClient;
use crate::api::models::{Contact, FollowUpUpdate, Message, MessageKind};
use crate::filter::{ContactFilter, MessageFilter};
use crate::pagination::Pager;

/// Everything the dashboard remembers between two user actions: loaded
/// contacts, the active filters, the conversation cursor, the current page,
/// the draft, and warnings waiting to be shown. Created after the password
/// gate, dropped when the user quits; nothing here survives the session.
#[derive(Debug, Default)]
pub struct Session {
    pub contacts: Vec<Contact>,
    pub contact_filter: ContactFilter,
    pub message_filter: MessageFilter,
    pub pager: Option<Pager>,
    pub messages: Vec<Message>,
    pub draft: String,
    pub warnings: Vec<String>,
    page_size: usize,
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    pub fn selected_phone(&self) -> Option<&str> {
        self.pager.as_ref().map(|p| p.phone())
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Reload the contact list. A backend refusal degrades to an empty
    /// sidebar, but the user gets told instead of seeing silence.
    pub async fn refresh_contacts(&mut self, client: &ApiClient) {
        match client
            .list_contacts(self.contact_filter.follow_up_only)
            .await
        {
            Ok(contacts) => self.contacts = contacts,
            Err(err) => {
                self.contacts.clear();
                self.warn(format!("could not load contacts ({err})"));
            }
        }
    }

    /// Open a conversation. Picking a different contact restarts the cursor
    /// at the first page.
    pub async fn select(&mut self, client: &ApiClient, phone: &str) {
        match self.pager.as_mut() {
            Some(pager) => pager.select(phone),
            None => self.pager = Some(Pager::new(phone, self.page_size)),
        }
        self.load_page(client).await;
    }

    pub async fn next_page(&mut self, client: &ApiClient) {
        if let Some(pager) = self.pager.as_mut() {
            pager.next();
            self.load_page(client).await;
        }
    }

    pub async fn prev_page(&mut self, client: &ApiClient) {
        let moved = match self.pager.as_mut() {
            Some(pager) => pager.prev(),
            None => false,
        };
        if moved {
            self.load_page(client).await;
        }
    }

    async fn load_page(&mut self, client: &ApiClient) {
        let Some(pager) = self.pager.as_ref() else {
            return;
        };
        let (phone, limit, offset) = (pager.phone().to_string(), pager.page_size(), pager.offset());
        match client.get_conversation(&phone, limit, offset).await {
            // an empty page is a normal answer when the cursor ran past the end
            Ok(messages) => self.messages = messages,
            Err(err) => {
                self.messages.clear();
                self.warn(format!("could not load conversation for {phone} ({err})"));
            }
        }
    }

    pub fn visible_contacts(&self) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| self.contact_filter.keeps(c))
            .collect()
    }

    pub fn visible_messages(&self) -> Vec<&Message> {
        self.message_filter.apply(&self.messages)
    }

    /// Send the draft through the webhook. Success means the webhook took
    /// the message; a failed history write only adds a warning.
    pub async fn send_draft(
        &mut self,
        client: &ApiClient,
        kind: MessageKind,
        template_name: Option<&str>,
    ) -> bool {
        let Some(phone) = self.selected_phone().map(str::to_string) else {
            self.warn("no conversation selected");
            return false;
        };
        let text = self.draft.trim().to_string();
        if text.is_empty() && kind == MessageKind::Text {
            self.warn("nothing to send");
            return false;
        }
        let outcome = client.send_message(&phone, &text, kind, template_name).await;
        if outcome.delivered {
            self.draft.clear();
            if !outcome.logged {
                self.warn("message sent but not recorded in history");
            }
            self.load_page(client).await;
        } else {
            self.warn(format!("could not send message to {phone}"));
        }
        outcome.delivered
    }

    pub async fn update_follow_up(
        &mut self,
        client: &ApiClient,
        id: i64,
        update: FollowUpUpdate,
    ) -> bool {
        let ok = client.patch_message(id, &update).await;
        if ok {
            self.load_page(client).await;
        } else {
            self.warn(format!("follow-up update for message {id} failed"));
        }
        ok
    }

    pub async fn remove_message(&mut self, client: &ApiClient, id: i64) -> bool {
        let ok = client.delete_message(id).await;
        if ok {
            self.load_page(client).await;
        } else {
            self.warn(format!("could not delete message {id}"));
        }
        ok
    }

    /// Wipe the selected contact's entire history and restart the cursor.
    pub async fn clear_conversation(&mut self, client: &ApiClient) -> bool {
        let Some(phone) = self.selected_phone().map(str::to_string) else {
            self.warn("no conversation selected");
            return false;
        };
        let ok = client.delete_conversation(&phone).await;
        if ok {
            self.pager = Some(Pager::new(phone, self.page_size));
            self.messages.clear();
        } else {
            self.warn(format!("could not clear conversation for {phone}"));
        }
        ok
    }

    pub async fn set_automation(&mut self, client: &ApiClient, enable: bool) -> bool {
        let Some(phone) = self.selected_phone().map(str::to_string) else {
            self.warn("no conversation selected");
            return false;
        };
        let ok = client.toggle_automation(&phone, enable).await;
        if !ok {
            self.warn(format!("could not change automation for {phone}"));
        }
        ok
    }
}
