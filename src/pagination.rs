/// Offset cursor over one conversation. The backend never reports a total
/// count, so the cursor cannot know where the end is; it finds out by
/// receiving an empty page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    phone: String,
    offset: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(phone: impl Into<String>, page_size: usize) -> Self {
        Self {
            phone: phone.into(),
            offset: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Switch conversations; the cursor restarts unless the contact is
    /// unchanged.
    pub fn select(&mut self, phone: &str) {
        if self.phone != phone {
            self.phone = phone.to_string();
            self.offset = 0;
        }
    }

    /// Always advances, even off a short page. An overrun just means the
    /// next fetch comes back empty.
    pub fn next(&mut self) {
        self.offset += self.page_size;
    }

    /// Steps back one page, clamped at the start. Returns whether the
    /// cursor actually moved.
    pub fn prev(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.page_size);
        true
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    /// 1-based "showing X-Y" bounds for the current page, `None` when the
    /// page is empty.
    pub fn range(&self, page_len: usize) -> Option<(usize, usize)> {
        if page_len == 0 {
            None
        } else {
            Some((self.offset + 1, self.offset + page_len))
        }
    }
}
