use chrono::{DateTime, Utc};

/// One forum post with its replies
///
/// Absent text fields are kept as `None` and scanned as empty strings.
#[derive(Debug, Clone, Default)]
pub struct TextItem {
    pub id: String,
    pub created_utc: DateTime<Utc>,
    pub title: Option<String>,
    pub body: Option<String>,
    /// Reply bodies; deleted replies show up as `None`
    pub replies: Vec<Option<String>>,
}

impl TextItem {
    pub fn new(id: impl Into<String>, created_utc: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_utc,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_reply(mut self, reply: Option<String>) -> Self {
        self.replies.push(reply);
        self
    }

    /// Title and body joined by a newline
    pub fn primary_text(&self) -> String {
        format!(
            "{}\n{}",
            self.title.as_deref().unwrap_or(""),
            self.body.as_deref().unwrap_or("")
        )
    }
}
