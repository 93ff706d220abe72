pub mod ci;
pub mod mattermost;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One communication event: a forum reply, a commit, a build notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub key: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    /// Thread identity when the source knows it (topic id, issue id, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
}

const REPLY_PREFIXES: [&str; 3] = ["re:", "fwd:", "fw:"];

impl Post {
    pub fn new(key: String, author: String, created_at: DateTime<Utc>, body: String) -> Self {
        Self {
            key,
            author,
            created_at,
            subject: None,
            body,
            thread: None,
        }
    }

    pub fn with_subject(mut self, subject: String) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn in_thread(mut self, thread: String) -> Self {
        self.thread = Some(thread);
        self
    }

    /// Subject when there is one, otherwise the first line of the body.
    pub fn summary(&self) -> &str {
        match self.subject.as_deref() {
            Some(subject) if !subject.is_empty() => subject,
            _ => self.body.split('\n').next().unwrap_or_default(),
        }
    }

    /// Explicit thread id, else the normalized subject, else the key itself.
    pub fn thread_key(&self) -> String {
        if let Some(thread) = self.thread.as_deref().filter(|t| !t.is_empty()) {
            return thread.to_string();
        }
        match self.subject.as_deref().map(normalize_subject) {
            Some(subject) if !subject.is_empty() => subject,
            _ => self.key.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            bail!("post by '{}' has an empty key", self.author);
        }
        if self.author.trim().is_empty() {
            bail!("post {} has an empty author", self.key);
        }
        Ok(())
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if let Some(subject) = self.subject.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("**{}**\n", subject.trim()));
        }
        out.push_str(&format!(
            "_by {} on {}_\n",
            self.author,
            self.created_at.format("%Y-%m-%d %H:%M")
        ));
        if !self.body.trim().is_empty() {
            out.push('\n');
            out.push_str(self.body.trim_end());
            out.push('\n');
        }
        out
    }
}

fn normalize_subject(subject: &str) -> String {
    let mut subject = subject.trim();
    // ascii lowercasing keeps byte offsets, so the prefix length is safe to slice on
    while let Some(prefix) = REPLY_PREFIXES
        .iter()
        .find(|p| subject.to_ascii_lowercase().starts_with(**p))
    {
        subject = subject[prefix.len()..].trim_start();
    }
    subject.to_lowercase()
}
