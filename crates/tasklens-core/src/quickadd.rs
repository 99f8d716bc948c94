use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

/// Response shape of the external text-to-fields service. The service
/// receives free text and returns the extracted title, an ISO-8601 due
/// date, and a priority label; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedQuickAdd {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl ParsedQuickAdd {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("failed to parse quick-add service response")
    }
}

/// Boundary trait for the service itself. The engine never calls it;
/// callers decide when (and whether) to, typically gated by
/// [`wants_parsing`].
pub trait QuickAddParser {
    fn parse(&self, input: &str) -> anyhow::Result<ParsedQuickAdd>;
}

/// True when the free text mentions a date or priority keyword and is
/// therefore worth a parser round-trip.
pub fn wants_parsing(input: &str) -> bool {
    static KEYWORDS: OnceLock<Regex> = OnceLock::new();
    let re = KEYWORDS.get_or_init(|| {
        Regex::new(
            "(?i)tomorrow|today|next|monday|tuesday|wednesday|thursday|friday|saturday|sunday|urgent|high|low",
        )
        .expect("keyword pattern is valid")
    });
    re.is_match(input)
}

/// The fields a quick-add entry carries before the service has seen
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickAddDraft {
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: String,
}

impl QuickAddDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: None,
            priority: "medium".to_string(),
        }
    }

    /// Parsed fields win over the draft; the raw title is the fallback
    /// when the service returns none.
    pub fn merge(mut self, parsed: ParsedQuickAdd) -> Self {
        if let Some(title) = parsed.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(due) = parsed.due_date {
            self.due_date = Some(due);
        }
        if let Some(priority) = parsed.priority {
            self.priority = priority;
        }
        self
    }
}
