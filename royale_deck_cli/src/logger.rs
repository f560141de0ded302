use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: u128,
    pub action: String,
    pub detail: String,
}

impl LogEntry {
    fn new(action: &str, detail: &str) -> Self {
        Self {
            timestamp: now_millis(),
            action: action.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// History of the edits made during one deck-building session.
pub struct SessionLog {
    pub session_name: String,
    pub entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            session_name: format!("session-{}", now_millis() / 1000),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, action: &str, detail: &str) {
        tracing::debug!(action, detail, "deck edit");
        self.entries.push(LogEntry::new(action, detail));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "=== {} ===", self.session_name)?;
        if self.entries.is_empty() {
            writeln!(out, "(no edits yet)")?;
        }
        for (i, e) in self.entries.iter().enumerate() {
            writeln!(out, "{:>3}. [{}] {} {}", i + 1, e.timestamp, e.action, e.detail)?;
        }
        Ok(())
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}
