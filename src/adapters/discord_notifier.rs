//! Discord webhook notifier.
//!
//! Posts `{"content": text}` to the configured webhook. Discord caps a
//! message at 2000 characters, so longer text is sent in line-aligned parts.

use crate::domain::error::TraderError;
use crate::ports::notify_port::NotifyPort;
use reqwest::blocking::Client;
use serde_json::json;
use tracing::error;

pub const MAX_MESSAGE_CHARS: usize = 2000;

pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }

    fn post(&self, content: &str) -> Result<(), TraderError> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .map_err(|e| TraderError::Notify {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            error!("discord webhook rejected message: {status} {body}");
            return Err(TraderError::Notify {
                reason: format!("webhook returned HTTP {status}"),
            });
        }
        Ok(())
    }
}

/// Split on line boundaries so each part fits in `limit` characters. A
/// single line longer than the limit is cut at character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line: Vec<char> = line.chars().collect();
        while line.len() > limit {
            let rest = line.split_off(limit);
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            parts.push(line.iter().collect());
            line = rest;
        }
        let line: String = line.into_iter().collect();
        let needed = current.chars().count() + line.chars().count() + usize::from(!current.is_empty());
        if needed > limit && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

impl NotifyPort for DiscordNotifier {
    fn send(&self, text: &str) -> Result<(), TraderError> {
        for part in split_message(text, MAX_MESSAGE_CHARS) {
            self.post(&part)?;
        }
        Ok(())
    }
}
