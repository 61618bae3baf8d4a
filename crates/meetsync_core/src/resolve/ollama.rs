//! Ollama chat client for venue inference.
//!
//! # Responsibility
//! - Build the structured chat request: rule prompt, reply schema,
//!   temperature zero.
//! - Decode the model reply into an optional venue name.
//!
//! # Invariants
//! - An empty reply means no venue, not a failure.
//! - A non-empty reply that is not the agreed JSON shape is a failure the
//!   caller must see.

use crate::config::OllamaConfig;
use crate::resolve::ResolveError;
use log::debug;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Upper bound on one inference round trip.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You extract venue names precisely. Follow instructions exactly.";

const VENUE_PROMPT: &str = r#"Extract venue name. Return JSON: {"venue_name": "X"} or {"venue_name": null}

RULES (apply in order):

1. CHECK FOR PLACEHOLDER AFTER LOCATION/VENUE
   Look for the exact pattern:
   - 'Location: TBD' or 'Location: TBA' or 'Location: To be determined'
   - 'Venue: TBD' or 'Venue: TBA' or 'Venue: Unknown'
   ONLY if TBD/TBA/etc comes IMMEDIATELY after 'Location:' or 'Venue:'
   → Return: null

   Counter-example: 'Talk TBD' + 'Location: Coder Faculty' → NOT a placeholder (TBD is for talk, not location)

2. EXPLICIT VENUE
   Look for these exact phrases:
   - 'Meetup will be at X'
   - 'will be at X'
   - 'held at X'
   - 'Location: X' where X is a real venue name (not TBD/TBA/Unknown/Pending/N/A)
   - 'Venue: X' where X is a real venue name
   → Return: X (venue name only, remove city/address)

   Examples:
   'Location: Coder Faculty' → 'Coder Faculty'
   'Meetup will be at La Plage Factory in Port Louis' → 'La Plage Factory'

3. COLLABORATION FALLBACK
   If NO explicit venue found in rule 2, check for:
   - 'collaborating with X'
   - 'collaboration with X'
   → Return: X

   Example: 'MSCC is collaborating with FRCI' + no explicit venue → 'FRCI'

4. NO VENUE FOUND
   If none of the above rules match → Return: null

CRITICAL:
- TBD/TBA only counts as placeholder if DIRECTLY after 'Location:' or 'Venue:'
- Extract ONLY the venue name, strip city/address
- NEVER return: TBD, TBA, Unknown, Pending, N/A as the venue_name value
"#;

/// Reply schema forced onto the model so the content decodes without
/// fuzzy parsing.
static VENUE_REPLY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {"venue_name": {"type": ["string", "null"]}},
        "required": ["venue_name"],
        "additionalProperties": false,
    })
});

/// Inference seam of the resolver.
pub trait InferenceClient {
    /// Infers a venue name from cleaned description text. `Ok(None)` means
    /// the model found no venue.
    ///
    /// # Errors
    /// Returns `ResolveError` on transport failure or an off-contract
    /// reply.
    fn infer_venue(&self, text: &str) -> Result<Option<String>, ResolveError>;
}

/// Production client for the Ollama `/api/chat` endpoint.
pub struct OllamaChatClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl OllamaChatClient {
    /// Builds a client bound to the configured Ollama instance, with the
    /// default [`INFERENCE_TIMEOUT`].
    pub fn new(config: &OllamaConfig) -> Result<Self, ResolveError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(INFERENCE_TIMEOUT)
            .build()
            .map_err(ResolveError::Build)?;
        Ok(Self {
            client,
            endpoint: format!("{}:{}/api/chat", config.url, config.port),
            model: config.model.clone(),
        })
    }
}

impl InferenceClient for OllamaChatClient {
    fn infer_venue(&self, text: &str) -> Result<Option<String>, ResolveError> {
        let started_at = Instant::now();
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("{VENUE_PROMPT}\nTEXT:\n{text}")},
            ],
            "format": &*VENUE_REPLY_SCHEMA,
            "options": {"temperature": 0},
            "stream": false,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .map_err(ResolveError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                status: status.as_u16(),
            });
        }

        let reply: ChatReply = response.json().map_err(ResolveError::Request)?;
        let content = reply.message.content.trim().to_string();
        if content.is_empty() {
            return Ok(None);
        }

        let venue: VenueReply = serde_json::from_str(&content)
            .map_err(|_| ResolveError::MalformedReply(reply_snippet(&content)))?;
        debug!(
            "event=venue_inference module=resolve status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(venue.venue_name)
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct VenueReply {
    venue_name: Option<String>,
}

/// Single-line excerpt of an off-contract reply, capped so error text
/// stays log friendly.
fn reply_snippet(content: &str) -> String {
    let flat: String = content
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(120)
        .collect();
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_snippet_flattens_and_caps() {
        assert_eq!(reply_snippet("line one\nline two"), "line one line two");
        let long = "x".repeat(300);
        assert_eq!(reply_snippet(&long).len(), 120);
    }

    #[test]
    fn venue_reply_accepts_null_and_string() {
        let null_reply: VenueReply =
            serde_json::from_str(r#"{"venue_name": null}"#).expect("null reply");
        assert_eq!(null_reply.venue_name, None);

        let named: VenueReply =
            serde_json::from_str(r#"{"venue_name": "Coder Faculty"}"#).expect("named reply");
        assert_eq!(named.venue_name.as_deref(), Some("Coder Faculty"));
    }
}
