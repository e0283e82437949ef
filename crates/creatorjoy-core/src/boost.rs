//! Boost generation through the workflow webhook.
//!
//! One call per boost: the generator posts the user's idea together with the
//! style's identity and summary, and races the exchange against a deadline.
//! Whatever comes back is classified into one of the reply shapes the
//! workflow is known to produce, and the script and call-to-action are pulled
//! out of it.
//!
//! There are no retries. A timeout does not mean nothing happened: the
//! workflow keeps running after we hang up and usually still writes history.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::BoostError;
use crate::models::{Boost, StyleProfile};

/// Deadline applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);
const DEFAULT_USER_AGENT: &str = concat!("creatorjoy/", env!("CARGO_PKG_VERSION"));

/// Configuration for the [`BoostGenerator`].
#[derive(Debug, Clone)]
pub struct BoostConfig {
    /// Webhook endpoint. Falls back to `CREATORJOY_WEBHOOK_URL`.
    pub webhook_url: String,
    /// Default deadline per call. Zero means "use `CREATORJOY_BOOST_TIMEOUT_MS`,
    /// then 60 seconds".
    pub timeout: Duration,
    /// `User-Agent` header sent with every call.
    pub user_agent: String,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout: Duration::ZERO,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Request body posted to the webhook.
#[derive(Debug, Serialize)]
struct BoostPayload<'a> {
    user_idea: &'a str,
    style_id: &'a str,
    style_name: &'a str,
    ai_summary: AiSummary<'a>,
}

/// Summary block of the payload. Missing strings go out as `null`, missing
/// lists as `[]`.
#[derive(Debug, Serialize)]
struct AiSummary<'a> {
    tone: Option<&'a str>,
    hook_style: Option<&'a str>,
    structure: Option<&'a str>,
    common_phrases: &'a [String],
    writing_rules: &'a [String],
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl<'a> BoostPayload<'a> {
    fn new(style: &'a StyleProfile, user_idea: &'a str) -> Self {
        let summary = &style.summary;
        Self {
            user_idea,
            style_id: &style.id,
            style_name: &style.name,
            ai_summary: AiSummary {
                tone: non_blank(summary.tone.as_ref()),
                hook_style: non_blank(summary.hook_style.as_ref()),
                structure: non_blank(summary.structure.as_ref()),
                common_phrases: summary.common_phrases.as_deref().unwrap_or_default(),
                writing_rules: summary.writing_rules.as_deref().unwrap_or_default(),
            },
        }
    }
}

// ── Response shapes ──────────────────────────────────────────────────

/// Script and call-to-action pulled out of a webhook reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptFields {
    pub script: String,
    pub cta: String,
}

impl ScriptFields {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            script: first_text(obj, &["script", "Script"]),
            cta: first_text(obj, &["cta", "CTA"]),
        }
    }
}

/// The reply shapes the workflow produces, in the order they are probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResponse {
    /// `[{"content": {"script": .., "cta": ..}}, ...]`; only the first
    /// element is read.
    Batch(ScriptFields),
    /// `{"content": {"script": .., "cta": ..}}`
    Wrapped(ScriptFields),
    /// `{"script": .., "cta": ..}`
    Flat(ScriptFields),
    /// Anything else.
    Unrecognized,
}

const FLAT_KEYS: [&str; 4] = ["script", "Script", "cta", "CTA"];

fn content_object(value: &Value) -> Option<&Map<String, Value>> {
    value.get("content").and_then(Value::as_object)
}

/// First key whose value is a non-empty string, else `""`.
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_owned()
}

impl WebhookResponse {
    /// Decide which shape a reply has.
    #[must_use]
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(items) => items
                .first()
                .and_then(content_object)
                .map_or(Self::Unrecognized, |c| {
                    Self::Batch(ScriptFields::from_object(c))
                }),
            Value::Object(obj) => {
                if let Some(content) = content_object(value) {
                    Self::Wrapped(ScriptFields::from_object(content))
                } else if FLAT_KEYS.iter().any(|k| obj.contains_key(*k)) {
                    Self::Flat(ScriptFields::from_object(obj))
                } else {
                    Self::Unrecognized
                }
            }
            _ => Self::Unrecognized,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Batch(_) => "batch",
            Self::Wrapped(_) => "wrapped",
            Self::Flat(_) => "flat",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// The extracted fields; an unrecognised reply yields empty strings.
    #[must_use]
    pub fn into_fields(self) -> ScriptFields {
        match self {
            Self::Batch(f) | Self::Wrapped(f) | Self::Flat(f) => f,
            Self::Unrecognized => ScriptFields::default(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Generator ────────────────────────────────────────────────────────

/// Calls the generation webhook.
#[derive(Debug, Clone)]
pub struct BoostGenerator {
    webhook_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BoostGenerator {
    /// Create a generator for the given webhook with default settings.
    ///
    /// # Errors
    ///
    /// Returns `BoostError::Config` if the URL is empty and
    /// `CREATORJOY_WEBHOOK_URL` is unset.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, BoostError> {
        Self::with_config(BoostConfig {
            webhook_url: webhook_url.into(),
            ..BoostConfig::default()
        })
    }

    /// Create a generator from explicit configuration, falling back to the
    /// environment for anything left empty.
    ///
    /// # Errors
    ///
    /// Returns `BoostError::Config` if no webhook URL can be found, or
    /// `BoostError::Transport` if the HTTP client cannot be built.
    #[allow(clippy::needless_pass_by_value)]
    pub fn with_config(cfg: BoostConfig) -> Result<Self, BoostError> {
        let webhook_url = first_non_empty(&[
            &cfg.webhook_url,
            &std::env::var("CREATORJOY_WEBHOOK_URL").unwrap_or_default(),
        ]);
        if webhook_url.is_empty() {
            return Err(BoostError::Config {
                reason: "missing webhook url: set CREATORJOY_WEBHOOK_URL or pass webhook_url in config"
                    .to_owned(),
            });
        }

        let timeout = if cfg.timeout.is_zero() {
            std::env::var("CREATORJOY_BOOST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map_or(DEFAULT_TIMEOUT, Duration::from_millis)
        } else {
            cfg.timeout
        };

        let user_agent = first_non_empty(&[&cfg.user_agent, DEFAULT_USER_AGENT]);
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            webhook_url,
            timeout,
            client,
        })
    }

    /// The deadline used by [`generate`](Self::generate).
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Generate a boost with the configured deadline.
    ///
    /// # Errors
    ///
    /// See [`generate_with_timeout`](Self::generate_with_timeout).
    pub async fn generate(&self, style: &StyleProfile, user_idea: &str) -> Result<Boost, BoostError> {
        self.generate_with_timeout(style, user_idea, self.timeout).await
    }

    /// Generate a boost, abandoning the call once `timeout` has elapsed.
    ///
    /// `user_idea` is forwarded as given, even when empty: requiring an idea
    /// is the caller's job.
    ///
    /// # Errors
    ///
    /// - `BoostError::Validation` if the style has no id (nothing is sent).
    /// - `BoostError::Timeout` if the deadline passes first; the request is
    ///   dropped, and the workflow may still record history.
    /// - `BoostError::Remote` on a non-2xx status.
    /// - `BoostError::Transport` if the request fails or the body is not JSON.
    pub async fn generate_with_timeout(
        &self,
        style: &StyleProfile,
        user_idea: &str,
        timeout: Duration,
    ) -> Result<Boost, BoostError> {
        if style.id.trim().is_empty() {
            return Err(BoostError::Validation {
                reason: "style profile has no id".to_owned(),
            });
        }

        let payload = BoostPayload::new(style, user_idea);
        let started = Instant::now();

        let reply = match self.exchange(&payload, timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    style_id = %style.id,
                    category = e.category(),
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %e,
                    "boost generation failed"
                );
                return Err(e);
            }
        };

        let response = WebhookResponse::classify(&reply);
        if response == WebhookResponse::Unrecognized {
            warn!(
                style_id = %style.id,
                kind = json_kind(&reply),
                "webhook reply has no script or cta; returning empty boost"
            );
        }
        info!(
            style_id = %style.id,
            shape = response.shape(),
            elapsed_ms = started.elapsed().as_millis(),
            "boost generated"
        );

        let fields = response.into_fields();
        Ok(Boost {
            idea: user_idea.to_owned(),
            script: fields.script,
            cta: fields.cta,
        })
    }

    /// Post the payload and read the JSON reply, or give up at the deadline.
    /// Losing the race drops the request future, which closes the connection.
    async fn exchange(
        &self,
        payload: &BoostPayload<'_>,
        timeout: Duration,
    ) -> Result<Value, BoostError> {
        let call = async {
            let resp = self.client.post(&self.webhook_url).json(payload).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(BoostError::Remote {
                    status: status.as_u16(),
                    status_text: reason_phrase(&resp),
                });
            }
            Ok(resp.json::<Value>().await?)
        };

        tokio::select! {
            result = call => result,
            () = tokio::time::sleep(timeout) => Err(BoostError::Timeout {
                timeout_ms: timeout.as_millis(),
            }),
        }
    }
}

/// The reason phrase the webhook actually sent, else the canonical one for
/// the status. Non-standard codes without a phrase give `""`.
fn reason_phrase(resp: &reqwest::Response) -> String {
    resp.extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
        .or_else(|| resp.status().canonical_reason().map(str::to_owned))
        .unwrap_or_default()
}

fn first_non_empty(vals: &[&str]) -> String {
    vals.iter()
        .find(|v| !v.is_empty())
        .map(|v| (*v).to_owned())
        .unwrap_or_default()
}
