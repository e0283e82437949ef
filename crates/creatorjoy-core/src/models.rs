//! Domain types for style profiles, boost history and generated boosts.
//!
//! Field names match the JSON documents the dashboard and the generation
//! workflow exchange (`script_1`, `hook_style`, `generated_at`, ...), so the
//! same types serve storage, the HTTP API and the webhook payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of script sample slots on a style profile.
pub const MAX_SCRIPTS: usize = 10;

// ── Style profiles ───────────────────────────────────────────────────

/// Up to ten free-text script samples. Slot order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSamples {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_6: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_7: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_8: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_9: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_10: Option<String>,
}

impl ScriptSamples {
    fn slots(&self) -> [&Option<String>; MAX_SCRIPTS] {
        [
            &self.script_1,
            &self.script_2,
            &self.script_3,
            &self.script_4,
            &self.script_5,
            &self.script_6,
            &self.script_7,
            &self.script_8,
            &self.script_9,
            &self.script_10,
        ]
    }

    fn slots_mut(&mut self) -> [&mut Option<String>; MAX_SCRIPTS] {
        [
            &mut self.script_1,
            &mut self.script_2,
            &mut self.script_3,
            &mut self.script_4,
            &mut self.script_5,
            &mut self.script_6,
            &mut self.script_7,
            &mut self.script_8,
            &mut self.script_9,
            &mut self.script_10,
        ]
    }

    /// The non-blank samples, in slot order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.slots()
            .into_iter()
            .filter_map(|s| s.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether every slot is absent or blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts().next().is_none()
    }

    /// Turn blank slots into `None` so they are not persisted.
    pub fn normalize(&mut self) {
        for slot in self.slots_mut() {
            if slot.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *slot = None;
            }
        }
    }

    /// Overwrite the slots that are present in `patch`. A blank string in the
    /// patch clears the slot.
    pub fn apply(&mut self, mut patch: Self) {
        for (slot, update) in self.slots_mut().into_iter().zip(patch.slots_mut()) {
            if let Some(text) = update.take() {
                *slot = Some(text);
            }
        }
        self.normalize();
    }
}

/// Style summary derived by the external analysis workflow. Every field may
/// be missing; a profile is usable without any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_phrases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writing_rules: Option<Vec<String>>,
}

impl StyleSummary {
    /// Overwrite the fields that are present in `patch`.
    pub fn apply(&mut self, patch: Self) {
        if patch.tone.is_some() {
            self.tone = patch.tone;
        }
        if patch.hook_style.is_some() {
            self.hook_style = patch.hook_style;
        }
        if patch.structure.is_some() {
            self.structure = patch.structure;
        }
        if patch.common_phrases.is_some() {
            self.common_phrases = patch.common_phrases;
        }
        if patch.writing_rules.is_some() {
            self.writing_rules = patch.writing_rules;
        }
    }
}

/// A named writing style: sample scripts plus an optional summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub scripts: ScriptSamples,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: StyleSummary,
}

/// Input for creating a style profile; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStyle {
    pub name: String,
    #[serde(flatten)]
    pub scripts: ScriptSamples,
    #[serde(flatten)]
    pub summary: StyleSummary,
}

impl NewStyle {
    /// A profile with a name and a single sample in `script_1`.
    pub fn with_script(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scripts: ScriptSamples {
                script_1: Some(script.into()),
                ..ScriptSamples::default()
            },
            summary: StyleSummary::default(),
        }
    }
}

/// Partial update for a style profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub scripts: ScriptSamples,
    #[serde(flatten)]
    pub summary: StyleSummary,
}

// ── Boost history ────────────────────────────────────────────────────

/// One generated boost as persisted by the generation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostHistory {
    pub id: String,
    /// Weak reference: the style may since have been deleted.
    pub style_id: String,
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub cta: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// A history record joined with the current name of its style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: BoostHistory,
    /// `None` when the style no longer exists.
    pub style_name: Option<String>,
}

/// A boost record submitted by the generation workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBoostRecord {
    pub style_id: String,
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub cta: Option<String>,
    /// The workflow's own timestamp; the store uses its clock when absent.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

// ── Generated boosts ─────────────────────────────────────────────────

/// A generated script and call-to-action for one idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boost {
    /// Echoed from the caller's input, never taken from the webhook.
    pub idea: String,
    pub script: String,
    pub cta: String,
}
