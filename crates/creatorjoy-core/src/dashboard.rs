//! Dashboard statistics and the generation view-model.
//!
//! [`load_snapshot`] gathers everything the dashboard header shows in one
//! concurrent pass. [`reduce`] is a plain state machine over
//! [`DashboardEvent`]s; [`DashboardController`] drives it against the real
//! stores and generator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::boost::BoostGenerator;
use crate::error::{BoostError, DashboardError};
use crate::history::HistoryStore;
use crate::models::{Boost, StyleProfile};
use crate::style::StyleStore;

/// How long a "copied" indicator stays lit.
pub const COPIED_INDICATOR_TTL: Duration = Duration::from_secs(2);

const STYLE_NOT_FOUND: &str = "Style profile not found";

// ── Statistics ───────────────────────────────────────────────────────

/// Header counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_styles: usize,
    /// Human label such as `"3 mins ago"` or `"Never"`.
    pub last_boost: String,
    pub boosts_this_week: usize,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            total_styles: 0,
            last_boost: "Never".to_owned(),
            boosts_this_week: 0,
        }
    }
}

/// Everything one dashboard load produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub styles: Vec<StyleProfile>,
    pub stats: DashboardStats,
    pub has_usable_profile: bool,
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{n} {unit}s ago")
    } else {
        format!("{n} {unit} ago")
    }
}

/// Relative label for the most recent boost.
///
/// Timestamps in the future count as "Just now".
#[must_use]
pub fn format_last_boost(now: DateTime<Utc>, generated_at: Option<DateTime<Utc>>) -> String {
    let Some(at) = generated_at else {
        return "Never".to_owned();
    };
    let elapsed = now - at;
    let mins = elapsed.num_minutes();
    if mins < 1 {
        "Just now".to_owned()
    } else if mins < 60 {
        plural(mins, "min")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

/// Load styles and statistics concurrently.
///
/// A failing last-boost query is logged and shown as "Never"; every other
/// failure aborts the load.
///
/// # Errors
///
/// Returns `DashboardError` if listing or counting styles, or counting this
/// week's boosts, fails.
pub async fn load_snapshot(
    styles: &StyleStore,
    history: &HistoryStore,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot, DashboardError> {
    let (list, count, last, week) = tokio::join!(
        styles.list(),
        styles.count(),
        history.last_boost(),
        history.boosts_this_week(now),
    );

    let last = last.unwrap_or_else(|e| {
        warn!(error = %e, "last boost lookup failed; showing Never");
        None
    });
    let total_styles = count?;

    Ok(DashboardSnapshot {
        styles: list?,
        stats: DashboardStats {
            total_styles,
            last_boost: format_last_boost(now, last.map(|b| b.generated_at)),
            boosts_this_week: week?,
        },
        has_usable_profile: total_styles > 0,
    })
}

// ── View-model ───────────────────────────────────────────────────────

/// Where the current generation stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Requesting { request_id: u64 },
    Succeeded(Boost),
    /// The message tells the user the boost may still land in history.
    TimedOut(String),
    Failed(String),
}

/// Which output field was last copied to the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopiedField {
    Idea,
    Script,
    Cta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub styles: Vec<StyleProfile>,
    pub stats: DashboardStats,
    pub loading: bool,
    pub load_error: Option<String>,
    pub selected_style_id: Option<String>,
    pub idea: String,
    pub phase: GenerationPhase,
    pub copied: Option<CopiedField>,
    /// Set after a successful generation; the owner should reload.
    pub needs_refresh: bool,
    next_request_id: u64,
}

impl DashboardState {
    /// Whether the style list is non-empty.
    #[must_use]
    pub fn has_style_profiles(&self) -> bool {
        !self.styles.is_empty()
    }

    /// Whether a Generate action would currently be accepted.
    #[must_use]
    pub fn can_generate(&self) -> bool {
        self.selected_style_id.is_some() && !self.is_generating()
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        matches!(self.phase, GenerationPhase::Requesting { .. })
    }

    /// The in-flight request and the style it is for.
    #[must_use]
    pub fn pending_request(&self) -> Option<(u64, &StyleProfile)> {
        let GenerationPhase::Requesting { request_id } = self.phase else {
            return None;
        };
        let id = self.selected_style_id.as_deref()?;
        self.styles
            .iter()
            .find(|s| s.id == id)
            .map(|style| (request_id, style))
    }
}

#[derive(Debug)]
pub enum DashboardEvent {
    LoadStarted,
    Loaded(DashboardSnapshot),
    LoadFailed(String),
    StyleSelected(Option<String>),
    IdeaChanged(String),
    GenerateRequested,
    GenerationFinished {
        request_id: u64,
        result: Result<Boost, BoostError>,
    },
    Copied(CopiedField),
    CopyExpired(CopiedField),
}

/// Apply one event.
#[must_use]
pub fn reduce(mut state: DashboardState, event: DashboardEvent) -> DashboardState {
    match event {
        DashboardEvent::LoadStarted => {
            state.loading = true;
        }
        DashboardEvent::Loaded(snapshot) => {
            state.loading = false;
            state.load_error = None;
            state.needs_refresh = false;
            state.styles = snapshot.styles;
            state.stats = snapshot.stats;
        }
        DashboardEvent::LoadFailed(message) => {
            // Previous data stays on screen.
            state.loading = false;
            state.needs_refresh = false;
            state.load_error = Some(message);
        }
        DashboardEvent::StyleSelected(id) => {
            state.selected_style_id = id.filter(|id| !id.is_empty());
        }
        DashboardEvent::IdeaChanged(idea) => {
            state.idea = idea;
        }
        DashboardEvent::GenerateRequested => {
            if !state.can_generate() {
                return state;
            }
            state.copied = None;
            let known = state
                .selected_style_id
                .as_deref()
                .is_some_and(|id| state.styles.iter().any(|s| s.id == id));
            if known {
                state.next_request_id += 1;
                state.phase = GenerationPhase::Requesting {
                    request_id: state.next_request_id,
                };
            } else {
                state.phase = GenerationPhase::Failed(STYLE_NOT_FOUND.to_owned());
            }
        }
        DashboardEvent::GenerationFinished { request_id, result } => {
            if state.phase != (GenerationPhase::Requesting { request_id }) {
                debug!(request_id, "dropping stale generation result");
                return state;
            }
            state.phase = match result {
                Ok(boost) => {
                    state.needs_refresh = true;
                    GenerationPhase::Succeeded(boost)
                }
                Err(e) if e.is_timeout() => GenerationPhase::TimedOut(e.to_string()),
                Err(e) => GenerationPhase::Failed(e.to_string()),
            };
        }
        DashboardEvent::Copied(field) => {
            if matches!(state.phase, GenerationPhase::Succeeded(_)) {
                state.copied = Some(field);
            }
        }
        DashboardEvent::CopyExpired(field) => {
            if state.copied == Some(field) {
                state.copied = None;
            }
        }
    }
    state
}

// ── Controller ───────────────────────────────────────────────────────

/// Runs the dashboard flow against live stores and the generator.
pub struct DashboardController {
    styles: Arc<StyleStore>,
    history: Arc<HistoryStore>,
    generator: BoostGenerator,
    state: DashboardState,
}

impl std::fmt::Debug for DashboardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardController")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl DashboardController {
    #[must_use]
    pub fn new(
        styles: Arc<StyleStore>,
        history: Arc<HistoryStore>,
        generator: BoostGenerator,
    ) -> Self {
        Self {
            styles,
            history,
            generator,
            state: DashboardState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Feed an event through [`reduce`].
    pub fn dispatch(&mut self, event: DashboardEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
    }

    /// Light the "copied" indicator for `field`. The returned future resolves
    /// to the matching `CopyExpired` event after [`COPIED_INDICATOR_TTL`];
    /// dispatch it to clear the indicator.
    pub fn copy(
        &mut self,
        field: CopiedField,
    ) -> impl Future<Output = DashboardEvent> + Send + use<> {
        self.dispatch(DashboardEvent::Copied(field));
        async move {
            tokio::time::sleep(COPIED_INDICATOR_TTL).await;
            DashboardEvent::CopyExpired(field)
        }
    }

    /// Reload styles and statistics.
    pub async fn refresh(&mut self, now: DateTime<Utc>) {
        self.dispatch(DashboardEvent::LoadStarted);
        let event = match load_snapshot(&self.styles, &self.history, now).await {
            Ok(snapshot) => DashboardEvent::Loaded(snapshot),
            Err(e) => {
                warn!(error = %e, "dashboard load failed");
                DashboardEvent::LoadFailed(e.to_string())
            }
        };
        self.dispatch(event);
    }

    /// Generate a boost for the selected style and current idea, then reload
    /// if it succeeded. Does nothing when Generate is not currently allowed.
    pub async fn generate(&mut self) {
        self.dispatch(DashboardEvent::GenerateRequested);
        let Some((request_id, style)) = self.state.pending_request() else {
            return;
        };
        let result = self.generator.generate(style, &self.state.idea).await;
        self.dispatch(DashboardEvent::GenerationFinished { request_id, result });

        if self.state.needs_refresh {
            self.refresh(Utc::now()).await;
        }
    }
}
