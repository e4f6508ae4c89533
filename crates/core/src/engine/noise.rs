use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::MenuCatalog;
use crate::domain::menu::ItemId;
use crate::engine::cart::CartState;
use crate::engine::emitter::EventLog;

pub const DEFAULT_ABANDONMENT_RATE: f64 = 0.08;
pub const DEFAULT_LAST_EVENT_OVERRIDE_RATE: f64 = 0.05;
pub const DEFAULT_MAX_NOISE_CANDIDATES: usize = 3;

/// Which event the post-session override marks as abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastEventOverride {
    /// The most recently emitted event of the whole run, which may belong to
    /// an earlier session when the current one emitted nothing.
    GlobalLastEvent,
    /// The last event of the session that just finished, if it emitted any.
    CurrentSessionLastEvent,
}

impl std::str::FromStr for LastEventOverride {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global_last_event" | "global" => Ok(Self::GlobalLastEvent),
            "current_session_last_event" | "current_session" => Ok(Self::CurrentSessionLastEvent),
            other => Err(format!(
                "unsupported last-event override `{other}` (expected global_last_event|current_session_last_event)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSettings {
    pub abandonment_rate: f64,
    pub last_event_override_rate: f64,
    pub last_event_override: LastEventOverride,
    pub max_noise_candidates: usize,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            abandonment_rate: DEFAULT_ABANDONMENT_RATE,
            last_event_override_rate: DEFAULT_LAST_EVENT_OVERRIDE_RATE,
            last_event_override: LastEventOverride::GlobalLastEvent,
            max_noise_candidates: DEFAULT_MAX_NOISE_CANDIDATES,
        }
    }
}

/// Distractor candidates and abandonment markers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoiseInjector {
    settings: NoiseSettings,
}

impl NoiseInjector {
    pub fn new(settings: NoiseSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Per-session abandonment flag, drawn once.
    pub fn draw_abandonment<R: Rng>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.settings.abandonment_rate
    }

    /// Uniform sample without replacement from catalog items that are neither
    /// in the cart nor already in the role's template pool.
    pub fn sample_distractors<R: Rng>(
        &self,
        catalog: &MenuCatalog,
        cart: &CartState,
        template_pool: &[ItemId],
        rng: &mut R,
    ) -> Vec<ItemId> {
        let eligible: Vec<&ItemId> =
            catalog.ids().filter(|id| !cart.contains(id) && !template_pool.contains(id)).collect();
        let amount = self.settings.max_noise_candidates.min(eligible.len());
        eligible.choose_multiple(rng, amount).map(|id| (*id).clone()).collect()
    }

    /// Post-session override. The draw happens whenever a session completes;
    /// returns the index of the event that was marked, if any.
    pub fn apply_last_event_override<R: Rng>(
        &self,
        log: &mut EventLog,
        session_start: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let triggered = rng.gen::<f64>() < self.settings.last_event_override_rate;
        if !triggered || log.is_empty() {
            return None;
        }
        let target = log.len() - 1;
        if self.settings.last_event_override == LastEventOverride::CurrentSessionLastEvent
            && target < session_start
        {
            return None;
        }
        log.mark_abandoned(target).then_some(target)
    }
}
