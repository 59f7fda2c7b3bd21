//! Fire / progress / quality model and its per-tick update rule.
//!
//! Pure data and arithmetic only: no timers, no DOM. `Session` decides when a
//! tick runs and what happens when a dish is done.

use serde::Serialize;

use crate::config::CookingConfig;

const MIN_LEVEL: f64 = 0.0;
const MAX_LEVEL: f64 = 100.0;

// --- Phase ------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Cooking,
    /// Transient: only observable between the finishing tick and the reset.
    Resolving,
}

// --- State ------------------------------------------------------------------

/// The three bounded scalars driven by the pan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CookingState {
    pub fire: f64,
    pub progress: f64,
    pub quality: f64,
}

impl Default for CookingState {
    fn default() -> Self {
        Self { fire: 0.0, progress: 0.0, quality: MAX_LEVEL }
    }
}

impl CookingState {
    /// State at the moment a cook begins.
    pub fn fresh(cfg: &CookingConfig) -> Self {
        Self { fire: cfg.start_fire.clamp(MIN_LEVEL, MAX_LEVEL), ..Self::default() }
    }

    /// One tick of the simulation. Returns true once progress has reached 100.
    pub fn advance(&mut self, cfg: &CookingConfig) -> bool {
        self.fire = (self.fire - cfg.fire_decay).max(MIN_LEVEL);

        if self.fire > cfg.heat_threshold {
            self.progress = (self.progress + (self.fire / 100.0) * cfg.progress_rate).min(MAX_LEVEL);
        }

        // Scorching and under-heat penalties never stack in the same tick.
        if self.fire > cfg.scorch_threshold {
            self.quality = (self.quality - cfg.scorch_penalty).max(MIN_LEVEL);
        } else if self.fire < cfg.heat_threshold && self.progress < cfg.chill_grace_progress {
            self.quality = (self.quality - cfg.chill_penalty).max(MIN_LEVEL);
        }

        self.is_done()
    }

    pub fn apply(&mut self, action: ControlAction) {
        let effect = action.effect();
        self.fire = (self.fire + effect.fire).clamp(MIN_LEVEL, MAX_LEVEL);
        self.quality = (self.quality + effect.quality).clamp(MIN_LEVEL, MAX_LEVEL);
    }

    pub fn is_done(&self) -> bool {
        self.progress >= MAX_LEVEL
    }

    /// Quality as reported to the host.
    pub fn rounded_quality(&self) -> u8 {
        self.quality.round().clamp(MIN_LEVEL, MAX_LEVEL) as u8
    }
}

// --- Player controls ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlAction {
    Fire,
    Water,
    Stir,
    Seasoning,
}

/// Signed change one control applies to the state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionEffect {
    pub fire: f64,
    pub quality: f64,
}

impl ControlAction {
    pub const ALL: [ControlAction; 4] =
        [ControlAction::Fire, ControlAction::Water, ControlAction::Stir, ControlAction::Seasoning];

    /// Unknown names yield `None`; callers treat that as a no-op.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "fire" => Some(ControlAction::Fire),
            "water" => Some(ControlAction::Water),
            "stir" => Some(ControlAction::Stir),
            "seasoning" => Some(ControlAction::Seasoning),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlAction::Fire => "fire",
            ControlAction::Water => "water",
            ControlAction::Stir => "stir",
            ControlAction::Seasoning => "seasoning",
        }
    }

    pub fn effect(self) -> ActionEffect {
        match self {
            ControlAction::Fire => ActionEffect { fire: 20.0, quality: 0.0 },
            ControlAction::Water => ActionEffect { fire: -10.0, quality: 5.0 },
            ControlAction::Stir => ActionEffect { fire: 0.0, quality: 10.0 },
            ControlAction::Seasoning => ActionEffect { fire: 0.0, quality: 15.0 },
        }
    }
}

// --- Read-only views ----------------------------------------------------------

/// What a presentation layer polls each frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CookingSnapshot {
    pub fire: f64,
    pub progress: f64,
    pub quality: f64,
    pub phase: Phase,
}

/// Result of a resolved session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CookingOutcome {
    pub success: bool,
    pub recipe: String,
    pub result: Option<String>,
    pub quality: u8,
}
