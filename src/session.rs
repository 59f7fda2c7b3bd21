//! One user-facing cooking session: recipe catalog, selection, the running
//! simulation, and the transitions between Idle, Cooking and Resolving.
//!
//! Invariants kept by every operation:
//! - `phase == Cooking` implies a recipe is selected and a tick task is armed.
//! - `phase != Cooking` implies no tick task is armed.
//! - Ingredient counts are never written; the host owns inventory.

use log::{debug, error, info, warn};

use crate::bridge::Outbound;
use crate::config::CookingConfig;
use crate::cooking::{ControlAction, CookingOutcome, CookingSnapshot, CookingState, Phase};
use crate::error::{CookingError, ValidationError};
use crate::recipe::{Recipe, find_recipe};
use crate::scheduler::{Scheduler, Task, TaskHandle};

pub struct Session<S: Scheduler> {
    cfg: CookingConfig,
    scheduler: S,
    recipes: Vec<Recipe>,
    selected: Option<Recipe>,
    phase: Phase,
    state: CookingState,
    visible: bool,
    // Re-entrancy guard around open/start/close; released by a timer.
    processing: bool,
    tick_task: Option<TaskHandle>,
    guard_task: Option<TaskHandle>,
    auto_close_task: Option<TaskHandle>,
    outbox: Vec<Outbound>,
    last_outcome: Option<CookingOutcome>,
}

impl<S: Scheduler> Session<S> {
    pub fn new(cfg: CookingConfig, scheduler: S) -> Self {
        Self {
            cfg,
            scheduler,
            recipes: Vec::new(),
            selected: None,
            phase: Phase::Idle,
            state: CookingState::default(),
            visible: false,
            processing: false,
            tick_task: None,
            guard_task: None,
            auto_close_task: None,
            outbox: Vec::new(),
            last_outcome: None,
        }
    }

    // --- Accessors -------------------------------------------------------------

    pub fn config(&self) -> &CookingConfig {
        &self.cfg
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn selected(&self) -> Option<&Recipe> {
        self.selected.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_cooking(&self) -> bool {
        self.phase == Phase::Cooking
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> CookingState {
        self.state
    }

    pub fn snapshot(&self) -> CookingSnapshot {
        CookingSnapshot {
            fire: self.state.fire,
            progress: self.state.progress,
            quality: self.state.quality,
            phase: self.phase,
        }
    }

    /// Outcome of the most recently resolved cook, cleared by `open` and `start_cooking`.
    pub fn last_outcome(&self) -> Option<&CookingOutcome> {
        self.last_outcome.as_ref()
    }

    /// Drains queued notifications for delivery to the host.
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    // --- Host commands -----------------------------------------------------------

    /// Starts a session. Any previous cook is discarded without a result.
    pub fn open(&mut self, recipes: Option<Vec<Recipe>>) {
        self.cancel_auto_close();
        self.reset_cooking();
        self.last_outcome = None;
        if let Some(recipes) = recipes {
            info!("loaded {} recipes", recipes.len());
            self.recipes = recipes;
        }
        self.visible = true;
        self.arm_guard(self.cfg.open_guard_ms);
        info!("cooking interface opened");
    }

    /// Replaces the catalog. The selection is rebound by id; if its id is gone
    /// the selection is cleared and an active cook is aborted.
    pub fn update_recipes(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes;
        let Some(current_id) = self.selected.as_ref().map(|r| r.id.clone()) else {
            return;
        };
        match find_recipe(&self.recipes, &current_id) {
            Some(updated) => {
                debug!("rebound selection '{}' to updated recipe", current_id);
                self.selected = Some(updated.clone());
            }
            None => {
                if self.is_cooking() {
                    warn!("recipe '{}' removed mid-cook, aborting", current_id);
                } else {
                    debug!("selected recipe '{}' no longer offered", current_id);
                }
                self.reset_cooking();
            }
        }
    }

    // --- Player operations ---------------------------------------------------------

    pub fn select_recipe(&mut self, id: &str) -> Result<&Recipe, CookingError> {
        if self.phase != Phase::Idle {
            return Err(ValidationError::AlreadyCooking.into());
        }
        let recipe = find_recipe(&self.recipes, id)
            .ok_or_else(|| CookingError::UnknownRecipe { id: id.to_string() })?
            .clone();
        debug!("selected recipe '{}'", recipe.id);
        Ok(self.selected.insert(recipe))
    }

    /// Checks every start precondition, first failure wins.
    pub fn validate(&self) -> Result<&Recipe, CookingError> {
        if self.processing {
            return Err(CookingError::Busy);
        }
        let recipe = self.selected.as_ref().ok_or(ValidationError::NothingSelected)?;
        if self.phase != Phase::Idle {
            return Err(ValidationError::AlreadyCooking.into());
        }
        if !recipe.can_cook() {
            return Err(ValidationError::InsufficientIngredients {
                missing: recipe.missing_ingredients(),
            }
            .into());
        }
        Ok(recipe)
    }

    /// Whether the confirm control should be enabled. Ignores the busy guard.
    pub fn is_eligible(&self) -> bool {
        self.phase == Phase::Idle && self.selected.as_ref().is_some_and(Recipe::can_cook)
    }

    pub fn start_cooking(&mut self) -> Result<(), CookingError> {
        let recipe_id = match self.validate() {
            Ok(recipe) => recipe.id.clone(),
            Err(err) => {
                if err.is_transient() {
                    debug!("start dropped: {}", err);
                } else {
                    info!("start rejected: {}", err);
                }
                return Err(err);
            }
        };
        self.arm_guard(self.cfg.start_guard_ms);

        // Re-arm from scratch so a rapid restart never leaves two tick streams.
        self.cancel_tick();
        self.cancel_auto_close();
        let handle = match self.scheduler.arm_interval(self.cfg.tick_ms, Task::Tick) {
            Ok(handle) => handle,
            Err(err) => {
                error!("failed to arm cooking tick: {}", err);
                self.phase = Phase::Idle;
                return Err(err);
            }
        };
        self.tick_task = Some(handle);
        self.last_outcome = None;
        self.state = CookingState::fresh(&self.cfg);
        self.phase = Phase::Cooking;
        self.outbox.push(Outbound::StartCooking { recipe_id: recipe_id.clone() });
        info!("cooking started: {}", recipe_id);
        Ok(())
    }

    /// Applies a control immediately. Returns false when not cooking.
    pub fn control_action(&mut self, action: ControlAction) -> bool {
        if self.phase != Phase::Cooking {
            debug!("control '{}' ignored outside cooking", action.as_str());
            return false;
        }
        self.state.apply(action);
        true
    }

    /// Name-based variant for UI bindings. Unknown names are a no-op.
    pub fn control_action_named(&mut self, kind: &str) -> bool {
        match ControlAction::parse(kind) {
            Some(action) => self.control_action(action),
            None => {
                debug!("unknown control '{}'", kind);
                false
            }
        }
    }

    // --- Simulation --------------------------------------------------------------

    /// One tick. Returns the outcome when this tick finished the dish.
    pub fn advance(&mut self) -> Option<CookingOutcome> {
        if self.phase != Phase::Cooking {
            return None;
        }
        if self.state.advance(&self.cfg) { self.complete_cooking() } else { None }
    }

    /// Resolves the current cook, notifies the host and returns to idle.
    pub fn complete_cooking(&mut self) -> Option<CookingOutcome> {
        if self.phase != Phase::Cooking {
            return None;
        }
        self.cancel_tick();
        let Some(recipe) = self.selected.as_ref() else {
            error!("cooking without a selected recipe, forcing reset");
            self.reset_cooking();
            return None;
        };
        self.phase = Phase::Resolving;

        let success = self.state.quality >= self.cfg.success_quality;
        let outcome = CookingOutcome {
            success,
            recipe: recipe.name.clone(),
            result: success.then(|| recipe.result.name.clone()),
            quality: self.state.rounded_quality(),
        };
        info!(
            "cooking finished: {} ({}), quality {}%",
            outcome.recipe,
            if success { "success" } else { "failure" },
            outcome.quality
        );
        self.outbox.push(Outbound::CookingComplete {
            success: outcome.success,
            recipe: outcome.recipe.clone(),
            result: outcome.result.clone(),
            quality: outcome.quality,
        });

        self.reset_cooking();
        self.last_outcome = Some(outcome.clone());
        if let Some(delay) = self.cfg.auto_close_ms {
            match self.scheduler.arm_timeout(delay, Task::AutoClose) {
                Ok(handle) => self.auto_close_task = Some(handle),
                Err(err) => warn!("auto-close not scheduled: {}", err),
            }
        }
        Some(outcome)
    }

    /// Abort path, valid from any phase. Never notifies the host.
    pub fn reset_cooking(&mut self) {
        self.cancel_tick();
        self.selected = None;
        self.state = CookingState::default();
        self.phase = Phase::Idle;
    }

    /// Dismisses the session, notifying the host with `closeUI`.
    pub fn close_interface(&mut self) -> Result<(), CookingError> {
        if self.processing {
            debug!("close dropped: processing");
            return Err(CookingError::Busy);
        }
        self.arm_guard(self.cfg.close_guard_ms);
        if self.is_cooking() {
            info!("closing mid-cook, discarding session");
        }
        self.cancel_auto_close();
        self.reset_cooking();
        self.visible = false;
        self.outbox.push(Outbound::CloseUi);
        info!("cooking interface closed");
        Ok(())
    }

    /// Disarms every timer this session owns and returns it to idle, silently.
    /// Used before the session is dropped so no late callback lands on a successor.
    pub fn shutdown(&mut self) {
        self.cancel_auto_close();
        if let Some(handle) = self.guard_task.take() {
            self.scheduler.cancel(handle);
        }
        self.processing = false;
        self.reset_cooking();
        self.visible = false;
        debug!("session shut down");
    }

    /// Entry point for every timer callback.
    pub fn run_task(&mut self, task: Task) {
        match task {
            Task::Tick => {
                if self.phase != Phase::Cooking {
                    warn!("stray tick outside cooking");
                    self.cancel_tick();
                    return;
                }
                self.advance();
            }
            Task::ReleaseGuard => {
                self.guard_task = None;
                self.processing = false;
            }
            Task::AutoClose => {
                self.auto_close_task = None;
                if let Err(err) = self.close_interface() {
                    warn!("auto-close skipped: {}", err);
                }
            }
        }
    }

    // --- Internals -----------------------------------------------------------------

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_auto_close(&mut self) {
        if let Some(handle) = self.auto_close_task.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn arm_guard(&mut self, delay_ms: u32) {
        if let Some(handle) = self.guard_task.take() {
            self.scheduler.cancel(handle);
        }
        self.processing = true;
        match self.scheduler.arm_timeout(delay_ms, Task::ReleaseGuard) {
            Ok(handle) => self.guard_task = Some(handle),
            Err(err) => {
                // Without a release timer the guard would never clear.
                warn!("guard release not scheduled: {}", err);
                self.processing = false;
            }
        }
    }
}
