//! Cocina NUI core crate.
//!
//! Cooking minigame for an in-game browser overlay. The host sends a recipe
//! catalog, the player picks a dish and keeps the pan at the right heat while
//! a fixed-rate tick drives fire, progress and quality; the outcome is posted
//! back to the host. Everything except `web` and `logger` is plain Rust and
//! runs natively under `cargo test`.

use wasm_bindgen::prelude::*;

pub mod bridge;
pub mod config;
pub mod cooking;
pub mod error;
pub mod keys;
mod logger;
pub mod recipe;
pub mod scheduler;
pub mod session;
pub mod web;

pub use bridge::{Inbound, Outbound, dispatch, encode_outbound, parse_inbound};
pub use config::CookingConfig;
pub use cooking::{ControlAction, CookingOutcome, CookingSnapshot, CookingState, Phase};
pub use error::{CookingError, ValidationError};
pub use recipe::{Ingredient, Recipe, ResultItem};
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle};
pub use session::Session;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}
