//! Browser glue: owns the single session in a `thread_local!`, arms real
//! timers, listens for host messages and keys, and posts notifications back
//! through `window.invokeNative('sendNuiMessage', json)`.
//!
//! Rendering is limited to syncing the three progress bars and the body
//! visibility; everything else is left to the page's own scripts, which can
//! poll `cooking_snapshot()`.

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, window};

use crate::bridge::{Outbound, dispatch, encode_outbound, parse_inbound};
use crate::config::CookingConfig;
use crate::cooking::CookingSnapshot;
use crate::error::CookingError;
use crate::keys;
use crate::logger;
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::session::Session;

const FIRE_BAR_ID: &str = "fireProgress";
const PROGRESS_BAR_ID: &str = "cookingProgress";
const QUALITY_BAR_ID: &str = "qualityProgress";
const NOTICE_ID: &str = "cookingNotice";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = window, js_name = invokeNative)]
    fn invoke_native(kind: &str, payload: &str) -> Result<(), JsValue>;
}

thread_local! {
    static SESSION: RefCell<Option<Session<WebScheduler>>> = const { RefCell::new(None) };
}

// --- Timers -------------------------------------------------------------------

/// `setInterval` / `setTimeout` backed scheduler. Interval closures are kept
/// alive here until cancelled; timeouts free themselves after firing.
#[derive(Default)]
pub struct WebScheduler {
    intervals: HashMap<i32, Closure<dyn FnMut()>>,
}

impl Scheduler for WebScheduler {
    fn arm_interval(&mut self, period_ms: u32, task: Task) -> Result<TaskHandle, CookingError> {
        let win = window().ok_or_else(no_window)?;
        let closure = Closure::wrap(Box::new(move || fire(task)) as Box<dyn FnMut()>);
        let id = win
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            )
            .map_err(js_err)?;
        self.intervals.insert(id, closure);
        Ok(TaskHandle(id))
    }

    fn arm_timeout(&mut self, delay_ms: u32, task: Task) -> Result<TaskHandle, CookingError> {
        let win = window().ok_or_else(no_window)?;
        // Leaks if cancelled before firing; only guard and auto-close use timeouts.
        let callback = Closure::once_into_js(move || fire(task));
        let id = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms as i32)
            .map_err(js_err)?;
        Ok(TaskHandle(id))
    }

    fn cancel(&mut self, handle: TaskHandle) {
        let Some(win) = window() else { return };
        // Timer ids share one pool, clearInterval also clears timeouts.
        win.clear_interval_with_handle(handle.0);
        if let Some(closure) = self.intervals.remove(&handle.0) {
            // Cancel usually runs inside this interval's own callback, so the
            // closure must outlive the current turn.
            let deferred = Closure::once_into_js(move || drop(closure));
            if let Err(err) = win.set_timeout_with_callback_and_timeout_and_arguments_0(deferred.unchecked_ref(), 0) {
                debug!("interval closure leaked: {}", js_err(err));
            }
        }
    }
}

fn fire(task: Task) {
    if with_session(|s| s.run_task(task)).is_none() {
        debug!("timer {:?} fired without a session", task);
    }
}

// --- Session access -------------------------------------------------------------

/// Runs `f` against the session, then delivers queued notifications and
/// re-renders outside the borrow. `None` if uninitialised or re-entered.
fn with_session<R>(f: impl FnOnce(&mut Session<WebScheduler>) -> R) -> Option<R> {
    let (out, outbound, snapshot, visible) = SESSION.with(|cell| {
        let mut slot = cell.try_borrow_mut().ok()?;
        let session = slot.as_mut()?;
        let out = f(session);
        Some((out, session.take_outbound(), session.snapshot(), session.is_visible()))
    })?;
    deliver(outbound);
    render(&snapshot, visible);
    Some(out)
}

fn deliver(outbound: Vec<Outbound>) {
    for msg in outbound {
        let json = match encode_outbound(&msg) {
            Ok(json) => json,
            Err(err) => {
                warn!("dropping notification: {}", err);
                continue;
            }
        };
        if let Err(err) = invoke_native("sendNuiMessage", &json) {
            // Outside the game client there is no invokeNative; nothing to retry.
            debug!("{}", js_err(err));
        }
    }
}

// --- Rendering ------------------------------------------------------------------

fn render(snapshot: &CookingSnapshot, visible: bool) {
    let Some(doc) = window().and_then(|w| w.document()) else { return };
    for (id, value) in [
        (FIRE_BAR_ID, snapshot.fire),
        (PROGRESS_BAR_ID, snapshot.progress),
        (QUALITY_BAR_ID, snapshot.quality),
    ] {
        if let Err(err) = set_style(&doc, id, "width", &format!("{value}%")) {
            debug!("{}", err);
        }
    }
    if let Some(body) = doc.body() {
        let display = if visible { "flex" } else { "none" };
        body.style().set_property("display", display).ok();
    }
}

fn lookup(doc: &Document, id: &str) -> Result<HtmlElement, CookingError> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| CookingError::Lookup { target: id.to_string() })
}

fn set_style(doc: &Document, id: &str, property: &str, value: &str) -> Result<(), CookingError> {
    lookup(doc, id)?.style().set_property(property, value).map_err(js_err)
}

/// Transient player-facing message for rejected actions.
fn report(err: &CookingError) {
    if err.is_transient() {
        debug!("dropped: {}", err);
        return;
    }
    info!("{}", err);
    let Some(doc) = window().and_then(|w| w.document()) else { return };
    match lookup(&doc, NOTICE_ID) {
        Ok(el) => el.set_text_content(Some(&err.to_string())),
        Err(lookup_err) => debug!("{}", lookup_err),
    }
}

// --- Exports ------------------------------------------------------------------

/// Creates the session and wires listeners. `config_json` overrides defaults.
/// Calling again replaces the session; listeners are installed only once.
#[wasm_bindgen]
pub fn init_cooking(config_json: Option<String>) -> Result<(), JsValue> {
    let cfg = match config_json {
        Some(raw) => CookingConfig::from_json(&raw).map_err(to_js)?,
        None => CookingConfig::default(),
    };
    logger::init(cfg.level_filter());
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let previous = SESSION.with(|cell| cell.replace(Some(Session::new(cfg, WebScheduler::default()))));
    let first_init = previous.is_none();
    if let Some(mut old) = previous {
        old.shutdown();
    }

    if first_init {
        let on_message = Closure::wrap(Box::new(move |evt: web_sys::MessageEvent| {
            match js_sys::JSON::stringify(&evt.data()) {
                Ok(raw) => handle_message(&String::from(raw)),
                Err(_) => warn!("unserialisable message payload"),
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())?;
        on_message.forget();

        let on_key = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let code = evt.code();
            match with_session(|s| keys::handle_key(s, &code)) {
                Some(Ok(true)) => evt.prevent_default(),
                Some(Ok(false)) | None => {}
                Some(Err(err)) => {
                    evt.prevent_default();
                    report(&err);
                }
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
        on_key.forget();
    }

    with_session(|_| ());
    info!("cooking system initialised");
    Ok(())
}

/// Entry for host messages delivered as JSON text.
#[wasm_bindgen]
pub fn handle_message(raw: &str) {
    let msg = match parse_inbound(raw) {
        Ok(msg) => msg,
        Err(err) => {
            warn!("{}", err);
            return;
        }
    };
    match with_session(|s| dispatch(s, msg)) {
        Some(Ok(())) => {}
        Some(Err(err)) => report(&err),
        None => warn!("message received before init_cooking"),
    }
}

#[wasm_bindgen]
pub fn select_recipe(id: &str) -> Result<(), JsValue> {
    session_call(|s| s.select_recipe(id).map(|_| ()))
}

/// Busy rejections resolve silently; other rejections reject with the reason.
#[wasm_bindgen]
pub fn start_cooking() -> Result<(), JsValue> {
    session_call(|s| s.start_cooking())
}

#[wasm_bindgen]
pub fn control_action(kind: &str) -> bool {
    with_session(|s| s.control_action_named(kind)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn close_cooking() -> Result<(), JsValue> {
    session_call(|s| s.close_interface())
}

/// `{fire, progress, quality, phase}` as JSON.
#[wasm_bindgen]
pub fn cooking_snapshot() -> Result<String, JsValue> {
    let json = SESSION.with(|cell| {
        let slot = cell.try_borrow().map_err(|_| JsValue::from_str("session busy"))?;
        let session = slot.as_ref().ok_or_else(|| JsValue::from_str("not initialised"))?;
        serde_json::to_string(&session.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    })?;
    Ok(json)
}

fn session_call(f: impl FnOnce(&mut Session<WebScheduler>) -> Result<(), CookingError>) -> Result<(), JsValue> {
    match with_session(f) {
        Some(Ok(())) => Ok(()),
        Some(Err(err)) if err.is_transient() => {
            report(&err);
            Ok(())
        }
        Some(Err(err)) => {
            report(&err);
            Err(to_js(err))
        }
        None => Err(JsValue::from_str("cooking session not initialised")),
    }
}

fn no_window() -> CookingError {
    CookingError::Lookup { target: "window".to_string() }
}

fn js_err(err: JsValue) -> CookingError {
    CookingError::Host { detail: err.as_string().unwrap_or_else(|| format!("{:?}", err)) }
}

fn to_js(err: CookingError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
