//! Keyboard shortcuts over the public session operations.

use crate::cooking::ControlAction;
use crate::error::CookingError;
use crate::scheduler::Scheduler;
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Cancel,
    Confirm,
    Control(ControlAction),
}

/// Maps a `KeyboardEvent.code` to a command.
pub fn map_key(code: &str) -> Option<KeyCommand> {
    let cmd = match code {
        "Escape" => KeyCommand::Cancel,
        "Space" => KeyCommand::Confirm,
        "Digit1" | "Numpad1" => KeyCommand::Control(ControlAction::Fire),
        "Digit2" | "Numpad2" => KeyCommand::Control(ControlAction::Water),
        "Digit3" | "Numpad3" => KeyCommand::Control(ControlAction::Stir),
        "Digit4" | "Numpad4" => KeyCommand::Control(ControlAction::Seasoning),
        _ => return None,
    };
    Some(cmd)
}

/// Runs the command bound to `code`. Returns whether the key was consumed,
/// so the caller can suppress the browser default. Keys do nothing while the
/// interface is hidden.
pub fn handle_key<S: Scheduler>(session: &mut Session<S>, code: &str) -> Result<bool, CookingError> {
    if !session.is_visible() {
        return Ok(false);
    }
    let Some(cmd) = map_key(code) else {
        return Ok(false);
    };
    match cmd {
        KeyCommand::Cancel => session.close_interface()?,
        // Confirm only fires when the start button would be enabled.
        KeyCommand::Confirm if session.is_eligible() => session.start_cooking()?,
        KeyCommand::Confirm => {}
        KeyCommand::Control(action) => {
            session.control_action(action);
        }
    }
    Ok(true)
}
