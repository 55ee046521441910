//! Script screening — a textual denylist checked before execution.
//!
//! Trivially bypassable (string concatenation, `getattr`, another module);
//! it only stops a model from casually emitting the obvious destructive calls.

use tracing::warn;

/// Calls that cause a script to be refused outright.
pub const DENIED_SCRIPT_CALLS: [&str; 2] = ["os.remove", "shutil.rmtree"];

/// Return the first denied call found in `source`, if any.
pub fn screen_script(source: &str) -> Option<&'static str> {
    let hit = DENIED_SCRIPT_CALLS
        .into_iter()
        .find(|call| source.contains(call));
    if let Some(call) = hit {
        warn!(call, "Script refused by denylist");
    }
    hit
}
