//! Global activation chord
//!
//! On macOS a CGEventTap watches modifier changes system-wide and fires a
//! manual trigger each time Control+Option goes down together.

mod keys;
#[cfg(target_os = "macos")]
mod listener;

#[cfg(target_os = "macos")]
pub use listener::HotkeyListener;
