//! Global chord listener using macOS CGEventTap
//!
//! Runs on a dedicated thread with its own CFRunLoop and forwards each
//! press of the activation chord as a manual trigger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventType,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::activation::TriggerSource;

use super::keys::{ChordDetector, ModifierState};

pub struct HotkeyListener {
    trigger_tx: mpsc::Sender<TriggerSource>,
    running: Arc<AtomicBool>,
}

impl HotkeyListener {
    pub fn new(trigger_tx: mpsc::Sender<TriggerSource>) -> Self {
        Self {
            trigger_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the listener thread
    ///
    /// Event tap creation happens on that thread, so a missing
    /// Accessibility permission is only logged from there.
    pub fn start(&self) -> Result<(), HotkeyError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyRunning);
        }

        let trigger_tx = self.trigger_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");

                if let Err(e) = run_event_loop(trigger_tx, Arc::clone(&running)) {
                    error!(error = %e, "hotkey listener error");
                }

                running.store(false, Ordering::SeqCst);
                info!("hotkey listener thread stopped");
            })
            .map_err(|e| HotkeyError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Ask the listener thread to exit on its next poll
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey listener is already running")]
    AlreadyRunning,

    #[error("failed to create event tap - check Accessibility permissions")]
    EventTapCreation,

    #[error("failed to attach event tap to the run loop")]
    RunLoopSource,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

fn run_event_loop(
    trigger_tx: mpsc::Sender<TriggerSource>,
    running: Arc<AtomicBool>,
) -> Result<(), HotkeyError> {
    let mut chord = ChordDetector::new();
    let (callback_tx, callback_rx) = std::sync::mpsc::channel::<CGEventFlags>();

    // Must be fast and non-blocking
    let callback = move |_proxy: core_graphics::event::CGEventTapProxy,
                         event_type: CGEventType,
                         event: &CGEvent|
                         -> Option<CGEvent> {
        match event_type {
            CGEventType::FlagsChanged => {
                let _ = callback_tx.send(event.get_flags());
            }
            CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                warn!("event tap disabled by the system");
            }
            _ => {}
        }
        Some(event.clone())
    };

    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::FlagsChanged],
        callback,
    )
    .map_err(|_| HotkeyError::EventTapCreation)?;

    tap.enable();

    let run_loop_source = tap
        .mach_port
        .create_runloop_source(0)
        .map_err(|_| HotkeyError::RunLoopSource)?;
    let run_loop = CFRunLoop::get_current();

    unsafe {
        run_loop.add_source(&run_loop_source, kCFRunLoopCommonModes);
    }

    info!("event tap created, press Control+Option to talk");

    while running.load(Ordering::SeqCst) {
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, Duration::from_millis(100), true);
        }

        while let Ok(event_flags) = callback_rx.try_recv() {
            let state = ModifierState::from_flags(event_flags);
            if !chord.update(state) {
                continue;
            }

            debug!(?state, "activation chord pressed");
            // try_send: a press while one is pending adds nothing
            match trigger_tx.try_send(TriggerSource::Hotkey) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!("trigger channel closed, stopping hotkey listener");
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(4);
        let listener = HotkeyListener::new(tx);
        assert!(!listener.is_running());
    }
}
