//! Desktop automation via enigo, the default browser and process spawning

use std::cell::RefCell;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::{debug, warn};

use super::{ActionError, Desktop, SystemKey};

thread_local! {
    // One platform input connection per thread that presses keys
    static KEYBOARD: RefCell<Option<Enigo>> = const { RefCell::new(None) };
}

/// The real desktop session
#[derive(Debug, Default)]
pub struct SystemDesktop;

impl SystemDesktop {
    pub fn new() -> Self {
        Self
    }
}

impl From<SystemKey> for Key {
    fn from(key: SystemKey) -> Self {
        match key {
            SystemKey::VolumeUp => Key::VolumeUp,
            SystemKey::VolumeDown => Key::VolumeDown,
            SystemKey::NextTrack => Key::MediaNextTrack,
            SystemKey::PreviousTrack => Key::MediaPrevTrack,
            SystemKey::PlayPause => Key::MediaPlayPause,
        }
    }
}

impl Desktop for SystemDesktop {
    fn press_key(&self, key: SystemKey) -> Result<(), ActionError> {
        KEYBOARD.with(|slot| {
            with_cached(
                slot,
                || Enigo::new(&Settings::default()).map_err(|e| ActionError::Keyboard(e.to_string())),
                |enigo| {
                    enigo
                        .key(key.into(), Direction::Click)
                        .map_err(|e| ActionError::Keyboard(e.to_string()))
                },
            )
        })?;
        debug!(?key, "key pressed");
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), ActionError> {
        webbrowser::open(url).map_err(|source| ActionError::Browser {
            url: url.to_string(),
            source,
        })
    }

    fn launch(&self, app: &str) -> Result<(), ActionError> {
        let _reaper = launch_command(app)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .and_then(reap_in_background)
            .map_err(|source| ActionError::Launch {
                app: app.to_string(),
                source,
            })?;
        debug!(app, "application launched");
        Ok(())
    }
}

/// Run `f` on the cached value in `slot`, building it first if needed.
/// A failed call clears the slot so the next one starts fresh.
fn with_cached<K, T, E>(
    slot: &RefCell<Option<K>>,
    build: impl FnOnce() -> Result<K, E>,
    f: impl FnOnce(&mut K) -> Result<T, E>,
) -> Result<T, E> {
    let mut slot = slot.borrow_mut();
    let value = match &mut *slot {
        Some(value) => value,
        empty => empty.insert(build()?),
    };
    let result = f(value);
    if result.is_err() {
        *slot = None;
    }
    result
}

/// Wait for a launched process on its own thread so it never lingers as a zombie
fn reap_in_background(mut child: Child) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let pid = child.id();
    thread::Builder::new()
        .name("launch-reaper".to_string())
        .spawn(move || {
            let status = child.wait();
            match &status {
                Ok(status) => debug!(pid, %status, "launched process exited"),
                Err(e) => warn!(pid, error = %e, "could not wait for launched process"),
            }
            status
        })
}

fn launch_command(app: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.args(["-a", app]);
        command
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", app]);
        command
    } else {
        Command::new(app)
    }
}
