//! Modifier key state and chord edge detection

/// Modifier key flag masks from macOS CGEventFlags
#[cfg(target_os = "macos")]
pub mod flags {
    use core_graphics::event::CGEventFlags;

    pub const CONTROL: CGEventFlags = CGEventFlags::CGEventFlagControl;
    pub const OPTION: CGEventFlags = CGEventFlags::CGEventFlagAlternate;
    pub const COMMAND: CGEventFlags = CGEventFlags::CGEventFlagCommand;
}

/// Tracks which modifier keys are currently pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub control: bool,
    pub option: bool,
    pub command: bool,
}

impl ModifierState {
    #[cfg(target_os = "macos")]
    pub fn from_flags(event_flags: core_graphics::event::CGEventFlags) -> Self {
        Self {
            control: event_flags.contains(flags::CONTROL),
            option: event_flags.contains(flags::OPTION),
            command: event_flags.contains(flags::COMMAND),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.control && !self.option && !self.command
    }

    /// Control + Option without Command, the activation chord
    pub fn is_control_option(&self) -> bool {
        self.control && self.option && !self.command
    }
}

/// Fires once per press of the activation chord
#[derive(Debug, Default)]
pub struct ChordDetector {
    held: bool,
}

impl ChordDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new modifier state; true when the chord has just been pressed
    pub fn update(&mut self, state: ModifierState) -> bool {
        let held = state.is_control_option();
        let pressed = held && !self.held;
        self.held = held;
        pressed
    }
}
