//! Proctoring signals and their classification into violations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A discrete proctoring violation. Severity is decided by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationEvent {
    TabHidden,
    FullscreenExited,
    DevToolsAttempt,
    ClipboardAttempt,
    ContextMenuAttempt,
}

impl fmt::Display for ViolationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationEvent::TabHidden => "tab hidden",
            ViolationEvent::FullscreenExited => "fullscreen exited",
            ViolationEvent::DevToolsAttempt => "developer tools shortcut",
            ViolationEvent::ClipboardAttempt => "clipboard use",
            ViolationEvent::ContextMenuAttempt => "context menu",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipboardAction {
    Copy,
    Cut,
    Paste,
}

/// A key press with its modifier state. `key` is the logical key value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyChord {
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ctrl_shift(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            shift: true,
            ..Self::default()
        }
    }

    fn key_is(&self, candidates: &[&str]) -> bool {
        candidates
            .iter()
            .any(|candidate| self.key.eq_ignore_ascii_case(candidate))
    }

    fn is_devtools(&self) -> bool {
        if self.key_is(&["F12"]) {
            return true;
        }
        let inspector = self.key_is(&["I", "J", "C"]);
        (self.ctrl && self.shift && inspector)
            || (self.meta && self.alt && inspector)
            || (self.ctrl && !self.shift && self.key_is(&["U"]))
    }

    fn is_clipboard(&self) -> bool {
        (self.ctrl || self.meta) && !self.shift && self.key_is(&["C", "V", "X"])
    }
}

/// Raw environment signal as delivered by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvSignal {
    VisibilityChanged { hidden: bool },
    FullscreenChanged { active: bool },
    KeyDown(KeyChord),
    ContextMenu,
    Clipboard(ClipboardAction),
}

/// What the host should do with a signal it just reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignalDisposition {
    pub event: Option<ViolationEvent>,
    pub prevent_default: bool,
}

impl SignalDisposition {
    const IGNORED: Self = Self {
        event: None,
        prevent_default: false,
    };

    fn forward(event: ViolationEvent, prevent_default: bool) -> Self {
        Self {
            event: Some(event),
            prevent_default,
        }
    }
}

/// Map a raw signal onto at most one violation.
#[must_use]
pub fn classify(signal: &EnvSignal) -> SignalDisposition {
    match signal {
        EnvSignal::VisibilityChanged { hidden: true } => {
            SignalDisposition::forward(ViolationEvent::TabHidden, false)
        }
        EnvSignal::FullscreenChanged { active: false } => {
            SignalDisposition::forward(ViolationEvent::FullscreenExited, false)
        }
        EnvSignal::VisibilityChanged { hidden: false }
        | EnvSignal::FullscreenChanged { active: true } => SignalDisposition::IGNORED,
        EnvSignal::KeyDown(chord) if chord.is_devtools() => {
            SignalDisposition::forward(ViolationEvent::DevToolsAttempt, true)
        }
        EnvSignal::KeyDown(chord) if chord.is_clipboard() => {
            SignalDisposition::forward(ViolationEvent::ClipboardAttempt, true)
        }
        EnvSignal::KeyDown(_) => SignalDisposition::IGNORED,
        EnvSignal::ContextMenu => {
            SignalDisposition::forward(ViolationEvent::ContextMenuAttempt, true)
        }
        EnvSignal::Clipboard(_) => {
            SignalDisposition::forward(ViolationEvent::ClipboardAttempt, true)
        }
    }
}

pub type ViolationHandler = Box<dyn Fn(ViolationEvent) + Send + Sync>;

/// Forwards classified signals to a single handler while active.
#[derive(Default)]
pub struct ViolationMonitor {
    handler: Option<ViolationHandler>,
}

impl ViolationMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handler.is_some()
    }

    /// Start forwarding to `handler`, replacing any previous one.
    pub fn activate(&mut self, handler: ViolationHandler) {
        self.handler = Some(handler);
        tracing::debug!("violation monitor activated");
    }

    /// Stop forwarding. Safe to call repeatedly.
    pub fn deactivate(&mut self) {
        if self.handler.take().is_some() {
            tracing::debug!("violation monitor deactivated");
        }
    }

    /// Classify one signal and forward it if it is a violation.
    ///
    /// An inactive monitor neither forwards nor blocks anything.
    pub fn observe(&self, signal: &EnvSignal) -> SignalDisposition {
        let Some(handler) = self.handler.as_ref() else {
            return SignalDisposition::IGNORED;
        };
        let disposition = classify(signal);
        match disposition.event {
            Some(event) => handler(event),
            None => tracing::debug!(?signal, "signal suppressed"),
        }
        disposition
    }
}

impl fmt::Debug for ViolationMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViolationMonitor")
            .field("active", &self.is_active())
            .finish()
    }
}
