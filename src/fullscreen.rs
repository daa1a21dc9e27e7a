//! Fullscreen state machine
//!
//! Pure transition decisions. Applying a transition (styles, scale, the state
//! notification) happens in the embed module.

use bevy::ecs::component::Component;

use crate::platform::Platform;

/// Per-instance fullscreen flag
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenState {
    /// Inline in the page
    #[default]
    Normal,
    /// Covering the viewport, natively or CSS-only
    Fullscreen,
}

impl FullscreenState {
    /// Whether the instance covers the viewport
    pub fn is_fullscreen(self) -> bool {
        self == Self::Fullscreen
    }
}

/// Native fullscreen as seen from one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFullscreen {
    /// No element is in native fullscreen
    Inactive,
    /// This instance's container is the native fullscreen element
    Container,
    /// Some other element holds native fullscreen
    OtherElement,
}

impl NativeFullscreen {
    /// Classify the document's current fullscreen element id
    pub fn observe(fullscreen_element: Option<&str>, container_id: &str) -> Self {
        match fullscreen_element {
            None => Self::Inactive,
            Some(id) if id == container_id => Self::Container,
            Some(_) => Self::OtherElement,
        }
    }

    /// Whether any element is in native fullscreen
    pub fn is_active(self) -> bool {
        self != Self::Inactive
    }
}

/// What a toggle request from the frame should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// The platform opens a standalone view instead
    Ignore,
    /// Leave native fullscreen; the change event completes the transition
    ExitNative,
    /// Leave CSS-only fullscreen
    Exit,
    /// Request native fullscreen on the container, CSS-only if unavailable
    Enter,
}

/// Decide how to answer a toggle request
pub fn toggle_action(
    state: FullscreenState,
    platform: Platform,
    native: NativeFullscreen,
) -> ToggleAction {
    if !platform.supports_in_frame_fullscreen() {
        ToggleAction::Ignore
    } else if native.is_active() {
        ToggleAction::ExitNative
    } else if state.is_fullscreen() {
        ToggleAction::Exit
    } else {
        ToggleAction::Enter
    }
}

/// State implied by a native fullscreen change event, if any
pub fn on_native_change(
    state: FullscreenState,
    platform: Platform,
    native: NativeFullscreen,
) -> Option<FullscreenState> {
    if !platform.supports_in_frame_fullscreen() {
        return None;
    }
    match native {
        NativeFullscreen::Container => Some(FullscreenState::Fullscreen),
        NativeFullscreen::Inactive if state.is_fullscreen() => Some(FullscreenState::Normal),
        _ => None,
    }
}

/// State implied by a key press, if any
///
/// Escape leaves CSS-only fullscreen. Native fullscreen handles Escape itself
/// and reports back through a change event.
pub fn on_key(state: FullscreenState, key: &str, native: NativeFullscreen) -> Option<FullscreenState> {
    (key == "Escape" && state.is_fullscreen() && !native.is_active())
        .then_some(FullscreenState::Normal)
}
