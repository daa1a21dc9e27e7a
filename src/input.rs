//! Host events forwarded into the embed app

use bevy::ecs::{component::Component, message::Message};

use crate::{host::HostDocument, message::FrameMessage};

/// Host-side listeners an instance installs for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Window `message`
    Message,
    /// Document `fullscreenchange`
    FullscreenChange,
    /// Document `keydown`
    KeyDown,
    /// Window `resize`
    Resize,
    /// Window `orientationchange`
    OrientationChange,
    /// Observer watching for the container leaving the document
    Removal,
}

impl ListenerKind {
    /// Every listener, in installation order
    pub const ALL: [Self; 6] = [
        Self::Message,
        Self::FullscreenChange,
        Self::KeyDown,
        Self::Resize,
        Self::OrientationChange,
        Self::Removal,
    ];

    /// DOM event name; `None` for the removal observer
    pub fn event_name(self) -> Option<&'static str> {
        match self {
            Self::Message => Some("message"),
            Self::FullscreenChange => Some("fullscreenchange"),
            Self::KeyDown => Some("keydown"),
            Self::Resize => Some("resize"),
            Self::OrientationChange => Some("orientationchange"),
            Self::Removal => None,
        }
    }
}

/// What happened on the host side
#[derive(Debug, Clone, PartialEq)]
pub enum HostEventKind {
    /// A structured message arrived on the shared cross-document channel
    Message(FrameMessage),
    /// The document's native fullscreen element changed
    FullscreenChange,
    /// A key was pressed on the host page
    KeyDown {
        /// DOM `KeyboardEvent.key`
        key: String,
    },
    /// The viewport was resized
    Resize,
    /// The device orientation changed
    OrientationChange,
    /// A native fullscreen request finished
    NativeFullscreenSettled {
        /// `false` when the platform rejected the request
        accepted: bool,
    },
    /// The frame finished loading its primary content
    FrameLoaded,
    /// The container left the document
    ContainerRemoved,
}

/// Event delivered by the listener of one instance
#[derive(Message, Debug, Clone, PartialEq)]
pub struct HostEvent {
    /// Identifier of the instance whose listener fired
    pub target: String,
    /// The event
    pub kind: HostEventKind,
}

impl HostEvent {
    /// Creates an event for the instance `target`
    pub fn new(target: impl Into<String>, kind: HostEventKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// Listeners currently installed for an instance
///
/// `install` and `release` form the setup/teardown pair for everything an
/// instance registers on the host.
#[derive(Component, Debug, Default)]
pub struct HostListeners {
    installed: Vec<ListenerKind>,
}

impl HostListeners {
    /// Register every listener for `id`
    pub fn install(host: &mut dyn HostDocument, id: &str) -> Self {
        for kind in ListenerKind::ALL {
            host.add_listener(id, kind);
        }
        Self {
            installed: ListenerKind::ALL.to_vec(),
        }
    }

    /// Deregister everything `install` registered
    pub fn release(&mut self, host: &mut dyn HostDocument, id: &str) {
        for kind in self.installed.drain(..) {
            host.remove_listener(id, kind);
        }
    }
}
