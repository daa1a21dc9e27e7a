//! Responsive, fullscreen-capable content frames embedded in host web pages
//!
//! This crate renders a sandboxed content frame into a container element of a
//! host page, scales it to the available space, and lets the embedded document
//! escape to fullscreen. The host page is not manipulated directly: the host
//! implements [`HostDocument`] and forwards its events to a Bevy app, which
//! keeps one entity of state per embed.
//!
//! # Architecture
//!
//! - **EmbedPlugin**: Registers the resources, messages and systems
//! - **HostDocument**: The injected host page (browser backend on `wasm32`)
//! - **HostChannel**: Host events queued from callbacks into the app
//! - **render**: Validates options and mounts one embed
//! - **FrameMessage**: Identifier-scoped messages exchanged with the frame

#![warn(missing_docs)]

mod channel;
mod config;
mod diagnostics;
mod embed;
mod fullscreen;
mod host;
mod input;
mod message;
mod platform;
mod plugin;
mod resource;
mod scale;
mod style;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use channel::*;
pub use config::*;
pub use diagnostics::*;
pub use embed::{EmbedInstance, EmbedRouter, RenderError, ScaleState, render, try_render};
pub use fullscreen::*;
pub use host::*;
pub use input::*;
pub use message::*;
pub use platform::*;
pub use plugin::*;
pub use resource::*;
pub use scale::*;
pub use style::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        channel::HostChannel,
        config::{EmbedContext, EmbedOptions, Theme, ThemeOverrides},
        embed::{EmbedInstance, ScaleState, render, try_render},
        fullscreen::FullscreenState,
        host::HostDocument,
        input::{HostEvent, HostEventKind},
        message::FrameMessage,
        platform::Platform,
        plugin::{EmbedPlugin, attach_host_document},
    };
}
