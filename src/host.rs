//! The host document seen by the embed app
//!
//! The controller never touches a DOM directly. Everything it reads or mutates
//! on the host page goes through [`HostDocument`], injected once per app with
//! [`attach_host_document`](crate::attach_host_document). The browser backend
//! implements it with `web-sys`; tests implement it with a recording mock.

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::{
    input::ListenerKind,
    message::FrameMessage,
    scale::{ContainerRect, Viewport},
};

/// Element of an instance that carries styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// The host element named by the identifier
    Container,
    /// Scaling wrapper between container and frame
    Wrapper,
    /// The sandboxed content frame
    Frame,
}

/// Reference to transient in-memory content the frame can load
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUrl(String);

impl ResourceUrl {
    /// Wraps a URL handed out by the host
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL the frame loads
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything needed to mount the wrapper and frame into a container
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    /// Primary content
    pub src: ResourceUrl,
    /// Wrapper `cssText`
    pub wrapper_css: String,
    /// Frame `cssText`
    pub frame_css: &'static str,
    /// Frame `sandbox` attribute
    pub sandbox: &'static str,
    /// Frame `allow` attribute
    pub allow: &'static str,
    /// Exposed as `data-ios-standalone-url` when present
    pub standalone: Option<ResourceUrl>,
}

/// Outcome of asking the host for native fullscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeRequest {
    /// The request is in flight; the host reports back with
    /// [`HostEventKind::NativeFullscreenSettled`](crate::HostEventKind::NativeFullscreenSettled)
    Pending,
    /// The container has no native fullscreen API
    Unsupported,
}

/// Failures reported by the host document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// No element with this id
    #[error("element #{0} is not in the document")]
    ElementMissing(String),
    /// The host could not store content
    #[error("could not create content resource: {0}")]
    ResourceCreation(String),
    /// Building or attaching the wrapper and frame failed
    #[error("could not mount frame: {0}")]
    Mount(String),
    /// The frame is gone or has no document to post to
    #[error("frame of #{0} is unreachable")]
    FrameUnreachable(String),
}

/// Operations the embed app needs from the host page
pub trait HostDocument {
    /// Whether an element with this id exists
    fn contains_element(&self, id: &str) -> bool;

    /// Current viewport size
    fn viewport(&self) -> Viewport;

    /// Bounding box of the container, if it is in the document
    fn container_rect(&self, id: &str) -> Option<ContainerRect>;

    /// Id of the element in native fullscreen; empty string for an element
    /// without id
    fn fullscreen_element(&self) -> Option<String>;

    /// Create a `<style>` element with the given id and contents
    fn install_stylesheet(&mut self, style_id: &str, css: &str);

    /// Replace the whole inline style of a node
    fn set_css_text(&mut self, id: &str, node: Node, css: &str);

    /// Set a single style property of a node
    fn set_style_property(&mut self, id: &str, node: Node, property: &str, value: &str);

    /// Build the wrapper and frame and append them to the container
    fn mount_frame(&mut self, id: &str, frame: &FrameSpec) -> Result<(), HostError>;

    /// Store content in memory and return a reference the frame can load
    fn create_resource(&mut self, content: &str, mime: &str) -> Result<ResourceUrl, HostError>;

    /// Drop content created by `create_resource`
    fn release_resource(&mut self, url: &ResourceUrl);

    /// Post a message into the frame's document
    fn post_to_frame(&mut self, id: &str, message: &FrameMessage) -> Result<(), HostError>;

    /// Ask for native fullscreen on the container
    fn request_native_fullscreen(&mut self, id: &str) -> NativeRequest;

    /// Leave native fullscreen
    fn exit_native_fullscreen(&mut self);

    /// Register a listener delivering host events targeted at `id`
    fn add_listener(&mut self, id: &str, kind: ListenerKind);

    /// Deregister a listener registered with `add_listener`
    fn remove_listener(&mut self, id: &str, kind: ListenerKind);

    /// Forget host-side state kept for an instance whose container left the
    /// document
    fn unmount(&mut self, id: &str);
}

/// Non-send resource owning the injected host document
pub struct HostHandle(Box<dyn HostDocument>);

impl HostHandle {
    /// Box a host document for insertion into the app
    pub fn new(document: impl HostDocument + 'static) -> Self {
        Self(Box::new(document))
    }
}

impl Deref for HostHandle {
    type Target = dyn HostDocument;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for HostHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
