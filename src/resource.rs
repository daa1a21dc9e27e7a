//! Lifecycle of the transient content resources of an instance

use bevy::ecs::component::Component;

use crate::host::{HostDocument, ResourceUrl};

/// MIME type of generated frame content
pub const CONTENT_MIME: &str = "text/html";

/// The primary / standalone resource pair of an instance
///
/// Each handle is released at most once: releasing takes it out of the slot.
#[derive(Component, Debug, Default)]
pub struct ResourceHandles {
    primary: Option<ResourceUrl>,
    standalone: Option<ResourceUrl>,
}

impl ResourceHandles {
    /// Handles for freshly created resources
    pub fn new(primary: ResourceUrl, standalone: Option<ResourceUrl>) -> Self {
        Self {
            primary: Some(primary),
            standalone,
        }
    }

    /// Release the primary content; returns whether anything was released
    pub fn release_primary(&mut self, host: &mut dyn HostDocument) -> bool {
        release(host, self.primary.take())
    }

    /// Release the standalone content; returns whether anything was released
    pub fn release_standalone(&mut self, host: &mut dyn HostDocument) -> bool {
        release(host, self.standalone.take())
    }

    /// Release whatever is still held
    pub fn release_all(&mut self, host: &mut dyn HostDocument) {
        self.release_primary(host);
        self.release_standalone(host);
    }
}

fn release(host: &mut dyn HostDocument, url: Option<ResourceUrl>) -> bool {
    match url {
        Some(url) => {
            host.release_resource(&url);
            true
        }
        None => false,
    }
}
