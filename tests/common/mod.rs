#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use bevy::{app::App, ecs::entity::Entity};
use bevy_embed_frame::{
    ContainerRect, EmbedOptions, EmbedPlugin, FrameMessage, FrameSpec, HostChannel, HostDocument,
    HostError, HostEvent, HostEventKind, ListenerKind, NativeRequest, Node, Platform, ResourceUrl,
    Viewport, attach_host_document,
};

/// Everything the mock document saw
#[derive(Default)]
pub struct DocState {
    pub elements: HashSet<String>,
    pub viewport: Viewport,
    pub rects: HashMap<String, ContainerRect>,
    pub fullscreen_element: Option<String>,
    pub native_support: bool,
    pub fail_resources: bool,
    /// Fail only resources whose content contains this text
    pub fail_resources_containing: Option<String>,
    pub fail_mount: bool,

    pub css: HashMap<(String, Node), String>,
    pub properties: HashMap<(String, Node, String), String>,
    pub mutations: usize,
    pub stylesheets: Vec<String>,
    pub frames: HashMap<String, FrameSpec>,
    pub mounts: usize,
    pub unmounted: Vec<String>,

    pub resources_created: usize,
    pub live_resources: HashMap<String, String>,
    pub released: Vec<String>,

    pub posted: Vec<(String, FrameMessage)>,
    pub listeners: HashSet<(String, ListenerKind)>,
    pub native_requests: Vec<String>,
    pub native_exits: usize,
    pub viewport_reads: usize,
}

/// Recording [`HostDocument`] shared between the app and the test
#[derive(Clone, Default)]
pub struct MockHost(pub Rc<RefCell<DocState>>);

impl MockHost {
    pub fn with_container(id: &str, viewport: Viewport, rect: ContainerRect) -> Self {
        let host = Self::default();
        {
            let mut state = host.0.borrow_mut();
            state.elements.insert(id.to_string());
            state.rects.insert(id.to_string(), rect);
            state.viewport = viewport;
        }
        host
    }

    pub fn state(&self) -> std::cell::Ref<'_, DocState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, DocState> {
        self.0.borrow_mut()
    }

    pub fn css(&self, id: &str, node: Node) -> Option<String> {
        self.state().css.get(&(id.to_string(), node)).cloned()
    }

    pub fn property(&self, id: &str, node: Node, property: &str) -> Option<String> {
        self.state()
            .properties
            .get(&(id.to_string(), node, property.to_string()))
            .cloned()
    }

    pub fn listener_count(&self, id: &str) -> usize {
        self.state()
            .listeners
            .iter()
            .filter(|(target, _)| target == id)
            .count()
    }
}

impl HostDocument for MockHost {
    fn contains_element(&self, id: &str) -> bool {
        self.state().elements.contains(id)
    }

    fn viewport(&self) -> Viewport {
        let mut state = self.state_mut();
        state.viewport_reads += 1;
        state.viewport
    }

    fn container_rect(&self, id: &str) -> Option<ContainerRect> {
        self.state().rects.get(id).copied()
    }

    fn fullscreen_element(&self) -> Option<String> {
        self.state().fullscreen_element.clone()
    }

    fn install_stylesheet(&mut self, style_id: &str, _css: &str) {
        let mut state = self.state_mut();
        state.elements.insert(style_id.to_string());
        state.stylesheets.push(style_id.to_string());
        state.mutations += 1;
    }

    fn set_css_text(&mut self, id: &str, node: Node, css: &str) {
        let mut state = self.state_mut();
        state.css.insert((id.to_string(), node), css.to_string());
        state.mutations += 1;
    }

    fn set_style_property(&mut self, id: &str, node: Node, property: &str, value: &str) {
        let mut state = self.state_mut();
        state
            .properties
            .insert((id.to_string(), node, property.to_string()), value.to_string());
        state.mutations += 1;
    }

    fn mount_frame(&mut self, id: &str, frame: &FrameSpec) -> Result<(), HostError> {
        let mut state = self.state_mut();
        if state.fail_mount {
            return Err(HostError::Mount("detached container".to_string()));
        }
        state.frames.insert(id.to_string(), frame.clone());
        state.mounts += 1;
        state.mutations += 1;
        Ok(())
    }

    fn create_resource(&mut self, content: &str, _mime: &str) -> Result<ResourceUrl, HostError> {
        let mut state = self.state_mut();
        let refused = state
            .fail_resources_containing
            .as_deref()
            .is_some_and(|needle| content.contains(needle));
        if state.fail_resources || refused {
            return Err(HostError::ResourceCreation("out of memory".to_string()));
        }
        state.resources_created += 1;
        let url = format!("blob:mock/{}", state.resources_created);
        state.live_resources.insert(url.clone(), content.to_string());
        Ok(ResourceUrl::new(url))
    }

    fn release_resource(&mut self, url: &ResourceUrl) {
        let mut state = self.state_mut();
        state.live_resources.remove(url.as_str());
        state.released.push(url.as_str().to_string());
    }

    fn post_to_frame(&mut self, id: &str, message: &FrameMessage) -> Result<(), HostError> {
        let mut state = self.state_mut();
        if !state.frames.contains_key(id) {
            return Err(HostError::FrameUnreachable(id.to_string()));
        }
        state.posted.push((id.to_string(), message.clone()));
        Ok(())
    }

    fn request_native_fullscreen(&mut self, id: &str) -> NativeRequest {
        let mut state = self.state_mut();
        state.native_requests.push(id.to_string());
        if state.native_support {
            NativeRequest::Pending
        } else {
            NativeRequest::Unsupported
        }
    }

    fn exit_native_fullscreen(&mut self) {
        self.state_mut().native_exits += 1;
    }

    fn add_listener(&mut self, id: &str, kind: ListenerKind) {
        self.state_mut().listeners.insert((id.to_string(), kind));
    }

    fn remove_listener(&mut self, id: &str, kind: ListenerKind) {
        self.state_mut().listeners.remove(&(id.to_string(), kind));
    }

    fn unmount(&mut self, id: &str) {
        let mut state = self.state_mut();
        state.frames.remove(id);
        state.unmounted.push(id.to_string());
    }
}

pub fn app(platform: Platform, host: &MockHost) -> App {
    let mut app = App::new();
    app.add_plugins(EmbedPlugin::new(platform));
    attach_host_document(&mut app, host.clone());
    app.finish();
    app.cleanup();
    app
}

pub fn options(id: &str) -> EmbedOptions {
    EmbedOptions::new(id).with_generator(|standalone, ctx| {
        format!("<main data-id=\"{}\" data-standalone=\"{standalone}\"></main>", ctx.id)
    })
}

pub const STANDALONE_MARKER: &str = "data-standalone=\"true\"";
pub const PRIMARY_MARKER: &str = "data-standalone=\"false\"";

pub fn render(app: &mut App, id: &str) -> Entity {
    bevy_embed_frame::render(app.world_mut(), options(id)).expect("render failed")
}

/// Queue host events as a listener would and run one update
pub fn dispatch(app: &mut App, target: &str, kinds: impl IntoIterator<Item = HostEventKind>) {
    {
        let channel = app.world().resource::<HostChannel>();
        for kind in kinds {
            channel.send(HostEvent::new(target, kind));
        }
    }
    app.update();
}

pub fn toggle(id: &str) -> HostEventKind {
    HostEventKind::Message(FrameMessage::ToggleFullscreen { id: id.to_string() })
}

pub fn escape() -> HostEventKind {
    HostEventKind::KeyDown {
        key: "Escape".to_string(),
    }
}

pub const DESKTOP_VIEWPORT: Viewport = Viewport {
    width: 1600.0,
    height: 900.0,
};

pub fn desktop_host(id: &str) -> MockHost {
    MockHost::with_container(
        id,
        DESKTOP_VIEWPORT,
        ContainerRect {
            top: 100.0,
            width: 800.0,
        },
    )
}

/// Phone-sized page: 400px wide container near the top
pub fn phone_host(id: &str) -> MockHost {
    MockHost::with_container(
        id,
        Viewport::new(400.0, 900.0),
        ContainerRect {
            top: 20.0,
            width: 400.0,
        },
    )
}
