//! Embed instances: mounting, scaling, fullscreen transitions and teardown

use std::collections::HashMap;

use bevy::ecs::{component::Component, entity::Entity, resource::Resource, world::World};
use thiserror::Error;

use crate::{
    config::{ConfigError, ContentGenerator, EmbedConfig, EmbedOptions},
    diagnostics::Diagnostics,
    fullscreen::{FullscreenState, NativeFullscreen, ToggleAction, on_key, on_native_change, toggle_action},
    host::{FrameSpec, HostDocument, HostError, HostHandle, NativeRequest, Node},
    input::HostListeners,
    message::FrameMessage,
    platform::Platform,
    resource::{CONTENT_MIME, ResourceHandles},
    scale::{ScaleOutcome, compute_scale},
    style::{
        ContainerPreset, FRAME_ALLOW, FRAME_CSS, FRAME_SANDBOX, FrameDecoration, px,
        responsive_rule, scale_transform, stylesheet_id, wrapper_css,
    },
};

/// A rendered embed; one entity per container
#[derive(Component, Debug)]
pub struct EmbedInstance {
    config: EmbedConfig,
}

impl EmbedInstance {
    /// Validated configuration the instance was rendered with
    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Container element identifier
    pub fn id(&self) -> &str {
        self.config.id()
    }
}

/// Last scale applied to an instance
///
/// The scale is derived: it is recomputed from the host geometry whenever the
/// instance is dirty or changes state, never edited directly.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    applied: ScaleOutcome,
    dirty: bool,
}

impl ScaleState {
    fn new(applied: ScaleOutcome) -> Self {
        Self {
            applied,
            dirty: false,
        }
    }

    /// The outcome last written to the host
    pub fn applied(&self) -> ScaleOutcome {
        self.applied
    }

    /// Current wrapper scale factor
    pub fn scale(&self) -> f32 {
        self.applied.scale
    }

    /// Current container height in CSS pixels
    pub fn container_height(&self) -> f32 {
        self.applied.container_height
    }

    /// Whether a recomputation is pending
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Request a recomputation on the next update
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn record(&mut self, applied: ScaleOutcome) {
        self.applied = applied;
        self.dirty = false;
    }
}

/// Routing table from embed identifier to its entity
#[derive(Resource, Debug, Default)]
pub struct EmbedRouter {
    routes: HashMap<String, Entity>,
}

impl EmbedRouter {
    /// Entity of the live instance `id`
    pub fn get(&self, id: &str) -> Option<Entity> {
        self.routes.get(id).copied()
    }

    /// Whether `id` is rendered
    pub fn contains(&self, id: &str) -> bool {
        self.routes.contains_key(id)
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no instance is live
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Entity> {
        self.routes.remove(id)
    }
}

/// Why an embed could not be rendered
#[derive(Debug, Error)]
pub enum RenderError {
    /// The options were rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// [`attach_host_document`](crate::attach_host_document) was never called
    #[error("no host document attached")]
    NoHost,
    /// No element carries the identifier
    #[error("container #{0} is not in the document")]
    ContainerMissing(String),
    /// A live instance already uses the identifier
    #[error("#{0} is already rendered")]
    AlreadyRendered(String),
    /// The host failed while mounting
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Render an embed, reporting failures as a diagnostic
///
/// Returns the instance entity, or `None` after recording exactly one
/// diagnostic. Rejected options and a missing container leave the document
/// untouched.
pub fn render(world: &mut World, options: EmbedOptions) -> Option<Entity> {
    let id = options.id.clone().filter(|id| !id.is_empty());
    match try_render(world, options) {
        Ok(entity) => Some(entity),
        Err(error) => {
            world
                .get_resource_or_init::<Diagnostics>()
                .report(id.as_deref(), error.to_string());
            None
        }
    }
}

/// Render an embed
pub fn try_render(world: &mut World, options: EmbedOptions) -> Result<Entity, RenderError> {
    let (config, generator) = options.validate()?;
    let id = config.id().to_string();

    if world
        .get_resource::<EmbedRouter>()
        .is_some_and(|router| router.contains(&id))
    {
        return Err(RenderError::AlreadyRendered(id));
    }

    let platform = world.get_resource::<Platform>().copied().unwrap_or_default();
    let mounted = {
        let mut host = world
            .get_non_send_resource_mut::<HostHandle>()
            .ok_or(RenderError::NoHost)?;
        mount(&mut **host, platform, &config, &generator)?
    };

    if !mounted.degraded.is_empty() {
        let mut diagnostics = world.get_resource_or_init::<Diagnostics>();
        for message in &mounted.degraded {
            diagnostics.report(Some(id.as_str()), message.as_str());
        }
    }

    log::debug!(
        "[embed #{id}] mounted at scale {} ({:?})",
        mounted.scale.scale(),
        mounted.scale.applied().regime
    );

    let entity = world
        .spawn((
            EmbedInstance { config },
            FullscreenState::Normal,
            mounted.scale,
            mounted.handles,
            mounted.listeners,
        ))
        .id();
    world
        .get_resource_or_init::<EmbedRouter>()
        .routes
        .insert(id, entity);
    Ok(entity)
}

struct Mounted {
    handles: ResourceHandles,
    listeners: HostListeners,
    scale: ScaleState,
    degraded: Vec<String>,
}

fn mount(
    host: &mut dyn HostDocument,
    platform: Platform,
    config: &EmbedConfig,
    generator: &ContentGenerator,
) -> Result<Mounted, RenderError> {
    let id = config.id();
    if !host.contains_element(id) {
        return Err(RenderError::ContainerMissing(id.to_string()));
    }

    let context = config.context(platform);
    let html = generator(false, &context);
    let standalone_html = generator(true, &context);

    let mut degraded = Vec::new();
    let standalone = if platform.needs_standalone_fallback() && !standalone_html.is_empty() {
        match host.create_resource(&standalone_html, CONTENT_MIME) {
            Ok(url) => Some(url),
            Err(error) => {
                degraded.push(format!("standalone view unavailable: {error}"));
                None
            }
        }
    } else {
        None
    };

    let primary = match host.create_resource(&html, CONTENT_MIME) {
        Ok(url) => url,
        Err(error) => {
            if let Some(url) = &standalone {
                host.release_resource(url);
            }
            return Err(error.into());
        }
    };
    let mut handles = ResourceHandles::new(primary.clone(), standalone.clone());

    let frame = FrameSpec {
        src: primary,
        wrapper_css: wrapper_css(config),
        frame_css: FRAME_CSS,
        sandbox: FRAME_SANDBOX,
        allow: FRAME_ALLOW,
        standalone,
    };
    if let Err(error) = host.mount_frame(id, &frame) {
        handles.release_all(host);
        return Err(error.into());
    }

    let style_id = stylesheet_id(id);
    if !host.contains_element(&style_id) {
        host.install_stylesheet(&style_id, &responsive_rule(config));
    }
    host.set_css_text(id, Node::Container, &ContainerPreset::Inline.css(config));

    let listeners = HostListeners::install(host, id);
    let applied = apply_scale(host, platform, config, FullscreenState::Normal);

    Ok(Mounted {
        handles,
        listeners,
        scale: ScaleState::new(applied),
        degraded,
    })
}

fn apply_scale(
    host: &mut dyn HostDocument,
    platform: Platform,
    config: &EmbedConfig,
    state: FullscreenState,
) -> ScaleOutcome {
    let id = config.id();
    let outcome = compute_scale(
        config.size(),
        state.is_fullscreen(),
        platform.device_class(),
        host.viewport(),
        host.container_rect(id).unwrap_or_default(),
    );
    host.set_style_property(id, Node::Wrapper, "transform", &scale_transform(outcome.scale));
    host.set_style_property(id, Node::Container, "height", &px(outcome.container_height));
    outcome
}

/// Mutable view of one instance while handling a host event
pub(crate) struct InstanceView<'a> {
    pub instance: &'a EmbedInstance,
    pub state: &'a mut FullscreenState,
    pub scale: &'a mut ScaleState,
}

impl InstanceView<'_> {
    fn native(&self, host: &dyn HostDocument) -> NativeFullscreen {
        NativeFullscreen::observe(host.fullscreen_element().as_deref(), self.instance.id())
    }

    /// Answer a toggle request from the frame
    pub fn toggle(&mut self, host: &mut dyn HostDocument, platform: Platform) {
        let instance = self.instance;
        let id = instance.id();
        match toggle_action(*self.state, platform, self.native(host)) {
            ToggleAction::Ignore => {
                log::debug!("[embed #{id}] toggle ignored, the frame opens its standalone view")
            }
            ToggleAction::ExitNative => host.exit_native_fullscreen(),
            ToggleAction::Exit => {
                self.transition(host, platform, FullscreenState::Normal);
            }
            ToggleAction::Enter => match host.request_native_fullscreen(id) {
                NativeRequest::Pending => {}
                NativeRequest::Unsupported => {
                    self.transition(host, platform, FullscreenState::Fullscreen);
                }
            },
        }
    }

    /// A native fullscreen request finished, either way the embed goes fullscreen
    pub fn native_settled(&mut self, host: &mut dyn HostDocument, platform: Platform, accepted: bool) {
        if !accepted {
            log::debug!(
                "[embed #{}] native fullscreen rejected, using CSS fullscreen",
                self.instance.id()
            );
        }
        self.transition(host, platform, FullscreenState::Fullscreen);
    }

    pub fn native_changed(&mut self, host: &mut dyn HostDocument, platform: Platform) {
        if let Some(next) = on_native_change(*self.state, platform, self.native(host)) {
            self.transition(host, platform, next);
        }
    }

    pub fn key_pressed(&mut self, host: &mut dyn HostDocument, platform: Platform, key: &str) {
        if let Some(next) = on_key(*self.state, key, self.native(host)) {
            self.transition(host, platform, next);
        }
    }

    pub fn refresh_scale(&mut self, host: &mut dyn HostDocument, platform: Platform) {
        let applied = apply_scale(host, platform, self.instance.config(), *self.state);
        self.scale.record(applied);
    }

    /// Move to `next`, swapping presets and notifying the frame
    ///
    /// Returns `false` without touching the host when already in `next`.
    pub fn transition(
        &mut self,
        host: &mut dyn HostDocument,
        platform: Platform,
        next: FullscreenState,
    ) -> bool {
        if *self.state == next {
            return false;
        }
        *self.state = next;

        let instance = self.instance;
        let config = instance.config();
        let id = config.id();
        let fullscreen = next.is_fullscreen();

        host.set_css_text(id, Node::Container, &ContainerPreset::for_fullscreen(fullscreen).css(config));
        let decoration = FrameDecoration::for_fullscreen(fullscreen);
        host.set_style_property(id, Node::Frame, "box-shadow", decoration.box_shadow);
        host.set_style_property(id, Node::Frame, "border-radius", decoration.border_radius);
        self.refresh_scale(host, platform);

        let notification = FrameMessage::FullscreenState {
            id: id.to_string(),
            is_fullscreen: fullscreen,
        };
        if let Err(error) = host.post_to_frame(id, &notification) {
            log::debug!("[embed #{id}] state notification dropped: {error}");
        }
        log::debug!("[embed #{id}] fullscreen: {fullscreen}");
        true
    }
}

/// Undo everything the instance registered on the host
pub(crate) fn teardown(
    host: &mut dyn HostDocument,
    id: &str,
    listeners: &mut HostListeners,
    handles: &mut ResourceHandles,
) {
    listeners.release(host, id);
    handles.release_all(host);
    host.unmount(id);
    log::debug!("[embed #{id}] torn down");
}
