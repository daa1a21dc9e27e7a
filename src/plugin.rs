//! Embed plugin routing host events to embed instances

use bevy::{
    app::{App, Plugin, PreUpdate, Update},
    ecs::{
        message::{MessageReader, MessageWriter},
        schedule::IntoScheduleConfigs,
        system::{Commands, NonSendMut, Query, Res, ResMut},
    },
};

use crate::{
    channel::HostChannel,
    diagnostics::Diagnostics,
    embed::{EmbedInstance, EmbedRouter, InstanceView, ScaleState, teardown},
    fullscreen::FullscreenState,
    host::{HostDocument, HostHandle},
    input::{HostEvent, HostEventKind, HostListeners},
    message::FrameMessage,
    platform::Platform,
    resource::ResourceHandles,
};

/// Plugin that drives embed instances from host events
///
/// The host page forwards its events through the [`HostChannel`] and is driven
/// back through the [`HostDocument`] attached with [`attach_host_document`].
/// Every app update drains the channel, applies fullscreen transitions, and
/// recomputes the scale of instances whose geometry changed, once per update
/// however many resize events arrived.
///
/// # Example
///
/// ```no_run
/// use bevy::app::App;
/// use bevy_embed_frame::prelude::*;
///
/// fn start(document: impl HostDocument + 'static) -> App {
///     let mut app = App::new();
///     app.add_plugins(EmbedPlugin::new(Platform::MOBILE));
///     attach_host_document(&mut app, document);
///
///     let options = EmbedOptions::new("lesson")
///         .with_generator(|standalone: bool, ctx: &EmbedContext| {
///             format!("<h1>{} (standalone: {standalone})</h1>", ctx.id)
///         });
///     render(app.world_mut(), options);
///     app
/// }
/// ```
#[derive(Default)]
pub struct EmbedPlugin {
    /// Capabilities of the host platform
    pub platform: Platform,
}

impl EmbedPlugin {
    /// Creates the plugin for a detected platform
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Plugin for EmbedPlugin {
    fn name(&self) -> &str {
        "bevy_embed_frame::EmbedPlugin"
    }

    fn build(&self, app: &mut App) {
        app.insert_resource(self.platform)
            .init_resource::<HostChannel>()
            .init_resource::<EmbedRouter>()
            .init_resource::<Diagnostics>()
            .add_message::<HostEvent>()
            .add_systems(PreUpdate, forward_host_channel)
            .add_systems(Update, (route_host_events, refresh_dirty_scales).chain());
    }

    fn finish(&self, app: &mut App) {
        if app.world().get_non_send_resource::<HostHandle>().is_none() {
            log::warn!(
                "EmbedPlugin has no host document. \
                Call attach_host_document() before rendering embeds."
            );
        }
    }
}

/// Inject the host document the embed app drives
pub fn attach_host_document(app: &mut App, document: impl HostDocument + 'static) {
    app.insert_non_send_resource(HostHandle::new(document));
}

/// System moving queued host events into Bevy messages
fn forward_host_channel(channel: Res<HostChannel>, mut events: MessageWriter<HostEvent>) {
    for event in channel.drain() {
        events.write(event);
    }
}

/// System applying host events to the instance they target
fn route_host_events(
    mut commands: Commands,
    mut events: MessageReader<HostEvent>,
    host: Option<NonSendMut<HostHandle>>,
    platform: Res<Platform>,
    mut router: ResMut<EmbedRouter>,
    mut instances: Query<(
        &EmbedInstance,
        &mut FullscreenState,
        &mut ScaleState,
        &mut ResourceHandles,
        &mut HostListeners,
    )>,
) {
    let Some(mut host) = host else {
        events.clear();
        return;
    };
    let document: &mut dyn HostDocument = &mut **host;
    let platform = *platform;

    for event in events.read() {
        let Some(entity) = router.get(&event.target) else {
            log::trace!("no embed #{} for {:?}", event.target, event.kind);
            continue;
        };
        let Ok((instance, mut state, mut scale, mut handles, mut listeners)) =
            instances.get_mut(entity)
        else {
            continue;
        };

        match &event.kind {
            HostEventKind::Message(message) => {
                // The channel is shared by every embed on the page.
                if message.id() != instance.id() {
                    continue;
                }
                if let FrameMessage::ToggleFullscreen { .. } = message {
                    InstanceView {
                        instance,
                        state: &mut state,
                        scale: &mut scale,
                    }
                    .toggle(document, platform);
                }
            }
            HostEventKind::FullscreenChange => InstanceView {
                instance,
                state: &mut state,
                scale: &mut scale,
            }
            .native_changed(document, platform),
            HostEventKind::KeyDown { key } => InstanceView {
                instance,
                state: &mut state,
                scale: &mut scale,
            }
            .key_pressed(document, platform, key),
            HostEventKind::Resize | HostEventKind::OrientationChange => scale.mark_dirty(),
            HostEventKind::NativeFullscreenSettled { accepted } => InstanceView {
                instance,
                state: &mut state,
                scale: &mut scale,
            }
            .native_settled(document, platform, *accepted),
            HostEventKind::FrameLoaded => {
                handles.release_primary(document);
            }
            HostEventKind::ContainerRemoved => {
                teardown(document, instance.id(), &mut listeners, &mut handles);
                router.remove(&event.target);
                commands.entity(entity).despawn();
            }
        }
    }
}

/// System recomputing the scale of every dirty instance
fn refresh_dirty_scales(
    host: Option<NonSendMut<HostHandle>>,
    platform: Res<Platform>,
    mut instances: Query<(&EmbedInstance, &mut FullscreenState, &mut ScaleState)>,
) {
    let Some(mut host) = host else {
        return;
    };
    for (instance, mut state, mut scale) in &mut instances {
        if !scale.is_dirty() {
            continue;
        }
        InstanceView {
            instance,
            state: &mut state,
            scale: &mut scale,
        }
        .refresh_scale(&mut **host, *platform);
    }
}
