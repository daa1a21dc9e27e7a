mod common;

use bevy::{app::App, ecs::entity::Entity};
use bevy_embed_frame::{
    ContainerPreset, EmbedInstance, FrameMessage, FullscreenState, HostEventKind, Node, Platform,
    ScaleState,
};
use common::*;

fn state(app: &App, entity: Entity) -> FullscreenState {
    *app.world().get::<FullscreenState>(entity).unwrap()
}

fn inline_css(app: &App, entity: Entity) -> String {
    let instance = app.world().get::<EmbedInstance>(entity).unwrap();
    ContainerPreset::Inline.css(instance.config())
}

fn notifications(host: &MockHost) -> Vec<bool> {
    host.state()
        .posted
        .iter()
        .map(|(_, message)| match message {
            FrameMessage::FullscreenState { is_fullscreen, .. } => *is_fullscreen,
            other => panic!("unexpected message {other:?}"),
        })
        .collect()
}

#[test]
fn css_fullscreen_round_trip_restores_inline_preset() {
    let host = phone_host("demo");
    let mut app = app(Platform::MOBILE, &host);
    let entity = render(&mut app, "demo");
    let inline = inline_css(&app, entity);
    assert_eq!(host.css("demo", Node::Container).as_deref(), Some(inline.as_str()));

    dispatch(&mut app, "demo", [toggle("demo")]);

    assert_eq!(state(&app, entity), FullscreenState::Fullscreen);
    assert_eq!(host.state().native_requests, vec!["demo".to_string()]);
    let css = host.css("demo", Node::Container).unwrap();
    assert!(css.starts_with("position:fixed"));
    // 400x900 viewport for 800x450 content
    assert_eq!(app.world().get::<ScaleState>(entity).unwrap().scale(), 0.5);
    assert_eq!(
        host.property("demo", Node::Frame, "border-radius").as_deref(),
        Some("0")
    );

    dispatch(&mut app, "demo", [escape()]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert_eq!(host.css("demo", Node::Container), Some(inline));
    assert_eq!(app.world().get::<ScaleState>(entity).unwrap().container_height(), 225.0);
    assert_eq!(
        host.property("demo", Node::Frame, "border-radius").as_deref(),
        Some("16px")
    );
    assert_eq!(notifications(&host), vec![true, false]);
}

#[test]
fn toggle_exits_css_fullscreen() {
    let host = desktop_host("demo");
    let mut app = app(Platform::DESKTOP, &host);
    let entity = render(&mut app, "demo");

    dispatch(&mut app, "demo", [toggle("demo")]);
    dispatch(&mut app, "demo", [toggle("demo")]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert_eq!(host.css("demo", Node::Container), Some(inline_css(&app, entity)));
    assert_eq!(app.world().get::<ScaleState>(entity).unwrap().scale(), 1.0);
    assert_eq!(notifications(&host), vec![true, false]);
}

#[test]
fn native_fullscreen_follows_change_events() {
    let host = desktop_host("demo");
    host.state_mut().native_support = true;
    let mut app = app(Platform::DESKTOP, &host);
    let entity = render(&mut app, "demo");

    dispatch(&mut app, "demo", [toggle("demo")]);
    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert_eq!(host.state().native_requests.len(), 1);

    host.state_mut().fullscreen_element = Some("demo".to_string());
    dispatch(
        &mut app,
        "demo",
        [
            HostEventKind::FullscreenChange,
            HostEventKind::NativeFullscreenSettled { accepted: true },
        ],
    );
    assert_eq!(state(&app, entity), FullscreenState::Fullscreen);
    // 1600x900 viewport for 800x450 content
    assert_eq!(app.world().get::<ScaleState>(entity).unwrap().scale(), 2.0);

    // The platform owns Escape while native fullscreen is active.
    dispatch(&mut app, "demo", [escape()]);
    assert_eq!(state(&app, entity), FullscreenState::Fullscreen);

    dispatch(&mut app, "demo", [toggle("demo")]);
    assert_eq!(host.state().native_exits, 1);
    assert_eq!(state(&app, entity), FullscreenState::Fullscreen);

    host.state_mut().fullscreen_element = None;
    dispatch(&mut app, "demo", [HostEventKind::FullscreenChange]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert_eq!(host.css("demo", Node::Container), Some(inline_css(&app, entity)));
    assert_eq!(notifications(&host), vec![true, false]);
}

#[test]
fn rejected_native_request_falls_back_to_css_fullscreen() {
    let host = desktop_host("demo");
    host.state_mut().native_support = true;
    let mut app = app(Platform::DESKTOP, &host);
    let entity = render(&mut app, "demo");

    dispatch(&mut app, "demo", [toggle("demo")]);
    dispatch(
        &mut app,
        "demo",
        [HostEventKind::NativeFullscreenSettled { accepted: false }],
    );

    assert_eq!(state(&app, entity), FullscreenState::Fullscreen);
    assert_eq!(notifications(&host), vec![true]);

    dispatch(&mut app, "demo", [escape()]);
    assert_eq!(state(&app, entity), FullscreenState::Normal);
}

#[test]
fn fullscreen_of_another_element_is_not_ours() {
    let host = desktop_host("demo");
    let mut app = app(Platform::DESKTOP, &host);
    let entity = render(&mut app, "demo");

    host.state_mut().fullscreen_element = Some("video".to_string());
    dispatch(&mut app, "demo", [HostEventKind::FullscreenChange]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert!(host.state().posted.is_empty());
}

#[test]
fn mismatched_identifier_changes_nothing() {
    let host = desktop_host("demo");
    let mut app = app(Platform::DESKTOP, &host);
    let entity = render(&mut app, "demo");
    let mutations = host.state().mutations;

    dispatch(&mut app, "demo", [toggle("other")]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert_eq!(host.state().mutations, mutations);
    assert!(host.state().native_requests.is_empty());
    assert!(host.state().posted.is_empty());
}

#[test]
fn state_notifications_are_not_toggle_requests() {
    let host = desktop_host("demo");
    let mut app = app(Platform::DESKTOP, &host);
    let entity = render(&mut app, "demo");

    let echo = HostEventKind::Message(FrameMessage::FullscreenState {
        id: "demo".to_string(),
        is_fullscreen: true,
    });
    dispatch(&mut app, "demo", [echo]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
}

#[test]
fn ios_ignores_toggle_requests() {
    let host = phone_host("demo");
    host.state_mut().native_support = true;
    let mut app = app(Platform::IOS, &host);
    let entity = render(&mut app, "demo");
    let mutations = host.state().mutations;

    dispatch(&mut app, "demo", [toggle("demo"), escape()]);

    assert_eq!(state(&app, entity), FullscreenState::Normal);
    assert_eq!(host.state().mutations, mutations);
    assert!(host.state().native_requests.is_empty());
    assert!(host.state().posted.is_empty());
}

#[test]
fn repeated_events_notify_once_per_transition() {
    let host = desktop_host("demo");
    host.state_mut().native_support = true;
    let mut app = app(Platform::DESKTOP, &host);
    render(&mut app, "demo");

    host.state_mut().fullscreen_element = Some("demo".to_string());
    dispatch(
        &mut app,
        "demo",
        [
            HostEventKind::FullscreenChange,
            HostEventKind::FullscreenChange,
            HostEventKind::NativeFullscreenSettled { accepted: true },
        ],
    );
    host.state_mut().fullscreen_element = None;
    dispatch(
        &mut app,
        "demo",
        [HostEventKind::FullscreenChange, HostEventKind::FullscreenChange],
    );

    assert_eq!(notifications(&host), vec![true, false]);
}
