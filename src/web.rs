//! Browser backend: a `web-sys` host document and the JavaScript entry point
//!
//! The page calls `render(options)` with
//! `{ id, width, height, aspect, theme, htmlGenerator }`. One Bevy app per
//! page holds every embed; DOM callbacks queue host events and pump the app,
//! immediately for user interaction and once per animation frame for resizes.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use bevy::app::App;
use crossbeam_channel::Sender;
use js_sys::{Array, Function, JSON, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, Event, EventTarget, HtmlElement, HtmlIFrameElement,
    KeyboardEvent, MessageEvent, MutationObserver, MutationObserverInit, MutationRecord, Url,
    Window, console,
};

use crate::{
    ContainerRect, ContentGenerator, EmbedOptions, EmbedPlugin, FrameMessage, FrameSpec,
    HostChannel, HostDocument, HostError, HostEvent, HostEventKind, ListenerKind, NativeRequest,
    Node, Platform, ResourceUrl, ThemeOverrides, Viewport, attach_host_document, id_from_number,
};

thread_local! {
    static RUNTIME: RefCell<Option<Rc<WebRuntime>>> = const { RefCell::new(None) };
}

/// When the app should process a queued event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pump {
    Now,
    NextFrame,
}

/// The page-wide embed app and its animation-frame scheduler
struct WebRuntime {
    app: RefCell<App>,
    sender: Sender<HostEvent>,
    window: Window,
    frame_callback: Closure<dyn FnMut()>,
    pending_frame: Cell<Option<i32>>,
}

impl WebRuntime {
    fn start() -> Result<Self, JsValue> {
        console_error_panic_hook::set_once();
        install_logger();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let platform = Platform::from_user_agent(&user_agent);
        log::debug!("embed runtime starting: {platform:?}");

        let mut app = App::new();
        app.add_plugins(EmbedPlugin::new(platform));
        attach_host_document(&mut app, WebDocument::new(window.clone(), document));
        app.finish();
        app.cleanup();

        let sender = app.world().resource::<HostChannel>().get_sender();
        let frame_callback = Closure::<dyn FnMut()>::new(|| {
            if let Some(runtime) = runtime() {
                runtime.on_frame();
            }
        });

        Ok(Self {
            app: RefCell::new(app),
            sender,
            window,
            frame_callback,
            pending_frame: Cell::new(None),
        })
    }

    fn notify(&self, event: HostEvent, pump: Pump) {
        let _ = self.sender.send(event);
        match pump {
            Pump::Now => self.pump(),
            Pump::NextFrame => self.schedule_frame(),
        }
    }

    fn pump(&self) {
        match self.app.try_borrow_mut() {
            Ok(mut app) => app.update(),
            // Called from inside an update; the queued event waits a frame.
            Err(_) => self.schedule_frame(),
        }
    }

    /// Cancel the pending frame, if any, and request a new one
    fn schedule_frame(&self) {
        if let Some(handle) = self.pending_frame.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        match self
            .window
            .request_animation_frame(self.frame_callback.as_ref().unchecked_ref())
        {
            Ok(handle) => self.pending_frame.set(Some(handle)),
            Err(error) => {
                log::warn!("requestAnimationFrame failed: {error:?}");
                self.pump();
            }
        }
    }

    fn on_frame(&self) {
        self.pending_frame.set(None);
        self.pump();
    }
}

fn runtime() -> Option<Rc<WebRuntime>> {
    RUNTIME.with(|slot| {
        let existing = slot.borrow().clone();
        if existing.is_some() {
            return existing;
        }
        match WebRuntime::start() {
            Ok(runtime) => {
                let runtime = Rc::new(runtime);
                *slot.borrow_mut() = Some(runtime.clone());
                Some(runtime)
            }
            Err(error) => {
                console::error_2(&"[embed] runtime unavailable".into(), &error);
                None
            }
        }
    })
}

fn notify(target: &str, kind: HostEventKind, pump: Pump) {
    if let Some(runtime) = runtime() {
        runtime.notify(HostEvent::new(target, kind), pump);
    }
}

/// Render an embed into the element whose id is `options.id`
///
/// Invalid options are reported on the console; nothing is thrown.
#[wasm_bindgen(js_name = render)]
pub fn render_embed(options: JsValue) {
    let Some(runtime) = runtime() else {
        return;
    };
    let Ok(mut app) = runtime.app.try_borrow_mut() else {
        log::error!("[embed] render() called from inside a content generator");
        return;
    };
    crate::render(app.world_mut(), options_from_js(&options));
}

fn options_from_js(options: &JsValue) -> EmbedOptions {
    let get = |target: &JsValue, key: &str| {
        Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
    };
    let theme = get(options, "theme");
    let color = |key: &str| get(&theme, key).as_string();

    EmbedOptions {
        id: id_option(&get(options, "id")),
        width: get(options, "width").as_f64().map(|width| width as f32),
        height: get(options, "height").as_f64().map(|height| height as f32),
        aspect: get(options, "aspect").as_string(),
        theme: ThemeOverrides {
            red: color("red"),
            gold: color("gold"),
            navy: color("navy"),
            bg: color("bg"),
        },
        generator: get(options, "htmlGenerator")
            .dyn_into::<Function>()
            .ok()
            .map(js_generator),
    }
}

fn id_option(id: &JsValue) -> Option<String> {
    id.as_string().or_else(|| id.as_f64().and_then(id_from_number))
}

fn js_generator(function: Function) -> ContentGenerator {
    Box::new(move |standalone, context| {
        let context = serde_json::to_string(context)
            .ok()
            .and_then(|json| JSON::parse(&json).ok())
            .unwrap_or(JsValue::UNDEFINED);
        match function.call2(&JsValue::NULL, &JsValue::from_bool(standalone), &context) {
            Ok(html) => html.as_string().unwrap_or_default(),
            Err(error) => {
                log::error!("[embed #{}] htmlGenerator threw: {error:?}", context_id(&context));
                String::new()
            }
        }
    })
}

fn context_id(context: &JsValue) -> String {
    Reflect::get(context, &JsValue::from_str("id"))
        .ok()
        .and_then(|id| id.as_string())
        .unwrap_or_default()
}

fn decode_message(data: &JsValue) -> Option<FrameMessage> {
    if !data.is_object() {
        return None;
    }
    let json = String::from(JSON::stringify(data).ok()?);
    FrameMessage::from_json(&json).ok()
}

/// Wrapper and frame created for an instance
struct MountedFrame {
    wrapper: HtmlElement,
    frame: HtmlIFrameElement,
    _onload: Closure<dyn FnMut()>,
}

/// A registered host callback, kept alive until removed
enum Listener {
    Event {
        target: EventTarget,
        name: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    },
    Observer {
        observer: MutationObserver,
        _callback: Closure<dyn FnMut(Array, MutationObserver)>,
    },
}

/// [`HostDocument`] backed by the browser DOM
struct WebDocument {
    window: Window,
    document: Document,
    frames: HashMap<String, MountedFrame>,
    listeners: HashMap<(String, ListenerKind), Listener>,
}

impl WebDocument {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            frames: HashMap::new(),
            listeners: HashMap::new(),
        }
    }

    fn element(&self, id: &str, node: Node) -> Option<HtmlElement> {
        match node {
            Node::Container => self
                .document
                .get_element_by_id(id)
                .and_then(|element| element.dyn_into::<HtmlElement>().ok()),
            Node::Wrapper => self.frames.get(id).map(|mounted| mounted.wrapper.clone()),
            Node::Frame => self
                .frames
                .get(id)
                .map(|mounted| HtmlElement::from(mounted.frame.clone())),
        }
    }

    fn create_html_element<T: JsCast>(&self, tag: &str) -> Result<T, HostError> {
        self.document
            .create_element(tag)
            .map_err(|error| HostError::Mount(format!("{error:?}")))?
            .dyn_into::<T>()
            .map_err(|_| HostError::Mount(format!("<{tag}> has an unexpected type")))
    }

    fn event_listener(&self, id: &str, kind: ListenerKind) -> Option<Listener> {
        let name = kind.event_name()?;
        let target: EventTarget = match kind {
            ListenerKind::FullscreenChange | ListenerKind::KeyDown => self.document.clone().into(),
            _ => self.window.clone().into(),
        };

        let id = id.to_string();
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let (host_event, pump) = match kind {
                ListenerKind::Message => {
                    let Some(message) = event
                        .dyn_ref::<MessageEvent>()
                        .and_then(|event| decode_message(&event.data()))
                    else {
                        return;
                    };
                    (HostEventKind::Message(message), Pump::Now)
                }
                ListenerKind::FullscreenChange => (HostEventKind::FullscreenChange, Pump::Now),
                ListenerKind::KeyDown => {
                    let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    (HostEventKind::KeyDown { key: event.key() }, Pump::Now)
                }
                ListenerKind::Resize => (HostEventKind::Resize, Pump::NextFrame),
                ListenerKind::OrientationChange => {
                    (HostEventKind::OrientationChange, Pump::NextFrame)
                }
                ListenerKind::Removal => return,
            };
            notify(&id, host_event, pump);
        });

        if let Err(error) =
            target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        {
            log::warn!("could not listen for {name}: {error:?}");
            return None;
        }
        Some(Listener::Event {
            target,
            name,
            callback,
        })
    }

    fn removal_observer(&self, id: &str) -> Option<Listener> {
        let container: web_sys::Node = self.document.get_element_by_id(id)?.into();
        let body = self.document.body()?;

        let target = id.to_string();
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let removed = records
                    .iter()
                    .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                    .any(|record| {
                        let nodes = record.removed_nodes();
                        (0..nodes.length())
                            .filter_map(|index| nodes.item(index))
                            .any(|node| {
                                node.is_same_node(Some(&container)) || node.contains(Some(&container))
                            })
                    });
                if removed {
                    // Teardown drops this callback, so it must not run inside it.
                    notify(&target, HostEventKind::ContainerRemoved, Pump::NextFrame);
                }
            },
        );

        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(error) => {
                log::warn!("[embed #{id}] removal observer unavailable: {error:?}");
                return None;
            }
        };
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        if let Err(error) = observer.observe_with_options(&body, &init) {
            log::warn!("[embed #{id}] cannot observe document: {error:?}");
            return None;
        }
        Some(Listener::Observer {
            observer,
            _callback: callback,
        })
    }
}

impl HostDocument for WebDocument {
    fn contains_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0) as f32
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn container_rect(&self, id: &str) -> Option<ContainerRect> {
        let rect = self.document.get_element_by_id(id)?.get_bounding_client_rect();
        Some(ContainerRect {
            top: rect.top() as f32,
            width: rect.width() as f32,
        })
    }

    fn fullscreen_element(&self) -> Option<String> {
        self.document
            .fullscreen_element()
            .map(|element: Element| element.id())
    }

    fn install_stylesheet(&mut self, style_id: &str, css: &str) {
        let Some(head) = self.document.head() else {
            log::warn!("no <head> for stylesheet {style_id}");
            return;
        };
        let style = match self.document.create_element("style") {
            Ok(style) => style,
            Err(error) => {
                log::warn!("could not create stylesheet {style_id}: {error:?}");
                return;
            }
        };
        style.set_id(style_id);
        style.set_text_content(Some(css));
        if let Err(error) = head.append_child(&style) {
            log::warn!("could not install stylesheet {style_id}: {error:?}");
        }
    }

    fn set_css_text(&mut self, id: &str, node: Node, css: &str) {
        if let Some(element) = self.element(id, node) {
            element.style().set_css_text(css);
        }
    }

    fn set_style_property(&mut self, id: &str, node: Node, property: &str, value: &str) {
        if let Some(element) = self.element(id, node) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn mount_frame(&mut self, id: &str, spec: &FrameSpec) -> Result<(), HostError> {
        let container = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| HostError::ElementMissing(id.to_string()))?;
        let attach = |error: JsValue| HostError::Mount(format!("{error:?}"));

        let wrapper: HtmlElement = self.create_html_element("div")?;
        wrapper.style().set_css_text(&spec.wrapper_css);

        let frame: HtmlIFrameElement = self.create_html_element("iframe")?;
        frame.set_src(spec.src.as_str());
        frame.style().set_css_text(spec.frame_css);
        for (name, value) in [
            ("scrolling", "no"),
            ("loading", "lazy"),
            ("sandbox", spec.sandbox),
            ("allow", spec.allow),
        ] {
            frame.set_attribute(name, value).map_err(attach)?;
        }
        if let Some(standalone) = &spec.standalone {
            frame
                .set_attribute("data-ios-standalone-url", standalone.as_str())
                .map_err(attach)?;
        }

        let target = id.to_string();
        let onload = Closure::<dyn FnMut()>::new(move || {
            notify(&target, HostEventKind::FrameLoaded, Pump::Now);
        });
        frame.set_onload(Some(onload.as_ref().unchecked_ref()));

        wrapper.append_child(&frame).map_err(attach)?;
        container.append_child(&wrapper).map_err(attach)?;

        self.frames.insert(
            id.to_string(),
            MountedFrame {
                wrapper,
                frame,
                _onload: onload,
            },
        );
        Ok(())
    }

    fn create_resource(&mut self, content: &str, mime: &str) -> Result<ResourceUrl, HostError> {
        let failed = |error: JsValue| HostError::ResourceCreation(format!("{error:?}"));
        let parts = Array::of1(&JsValue::from_str(content));
        let options = BlobPropertyBag::new();
        options.set_type(mime);
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(failed)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(failed)?;
        Ok(ResourceUrl::new(url))
    }

    fn release_resource(&mut self, url: &ResourceUrl) {
        let _ = Url::revoke_object_url(url.as_str());
    }

    fn post_to_frame(&mut self, id: &str, message: &FrameMessage) -> Result<(), HostError> {
        let unreachable = || HostError::FrameUnreachable(id.to_string());
        let window = self
            .frames
            .get(id)
            .and_then(|mounted| mounted.frame.content_window())
            .ok_or_else(unreachable)?;
        let json = message.to_json().map_err(|_| unreachable())?;
        let value = JSON::parse(&json).map_err(|_| unreachable())?;
        window.post_message(&value, "*").map_err(|_| unreachable())
    }

    fn request_native_fullscreen(&mut self, id: &str) -> NativeRequest {
        let Some(container) = self.document.get_element_by_id(id) else {
            return NativeRequest::Unsupported;
        };
        let Some(request) = Reflect::get(&container, &JsValue::from_str("requestFullscreen"))
            .ok()
            .and_then(|request| request.dyn_into::<Function>().ok())
        else {
            return NativeRequest::Unsupported;
        };

        match request.call0(&container) {
            Ok(result) => {
                let promise = result.dyn_into::<Promise>().ok();
                let target = id.to_string();
                spawn_local(async move {
                    let accepted = match promise {
                        Some(promise) => JsFuture::from(promise).await.is_ok(),
                        None => true,
                    };
                    notify(
                        &target,
                        HostEventKind::NativeFullscreenSettled { accepted },
                        Pump::Now,
                    );
                });
                NativeRequest::Pending
            }
            Err(error) => {
                log::debug!("[embed #{id}] requestFullscreen threw: {error:?}");
                NativeRequest::Unsupported
            }
        }
    }

    fn exit_native_fullscreen(&mut self) {
        self.document.exit_fullscreen();
    }

    fn add_listener(&mut self, id: &str, kind: ListenerKind) {
        self.remove_listener(id, kind);
        let listener = match kind {
            ListenerKind::Removal => self.removal_observer(id),
            _ => self.event_listener(id, kind),
        };
        if let Some(listener) = listener {
            self.listeners.insert((id.to_string(), kind), listener);
        }
    }

    fn remove_listener(&mut self, id: &str, kind: ListenerKind) {
        match self.listeners.remove(&(id.to_string(), kind)) {
            Some(Listener::Event {
                target,
                name,
                callback,
            }) => {
                let _ =
                    target.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
            }
            Some(Listener::Observer { observer, .. }) => observer.disconnect(),
            None => {}
        }
    }

    fn unmount(&mut self, id: &str) {
        self.frames.remove(id);
    }
}

/// `log` backend writing to the browser console
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

fn install_logger() {
    // Another logger may already be installed by the page's own wasm code.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("{}: {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => console::error_1(&line),
            log::Level::Warn => console::warn_1(&line),
            log::Level::Info => console::info_1(&line),
            log::Level::Debug | log::Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}
