// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::{Point, Size, Vec2};
use understory_gallery::{
    CloseReason, CopyFeedback, CopyTicket, FrameHandle, GalleryConfig, GalleryHost,
    GridViewController, HostError, HostOperation, LoadTicket, Manifest, ManifestItem,
    PointerSample, TileContent, ViewportClass,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlImageElement, KeyboardEvent,
    PointerEvent, Window,
};

/// Asynchronous completion reported by the browser.
#[derive(Debug)]
pub enum HostEvent {
    /// An `<img>` fired `load` or `error`.
    ImageLoaded(LoadTicket, Result<(), HostError>),
    /// A clipboard write settled.
    CopyFinished(CopyTicket, Result<(), HostError>),
    /// An animation frame ran at the given timestamp.
    Frame(FrameHandle, f64),
}

#[derive(Default)]
struct Inbox {
    events: RefCell<VecDeque<HostEvent>>,
    wake: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Inbox {
    fn push(&self, event: HostEvent) {
        self.events.borrow_mut().push_back(event);
        let wake = self.wake.borrow().clone();
        if let Some(wake) = wake {
            wake();
        }
    }
}

/// Elements the host renders into. All of them must already be in the document.
#[derive(Clone, Debug)]
pub struct WebHostElements {
    /// Clipping viewport; receives pointer input.
    pub viewport: HtmlElement,
    /// Translated container holding the tiles.
    pub grid: HtmlElement,
    /// Lightbox overlay; clicks on it outside its content close it.
    pub lightbox: HtmlElement,
    /// Full size image inside the lightbox.
    pub lightbox_image: HtmlImageElement,
    /// Caption inside the lightbox.
    pub lightbox_caption: HtmlElement,
    /// Lightbox close control.
    pub close_button: HtmlElement,
    /// Lightbox copy control.
    pub copy_button: HtmlElement,
    /// Transient notification area.
    pub toast: HtmlElement,
    /// Banner ad slot.
    pub banner: HtmlElement,
}

/// An `<img>` whose `load` or `error` has not fired yet.
struct PendingLoad {
    ticket: LoadTicket,
    image: HtmlImageElement,
}

impl PendingLoad {
    fn detach(&self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}

type PendingLoads = Rc<RefCell<HashMap<u64, PendingLoad>>>;

/// Settlement callbacks of one clipboard write.
struct CopyCallbacks {
    _resolve: Closure<dyn FnMut(JsValue)>,
    _reject: Closure<dyn FnMut(JsValue)>,
}

/// Shared `load`/`error` handler for tile images. The ticket travels in the
/// image's `data-ticket` attribute.
fn image_listener(
    inbox: &Rc<Inbox>,
    loads: &PendingLoads,
    loaded: bool,
) -> Closure<dyn FnMut(Event)> {
    let inbox = Rc::clone(inbox);
    let loads = Rc::clone(loads);
    Closure::new(move |event: Event| {
        let key = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|image| image.get_attribute("data-ticket"))
            .and_then(|raw| raw.parse::<u64>().ok());
        let Some(load) = key.and_then(|key| loads.borrow_mut().remove(&key)) else {
            return;
        };
        load.detach();
        let result = if loaded {
            Ok(())
        } else {
            Err(HostError::new(HostOperation::LoadImage, "image failed to load"))
        };
        inbox.push(HostEvent::ImageLoaded(load.ticket, result));
    })
}

/// [`GalleryHost`] that renders into the DOM.
///
/// Browser callbacks are owned by the host: one shared listener pair for
/// every tile image, one animation frame callback, and a resolve/reject pair
/// per clipboard write in flight. Nothing is leaked to the JS heap.
pub struct WebHost {
    window: Window,
    document: Document,
    elements: WebHostElements,
    inbox: Rc<Inbox>,
    loads: PendingLoads,
    on_image_load: Closure<dyn FnMut(Event)>,
    on_image_error: Closure<dyn FnMut(Event)>,
    next_frame: u64,
    scheduled_frame: Rc<Cell<Option<FrameHandle>>>,
    frame_id: Option<i32>,
    on_frame: Closure<dyn FnMut(f64)>,
    copies: HashMap<CopyTicket, CopyCallbacks>,
}

impl fmt::Debug for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHost")
            .field("elements", &self.elements)
            .field("queued", &self.inbox.events.borrow().len())
            .field("pending_loads", &self.loads.borrow().len())
            .field("scheduled_frame", &self.scheduled_frame.get())
            .field("copies_in_flight", &self.copies.len())
            .finish_non_exhaustive()
    }
}

impl WebHost {
    /// Creates a host for `elements` in the current window.
    pub fn new(elements: WebHostElements) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let inbox = Rc::new(Inbox::default());
        let loads = PendingLoads::default();
        let scheduled_frame = Rc::new(Cell::new(None));
        let on_frame = {
            let inbox = Rc::clone(&inbox);
            let scheduled = Rc::clone(&scheduled_frame);
            Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
                if let Some(handle) = scheduled.take() {
                    inbox.push(HostEvent::Frame(handle, timestamp));
                }
            })
        };
        Ok(Self {
            window,
            document,
            elements,
            on_image_load: image_listener(&inbox, &loads, true),
            on_image_error: image_listener(&inbox, &loads, false),
            inbox,
            loads,
            next_frame: 0,
            scheduled_frame,
            frame_id: None,
            on_frame,
            copies: HashMap::new(),
        })
    }

    /// Milliseconds on the same clock as event and frame timestamps.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }

    /// Size of the viewport element.
    #[must_use]
    pub fn viewport_size(&self) -> Size {
        let rect = self.elements.viewport.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    /// Calls `wake` whenever a completion is queued.
    pub fn set_waker(&self, wake: impl Fn() + 'static) {
        *self.inbox.wake.borrow_mut() = Some(Rc::new(wake));
    }

    /// Drains queued completions.
    pub fn take_events(&self) -> Vec<HostEvent> {
        self.inbox.events.borrow_mut().drain(..).collect()
    }

    /// Drops the callbacks of a settled clipboard write.
    ///
    /// wasm-bindgen defers freeing a closure dropped during its own call
    /// until the call returns.
    pub fn release_copy(&mut self, ticket: CopyTicket) {
        self.copies.remove(&ticket);
    }

    fn div(&self, class: &str) -> Result<HtmlElement, JsValue> {
        let element = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(JsValue::from)?;
        element.set_class_name(class);
        Ok(element)
    }

    fn dispatch(&self, target: &Element, kind: &str) {
        let result = Event::new(kind).and_then(|event| target.dispatch_event(&event));
        if let Err(err) = result {
            tracing::warn!(kind, error = ?err, "failed to dispatch gallery event");
        }
    }
}

fn host_error(operation: HostOperation, err: &JsValue) -> HostError {
    HostError::new(
        operation,
        err.as_string().unwrap_or_else(|| format!("{err:?}")),
    )
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        tracing::warn!(property, error = ?err, "failed to set style");
    }
}

fn set_class(element: &Element, class: &str, on: bool) {
    if let Err(err) = element.class_list().toggle_with_force(class, on) {
        tracing::warn!(class, error = ?err, "failed to toggle class");
    }
}

impl GalleryHost for WebHost {
    type Node = HtmlElement;

    fn set_grid_size(&mut self, size: Size) {
        set_style(&self.elements.grid, "width", &format!("{}px", size.width));
        set_style(&self.elements.grid, "height", &format!("{}px", size.height));
    }

    fn set_grid_offset(&mut self, offset: Vec2) {
        let transform = format!("translate3d({}px, {}px, 0)", offset.x, offset.y);
        set_style(&self.elements.grid, "transform", &transform);
    }

    fn set_dragging(&mut self, dragging: bool) {
        set_class(&self.elements.viewport, "dragging", dragging);
    }

    fn create_tile(&mut self, tile: &TileContent<'_>) -> Result<HtmlElement, HostError> {
        let build = || -> Result<HtmlElement, JsValue> {
            let node = self.div("tile placeholder entering")?;
            node.set_attribute("data-index", &tile.index.to_string())?;
            set_style(&node, "left", &format!("{}px", tile.origin.x));
            set_style(&node, "top", &format!("{}px", tile.origin.y));
            set_style(&node, "width", &format!("{}px", tile.size.width));
            set_style(&node, "height", &format!("{}px", tile.size.height));
            let caption = self.div("tile-caption")?;
            caption.set_text_content(Some(tile.caption));
            node.append_child(&caption)?;
            self.elements.grid.append_child(&node)?;
            Ok(node)
        };
        build().map_err(|err| host_error(HostOperation::CreateTile, &err))
    }

    fn begin_image_load(
        &mut self,
        node: &HtmlElement,
        image: &str,
        ticket: LoadTicket,
    ) -> Result<(), HostError> {
        let load_error = |err: JsValue| host_error(HostOperation::LoadImage, &err);
        let img = HtmlImageElement::new().map_err(load_error)?;
        img.set_alt("");
        img.set_draggable(false);
        img.set_attribute("data-ticket", &ticket.get().to_string()).map_err(load_error)?;
        node.append_child(&img).map_err(load_error)?;

        img.set_onload(Some(self.on_image_load.as_ref().unchecked_ref()));
        img.set_onerror(Some(self.on_image_error.as_ref().unchecked_ref()));
        self.loads.borrow_mut().insert(
            ticket.get(),
            PendingLoad {
                ticket,
                image: img.clone(),
            },
        );
        img.set_src(image);
        Ok(())
    }

    fn show_tile_image(&mut self, node: &HtmlElement) {
        set_class(node, "placeholder", false);
        set_class(node, "loaded", true);
    }

    fn mark_tile_exiting(&mut self, node: &HtmlElement) {
        set_class(node, "entering", false);
        set_class(node, "exiting", true);
    }

    fn cancel_tile_exit(&mut self, node: &HtmlElement) {
        set_class(node, "exiting", false);
    }

    fn remove_tile(&mut self, node: HtmlElement) {
        self.loads.borrow_mut().retain(|_, load| {
            let inside = node.contains(Some(load.image.as_ref()));
            if inside {
                load.detach();
            }
            !inside
        });
        node.remove();
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle::new(self.next_frame);
        if let Some(previous) = self.scheduled_frame.get() {
            self.cancel_frame(previous);
        }
        match self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
        {
            Ok(id) => {
                self.scheduled_frame.set(Some(handle));
                self.frame_id = Some(id);
            }
            Err(err) => tracing::warn!(error = ?err, "requestAnimationFrame failed"),
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.scheduled_frame.get() != Some(handle) {
            return;
        }
        self.scheduled_frame.set(None);
        if let Some(id) = self.frame_id.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                tracing::warn!(error = ?err, "cancelAnimationFrame failed");
            }
        }
    }

    fn open_lightbox(&mut self, item: &ManifestItem, _index: usize) {
        self.elements.lightbox_image.set_src(&item.image);
        self.elements.lightbox_image.set_alt(&item.caption);
        self.elements
            .lightbox_caption
            .set_text_content(Some(&item.caption));
        set_class(&self.elements.lightbox, "open", true);
    }

    fn close_lightbox(&mut self) {
        set_class(&self.elements.lightbox, "open", false);
    }

    fn set_copy_feedback(&mut self, feedback: CopyFeedback) {
        let label = match feedback {
            CopyFeedback::Ready => "Copy image",
            CopyFeedback::Copying => "Copying...",
            CopyFeedback::Copied => "Copied!",
        };
        self.elements.copy_button.set_text_content(Some(label));
        set_class(
            &self.elements.copy_button,
            "copied",
            feedback == CopyFeedback::Copied,
        );
    }

    fn copy_image(&mut self, item: &ManifestItem, ticket: CopyTicket) -> Result<(), HostError> {
        let promise = self
            .window
            .navigator()
            .clipboard()
            .write_text(&item.image);

        let inbox = Rc::clone(&self.inbox);
        let resolve = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            inbox.push(HostEvent::CopyFinished(ticket, Ok(())));
        });
        let inbox = Rc::clone(&self.inbox);
        let reject = Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
            inbox.push(HostEvent::CopyFinished(
                ticket,
                Err(host_error(HostOperation::CopyImage, &err)),
            ));
        });
        promise.then2(&resolve, &reject);
        // Held until `release_copy` after the promise settles.
        self.copies.insert(
            ticket,
            CopyCallbacks {
                _resolve: resolve,
                _reject: reject,
            },
        );
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.elements.toast.set_text_content(Some(message));
        set_class(&self.elements.toast, "visible", true);
    }

    fn refresh_banner(&mut self, class: ViewportClass) {
        let value = match class {
            ViewportClass::Mobile => "mobile",
            ViewportClass::Desktop => "desktop",
        };
        if let Err(err) = self
            .elements
            .banner
            .set_attribute("data-viewport-class", value)
        {
            tracing::warn!(error = ?err, "failed to tag banner");
        }
        self.dispatch(&self.elements.banner, "gallery-banner-refresh");
    }

    fn swap_modal_ad(&mut self) {
        self.dispatch(&self.elements.lightbox, "gallery-modal-ad-swap");
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        if let Some(handle) = self.scheduled_frame.get() {
            self.cancel_frame(handle);
        }
        for load in self.loads.borrow().values() {
            load.detach();
        }
    }
}

/// Delivers queued completions to `gallery`.
///
/// Does nothing if the controller is already borrowed; the events stay
/// queued for the next call.
pub fn dispatch_events(gallery: &RefCell<GridViewController<WebHost>>) {
    let Ok(mut gallery) = gallery.try_borrow_mut() else {
        return;
    };
    loop {
        let events = gallery.host().take_events();
        if events.is_empty() {
            break;
        }
        for event in events {
            match event {
                HostEvent::ImageLoaded(ticket, result) => {
                    gallery.image_loaded(ticket, result);
                }
                HostEvent::CopyFinished(ticket, result) => {
                    gallery.host_mut().release_copy(ticket);
                    let now = gallery.host().now();
                    gallery.copy_finished(ticket, result, now);
                }
                HostEvent::Frame(handle, timestamp) => gallery.animation_frame(handle, timestamp),
            }
        }
    }
}

struct Registration {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl Registration {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(JsValue) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(JsValue)>::new(handler);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let callback = self.callback.as_ref().unchecked_ref();
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.kind, callback)
        {
            tracing::warn!(kind = self.kind, error = ?err, "failed to remove listener");
        }
    }
}

/// A mounted gallery and its DOM listeners. Dropping it detaches the
/// listeners and stops the timer tick.
pub struct Listeners {
    gallery: Rc<RefCell<GridViewController<WebHost>>>,
    window: Window,
    registrations: Vec<Registration>,
    tick: Option<(i32, Closure<dyn FnMut()>)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("registrations", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

impl Listeners {
    /// The mounted gallery.
    #[must_use]
    pub fn gallery(&self) -> &Rc<RefCell<GridViewController<WebHost>>> {
        &self.gallery
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        if let Some((id, _)) = self.tick.take() {
            self.window.clear_interval_with_handle(id);
        }
        self.registrations.clear();
    }
}

type PointerForward = fn(&mut GridViewController<WebHost>, PointerSample);

/// Milliseconds between timer ticks.
const TICK_MS: i32 = 50;

fn pointer_sample(viewport: &HtmlElement, event: &PointerEvent) -> PointerSample {
    let rect = viewport.get_bounding_client_rect();
    PointerSample::new(
        Point::new(
            f64::from(event.client_x()) - rect.left(),
            f64::from(event.client_y()) - rect.top(),
        ),
        event.time_stamp(),
    )
}

/// Mounts a gallery into `elements` and wires pointer, keyboard, resize and
/// timer input to it.
pub fn attach(
    config: GalleryConfig,
    manifest: Manifest,
    elements: WebHostElements,
) -> Result<Listeners, JsValue> {
    let host = WebHost::new(elements.clone())?;
    let window = host.window.clone();
    let viewport = host.viewport_size();
    let now = host.now();
    let gallery = GridViewController::new(config, manifest, viewport, host, now)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let gallery = Rc::new(RefCell::new(gallery));

    let weak = Rc::downgrade(&gallery);
    gallery.borrow().host().set_waker(move || {
        if let Some(gallery) = weak.upgrade() {
            dispatch_events(&gallery);
        }
    });

    let mut registrations = Vec::new();
    let target: &EventTarget = elements.viewport.as_ref();

    let pointer_events: [(&'static str, PointerForward); 3] = [
        ("pointerdown", GridViewController::pointer_down),
        ("pointermove", GridViewController::pointer_move),
        ("pointerup", GridViewController::pointer_up),
    ];
    for (kind, forward) in pointer_events {
        let gallery = Rc::clone(&gallery);
        let viewport = elements.viewport.clone();
        registrations.push(Registration::new(target, kind, move |event: JsValue| {
            let event: PointerEvent = event.unchecked_into();
            if kind == "pointerdown" {
                event.prevent_default();
            }
            let sample = pointer_sample(&viewport, &event);
            forward(&mut gallery.borrow_mut(), sample);
        })?);
    }
    {
        let gallery = Rc::clone(&gallery);
        registrations.push(Registration::new(target, "pointerleave", move |event: JsValue| {
            let event: Event = event.unchecked_into();
            gallery.borrow_mut().pointer_leave(event.time_stamp());
        })?);
    }
    {
        let gallery = Rc::clone(&gallery);
        registrations.push(Registration::new(
            window.as_ref(),
            "keydown",
            move |event: JsValue| {
                let event: KeyboardEvent = event.unchecked_into();
                if event.key() == "Escape" {
                    gallery.borrow_mut().close_lightbox(CloseReason::Escape);
                }
            },
        )?);
    }
    {
        let gallery = Rc::clone(&gallery);
        let lightbox = elements.lightbox.clone();
        registrations.push(Registration::new(
            elements.lightbox.as_ref(),
            "click",
            move |event: JsValue| {
                let event: Event = event.unchecked_into();
                let backdrop: &EventTarget = lightbox.as_ref();
                if event.target().as_ref() == Some(backdrop) {
                    gallery.borrow_mut().close_lightbox(CloseReason::Backdrop);
                }
            },
        )?);
    }
    {
        let gallery = Rc::clone(&gallery);
        registrations.push(Registration::new(
            elements.close_button.as_ref(),
            "click",
            move |event: JsValue| {
                let event: Event = event.unchecked_into();
                event.stop_propagation();
                gallery.borrow_mut().close_lightbox(CloseReason::CloseButton);
            },
        )?);
    }
    {
        let gallery = Rc::clone(&gallery);
        registrations.push(Registration::new(
            elements.copy_button.as_ref(),
            "click",
            move |event: JsValue| {
                let event: Event = event.unchecked_into();
                event.stop_propagation();
                gallery.borrow_mut().copy_image();
            },
        )?);
    }
    {
        let gallery = Rc::clone(&gallery);
        registrations.push(Registration::new(window.as_ref(), "resize", move |_| {
            let mut gallery = gallery.borrow_mut();
            let size = gallery.host().viewport_size();
            let now = gallery.host().now();
            gallery.resize(size, now);
        })?);
    }

    let tick = {
        let gallery = Rc::clone(&gallery);
        Closure::<dyn FnMut()>::new(move || {
            let Ok(mut gallery) = gallery.try_borrow_mut() else {
                return;
            };
            let now = gallery.host().now();
            gallery.advance_timers(now);
        })
    };
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        TICK_MS,
    )?;

    Ok(Listeners {
        gallery,
        window,
        registrations,
        tick: Some((id, tick)),
    })
}
