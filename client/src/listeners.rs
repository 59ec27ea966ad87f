use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

/// A window event listener that is removed when dropped.
pub struct WindowListener {
    window: web_sys::Window,
    event: &'static str,
    handler: Closure<dyn Fn(web_sys::Event)>,
}

impl WindowListener {
    pub fn new(event: &'static str, f: impl Fn(web_sys::Event) + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let handler = Closure::<dyn Fn(web_sys::Event)>::new(f);
        if let Err(err) =
            window.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
        {
            tracing::warn!(event, ?err, "failed to attach window listener");
            return None;
        }
        Some(Self {
            window,
            event,
            handler,
        })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback(self.event, self.handler.as_ref().unchecked_ref());
    }
}

/// Current window width in CSS pixels.
pub fn window_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

pub fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|dpr| dpr.is_finite() && *dpr > 0.0)
        .unwrap_or(1.0)
}
