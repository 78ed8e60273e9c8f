use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::webgl::WebGl;
use crate::scene::Scene;

pub type SharedScene = Rc<RefCell<Scene<WebGl>>>;

/// Radians of orbit per dragged pixel.
const ORBIT_PER_PIXEL: f32 = 0.005;

fn window_size() -> Option<(u32, u32)> {
    let window = window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w as u32, h as u32))
}

/// Sizes the canvas to the window and forwards the new size to the scene.
fn fit_canvas(canvas: &HtmlCanvasElement, scene: &SharedScene) {
    if let Some((w, h)) = window_size() {
        canvas.set_width(w);
        canvas.set_height(h);
        scene.borrow_mut().resize(w, h);
    }
}

/// Installs resize and pointer listeners, then starts the animation loop.
pub fn start(canvas: HtmlCanvasElement, scene: SharedScene) -> Result<(), JsValue> {
    let window = window().ok_or("no window")?;

    fit_canvas(&canvas, &scene);
    let resize_closure = {
        let canvas = canvas.clone();
        let scene = scene.clone();
        Closure::wrap(Box::new(move || fit_canvas(&canvas, &scene)) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();

    let drag_closure = {
        let scene = scene.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            if event.buttons() & 1 == 1 {
                let dx = event.movement_x() as f32 * ORBIT_PER_PIXEL;
                let dy = event.movement_y() as f32 * ORBIT_PER_PIXEL;
                scene.borrow_mut().camera_mut().orbit(-dx, dy);
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    canvas.add_event_listener_with_callback("mousemove", drag_closure.as_ref().unchecked_ref())?;
    drag_closure.forget();

    let wheel_closure = {
        let scene = scene.clone();
        Closure::wrap(Box::new(move |event: WheelEvent| {
            event.prevent_default();
            let factor = (event.delta_y() * 0.001).exp() as f32;
            scene.borrow_mut().camera_mut().zoom(factor);
        }) as Box<dyn FnMut(WheelEvent)>)
    };
    canvas.add_event_listener_with_callback("wheel", wheel_closure.as_ref().unchecked_ref())?;
    wheel_closure.forget();

    // Animation loop
    // `f` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. Storing it inside an `Option`
    // allows us to create the `Closure` first and then obtain a reference to
    // it from within itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let performance = window.performance().ok_or("no performance clock")?;
    let stats_element = window
        .document()
        .and_then(|document| document.get_element_by_id("stats"));
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let (width, height) = (canvas.width(), canvas.height());
        let frame = scene
            .borrow_mut()
            .tick(|| performance.now(), width, height);
        match frame {
            Ok(Some(report)) => {
                if let Some(element) = &stats_element {
                    element.set_text_content(Some(&format!("{:.0} FPS", report.fps)));
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::error!("render loop stopped: {err}");
                return;
            }
        }

        // schedule next
        let next = web_sys::window().and_then(|window| {
            let callback = f.borrow();
            let callback = callback.as_ref()?;
            window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .ok()
        });
        if next.is_none() {
            log::error!("could not schedule the next frame");
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }

    Ok(())
}
