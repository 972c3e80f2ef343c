use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, trace};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, DomRect, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList,
	WheelEvent, Window,
};

use super::drag::DragOutcome;
use super::render;
use super::state::{CanvasEvent, OrgChartConfig, OrgChartState};
use super::types::OrgChartData;

type SharedState = Rc<RefCell<Option<OrgChartState>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Interactive org chart drawn on a `<canvas>`.
///
/// Team circles are sized by headcount and settle under a force layout.
/// Dragging a team pins it where it is dropped; a double click releases it.
/// Empty space pans, the wheel or a two finger pinch zooms. A press that does
/// not move is reported through `on_team_click`.
#[component]
pub fn OrgChartCanvas(
	#[prop(into)] data: Signal<OrgChartData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] config: OrgChartConfig,
	#[prop(optional)] on_team_click: Option<Callback<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb: SharedClosure = Rc::new(RefCell::new(None));
	let unmounted = Arc::new(AtomicBool::new(false));
	let (state_init, animate_init, resize_cb_init, unmounted_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), unmounted.clone());

	on_cleanup(move || unmounted.store(true, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let data = data.get();
		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.replace_data(&data);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			return;
		};

		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*state_init.borrow_mut() = Some(OrgChartState::new(&data, w, h, config.clone()));
		debug!("mounted org chart with {} teams at {w}x{h}", data.teams.len());

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = canvas_size(&win, &canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, resize_inner, unmounted_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			unmounted_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if unmounted_anim.load(Ordering::Relaxed) {
				if let Some(mut s) = state_anim.borrow_mut().take() {
					s.dispose();
				}
				if let (Some(win), Some(cb)) = (web_sys::window(), resize_inner.borrow_mut().take()) {
					let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				debug!("org chart unmounted, animation stopped");
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				render::render(s, &ctx);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(&state_md, CanvasEvent::PointerDown { x, y }, on_team_click);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(&state_mm, CanvasEvent::PointerMove { x, y }, on_team_click);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let timestamp = ev.time_stamp();
		dispatch(&state_mu, CanvasEvent::PointerUp { timestamp }, on_team_click);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		dispatch(&state_ml, CanvasEvent::PointerLeave, on_team_click);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) {
			let delta_y = ev.delta_y();
			dispatch(&state_wh, CanvasEvent::Wheel { delta_y, x, y }, on_team_click);
		}
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		if let Some(touches) = touch_points(canvas_ref, &ev.touches()) {
			dispatch(&state_ts, CanvasEvent::TouchStart { touches }, on_team_click);
		}
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		if let Some(touches) = touch_points(canvas_ref, &ev.touches()) {
			dispatch(&state_tm, CanvasEvent::TouchMove { touches }, on_team_click);
		}
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let timestamp = ev.time_stamp();
		if let Some(touches) = touch_points(canvas_ref, &ev.touches()) {
			dispatch(&state_te, CanvasEvent::TouchEnd { touches, timestamp }, on_team_click);
		}
	};

	let state_tc = state.clone();
	let on_touchcancel = move |_: TouchEvent| {
		dispatch(&state_tc, CanvasEvent::PointerLeave, on_team_click);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="org-chart-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

fn dispatch(state: &SharedState, event: CanvasEvent, on_team_click: Option<Callback<String>>) {
	trace!("{event:?}");
	let outcome = match *state.borrow_mut() {
		Some(ref mut s) => s.handle(event),
		None => return,
	};
	match outcome {
		Some(DragOutcome::Click(id)) => {
			if let Some(cb) = on_team_click {
				cb.run(id);
			}
		}
		Some(DragOutcome::Pinned(id)) => debug!("pinned {id}"),
		Some(DragOutcome::Unpinned(id)) => debug!("unpinned {id}"),
		None => {}
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
		(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
	} else {
		(
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	}
}

fn canvas_rect(canvas_ref: NodeRef<leptos::html::Canvas>) -> Option<DomRect> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	Some(canvas.get_bounding_client_rect())
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
	let rect = canvas_rect(canvas_ref)?;
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn touch_points(canvas_ref: NodeRef<leptos::html::Canvas>, list: &TouchList) -> Option<Vec<(f64, f64)>> {
	let rect = canvas_rect(canvas_ref)?;
	Some(
		(0..list.length())
			.filter_map(|i| list.get(i))
			.map(|t| (t.client_x() as f64 - rect.left(), t.client_y() as f64 - rect.top()))
			.collect(),
	)
}
