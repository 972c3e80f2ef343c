//! Interactive org chart for the browser.
//!
//! Teams are laid out by a force simulation whose circles are sized by
//! headcount. The layout engine ([`Simulation`]), viewport ([`Viewport`]) and
//! drag/pin controller ([`DragPinController`]) are plain Rust and can be
//! driven without a DOM through [`OrgChartState`]; [`OrgChartCanvas`] mounts
//! them on a `<canvas>` with Leptos.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

pub use components::org_chart::{
	CanvasEvent, DragConfig, DragOutcome, DragPinController, EdgeSnapshot, GraphEdge, GraphNode,
	LayoutSnapshot, NodeInfo, NodeSnapshot, OrgChartCanvas, OrgChartConfig, OrgChartData,
	OrgChartError, OrgChartState, OrgTeam, PinState, Simulation, SimulationConfig, Viewport,
	ViewportConfig, ViewportState, edge_point, scale,
};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the homepage and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Org Chart" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
