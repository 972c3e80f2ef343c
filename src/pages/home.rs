use std::collections::HashMap;

use leptos::prelude::*;

use crate::components::org_chart::{OrgChartCanvas, OrgChartData};

const SAMPLE_ORG: &str = include_str!("sample_org.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let selected = RwSignal::new(None::<String>);
	let chart = OrgChartData::from_json(SAMPLE_ORG).map(|org| {
		let names: HashMap<String, String> =
			org.teams.iter().map(|t| (t.id.clone(), t.name.clone())).collect();
		let on_team_click = Callback::new(move |id: String| {
			selected.set(Some(names.get(&id).cloned().unwrap_or(id)));
		});
		let org_data = Signal::derive(move || org.clone());

		view! {
			<div class="fullscreen-graph">
				<OrgChartCanvas data=org_data fullscreen=true on_team_click=on_team_click />
				<div class="graph-overlay">
					<h1>"Org Chart"</h1>
					<p class="subtitle">
						"Drag a team to pin it, double click to release. Scroll or pinch to zoom. Drag background to pan."
					</p>
					<Show when=move || selected.get().is_some()>
						<p class="selected">"Selected: " {move || selected.get().unwrap_or_default()}</p>
					</Show>
				</div>
			</div>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>{chart}</ErrorBoundary>
	}
}
