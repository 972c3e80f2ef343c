use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::OrgChartError;

/// One team as supplied by the org-data store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgTeam {
	/// Stable, opaque identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Role count; negatives are treated as zero.
	#[serde(default)]
	pub weight: i64,
	/// `None` for a root.
	#[serde(default)]
	pub parent_id: Option<String>,
}

/// Ordered team list the layout is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgChartData {
	/// Teams in input order.
	pub teams: Vec<OrgTeam>,
}

impl OrgChartData {
	/// Wrap an already-built team list.
	pub fn new(teams: Vec<OrgTeam>) -> Self {
		Self { teams }
	}

	/// Parse a JSON array of teams, rejecting duplicate ids.
	pub fn from_json(json: &str) -> Result<Self, OrgChartError> {
		let data: Self = serde_json::from_str(json)?;
		let mut seen = HashSet::new();
		for team in &data.teams {
			if !seen.insert(team.id.as_str()) {
				return Err(OrgChartError::DuplicateTeam(team.id.clone()));
			}
		}
		Ok(data)
	}

	/// Depth of every team below its root. Unknown parents count as roots and
	/// parent cycles are cut at the team count.
	pub fn depths(&self) -> HashMap<&str, usize> {
		let parents: HashMap<&str, Option<&str>> = self
			.teams
			.iter()
			.map(|t| (t.id.as_str(), t.parent_id.as_deref()))
			.collect();
		let limit = self.teams.len();

		self.teams
			.iter()
			.map(|team| {
				let mut depth = 0;
				let mut cursor = team.parent_id.as_deref();
				while let Some(parent) = cursor {
					if depth >= limit || !parents.contains_key(parent) {
						break;
					}
					depth += 1;
					cursor = parents.get(parent).copied().flatten();
				}
				(team.id.as_str(), depth)
			})
			.collect()
	}
}

/// Per-node entry of a [`LayoutSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSnapshot {
	/// Team id.
	pub id: String,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Display radius in graph units.
	pub radius: f64,
	/// Whether the node is held at a pinned position.
	pub is_pinned: bool,
}

/// Parent → child edge, by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeSnapshot {
	/// Parent team id.
	pub source: String,
	/// Child team id.
	pub target: String,
}

/// Immutable copy of the layout handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LayoutSnapshot {
	/// Nodes in input order.
	pub nodes: Vec<NodeSnapshot>,
	/// Edges whose endpoints both exist.
	pub edges: Vec<EdgeSnapshot>,
}

impl LayoutSnapshot {
	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&NodeSnapshot> {
		self.nodes.iter().find(|n| n.id == id)
	}
}
