//! Force-directed layout engine.
//!
//! One [`Simulation`] owns every node and edge record of a chart for its whole
//! lifetime. Each tick applies many-body repulsion, radius-aware link springs,
//! a weak centering pull and pairwise collision to the velocities of the free
//! nodes, then integrates with a fixed velocity decay and cools `alpha`
//! toward `alpha_target`. Pinned nodes skip integration and sit exactly on
//! their pin.
//!
//! Construction pre-settles synchronously: the first snapshot anyone sees is
//! already at rest.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use super::geometry::{EPSILON, jiggle};
use super::scale::{clamp_weight, radius};
use super::types::{EdgeSnapshot, LayoutSnapshot, NodeSnapshot, OrgChartData, OrgTeam};

/// Hard stop for the pre-settle loop.
const MAX_PRESETTLE_TICKS: usize = 10_000;
/// Golden angle, for the phyllotaxis seed.
const SEED_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);
const SEED_SPACING: f64 = 30.0;

/// Tuning for [`Simulation`]. Forces are heuristic, not physical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Gap added to the two radii to get a link's rest length.
	pub link_padding: f64,
	/// Link stiffness, divided by the smaller endpoint degree.
	pub link_strength: f64,
	/// Pull toward the centre point.
	pub center_strength: f64,
	/// Centre point, graph space.
	pub center_x: f64,
	/// Centre point, graph space.
	pub center_y: f64,
	/// Clearance added to each radius for collision.
	pub collision_margin: f64,
	/// Fraction of an overlap resolved per tick.
	pub collision_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha at or below which the layout rests.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per tick.
	pub alpha_decay: f64,
	/// Target held while a node is being dragged.
	pub alpha_target_active: f64,
	/// Alpha floor applied when a node is unpinned.
	pub unpin_alpha: f64,
	/// Starting alpha when reseeding from a previous layout.
	pub reseed_alpha: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge_strength: -120.0,
			link_padding: 60.0,
			link_strength: 0.7,
			center_strength: 0.015,
			center_x: 0.0,
			center_y: 0.0,
			collision_margin: 4.0,
			collision_strength: 0.7,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_target_active: 0.3,
			unpin_alpha: 0.2,
			reseed_alpha: 0.5,
		}
	}
}

impl SimulationConfig {
	fn sanitized(mut self) -> Self {
		self.alpha_min = self.alpha_min.max(1e-6);
		self.alpha_decay = self.alpha_decay.clamp(1e-4, 1.0);
		self.velocity_decay = self.velocity_decay.clamp(0.0, 1.0);
		self
	}
}

/// Kinematic record of one team.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Team id.
	pub id: String,
	/// Role count, clamped to non-negative.
	pub weight: u32,
	/// Derived from `weight`.
	pub radius: f64,
	/// Graph-space position.
	pub x: f64,
	/// Graph-space position.
	pub y: f64,
	/// Velocity carried between ticks.
	pub vx: f64,
	/// Velocity carried between ticks.
	pub vy: f64,
	/// While set, `(x, y)` equals this exactly.
	pub pin: Option<(f64, f64)>,
}

/// Parent → child link, as indices into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphEdge {
	/// Parent index.
	pub source: usize,
	/// Child index.
	pub target: usize,
}

type LayoutCallback = Box<dyn FnMut(&LayoutSnapshot)>;

/// The layout engine. See the module docs.
pub struct Simulation {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	index: HashMap<String, usize>,
	degree: Vec<usize>,
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	dropped_edges: usize,
	subscriber: Option<LayoutCallback>,
	disposed: bool,
}

impl Simulation {
	/// Build a fresh layout and pre-settle it.
	pub fn new(data: &OrgChartData, config: SimulationConfig) -> Self {
		let mut sim = Self::build(data, config, None);
		sim.presettle();
		sim
	}

	/// Build a layout that keeps the positions and pins of every id present in
	/// `previous`, then pre-settle it from a lower starting temperature.
	pub fn reseeded(data: &OrgChartData, config: SimulationConfig, previous: &LayoutSnapshot) -> Self {
		let mut sim = Self::build(data, config, Some(previous));
		sim.presettle();
		sim
	}

	fn build(data: &OrgChartData, config: SimulationConfig, previous: Option<&LayoutSnapshot>) -> Self {
		let config = config.sanitized();
		let mut teams: Vec<&OrgTeam> = Vec::with_capacity(data.teams.len());
		let mut index = HashMap::with_capacity(data.teams.len());
		for team in &data.teams {
			if index.contains_key(&team.id) {
				debug!("ignoring duplicate team id {}", team.id);
				continue;
			}
			index.insert(team.id.clone(), teams.len());
			teams.push(team);
		}

		let previous: HashMap<&str, &NodeSnapshot> = previous
			.map(|snap| snap.nodes.iter().map(|n| (n.id.as_str(), n)).collect())
			.unwrap_or_default();

		let mut nodes: Vec<GraphNode> = teams
			.iter()
			.enumerate()
			.map(|(i, team)| {
				let weight = clamp_weight(team.weight);
				let (x, y) = seed_position(i, &config);
				let mut node = GraphNode {
					id: team.id.clone(),
					weight,
					radius: radius(weight),
					x,
					y,
					vx: 0.0,
					vy: 0.0,
					pin: None,
				};
				if let Some(prev) = previous.get(team.id.as_str()) {
					node.x = prev.x;
					node.y = prev.y;
					if prev.is_pinned {
						node.pin = Some((prev.x, prev.y));
					}
				}
				node
			})
			.collect();

		// New children start beside their parent's previous position.
		if !previous.is_empty() {
			for (i, team) in teams.iter().enumerate() {
				if previous.contains_key(team.id.as_str()) {
					continue;
				}
				let Some(parent) = team.parent_id.as_deref().and_then(|p| previous.get(p)) else {
					continue;
				};
				let (jx, jy) = jiggle(i, i + 1);
				let reach = parent.radius + nodes[i].radius + config.link_padding;
				nodes[i].x = parent.x + jx / EPSILON * reach;
				nodes[i].y = parent.y + jy / EPSILON * reach;
			}
		}

		let mut edges = Vec::new();
		let mut dropped_edges = 0;
		for (child, team) in teams.iter().enumerate() {
			let Some(parent_id) = team.parent_id.as_deref() else {
				continue;
			};
			match index.get(parent_id) {
				Some(&parent) if parent != child => edges.push(GraphEdge {
					source: parent,
					target: child,
				}),
				_ => dropped_edges += 1,
			}
		}
		if dropped_edges > 0 {
			debug!("dropped {dropped_edges} edges with a missing endpoint");
		}

		let mut degree = vec![0; nodes.len()];
		for edge in &edges {
			degree[edge.source] += 1;
			degree[edge.target] += 1;
		}

		let alpha = if previous.is_empty() { 1.0 } else { config.reseed_alpha.clamp(config.alpha_min, 1.0) };

		Self {
			nodes,
			edges,
			index,
			degree,
			config,
			alpha,
			alpha_target: 0.0,
			dropped_edges,
			subscriber: None,
			disposed: false,
		}
	}

	fn presettle(&mut self) {
		let mut ticks = 0;
		while self.is_settling() && ticks < MAX_PRESETTLE_TICKS {
			self.step();
			ticks += 1;
		}
		if self.is_settling() {
			self.alpha = self.config.alpha_min;
		}
		debug!(
			"pre-settled {} nodes / {} edges in {ticks} ticks",
			self.nodes.len(),
			self.edges.len()
		);
	}

	/// Receive the current snapshot now and one per settling tick after.
	/// Replaces any previous subscriber.
	pub fn subscribe(&mut self, callback: impl FnMut(&LayoutSnapshot) + 'static) {
		if self.disposed {
			return;
		}
		let mut callback: LayoutCallback = Box::new(callback);
		callback(&self.snapshot());
		self.subscriber = Some(callback);
	}

	/// Stop for good: later ticks do nothing and the subscriber is dropped.
	pub fn dispose(&mut self) {
		if !self.disposed {
			debug!("disposing simulation of {} nodes", self.nodes.len());
		}
		self.disposed = true;
		self.subscriber = None;
	}

	/// Whether [`dispose`](Self::dispose) has been called.
	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// `true` while alpha is above `alpha_min`.
	pub fn is_settling(&self) -> bool {
		self.alpha > self.config.alpha_min
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Value alpha is relaxing toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Active tuning.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Node records, in input order.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Resolved edges.
	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Edges discarded at construction because an endpoint was missing.
	pub fn dropped_edges(&self) -> usize {
		self.dropped_edges
	}

	/// Advance one frame. Does nothing once resting or disposed; otherwise
	/// steps, notifies the subscriber and returns `true`.
	pub fn tick(&mut self) -> bool {
		if self.disposed || !self.is_settling() {
			return false;
		}
		self.step();
		self.emit();
		true
	}

	/// Copy of every node position and edge.
	pub fn snapshot(&self) -> LayoutSnapshot {
		LayoutSnapshot {
			nodes: self
				.nodes
				.iter()
				.map(|n| NodeSnapshot {
					id: n.id.clone(),
					x: n.x,
					y: n.y,
					radius: n.radius,
					is_pinned: n.pin.is_some(),
				})
				.collect(),
			edges: self
				.edges
				.iter()
				.map(|e| EdgeSnapshot {
					source: self.nodes[e.source].id.clone(),
					target: self.nodes[e.target].id.clone(),
				})
				.collect(),
		}
	}

	/// Top-most node whose circle contains the graph-space point.
	pub fn node_at(&self, gx: f64, gy: f64) -> Option<&str> {
		self.nodes
			.iter()
			.rev()
			.find(|n| (n.x - gx).hypot(n.y - gy) <= n.radius)
			.map(|n| n.id.as_str())
	}

	/// Radius-inclusive bounding box `(min_x, min_y, max_x, max_y)`.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		self.nodes.iter().fold(None, |acc, n| {
			let (x0, y0, x1, y1) = (n.x - n.radius, n.y - n.radius, n.x + n.radius, n.y + n.radius);
			Some(match acc {
				None => (x0, y0, x1, y1),
				Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
			})
		})
	}

	/// Hold a node at `(x, y)`. Unknown ids and non-finite points are ignored.
	pub(super) fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		if !(x.is_finite() && y.is_finite()) {
			return false;
		}
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.pin = Some((x, y));
		node.x = x;
		node.y = y;
		node.vx = 0.0;
		node.vy = 0.0;
		true
	}

	/// Release a pin. Returns `false` for unknown or already-free nodes.
	pub(super) fn unpin(&mut self, id: &str) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		self.nodes[i].pin.take().is_some()
	}

	/// Keep the layout hot while the user is holding a node.
	pub(super) fn begin_interaction(&mut self) {
		self.alpha_target = self.config.alpha_target_active;
		self.alpha = self.alpha.max(self.config.alpha_target_active);
	}

	/// Let the layout cool back to rest.
	pub(super) fn end_interaction(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Raise alpha to at least `floor`.
	pub(super) fn reheat(&mut self, floor: f64) {
		if floor.is_finite() {
			self.alpha = self.alpha.max(floor.min(1.0));
		}
	}

	fn emit(&mut self) {
		if self.subscriber.is_none() {
			return;
		}
		let snapshot = self.snapshot();
		if let Some(callback) = self.subscriber.as_mut() {
			callback(&snapshot);
		}
	}

	fn step(&mut self) {
		self.apply_charge();
		self.apply_links();
		self.apply_centering();
		self.apply_collisions();
		self.integrate();
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
	}

	/// Add to a free node's velocity; non-finite contributions are dropped.
	fn nudge(&mut self, i: usize, dvx: f64, dvy: f64) {
		if !(dvx.is_finite() && dvy.is_finite()) {
			return;
		}
		let node = &mut self.nodes[i];
		if node.pin.is_none() {
			node.vx += dvx;
			node.vy += dvy;
		}
	}

	fn is_pinned(&self, i: usize) -> bool {
		self.nodes[i].pin.is_some()
	}

	fn apply_charge(&mut self) {
		let strength = self.config.charge_strength * self.alpha;
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (mut dx, mut dy) = (self.nodes[j].x - self.nodes[i].x, self.nodes[j].y - self.nodes[i].y);
				if dx == 0.0 && dy == 0.0 {
					(dx, dy) = jiggle(i, j);
				}
				let w = strength / (dx * dx + dy * dy).max(1.0);
				self.nudge(i, dx * w, dy * w);
				self.nudge(j, -dx * w, -dy * w);
			}
		}
	}

	fn apply_links(&mut self) {
		for e in 0..self.edges.len() {
			let GraphEdge { source, target } = self.edges[e];
			let (s, t) = (&self.nodes[source], &self.nodes[target]);
			let (mut dx, mut dy) = (t.x + t.vx - s.x - s.vx, t.y + t.vy - s.y - s.vy);
			if dx == 0.0 && dy == 0.0 {
				(dx, dy) = jiggle(source, target);
			}
			let dist = dx.hypot(dy);
			let rest = s.radius + t.radius + self.config.link_padding;
			let (ds, dt) = (self.degree[source] as f64, self.degree[target] as f64);
			let strength = self.config.link_strength / ds.min(dt);
			let l = (dist - rest) / dist * self.alpha * strength;
			let (fx, fy) = (dx * l, dy * l);

			// A pinned end cannot absorb its share.
			let bias = match (self.is_pinned(source), self.is_pinned(target)) {
				(true, false) => 1.0,
				(false, true) => 0.0,
				_ => ds / (ds + dt),
			};
			self.nudge(target, -fx * bias, -fy * bias);
			self.nudge(source, fx * (1.0 - bias), fy * (1.0 - bias));
		}
	}

	fn apply_centering(&mut self) {
		let k = self.config.center_strength * self.alpha;
		let (cx, cy) = (self.config.center_x, self.config.center_y);
		for i in 0..self.nodes.len() {
			let (x, y) = (self.nodes[i].x, self.nodes[i].y);
			self.nudge(i, (cx - x) * k, (cy - y) * k);
		}
	}

	fn apply_collisions(&mut self) {
		let margin = self.config.collision_margin;
		let strength = self.config.collision_strength;
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let reach = a.radius + b.radius + 2.0 * margin;
				let (mut dx, mut dy) = (a.x + a.vx - b.x - b.vx, a.y + a.vy - b.y - b.vy);
				if dx == 0.0 && dy == 0.0 {
					(dx, dy) = jiggle(i, j);
				}
				let dist_sq = dx * dx + dy * dy;
				if dist_sq >= reach * reach {
					continue;
				}
				let dist = dist_sq.sqrt();
				let l = (reach - dist) / dist * strength;
				let (fx, fy) = (dx * l, dy * l);

				// The smaller node gives way more.
				let (ra, rb) = (a.radius * a.radius, b.radius * b.radius);
				let share = match (self.is_pinned(i), self.is_pinned(j)) {
					(false, true) => 1.0,
					(true, false) => 0.0,
					_ => rb / (ra + rb),
				};
				self.nudge(i, fx * share, fy * share);
				self.nudge(j, -fx * (1.0 - share), -fy * (1.0 - share));
			}
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			if let Some((px, py)) = node.pin {
				node.x = px;
				node.y = py;
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx *= keep;
			node.vy *= keep;
			let (nx, ny) = (node.x + node.vx, node.y + node.vy);
			if nx.is_finite() && ny.is_finite() {
				node.x = nx;
				node.y = ny;
			} else {
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
	}
}

fn seed_position(i: usize, config: &SimulationConfig) -> (f64, f64) {
	let r = SEED_SPACING * (0.5 + i as f64).sqrt();
	let angle = i as f64 * SEED_ANGLE;
	(config.center_x + r * angle.cos(), config.center_y + r * angle.sin())
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	fn team(id: &str, weight: i64, parent: Option<&str>) -> OrgTeam {
		OrgTeam {
			id: id.into(),
			name: id.to_uppercase(),
			weight,
			parent_id: parent.map(Into::into),
		}
	}

	fn star() -> OrgChartData {
		OrgChartData::new(vec![
			team("root", 5, None),
			team("a", 0, Some("root")),
			team("b", 2, Some("root")),
			team("c", 10, Some("root")),
		])
	}

	fn pos(sim: &Simulation, id: &str) -> (f64, f64) {
		let n = sim.node(id).unwrap();
		(n.x, n.y)
	}

	#[test]
	fn presettle_leaves_the_layout_resting() {
		let sim = Simulation::new(&star(), SimulationConfig::default());
		assert!(sim.alpha() <= sim.config().alpha_min);
		assert!(!sim.is_settling());
	}

	#[test]
	fn star_settles_without_overlap_and_evenly() {
		let sim = Simulation::new(&star(), SimulationConfig::default());
		let nodes = sim.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let d = (nodes[i].x - nodes[j].x).hypot(nodes[i].y - nodes[j].y);
				assert!(
					d >= nodes[i].radius + nodes[j].radius,
					"{} and {} overlap: {d}",
					nodes[i].id,
					nodes[j].id
				);
			}
		}

		let root = pos(&sim, "root");
		let dists: Vec<f64> = ["a", "b", "c"]
			.iter()
			.map(|id| {
				let p = pos(&sim, id);
				(p.0 - root.0).hypot(p.1 - root.1)
			})
			.collect();
		let mean = dists.iter().sum::<f64>() / 3.0;
		for d in &dists {
			assert!((d - mean).abs() <= 0.25 * mean, "{dists:?}");
		}
	}

	#[test]
	fn resting_layout_does_not_tick() {
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		let before = sim.snapshot();
		assert!(!sim.tick());
		assert_eq!(sim.snapshot(), before);
	}

	#[test]
	fn pinned_node_holds_exactly_while_others_move() {
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		assert!(sim.pin("a", 500.0, -250.0));
		sim.begin_interaction();
		let other_before = pos(&sim, "b");
		for _ in 0..120 {
			assert!(sim.tick());
			assert_eq!(pos(&sim, "a"), (500.0, -250.0));
		}
		assert_ne!(pos(&sim, "b"), other_before);
	}

	#[test]
	fn unpin_and_reheat_converges_again() {
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		sim.pin("c", 400.0, 400.0);
		sim.begin_interaction();
		for _ in 0..30 {
			sim.tick();
		}
		sim.end_interaction();
		assert!(sim.unpin("c"));
		sim.reheat(sim.config().unpin_alpha);
		assert!(sim.is_settling());

		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 1_000, "never came to rest");
		}
		assert!(sim.alpha() <= sim.config().alpha_min);
		assert!(sim.node("c").unwrap().pin.is_none());
	}

	#[test]
	fn interaction_keeps_it_hot_until_released() {
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		sim.begin_interaction();
		for _ in 0..2_000 {
			sim.tick();
		}
		assert!(sim.is_settling());
		sim.end_interaction();
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 1_000);
		}
	}

	#[test]
	fn edges_to_missing_parents_are_dropped() {
		let data = OrgChartData::new(vec![
			team("root", 1, None),
			team("a", 1, Some("root")),
			team("b", 1, Some("ghost")),
			team("self", 1, Some("self")),
		]);
		let sim = Simulation::new(&data, SimulationConfig::default());
		assert_eq!(sim.edges().len(), 1);
		assert_eq!(sim.dropped_edges(), 2);
		let snap = sim.snapshot();
		assert_eq!(snap.edges, vec![EdgeSnapshot {
			source: "root".into(),
			target: "a".into()
		}]);
	}

	#[test]
	fn negative_weight_is_zero_weight() {
		let data = OrgChartData::new(vec![team("neg", -4, None), team("zero", 0, None)]);
		let sim = Simulation::new(&data, SimulationConfig::default());
		assert_eq!(sim.node("neg").unwrap().weight, 0);
		assert_eq!(sim.node("neg").unwrap().radius, sim.node("zero").unwrap().radius);
	}

	#[test]
	fn duplicate_ids_keep_the_first() {
		let data = OrgChartData::new(vec![
			team("root", 1, None),
			team("x", 3, Some("root")),
			team("x", 9, None),
		]);
		let sim = Simulation::new(&data, SimulationConfig::default());
		assert_eq!(sim.nodes().len(), 2);
		assert_eq!(sim.node("x").unwrap().weight, 3);
		assert_eq!(sim.edges().len(), 1);
	}

	#[test]
	fn empty_and_single_graphs_are_fine() {
		let empty = Simulation::new(&OrgChartData::default(), SimulationConfig::default());
		assert!(empty.snapshot().nodes.is_empty());
		assert!(empty.bounds().is_none());

		let single = Simulation::new(&OrgChartData::new(vec![team("solo", 2, None)]), SimulationConfig::default());
		let (x, y) = pos(&single, "solo");
		assert!(x.is_finite() && y.is_finite());
		assert!(!single.is_settling());
	}

	#[test]
	fn coincident_nodes_separate_without_nan() {
		let data = OrgChartData::new(vec![
			team("p", 1, None),
			team("q", 1, Some("p")),
			team("r", 1, Some("p")),
		]);
		let stacked = LayoutSnapshot {
			nodes: ["p", "q", "r"]
				.iter()
				.map(|id| NodeSnapshot {
					id: (*id).into(),
					x: 0.0,
					y: 0.0,
					radius: 0.0,
					is_pinned: false,
				})
				.collect(),
			edges: Vec::new(),
		};
		let sim = Simulation::reseeded(&data, SimulationConfig::default(), &stacked);
		for n in sim.nodes() {
			assert!(n.x.is_finite() && n.y.is_finite(), "{n:?}");
		}
		let (p, q) = (pos(&sim, "p"), pos(&sim, "q"));
		assert!((p.0 - q.0).hypot(p.1 - q.1) > 1.0);
	}

	#[test]
	fn non_finite_forces_are_dropped() {
		let all_finite = |sim: &Simulation| sim.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite());

		let charged = SimulationConfig {
			charge_strength: f64::INFINITY,
			..SimulationConfig::default()
		};
		let mut sim = Simulation::new(&star(), charged);
		assert!(all_finite(&sim));
		sim.reheat(1.0);
		for _ in 0..20 {
			sim.tick();
		}
		assert!(all_finite(&sim));

		let linked = SimulationConfig {
			link_strength: f64::NAN,
			..SimulationConfig::default()
		};
		assert!(all_finite(&Simulation::new(&star(), linked)));

		let far = LayoutSnapshot {
			nodes: [("root", 1e300, -1e300), ("a", -1e300, 1e300), ("b", 1e300, 1e300), ("c", -1e300, -1e300)]
				.iter()
				.map(|&(id, x, y)| NodeSnapshot {
					id: id.into(),
					x,
					y,
					radius: 0.0,
					is_pinned: false,
				})
				.collect(),
			edges: Vec::new(),
		};
		let sim = Simulation::reseeded(&star(), SimulationConfig::default(), &far);
		assert!(all_finite(&sim));
	}

	#[test]
	fn reseeding_keeps_survivors_and_pins() {
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		sim.pin("b", 321.0, 123.0);
		let previous = sim.snapshot();

		let mut data = star();
		data.teams.push(team("d", 1, Some("c")));
		let next = Simulation::reseeded(&data, SimulationConfig::default(), &previous);
		assert_eq!(pos(&next, "b"), (321.0, 123.0));
		assert!(next.node("b").unwrap().pin.is_some());
		assert!(next.node("d").is_some());
		assert!(!next.is_settling());
	}

	#[test]
	fn subscriber_sees_presettled_snapshot_then_ticks() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		let sink = seen.clone();
		sim.subscribe(move |snap| sink.borrow_mut().push(snap.clone()));
		assert_eq!(seen.borrow().len(), 1);
		assert_eq!(seen.borrow()[0], sim.snapshot());

		sim.reheat(0.1);
		sim.tick();
		sim.tick();
		assert_eq!(seen.borrow().len(), 3);
	}

	#[test]
	fn disposed_simulation_stays_silent() {
		let calls = Rc::new(RefCell::new(0));
		let mut sim = Simulation::new(&star(), SimulationConfig::default());
		let counter = calls.clone();
		sim.subscribe(move |_| *counter.borrow_mut() += 1);
		sim.reheat(0.5);
		sim.dispose();
		assert!(!sim.tick());
		sim.subscribe(|_| panic!("subscribed after dispose"));
		assert_eq!(*calls.borrow(), 1);
		assert!(sim.is_disposed());
	}

	#[test]
	fn hit_test_and_bounds() {
		let sim = Simulation::new(&star(), SimulationConfig::default());
		let root = sim.node("root").unwrap();
		assert_eq!(sim.node_at(root.x, root.y), Some("root"));
		assert_eq!(sim.node_at(1e6, 1e6), None);

		let (x0, y0, x1, y1) = sim.bounds().unwrap();
		for n in sim.nodes() {
			assert!(n.x - n.radius >= x0 && n.x + n.radius <= x1);
			assert!(n.y - n.radius >= y0 && n.y + n.radius <= y1);
		}
	}

	#[test]
	fn bad_decay_still_terminates() {
		let config = SimulationConfig {
			alpha_decay: 0.0,
			alpha_min: 0.0,
			..SimulationConfig::default()
		};
		let sim = Simulation::new(&star(), config);
		assert!(!sim.is_settling());
	}
}
