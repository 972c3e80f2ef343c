mod component;
mod drag;
mod error;
mod geometry;
mod render;
pub mod scale;
mod simulation;
mod state;
mod types;
mod viewport;

pub use component::OrgChartCanvas;
pub use drag::{DragConfig, DragOutcome, DragPinController, PinState};
pub use error::OrgChartError;
pub use geometry::edge_point;
pub use simulation::{GraphEdge, GraphNode, Simulation, SimulationConfig};
pub use state::{CanvasEvent, NodeInfo, OrgChartConfig, OrgChartState};
pub use types::{EdgeSnapshot, LayoutSnapshot, NodeSnapshot, OrgChartData, OrgTeam};
pub use viewport::{Viewport, ViewportConfig, ViewportState};
