// Layout engine: page geometry, body classification and adaptive flow planning.
// Every stage is a pure function of its inputs; nothing here is shared between requests.

pub mod classifier;
pub mod flow;
pub mod geometry;
pub mod theme;

// Re-export the public API consumed by rendering and the handlers.
pub use classifier::{classify_result_body, flatten_general_body};
pub use flow::{plan_general_flow, plan_result_flow, FlowPlan, Placement};
pub use geometry::{compute_geometry, GeometryError, PageGeometry, Zone};
pub use theme::{default_a4_theme, LayoutTheme, DEFAULT_FONT};
