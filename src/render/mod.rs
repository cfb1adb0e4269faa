/// Rendering: animated scatter views and static line charts.
///
/// Both draw into an in-memory RGB buffer with plotters, encode with `image`,
/// and hand the bytes to [`artifact::write_atomic`].

pub mod animation;
pub mod artifact;
pub mod chart;
pub mod frame;

pub use animation::{render_animation, render_frame};
pub use artifact::{artifact_path, chart_path};
pub use chart::{ChartSpec, plot_lines, plot_pairs};
pub use frame::{Bounds, FrameSpec, Projection};
