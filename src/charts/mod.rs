//! Charts module - chart descriptions and static image rendering

mod backend;
mod plotter;
mod renderer;

pub use backend::FontTolerantBackend;
pub use plotter::{
    metric_color, Chart, ChartPlotter, Marker, ReferenceLine, Series, LEGACY_TICKS,
    STATISTICS_TICKS,
};
pub use renderer::{
    format_tick, ChartError, ImageFormat, StaticChartRenderer, DEFAULT_HEIGHT, DEFAULT_WIDTH,
    TICK_FORMAT,
};
