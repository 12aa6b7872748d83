//! Charts module - Linked views and static export

mod age_view;
mod count_view;
mod interaction;
mod plotter;
mod priority_view;
mod renderer;

pub use age_view::AgeView;
pub use count_view::CountView;
pub use priority_view::PriorityView;
pub use renderer::{Snapshot, StaticChartRenderer};
