pub mod assembly;
pub mod lttb;
pub mod merge;

pub use assembly::{AlertMarker, TimeseriesAssembler, TimeseriesView, DEFAULT_LTTB_THRESHOLD};
pub use lttb::{downsample, select_indices, Point};
pub use merge::merged_indices;
