pub mod branch_indicator;
pub mod gutter;
pub mod message_block;
pub mod minimap;
pub mod status_bar;
pub mod viewport_state;

pub use branch_indicator::BranchIndicator;
pub use message_block::MessageView;
pub use minimap::{Minimap, MinimapConfig, MinimapHit, MinimapLayout, MinimapMarker, MinimapTooltip};
pub use status_bar::{Notice, NoticeLevel, StatusBar};
pub use viewport_state::{ScrollTarget, ViewportState, VisibleRange};
