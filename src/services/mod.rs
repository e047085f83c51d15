/// Shared service building blocks
pub mod common;
/// Video player lifecycle registry
pub mod video;

pub use video::{Playable, PlayerId, VideoPlayerRegistry};
