//! Library half of the `ocean-scene` tool, kept separate so the commands
//! can be exercised from tests without spawning the binary.

pub mod compose;
pub mod downsample;
pub mod wind;

pub use compose::{compose_scene, ComposeOptions, SceneDocument};
pub use downsample::{downsample_file, downsample_payload, DownsampleSummary};
pub use wind::WindPayload;
