//! Media staging and per-asset state.
//!
//! - [`MediaUpload`]: raw bytes submitted by the user
//! - [`TempMediaStore`] / [`ScratchFiles`]: disk-backed temporary copies with guaranteed release
//! - [`MediaAsset`]: one staged file moving through [`ReadinessState`]

mod asset;
mod store;
mod upload;

pub use asset::{MediaAsset, MediaKind, ReadinessState};
pub use store::{ScratchFiles, TempMediaStore};
pub use upload::MediaUpload;
