//! Image generation and local storage

pub mod backend;
pub mod pipeline;

pub use backend::{ImageBackend, OpenAIImageBackend, UnconfiguredImageBackend};
pub use pipeline::{HttpImagePipeline, ImagePipeline, file_name_for};
