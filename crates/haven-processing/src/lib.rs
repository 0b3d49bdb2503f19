//! Haven processing layer
//!
//! Thumbnail generation for stored uploads: the image path decodes with the
//! `image` crate, the video path shells out to ffprobe/ffmpeg, and the
//! [`Thumbnailer`] state machine turns decode failures into placeholder
//! symlinks instead of propagating them.

pub mod image;
pub mod renderer;
pub mod thumbnail;
pub mod video;

pub use renderer::{MediaRenderer, ThumbRenderer};
pub use thumbnail::{ThumbOutcome, Thumbnailer, ThumbnailError};
