//! Image post-processing: storage normalization, enhancement, web renditions,
//! thumbnails and inline image discovery.

pub mod embedded;
pub mod enhance;
pub mod optimizer;

pub use embedded::extract_embedded_images;
pub use optimizer::{ImageInfo, ImageOptimizer, OptimizedImage, SavedImage, image_info};
