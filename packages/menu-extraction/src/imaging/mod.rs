//! Raster image processing: preprocessing profiles and block segmentation.

pub mod preprocess;
pub mod segment;

pub use preprocess::{contour_profile, ocr_profile};
pub use segment::{count_regions, crop_regions, segment};
