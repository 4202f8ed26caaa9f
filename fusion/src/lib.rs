//! Fusion - alignment and compositing of shifted image captures.
//!
//! This library turns a set of slightly offset, noisy captures of the same
//! scene (successive video frames, repeated scans) into one image:
//! - Containers holding images with their positions and cached offsets
//! - Recursive divide-and-conquer alignment
//! - Weighted average, filter and sub-pixel point renderers
//!
//! Measuring the offset between two planes is left to the caller through
//! the [`Comparator`] trait.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fusion::{AverageRender, Container, ImageContainer, Progress, RecursiveAligner};
//!
//! let mut container = ImageContainer::new();
//! for frame in frames {
//!     container.add_image(frame);
//! }
//!
//! RecursiveAligner::new(my_comparator).align(&mut container, Progress::none())?;
//! let fused = AverageRender::default().render(&container, Progress::none())?;
//! ```

pub mod aligner;
pub mod comparator;
pub mod container;
pub mod error;
pub mod geometry;
pub mod image;
pub mod plane;
pub mod progress;
pub mod render;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Image model
// ============================================================================

pub use geometry::{Rect, Size};
pub use image::{ColorSystem, ImageEx, MAX_PLANES};
pub use plane::{Plane, ScalingFunction, color};

// ============================================================================
// Containers and collaborators
// ============================================================================

pub use comparator::{Comparator, ImageOffset};
pub use container::{Container, ImageContainer, ImageGroup, ImageItem, UNGROUPED};
pub use error::{Error, Result};
pub use progress::{Progress, ProgressCounter, ProgressWatcher};

// ============================================================================
// Alignment and rendering
// ============================================================================

pub use aligner::{RecursiveAligner, merge_vertical};
pub use render::{
    AverageRender, AverageRenderConfig, Filter, FloatRender, FloatRenderConfig, PixelFilter,
    PlaneRender, PointPolicy, SimpleRender, SimpleRenderConfig,
};
