//! Renderer configuration.

use strum_macros::Display;

/// Configuration for [`AverageRender`](super::AverageRender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AverageRenderConfig {
    /// Render every channel at full resolution instead of its native
    /// (possibly subsampled) resolution.
    pub upscale_chroma: bool,
    /// Only render the first plane into a Gray image. Used when merging
    /// representative images during alignment.
    pub for_merging: bool,
}

impl AverageRenderConfig {
    /// Single-plane preset used by the aligner.
    pub fn for_merging() -> Self {
        Self {
            for_merging: true,
            ..Default::default()
        }
    }

    pub fn with_upscale_chroma(mut self, upscale_chroma: bool) -> Self {
        self.upscale_chroma = upscale_chroma;
        self
    }
}

/// Per-pixel reduction used by [`SimpleRender`](super::SimpleRender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Filter {
    /// Arithmetic mean of the contributing samples.
    #[default]
    Average,
    /// Gamma-exaggerated mean absolute deviation. A diagnostic overlay that
    /// lights up misaligned areas; renders a single Gray plane.
    Difference,
    /// Darkest contributing sample on the first channel, mean elsewhere.
    DarkSelect,
}

/// Configuration for [`SimpleRender`](super::SimpleRender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimpleRenderConfig {
    pub filter: Filter,
    /// Upscale subsampled planes before reduction instead of after.
    pub upscale_chroma: bool,
    /// Only render the first `n` images.
    pub max_count: Option<usize>,
}

impl SimpleRenderConfig {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn with_upscale_chroma(mut self, upscale_chroma: bool) -> Self {
        self.upscale_chroma = upscale_chroma;
        self
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        assert!(max_count > 0, "max_count must be at least 1");
        self.max_count = Some(max_count);
        self
    }
}

/// How [`FloatRender`](super::FloatRender) reduces the samples gathered
/// around an output pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PointPolicy {
    /// Spline-weighted mean of the 16 nearest samples.
    #[default]
    Weighted,
    /// Spline-weighted mean of every sample, accumulated without storing them.
    Streaming,
    /// Value of the closest sample.
    Nearest,
}

/// Configuration for [`FloatRender`](super::FloatRender).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRenderConfig {
    /// Output resolution multiplier relative to the container.
    pub scale: f64,
    pub policy: PointPolicy,
    /// Only render the first `n` images.
    pub max_count: Option<usize>,
}

impl Default for FloatRenderConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            policy: PointPolicy::Weighted,
            max_count: None,
        }
    }
}

impl FloatRenderConfig {
    /// Reconstruction at the input resolution.
    pub fn x1() -> Self {
        Self {
            scale: 1.0,
            ..Default::default()
        }
    }

    /// 2x super-resolution with default parameters.
    pub fn x2() -> Self {
        Self::default()
    }

    pub fn x3() -> Self {
        Self {
            scale: 3.0,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        assert!(
            scale.is_finite() && scale > 0.0,
            "scale must be positive and finite"
        );
        self.scale = scale;
        self
    }

    pub fn with_policy(mut self, policy: PointPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        assert!(max_count > 0, "max_count must be at least 1");
        self.max_count = Some(max_count);
        self
    }
}
