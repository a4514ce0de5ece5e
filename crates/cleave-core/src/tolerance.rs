/// Tolerance for the geometric predicates used while cutting.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Relative linear tolerance; multiplied by the model size before use.
    pub linear: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;

    /// Absolute epsilon for a model whose bounding diagonal is `extent`.
    ///
    /// Models smaller than one unit still get the unscaled epsilon, so a
    /// degenerate (zero-size) model never ends up with a zero band.
    pub fn scaled(self, extent: f64) -> f64 {
        if extent.is_finite() && extent > 1.0 {
            self.linear * extent
        } else {
            self.linear
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
        }
    }
}
