use std::path::PathBuf;

/// Everything that can go wrong while setting up the controls.
///
/// Gesture handling itself never fails: degenerate geometry is a no-op.
#[derive(Debug, thiserror::Error)]
pub enum ControlsError
{
  #[error("zoom bounds are inverted: zoom_min {min} > zoom_max {max}")]
  InvertedZoomBounds
  {
    min: f32,
    max: f32,
  },

  #[error("zoom_min must be positive, got {0}")]
  NonPositiveZoomMin(f32),

  #[error("{name} must be finite, got {value}")]
  NonFinite
  {
    name: &'static str,
    value: f32,
  },

  #[error("dynamic_damping_factor must lie in (0, 1], got {0}")]
  DampingOutOfRange(f32),

  #[error("invalid camera {field}: {reason}")]
  InvalidCamera
  {
    field: &'static str,
    reason: &'static str,
  },

  #[error("failed to read config {}: {source}", path.display())]
  Io
  {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),
}
