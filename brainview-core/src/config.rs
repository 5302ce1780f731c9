use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ControlsError;

//
// ──────────────────────────────────────────────────────────────
//   Defaults (tuned for the brain viewer's orthographic camera)
// ──────────────────────────────────────────────────────────────
//

const DEFAULT_ROTATE_SPEED: f32 = 1.0;
const DEFAULT_ZOOM_SPEED: f32 = 0.02;
const DEFAULT_PAN_SPEED: f32 = 1.0;
const DEFAULT_DAMPING: f32 = 0.5;
const DEFAULT_ZOOM_MIN: f32 = 0.5;
const DEFAULT_ZOOM_MAX: f32 = 10.0;

// A, S, D
const DEFAULT_KEYS: [u32; 3] = [65, 83, 68];

/// Tuning knobs for [`crate::ArcballControls`].
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "static_moving": true, "zoom_max": 20.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig
{
  pub rotate_speed: f32,
  pub zoom_speed: f32,
  /// Multiplier on the cursor-locked pan distance. Independent of
  /// `zoom_speed`: at 1.0 the content stays under the cursor.
  pub pan_speed: f32,

  pub no_rotate: bool,
  pub no_zoom: bool,
  pub no_pan: bool,
  pub no_roll: bool,

  /// `true` tracks the pointer 1:1; `false` lets the residual delta decay
  /// by `dynamic_damping_factor` every tick.
  pub static_moving: bool,
  pub dynamic_damping_factor: f32,

  pub zoom_min: f32,
  pub zoom_max: f32,

  /// Key codes forcing rotate, zoom and pan while held.
  pub keys: [u32; 3],
}

impl Default for ControlsConfig
{
  fn default() -> Self
  {
    Self {
      rotate_speed: DEFAULT_ROTATE_SPEED,
      zoom_speed: DEFAULT_ZOOM_SPEED,
      pan_speed: DEFAULT_PAN_SPEED,

      no_rotate: false,
      no_zoom: false,
      no_pan: false,
      no_roll: false,

      static_moving: false,
      dynamic_damping_factor: DEFAULT_DAMPING,

      zoom_min: DEFAULT_ZOOM_MIN,
      zoom_max: DEFAULT_ZOOM_MAX,

      keys: DEFAULT_KEYS,
    }
  }
}

impl ControlsConfig
{
  pub fn from_json_str(json: &str) -> Result<Self, ControlsError>
  {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ControlsError>
  {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
      .map_err(|source| ControlsError::Io { path: path.to_path_buf(), source })?;

    Self::from_json_str(&text)
  }

  pub fn validate(&self) -> Result<(), ControlsError>
  {
    check_finite("rotate_speed", self.rotate_speed)?;
    check_finite("zoom_speed", self.zoom_speed)?;
    check_finite("pan_speed", self.pan_speed)?;
    check_finite("zoom_min", self.zoom_min)?;
    check_finite("zoom_max", self.zoom_max)?;
    check_finite("dynamic_damping_factor", self.dynamic_damping_factor)?;

    if self.zoom_min <= 0.0
    {
      return Err(ControlsError::NonPositiveZoomMin(self.zoom_min));
    }

    if self.zoom_min > self.zoom_max
    {
      return Err(ControlsError::InvertedZoomBounds { min: self.zoom_min, max: self.zoom_max });
    }

    if !(self.dynamic_damping_factor > 0.0 && self.dynamic_damping_factor <= 1.0)
    {
      return Err(ControlsError::DampingOutOfRange(self.dynamic_damping_factor));
    }

    Ok(())
  }

  pub fn clamp_zoom(&self, zoom: f32) -> f32
  {
    zoom.clamp(self.zoom_min, self.zoom_max)
  }
}

fn check_finite(name: &'static str, value: f32) -> Result<(), ControlsError>
{
  if value.is_finite()
  {
    Ok(())
  }
  else
  {
    Err(ControlsError::NonFinite { name, value })
  }
}
