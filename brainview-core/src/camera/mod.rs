use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::error::ControlsError;

mod orthographic;
mod perspective;
mod uniform;

pub use orthographic::{AnatomicalView, OrthographicCamera, ResetOptions, SpherePosition};
pub use perspective::PerspectiveCamera;
pub use uniform::CameraUniform;

//
// ──────────────────────────────────────────────────────────────
//   Frustum bounds (orthographic-style extents)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FrustumBounds
{
  pub left: f32,
  pub right: f32,
  pub top: f32,
  pub bottom: f32,
}

impl FrustumBounds
{
  pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self
  {
    Self { left, right, top, bottom }
  }

  pub fn width(&self) -> f32
  {
    self.right - self.left
  }

  pub fn height(&self) -> f32
  {
    self.top - self.bottom
  }

  /// Moves all four edges; the extents stay the same.
  pub fn shifted(&self, dx: f32, dy: f32) -> Self
  {
    Self {
      left: self.left + dx,
      right: self.right + dx,
      top: self.top + dy,
      bottom: self.bottom + dy,
    }
  }

  fn is_finite(&self) -> bool
  {
    self.left.is_finite() && self.right.is_finite() && self.top.is_finite() && self.bottom.is_finite()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   CameraAdapter
// ──────────────────────────────────────────────────────────────
//

/// The only way the controls touch a camera.
///
/// Any projection-matrix-owning camera can be driven by
/// [`crate::ArcballControls`] once it exposes these fields. Panning moves
/// the frustum bounds rather than the position, so the look-at target stays
/// fixed.
pub trait CameraAdapter
{
  fn position(&self) -> Vec3;
  fn set_position(&mut self, position: Vec3);

  fn up(&self) -> Vec3;
  fn set_up(&mut self, up: Vec3);

  fn zoom(&self) -> f32;
  fn set_zoom(&mut self, zoom: f32);

  fn bounds(&self) -> FrustumBounds;
  fn set_bounds(&mut self, bounds: FrustumBounds);

  /// Rebuild the projection after zoom or bounds changed.
  fn update_projection_matrix(&mut self);

  /// Re-orient the view towards `target` using the current up vector.
  fn look_at(&mut self, target: Vec3);

  fn view_matrix(&self) -> Mat4;
  fn projection_matrix(&self) -> Mat4;

  fn view_proj(&self) -> Mat4
  {
    self.projection_matrix() * self.view_matrix()
  }

  /// Rejects cameras the controls cannot work with.
  fn validate(&self) -> Result<(), ControlsError>
  {
    if !self.position().is_finite()
    {
      return Err(ControlsError::InvalidCamera { field: "position", reason: "not finite" });
    }

    let up = self.up();
    if !up.is_finite() || up.length_squared() == 0.0
    {
      return Err(ControlsError::InvalidCamera { field: "up", reason: "must be a finite non-zero vector" });
    }

    let zoom = self.zoom();
    if !(zoom.is_finite() && zoom > 0.0)
    {
      return Err(ControlsError::InvalidCamera { field: "zoom", reason: "must be finite and positive" });
    }

    let bounds = self.bounds();
    if !bounds.is_finite() || bounds.width() == 0.0 || bounds.height() == 0.0
    {
      return Err(ControlsError::InvalidCamera { field: "bounds", reason: "must be finite with non-zero extents" });
    }

    Ok(())
  }
}

/// Shared camera handle, so a renderer can keep reading the camera while the
/// controls own the handle. Every call holds the borrow only for its own
/// duration.
impl<T: CameraAdapter> CameraAdapter for Rc<RefCell<T>>
{
  fn position(&self) -> Vec3
  {
    self.borrow().position()
  }

  fn set_position(&mut self, position: Vec3)
  {
    self.borrow_mut().set_position(position);
  }

  fn up(&self) -> Vec3
  {
    self.borrow().up()
  }

  fn set_up(&mut self, up: Vec3)
  {
    self.borrow_mut().set_up(up);
  }

  fn zoom(&self) -> f32
  {
    self.borrow().zoom()
  }

  fn set_zoom(&mut self, zoom: f32)
  {
    self.borrow_mut().set_zoom(zoom);
  }

  fn bounds(&self) -> FrustumBounds
  {
    self.borrow().bounds()
  }

  fn set_bounds(&mut self, bounds: FrustumBounds)
  {
    self.borrow_mut().set_bounds(bounds);
  }

  fn update_projection_matrix(&mut self)
  {
    self.borrow_mut().update_projection_matrix();
  }

  fn look_at(&mut self, target: Vec3)
  {
    self.borrow_mut().look_at(target);
  }

  fn view_matrix(&self) -> Mat4
  {
    self.borrow().view_matrix()
  }

  fn projection_matrix(&self) -> Mat4
  {
    self.borrow().projection_matrix()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Shared helpers
// ──────────────────────────────────────────────────────────────
//

/// Right-handed view matrix, or `None` when eye, target and up are
/// degenerate (eye on the target, or up parallel to the view direction).
pub(crate) fn build_view_matrix(eye: Vec3, target: Vec3, up: Vec3) -> Option<Mat4>
{
  let forward = target - eye;
  if forward.length_squared() <= f32::EPSILON || forward.cross(up).length_squared() <= f32::EPSILON
  {
    return None;
  }

  Some(Mat4::look_at_rh(eye, target, up))
}
