use glam::{Mat4, Vec3, Vec4};

use super::{build_view_matrix, CameraAdapter, FrustumBounds};

//
// ──────────────────────────────────────────────────────────────
//   Perspective camera
//
//   The frustum bounds are the near-plane extents implied by
//   fovy/aspect. Panning shifts them off-centre (a lens shift)
//   and zoom divides them, so the controls treat this camera
//   exactly like the orthographic one.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct PerspectiveCamera
{
  pub position: Vec3,
  pub up: Vec3,
  pub zoom: f32,
  pub bounds: FrustumBounds,

  pub fovy: f32,
  pub aspect: f32,
  pub znear: f32,
  pub zfar: f32,

  view: Mat4,
  projection: Mat4,
}

impl PerspectiveCamera
{
  pub fn new(aspect: f32) -> Self
  {
    let fovy = std::f32::consts::FRAC_PI_4;
    let znear = 0.1;

    let mut camera = Self {
      position: Vec3::new(8.0, -12.0, 6.0),
      up: Vec3::Z,
      zoom: 1.0,
      bounds: near_plane_bounds(fovy, aspect, znear),
      fovy,
      aspect,
      znear,
      zfar: 10_000.0,
      view: Mat4::IDENTITY,
      projection: Mat4::IDENTITY,
    };

    camera.look_at(Vec3::ZERO);
    camera.update_projection_matrix();
    camera
  }

  /// Refit the bounds to a new aspect ratio, keeping any pan offset.
  pub fn set_aspect(&mut self, aspect: f32)
  {
    let offset_x = (self.bounds.left + self.bounds.right) * 0.5;
    let offset_y = (self.bounds.top + self.bounds.bottom) * 0.5;

    self.aspect = aspect;
    self.bounds = near_plane_bounds(self.fovy, aspect, self.znear).shifted(offset_x, offset_y);
    self.update_projection_matrix();
  }
}

impl CameraAdapter for PerspectiveCamera
{
  fn position(&self) -> Vec3
  {
    self.position
  }

  fn set_position(&mut self, position: Vec3)
  {
    self.position = position;
  }

  fn up(&self) -> Vec3
  {
    self.up
  }

  fn set_up(&mut self, up: Vec3)
  {
    self.up = up;
  }

  fn zoom(&self) -> f32
  {
    self.zoom
  }

  fn set_zoom(&mut self, zoom: f32)
  {
    self.zoom = zoom;
  }

  fn bounds(&self) -> FrustumBounds
  {
    self.bounds
  }

  fn set_bounds(&mut self, bounds: FrustumBounds)
  {
    self.bounds = bounds;
  }

  fn update_projection_matrix(&mut self)
  {
    let b = self.bounds;
    let half_w = b.width() / (2.0 * self.zoom);
    let half_h = b.height() / (2.0 * self.zoom);
    let cx = (b.right + b.left) * 0.5;
    let cy = (b.top + b.bottom) * 0.5;

    self.projection = frustum_rh(cx - half_w, cx + half_w, cy - half_h, cy + half_h, self.znear, self.zfar);
  }

  fn look_at(&mut self, target: Vec3)
  {
    if let Some(view) = build_view_matrix(self.position, target, self.up)
    {
      self.view = view;
    }
  }

  fn view_matrix(&self) -> Mat4
  {
    self.view
  }

  fn projection_matrix(&self) -> Mat4
  {
    self.projection
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Matrix builders
// ──────────────────────────────────────────────────────────────
//

fn near_plane_bounds(fovy: f32, aspect: f32, znear: f32) -> FrustumBounds
{
  let top = znear * (fovy * 0.5).tan();
  let right = top * aspect;
  FrustumBounds::new(-right, right, top, -top)
}

/// Off-centre right-handed frustum with a [0, 1] depth range, matching
/// `Mat4::perspective_rh` when the bounds are symmetric.
fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, znear: f32, zfar: f32) -> Mat4
{
  let r = zfar / (znear - zfar);

  Mat4::from_cols(
    Vec4::new(2.0 * znear / (right - left), 0.0, 0.0, 0.0),
    Vec4::new(0.0, 2.0 * znear / (top - bottom), 0.0, 0.0),
    Vec4::new((right + left) / (right - left), (top + bottom) / (top - bottom), r, -1.0),
    Vec4::new(0.0, 0.0, r * znear, 0.0),
  )
}
