use std::str::FromStr;

use glam::{Mat4, Vec3};

use super::{build_view_matrix, CameraAdapter, FrustumBounds};

//
// ──────────────────────────────────────────────────────────────
//   Orthographic camera (right-handed, Z-up, RAS world)
//
//   The brain sits at the origin and the camera rides on a sphere
//   of radius VIEW_RADIUS around it. Zoom divides the visible
//   extents around their centre.
// ──────────────────────────────────────────────────────────────
//

pub const DEFAULT_HALF_WIDTH: f32 = 150.0;
pub const VIEW_RADIUS: f32 = 500.0;

const DEFAULT_NEAR: f32 = 1.0;
const DEFAULT_FAR: f32 = 10_000.0;

#[derive(Debug, Clone)]
pub struct OrthographicCamera
{
  pub position: Vec3,
  pub up: Vec3,
  pub zoom: f32,
  pub bounds: FrustumBounds,

  pub near: f32,
  pub far: f32,

  /// height / width of the viewport the bounds were fitted to.
  aspect_hw: f32,
  home_position: Vec3,

  view: Mat4,
  projection: Mat4,
}

/// Canonical anatomical viewpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnatomicalView
{
  Right,
  Left,
  Anterior,
  Posterior,
  Superior,
  Inferior,
}

/// Partial position update; unset components keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePosition
{
  pub x: Option<f32>,
  pub y: Option<f32>,
  pub z: Option<f32>,
  pub force_z_up: bool,
  pub remember: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ResetOptions
{
  pub fov: bool,
  pub position: bool,
  pub zoom: bool,
}

impl Default for ResetOptions
{
  fn default() -> Self
  {
    Self { fov: true, position: true, zoom: true }
  }
}

impl OrthographicCamera
{
  pub fn new(width: f32, height: f32) -> Self
  {
    Self::with_clip(width, height, DEFAULT_NEAR, DEFAULT_FAR)
  }

  pub fn with_clip(width: f32, height: f32, near: f32, far: f32) -> Self
  {
    let aspect_hw = aspect_hw(width, height);
    let home_position = Vec3::new(VIEW_RADIUS, 0.0, 0.0);

    let mut camera = Self {
      position: home_position,
      up: Vec3::Z,
      zoom: 1.0,
      bounds: default_bounds(aspect_hw),
      near,
      far,
      aspect_hw,
      home_position,
      view: Mat4::IDENTITY,
      projection: Mat4::IDENTITY,
    };

    camera.look_at(Vec3::ZERO);
    camera.update_projection_matrix();
    camera
  }

  /// Refit top/bottom to a new viewport, keeping the horizontal extent.
  pub fn handle_viewport_resize(&mut self, width: f32, height: f32)
  {
    if !(width > 0.0 && height > 0.0)
    {
      return;
    }

    let ratio_hw = height / width;
    let ratio_wh = self.bounds.width() / self.bounds.height();

    self.bounds.top = ratio_hw * non_zero_or(self.bounds.top * ratio_wh, DEFAULT_HALF_WIDTH);
    self.bounds.bottom = ratio_hw * non_zero_or(self.bounds.bottom * ratio_wh, -DEFAULT_HALF_WIDTH);
    self.aspect_hw = ratio_hw;

    self.update_projection_matrix();
  }

  /// Move along the viewing sphere. The result is always normalised to
  /// `VIEW_RADIUS`; a zero vector falls back to looking from above.
  pub fn set_position_on_sphere(&mut self, request: SpherePosition)
  {
    if let Some(x) = request.x
    {
      self.position.x = x;
    }
    if let Some(y) = request.y
    {
      self.position.y = y;
    }
    if let Some(z) = request.z
    {
      self.position.z = z;
    }

    if self.position.length() < 0.00001
    {
      self.position = Vec3::new(0.0, 0.0, VIEW_RADIUS);
    }
    self.position = self.position.normalize() * VIEW_RADIUS;

    if request.force_z_up
    {
      self.up = z_up_for(self.position);
    }

    if request.remember
    {
      self.home_position = self.position;
    }

    self.look_at(Vec3::ZERO);
    self.update_projection_matrix();
  }

  pub fn set_anatomical_view(&mut self, view: AnatomicalView)
  {
    let (position, up) = match view
    {
      AnatomicalView::Right => (Vec3::new(VIEW_RADIUS, 0.0, 0.0), Vec3::Z),
      AnatomicalView::Left => (Vec3::new(-VIEW_RADIUS, 0.0, 0.0), Vec3::Z),
      AnatomicalView::Anterior => (Vec3::new(0.0, VIEW_RADIUS, 0.0), Vec3::Z),
      AnatomicalView::Posterior => (Vec3::new(0.0, -VIEW_RADIUS, 0.0), Vec3::Z),
      AnatomicalView::Superior => (Vec3::new(0.0, 0.0, VIEW_RADIUS), Vec3::Y),
      AnatomicalView::Inferior => (Vec3::new(0.0, 0.0, -VIEW_RADIUS), Vec3::Y),
    };

    self.position = position;
    self.up = up;
    self.look_at(Vec3::ZERO);
  }

  pub fn reset_view(&mut self, options: ResetOptions)
  {
    if options.fov
    {
      self.bounds = default_bounds(self.aspect_hw);
    }

    if options.position
    {
      self.position = self.home_position;
      self.set_position_on_sphere(SpherePosition::default());
      self.up = z_up_for(self.position);
    }

    if options.zoom
    {
      self.zoom = 1.0;
    }

    self.look_at(Vec3::ZERO);
    self.update_projection_matrix();
  }

  pub fn home_position(&self) -> Vec3
  {
    self.home_position
  }
}

impl CameraAdapter for OrthographicCamera
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

    self.projection =
      Mat4::orthographic_rh(cx - half_w, cx + half_w, cy - half_h, cy + half_h, self.near, self.far);
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

impl FromStr for AnatomicalView
{
  type Err = String;

  /// Accepts any word starting with r, l, a, p, s or i.
  fn from_str(s: &str) -> Result<Self, Self::Err>
  {
    match s.trim().chars().next().map(|c| c.to_ascii_lowercase())
    {
      Some('r') => Ok(Self::Right),
      Some('l') => Ok(Self::Left),
      Some('a') => Ok(Self::Anterior),
      Some('p') => Ok(Self::Posterior),
      Some('s') => Ok(Self::Superior),
      Some('i') => Ok(Self::Inferior),
      _ => Err(format!("unknown anatomical view: {s:?}")),
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

fn aspect_hw(width: f32, height: f32) -> f32
{
  if width > 0.0 && height > 0.0
  {
    height / width
  }
  else
  {
    1.0
  }
}

fn default_bounds(aspect_hw: f32) -> FrustumBounds
{
  FrustumBounds::new(
    -DEFAULT_HALF_WIDTH,
    DEFAULT_HALF_WIDTH,
    aspect_hw * DEFAULT_HALF_WIDTH,
    -aspect_hw * DEFAULT_HALF_WIDTH,
  )
}

/// Z-up unless the camera sits on the Z axis, where Y-up is used instead.
fn z_up_for(position: Vec3) -> Vec3
{
  if position.x != 0.0 || position.y != 0.0
  {
    Vec3::Z
  }
  else
  {
    Vec3::Y
  }
}

fn non_zero_or(value: f32, fallback: f32) -> f32
{
  if value == 0.0 || value.is_nan()
  {
    fallback
  }
  else
  {
    value
  }
}
