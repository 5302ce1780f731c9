use glam::{Vec2, Vec3};

use crate::input::FixAxis;
use crate::screen::Screen;

//
// ──────────────────────────────────────────────────────────────
//   Trackball projection
//
//   The ball is centred on the screen with radius half the short
//   side. Points inside it land on the front hemisphere, points
//   outside land on the silhouette (z = 0), which reads as roll.
// ──────────────────────────────────────────────────────────────
//

/// Projects a page-space point onto the unit trackball, expressed in world
/// space using the camera's `up` and `eye` (position − target) vectors.
///
/// Pure: the same inputs always give the same bits.
pub fn project_on_ball(screen: &Screen, page: Vec2, up: Vec3, eye: Vec3, fix_axis: FixAxis, no_roll: bool) -> Vec3
{
  let radius = screen.ball_radius();
  if !(radius > 0.0)
  {
    return Vec3::ZERO;
  }

  let local = ball_local(screen, radius, page, fix_axis, no_roll);

  with_length(up, local.y) + with_length(up.cross(eye), local.x) + with_length(eye, local.z)
}

/// Page coordinates → normalized [0, 1] screen coordinates.
pub fn mouse_on_screen(screen: &Screen, page: Vec2) -> Vec2
{
  screen.normalize(page)
}

/// Camera-local point on the ball (x right, y up, z towards the viewer).
fn ball_local(screen: &Screen, radius: f32, page: Vec2, fix_axis: FixAxis, no_roll: bool) -> Vec3
{
  let mut x = (page.x - screen.width * 0.5 - screen.left) / radius;
  let mut y = (screen.height * 0.5 + screen.top - page.y) / radius;
  let mut length = (x * x + y * y).sqrt();

  match fix_axis
  {
    FixAxis::Free =>
    {}
    FixAxis::LockX =>
    {
      x = 0.0;
      length = y.abs();
    }
    FixAxis::LockY =>
    {
      y = 0.0;
      length = x.abs();
    }
    FixAxis::Radial =>
    {
      let dir = Vec2::new(x, y).normalize_or_zero();
      x = dir.x;
      y = dir.y;
      length = 1.0;
    }
  }

  if no_roll
  {
    // Hyperbolic sheet outside √½ keeps the surface smooth without roll
    let z = if length < std::f32::consts::FRAC_1_SQRT_2 { (1.0 - length * length).sqrt() } else { 0.5 / length };
    return Vec3::new(x, y, z);
  }

  if length > 1.0
  {
    return Vec3::new(x, y, 0.0).normalize_or_zero();
  }

  Vec3::new(x, y, (1.0 - length * length).sqrt())
}

/// `v` resized to `length`; a zero vector stays zero.
fn with_length(v: Vec3, length: f32) -> Vec3
{
  v.normalize_or_zero() * length
}
