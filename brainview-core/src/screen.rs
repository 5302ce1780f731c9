use glam::Vec2;

//
// ──────────────────────────────────────────────────────────────
//   Screen rectangle (page pixels, y down)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Screen
{
  pub left: f32,
  pub top: f32,
  pub width: f32,
  pub height: f32,
}

impl Screen
{
  pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self
  {
    Self { left, top, width, height }
  }

  /// Screen covering the whole viewport, used when the surface is the
  /// top-level window and has no bounding box of its own.
  pub fn from_viewport(size: Vec2) -> Self
  {
    Self::new(0.0, 0.0, size.x, size.y)
  }

  pub fn is_degenerate(&self) -> bool
  {
    !(self.width > 0.0 && self.height > 0.0)
  }

  /// Radius of the virtual trackball, in pixels.
  pub fn ball_radius(&self) -> f32
  {
    0.5 * self.width.min(self.height)
  }

  pub fn center(&self) -> Vec2
  {
    Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
  }

  /// Page coordinates → [0, 1] inside the rectangle.
  pub fn normalize(&self, page: Vec2) -> Vec2
  {
    if self.is_degenerate()
    {
      return Vec2::ZERO;
    }

    Vec2::new((page.x - self.left) / self.width, (page.y - self.top) / self.height)
  }
}
