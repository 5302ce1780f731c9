use glam::Vec2;

use crate::screen::Screen;

mod surface;
mod tracker;

pub use surface::HeadlessSurface;
pub use tracker::{touch_centroid, touch_distance, InputTracker};

//
// ──────────────────────────────────────────────────────────────
//   Platform-neutral input events (page pixels, y down)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers
{
  pub shift: bool,
  pub ctrl: bool,
  pub alt: bool,
}

/// Constraint applied to the trackball projection while rotating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixAxis
{
  #[default]
  Free,
  /// Horizontal motion ignored (shift).
  LockX,
  /// Vertical motion ignored (ctrl).
  LockY,
  /// Only the direction from the centre counts (alt).
  Radial,
}

impl Modifiers
{
  pub fn fix_axis(&self) -> FixAxis
  {
    if self.alt
    {
      FixAxis::Radial
    }
    else if self.ctrl
    {
      FixAxis::LockY
    }
    else if self.shift
    {
      FixAxis::LockX
    }
    else
    {
      FixAxis::Free
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent
{
  PointerDown
  {
    x: f32,
    y: f32,
    button: u16,
    modifiers: Modifiers,
  },
  PointerMove
  {
    x: f32,
    y: f32,
    modifiers: Modifiers,
  },
  PointerUp,
  Wheel
  {
    delta_y: f32,
  },
  /// `touches` always lists every finger still on the surface.
  TouchStart
  {
    touches: Vec<Vec2>,
  },
  TouchMove
  {
    touches: Vec<Vec2>,
  },
  TouchEnd
  {
    touches: Vec<Vec2>,
  },
  KeyDown
  {
    key_code: u32,
  },
  KeyUp
  {
    key_code: u32,
  },
  ContextMenu,
}

impl InputEvent
{
  pub fn channel(&self) -> InputChannel
  {
    match self
    {
      InputEvent::PointerDown { .. } => InputChannel::MouseDown,
      InputEvent::PointerMove { .. } => InputChannel::MouseMove,
      InputEvent::PointerUp => InputChannel::MouseUp,
      InputEvent::Wheel { .. } => InputChannel::Wheel,
      InputEvent::TouchStart { .. } => InputChannel::TouchStart,
      InputEvent::TouchMove { .. } => InputChannel::TouchMove,
      InputEvent::TouchEnd { .. } => InputChannel::TouchEnd,
      InputEvent::KeyDown { .. } => InputChannel::KeyDown,
      InputEvent::KeyUp { .. } => InputChannel::KeyUp,
      InputEvent::ContextMenu => InputChannel::ContextMenu,
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Listener channels and the surface they live on
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputChannel
{
  ContextMenu,
  MouseDown,
  Wheel,
  TouchStart,
  TouchEnd,
  TouchMove,
  MouseMove,
  MouseUp,
  KeyDown,
  KeyUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget
{
  /// The canvas element itself.
  Element,
  /// The whole document, so drags keep tracking outside the canvas.
  Document,
  /// The top-level window (keyboard).
  Window,
}

impl InputChannel
{
  pub const ELEMENT: [InputChannel; 6] = [
    InputChannel::ContextMenu,
    InputChannel::MouseDown,
    InputChannel::Wheel,
    InputChannel::TouchStart,
    InputChannel::TouchEnd,
    InputChannel::TouchMove,
  ];

  pub const DRAG: [InputChannel; 2] = [InputChannel::MouseMove, InputChannel::MouseUp];

  pub const KEYBOARD: [InputChannel; 2] = [InputChannel::KeyDown, InputChannel::KeyUp];

  pub fn target(&self) -> ListenerTarget
  {
    match self
    {
      InputChannel::MouseMove | InputChannel::MouseUp => ListenerTarget::Document,
      InputChannel::KeyDown | InputChannel::KeyUp => ListenerTarget::Window,
      _ => ListenerTarget::Element,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle
{
  pub id: u64,
  pub channel: InputChannel,
}

/// The DOM-like element the controls are bound to.
///
/// Injected at construction so the controls run headless: a browser
/// binding attaches real listeners here, tests use [`HeadlessSurface`].
pub trait InputSurface
{
  /// Bounding box in page pixels, or `None` for the top-level window.
  fn bounding_rect(&self) -> Option<Screen>;

  /// Size of the top-level window.
  fn viewport_size(&self) -> Vec2;

  fn add_listener(&mut self, channel: InputChannel) -> ListenerHandle;

  fn remove_listener(&mut self, handle: ListenerHandle);

  fn screen(&self) -> Screen
  {
    self.bounding_rect().unwrap_or_else(|| Screen::from_viewport(self.viewport_size()))
  }
}
