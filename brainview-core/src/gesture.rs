use glam::{Quat, Vec2, Vec3};
use log::trace;

use crate::camera::CameraAdapter;
use crate::config::ControlsConfig;
use crate::events::ControlEvent;

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

/// Residual below which rotation and zoom count as settled.
pub const EPS: f32 = 0.000001;

/// Squared normalized pan distance below which panning counts as settled.
pub const PAN_EPS_SQ: f32 = 0.00001;

//
// ──────────────────────────────────────────────────────────────
//   Gesture state
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState
{
  #[default]
  None,
  Rotate,
  Zoom,
  Pan,
  TouchRotate,
  TouchZoomPan,
}

impl GestureState
{
  /// Mouse button index → gesture (0 rotate, 1 zoom, 2 pan).
  pub fn from_button(button: u16) -> Self
  {
    match button
    {
      0 => GestureState::Rotate,
      1 => GestureState::Zoom,
      2 => GestureState::Pan,
      _ => GestureState::None,
    }
  }

  pub fn from_touch_count(count: usize) -> Self
  {
    match count
    {
      1 => GestureState::TouchRotate,
      2 => GestureState::TouchZoomPan,
      _ => GestureState::None,
    }
  }
}

/// What one operation did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step
{
  Idle,
  Moved
  {
    first: bool,
  },
  Stopped,
}

impl Step
{
  pub fn moved(&self) -> bool
  {
    matches!(self, Step::Moved { .. })
  }

  fn event(&self) -> Option<ControlEvent>
  {
    match self
    {
      Step::Moved { first: true } => Some(ControlEvent::Start),
      Step::Stopped => Some(ControlEvent::End),
      _ => None,
    }
  }
}

/// Result of one [`GestureMachine::tick`].
#[derive(Debug, Clone, Default)]
pub struct Tick
{
  /// Start/end notifications, in the order the operations produced them.
  pub events: Vec<ControlEvent>,
  pub rotated: bool,
  pub zoomed: bool,
  pub panned: bool,
  /// World-space displacement of the view centre caused by panning.
  pub pan_world: Vec3,
}

impl Tick
{
  pub fn changed(&self) -> bool
  {
    self.rotated || self.zoomed || self.panned
  }

  fn record(&mut self, step: Step) -> bool
  {
    if let Some(event) = step.event()
    {
      self.events.push(event);
    }
    step.moved()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Gesture machine
//
//   Input handlers only write the *_end samples (and seed the
//   *_start ones on gesture begin). `tick` consumes the gap
//   between start and end once per frame, either snapping start
//   to end (static moving) or closing a fraction of the gap.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default)]
pub struct GestureMachine
{
  pub state: GestureState,
  pub previous: GestureState,

  pub rotate_start: Vec3,
  pub rotate_end: Vec3,

  pub zoom_start: Vec2,
  pub zoom_end: Vec2,

  pub touch_zoom_distance_start: f32,
  pub touch_zoom_distance_end: f32,

  pub pan_start: Vec2,
  pub pan_end: Vec2,

  is_rotating: bool,
  is_zooming: bool,
  is_panning: bool,
}

impl GestureMachine
{
  pub fn new() -> Self
  {
    Self::default()
  }

  /// Drops every pending residual so the next tick is a no-op.
  pub fn collapse(&mut self)
  {
    self.state = GestureState::None;
    self.previous = GestureState::None;

    self.rotate_start = self.rotate_end;
    self.zoom_start = self.zoom_end;
    self.touch_zoom_distance_start = self.touch_zoom_distance_end;
    self.pan_start = self.pan_end;

    self.is_rotating = false;
    self.is_zooming = false;
    self.is_panning = false;
  }

  pub fn is_moving(&self) -> bool
  {
    self.is_rotating || self.is_zooming || self.is_panning
  }

  /// Advance one frame against `camera`, which looks at `target`.
  pub fn tick<C: CameraAdapter>(&mut self, camera: &mut C, target: Vec3, config: &ControlsConfig) -> Tick
  {
    let mut tick = Tick::default();

    let mut eye = camera.position() - target;
    let mut up = camera.up();

    if !config.no_rotate
    {
      let step = self.rotate(&mut eye, &mut up, config);
      tick.rotated = tick.record(step);
    }

    if !config.no_zoom
    {
      let step = self.zoom(camera, config);
      tick.zoomed = tick.record(step);
    }

    if !config.no_pan
    {
      let (step, world) = self.pan(camera, eye, up, config);
      tick.panned = tick.record(step);
      tick.pan_world = world;
    }

    if tick.rotated
    {
      camera.set_position(target + eye);
      camera.set_up(up);
      camera.look_at(target);
    }

    if tick.zoomed || tick.panned
    {
      camera.update_projection_matrix();
    }

    tick
  }

  //
  // ── Rotate ─────────────────────────────────────────────────
  //

  fn rotate(&mut self, eye: &mut Vec3, up: &mut Vec3, config: &ControlsConfig) -> Step
  {
    let angle = angle_between(self.rotate_start, self.rotate_end);
    let axis = self.rotate_start.cross(self.rotate_end).try_normalize();

    let axis = match axis
    {
      Some(axis) if angle > EPS => axis,
      _ => return settle(&mut self.is_rotating),
    };

    let angle = angle * config.rotate_speed;
    let q = Quat::from_axis_angle(axis, -angle);

    *eye = q * *eye;
    *up = q * *up;
    self.rotate_end = q * self.rotate_end;

    if config.static_moving
    {
      self.rotate_start = self.rotate_end;
    }
    else
    {
      let damp = Quat::from_axis_angle(axis, angle * (config.dynamic_damping_factor - 1.0));
      self.rotate_start = damp * self.rotate_start;
    }

    trace!("rotate {:.6} rad about {:?}", angle, axis);
    begin(&mut self.is_rotating)
  }

  //
  // ── Zoom ───────────────────────────────────────────────────
  //

  fn zoom<C: CameraAdapter>(&mut self, camera: &mut C, config: &ControlsConfig) -> Step
  {
    if self.state == GestureState::TouchZoomPan
    {
      return self.pinch_zoom(camera, config);
    }

    let factor = 1.0 + (self.zoom_end.y - self.zoom_start.y) * config.zoom_speed;
    if !((factor - 1.0).abs() > EPS)
    {
      return settle(&mut self.is_zooming);
    }

    let current = camera.zoom();

    // A factor at or below zero asks for unbounded magnification
    let wanted = if factor > 0.0 { current / factor } else { config.zoom_max };
    let zoom = config.clamp_zoom(wanted);

    if zoom != wanted || config.static_moving
    {
      self.zoom_start = self.zoom_end;
    }
    else
    {
      self.zoom_start.y += (self.zoom_end.y - self.zoom_start.y) * config.dynamic_damping_factor;
    }

    if zoom == current
    {
      return settle(&mut self.is_zooming);
    }

    camera.set_zoom(zoom);
    trace!("zoom {current} -> {zoom}");
    begin(&mut self.is_zooming)
  }

  fn pinch_zoom<C: CameraAdapter>(&mut self, camera: &mut C, config: &ControlsConfig) -> Step
  {
    let start = self.touch_zoom_distance_start;
    let end = self.touch_zoom_distance_end;
    self.touch_zoom_distance_start = end;

    if !(start > 0.0)
    {
      return settle(&mut self.is_zooming);
    }

    let factor = end / start;
    if !((factor - 1.0).abs() > EPS && factor > 0.0)
    {
      return settle(&mut self.is_zooming);
    }

    let current = camera.zoom();
    let zoom = config.clamp_zoom(current * factor);
    if zoom == current
    {
      return settle(&mut self.is_zooming);
    }

    camera.set_zoom(zoom);
    trace!("pinch zoom {current} -> {zoom}");
    begin(&mut self.is_zooming)
  }

  //
  // ── Pan ────────────────────────────────────────────────────
  //

  fn pan<C: CameraAdapter>(&mut self, camera: &mut C, eye: Vec3, up: Vec3, config: &ControlsConfig) -> (Step, Vec3)
  {
    let change = self.pan_end - self.pan_start;
    if !(change.length_squared() > PAN_EPS_SQ)
    {
      return (settle(&mut self.is_panning), Vec3::ZERO);
    }

    // Normalized screen units → world units of the visible frustum
    let bounds = camera.bounds();
    let zoom = camera.zoom();
    let world = Vec2::new(change.x * bounds.width() / zoom, change.y * bounds.height() / zoom) * config.pan_speed;

    camera.set_bounds(bounds.shifted(-world.x, world.y));

    let direction = eye.cross(up).normalize_or_zero() * world.x + up.normalize_or_zero() * world.y;

    if config.static_moving
    {
      self.pan_start = self.pan_end;
    }
    else
    {
      self.pan_start += (self.pan_end - self.pan_start) * config.dynamic_damping_factor;
    }

    trace!("pan {:?} (world {:?})", world, direction);
    (begin(&mut self.is_panning), direction)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

/// Angle between two vectors; stable for nearly parallel inputs where
/// `acos` of the normalised dot product loses all precision.
pub fn angle_between(a: Vec3, b: Vec3) -> f32
{
  a.cross(b).length().atan2(a.dot(b))
}

fn begin(flag: &mut bool) -> Step
{
  let first = !*flag;
  *flag = true;
  Step::Moved { first }
}

fn settle(flag: &mut bool) -> Step
{
  if *flag
  {
    *flag = false;
    Step::Stopped
  }
  else
  {
    Step::Idle
  }
}
