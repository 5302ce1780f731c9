use glam::{Vec2, Vec3};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::camera::{CameraAdapter, FrustumBounds};
use crate::config::ControlsConfig;
use crate::error::ControlsError;
use crate::events::{ControlEvent, EventDispatch, Listener};
use crate::gesture::{GestureMachine, GestureState};
use crate::input::{touch_centroid, touch_distance, FixAxis, InputChannel, InputEvent, InputSurface, InputTracker, Modifiers};
use crate::projector::{mouse_on_screen, project_on_ball};
use crate::screen::Screen;

/// Wheel delta (pixels) → normalized zoom sample offset.
const WHEEL_SCALE: f32 = 0.01;

//
// ──────────────────────────────────────────────────────────────
//   Public value types
// ──────────────────────────────────────────────────────────────
//

/// Partial retarget request; unset components keep their value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookAt
{
  pub x: Option<f32>,
  pub y: Option<f32>,
  pub z: Option<f32>,
  /// Also make the new target the reset baseline.
  pub remember: bool,
}

/// Serializable view of the camera as the controls see it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlsSnapshot
{
  pub target: Vec3,
  pub position: Vec3,
  pub up: Vec3,
  pub zoom: f32,
  pub bounds: FrustumBounds,
  /// Accumulated world-space displacement of the view centre from panning.
  pub pan_offset: Vec3,
}

/// Camera state `reset()` returns to.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline
{
  target: Vec3,
  position: Vec3,
  up: Vec3,
  zoom: f32,
  bounds: FrustumBounds,
}

impl Baseline
{
  fn capture(camera: &impl CameraAdapter, target: Vec3) -> Self
  {
    Self { target, position: camera.position(), up: camera.up(), zoom: camera.zoom(), bounds: camera.bounds() }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   ArcballControls
// ──────────────────────────────────────────────────────────────
//

/// Arcball camera controls bound to one camera and one input surface.
///
/// Input handlers only record samples; the camera moves in [`update`],
/// which the host calls once per rendered frame. Listeners registered with
/// [`on`] hear `start`, `change` and `end` synchronously.
///
/// [`update`]: ArcballControls::update
/// [`on`]: ArcballControls::on
pub struct ArcballControls<C: CameraAdapter, S: InputSurface>
{
  camera: C,
  surface: S,
  config: ControlsConfig,

  target: Vec3,
  screen: Screen,
  baseline: Baseline,
  pan_offset: Vec3,

  gesture: GestureMachine,
  tracker: InputTracker,
  dispatch: EventDispatch,

  enabled: bool,
  disposed: bool,
  drag_moved: bool,
}

impl<C: CameraAdapter, S: InputSurface> ArcballControls<C, S>
{
  /// Validates configuration and camera up front; nothing is registered on
  /// the surface if either is rejected.
  pub fn new(mut camera: C, mut surface: S, config: ControlsConfig) -> Result<Self, ControlsError>
  {
    config.validate()?;
    camera.validate()?;

    let target = Vec3::ZERO;
    if camera.position() == target
    {
      return Err(ControlsError::InvalidCamera { field: "position", reason: "coincides with the look-at target" });
    }

    let zoom = camera.zoom();
    let clamped = config.clamp_zoom(zoom);
    if clamped != zoom
    {
      warn!("camera zoom {zoom} outside [{}, {}], clamped to {clamped}", config.zoom_min, config.zoom_max);
      camera.set_zoom(clamped);
    }

    camera.look_at(target);
    camera.update_projection_matrix();

    let mut tracker = InputTracker::new();
    tracker.attach(&mut surface);

    let screen = surface.screen();
    let baseline = Baseline::capture(&camera, target);

    debug!("arcball controls attached, screen {:?}", screen);

    Ok(Self {
      camera,
      surface,
      config,
      target,
      screen,
      baseline,
      pan_offset: Vec3::ZERO,
      gesture: GestureMachine::new(),
      tracker,
      dispatch: EventDispatch::new(),
      enabled: true,
      disposed: false,
      drag_moved: false,
    })
  }

  //
  // ── Accessors ──────────────────────────────────────────────
  //

  pub fn camera(&self) -> &C
  {
    &self.camera
  }

  pub fn camera_mut(&mut self) -> &mut C
  {
    &mut self.camera
  }

  pub fn surface(&self) -> &S
  {
    &self.surface
  }

  /// Call [`handle_resize`](Self::handle_resize) after changing the
  /// surface geometry.
  pub fn surface_mut(&mut self) -> &mut S
  {
    &mut self.surface
  }

  pub fn config(&self) -> &ControlsConfig
  {
    &self.config
  }

  pub fn target(&self) -> Vec3
  {
    self.target
  }

  pub fn state(&self) -> GestureState
  {
    self.gesture.state
  }

  pub fn screen(&self) -> Screen
  {
    self.screen
  }

  pub fn is_enabled(&self) -> bool
  {
    self.enabled
  }

  pub fn set_enabled(&mut self, enabled: bool)
  {
    self.enabled = enabled;
  }

  pub fn is_disposed(&self) -> bool
  {
    self.disposed
  }

  pub fn snapshot(&self) -> ControlsSnapshot
  {
    ControlsSnapshot {
      target: self.target,
      position: self.camera.position(),
      up: self.camera.up(),
      zoom: self.camera.zoom(),
      bounds: self.camera.bounds(),
      pan_offset: self.pan_offset,
    }
  }

  //
  // ── Events ─────────────────────────────────────────────────
  //

  pub fn on(&mut self, kind: ControlEvent, listener: &Listener)
  {
    self.dispatch.on(kind, listener);
  }

  pub fn off(&mut self, kind: ControlEvent, listener: &Listener)
  {
    self.dispatch.off(kind, listener);
  }

  //
  // ── Frame / camera operations ──────────────────────────────
  //

  /// Advance one frame. Returns `true` when the camera changed, in which
  /// case exactly one `change` event was emitted.
  pub fn update(&mut self) -> bool
  {
    if self.disposed
    {
      return false;
    }

    // Presets and host edits move the camera behind our back
    self.camera.look_at(self.target);

    let tick = self.gesture.tick(&mut self.camera, self.target, &self.config);

    for event in &tick.events
    {
      self.dispatch.dispatch(*event);
    }

    if !tick.changed()
    {
      return false;
    }

    self.pan_offset += tick.pan_world;
    if self.gesture.state != GestureState::None
    {
      self.drag_moved = true;
    }

    self.dispatch.dispatch(ControlEvent::Change);
    true
  }

  /// Back to the baseline captured at construction or by the last
  /// `remember_state` / `look_at(remember)`.
  pub fn reset(&mut self)
  {
    self.gesture.collapse();

    let baseline = self.baseline;
    self.target = baseline.target;
    self.camera.set_position(baseline.position);
    self.camera.set_up(baseline.up);
    self.camera.set_zoom(baseline.zoom);
    self.camera.set_bounds(baseline.bounds);
    self.pan_offset = Vec3::ZERO;

    self.camera.look_at(self.target);
    self.camera.update_projection_matrix();

    debug!("controls reset");
    self.dispatch.dispatch(ControlEvent::Change);
  }

  pub fn look_at(&mut self, request: LookAt)
  {
    if let Some(x) = request.x
    {
      self.target.x = x;
    }
    if let Some(y) = request.y
    {
      self.target.y = y;
    }
    if let Some(z) = request.z
    {
      self.target.z = z;
    }

    if request.remember
    {
      self.baseline.target = self.target;
    }

    self.camera.look_at(self.target);
    self.dispatch.dispatch(ControlEvent::Change);
  }

  /// Make the current camera state the reset baseline.
  pub fn remember_state(&mut self)
  {
    self.baseline = Baseline::capture(&self.camera, self.target);
  }

  /// Re-reads the screen and takes the camera's current frustum bounds as
  /// the reset bounds, so a reset keeps the new aspect.
  pub fn handle_resize(&mut self)
  {
    self.screen = self.surface.screen();
    self.baseline.bounds = self.camera.bounds();
  }

  /// Removes every listener registration. Input is inert afterwards and
  /// pending damping is dropped. Safe to call twice.
  pub fn dispose(&mut self)
  {
    if self.disposed
    {
      return;
    }

    self.tracker.detach_all(&mut self.surface);
    self.gesture.collapse();
    self.disposed = true;

    info!("arcball controls disposed");
  }

  //
  // ── Input ──────────────────────────────────────────────────
  //

  /// Feed one platform event. Returns `true` when the platform's default
  /// action should be prevented.
  pub fn handle_event(&mut self, event: &InputEvent) -> bool
  {
    if self.disposed || !self.enabled || !self.tracker.is_listening(event.channel())
    {
      return false;
    }

    match event
    {
      InputEvent::PointerDown { x, y, button, modifiers } => self.on_pointer_down(Vec2::new(*x, *y), *button, *modifiers),
      InputEvent::PointerMove { x, y, modifiers } => self.on_pointer_move(Vec2::new(*x, *y), *modifiers),
      InputEvent::PointerUp => self.on_pointer_up(),
      InputEvent::Wheel { delta_y } => self.on_wheel(*delta_y),
      InputEvent::TouchStart { touches } => self.on_touch_start(touches),
      InputEvent::TouchMove { touches } => self.on_touch_move(touches),
      InputEvent::TouchEnd { touches } => self.on_touch_end(touches),
      InputEvent::KeyDown { key_code } => self.on_key_down(*key_code),
      InputEvent::KeyUp { .. } => self.on_key_up(),
      InputEvent::ContextMenu => true,
    }
  }

  fn on_pointer_down(&mut self, page: Vec2, button: u16, modifiers: Modifiers) -> bool
  {
    if self.gesture.state == GestureState::None
    {
      self.gesture.state = GestureState::from_button(button);
    }

    match self.gesture.state
    {
      GestureState::Rotate if !self.config.no_rotate =>
      {
        let p = self.ball_point(page, modifiers.fix_axis());
        self.gesture.rotate_start = p;
        self.gesture.rotate_end = p;
      }
      GestureState::Zoom if !self.config.no_zoom =>
      {
        let p = mouse_on_screen(&self.screen, page);
        self.gesture.zoom_start = p;
        self.gesture.zoom_end = p;
      }
      GestureState::Pan if !self.config.no_pan =>
      {
        let p = mouse_on_screen(&self.screen, page);
        self.gesture.pan_start = p;
        self.gesture.pan_end = p;
      }
      _ =>
      {}
    }

    debug!("pointer down: button {button} -> {:?}", self.gesture.state);

    self.drag_moved = false;
    self.tracker.begin_drag(&mut self.surface);
    self.dispatch.dispatch(ControlEvent::Start);
    true
  }

  fn on_pointer_move(&mut self, page: Vec2, modifiers: Modifiers) -> bool
  {
    match self.gesture.state
    {
      GestureState::Rotate if !self.config.no_rotate =>
      {
        self.gesture.rotate_end = self.ball_point(page, modifiers.fix_axis());
      }
      GestureState::Zoom if !self.config.no_zoom =>
      {
        self.gesture.zoom_end = mouse_on_screen(&self.screen, page);
      }
      GestureState::Pan if !self.config.no_pan =>
      {
        self.gesture.pan_end = mouse_on_screen(&self.screen, page);
      }
      _ =>
      {}
    }

    true
  }

  fn on_pointer_up(&mut self) -> bool
  {
    self.gesture.state = GestureState::None;
    self.tracker.end_drag(&mut self.surface);

    if self.drag_moved
    {
      self.drag_moved = false;
      self.dispatch.dispatch(ControlEvent::End);
    }

    true
  }

  /// One wheel notch is a complete zoom gesture.
  fn on_wheel(&mut self, delta_y: f32) -> bool
  {
    if !self.config.no_zoom
    {
      self.gesture.zoom_start.y += delta_y * WHEEL_SCALE;
    }

    self.dispatch.dispatch(ControlEvent::Start);
    self.dispatch.dispatch(ControlEvent::End);
    true
  }

  fn on_touch_start(&mut self, touches: &[Vec2]) -> bool
  {
    self.gesture.state = GestureState::from_touch_count(touches.len());

    match self.gesture.state
    {
      GestureState::TouchRotate =>
      {
        let p = self.ball_point(touches[0], FixAxis::Free);
        self.gesture.rotate_start = p;
        self.gesture.rotate_end = p;
      }
      GestureState::TouchZoomPan =>
      {
        let distance = touch_distance(touches).unwrap_or(0.0);
        self.gesture.touch_zoom_distance_start = distance;
        self.gesture.touch_zoom_distance_end = distance;

        let centre = self.touch_centre(touches);
        self.gesture.pan_start = centre;
        self.gesture.pan_end = centre;
      }
      _ =>
      {}
    }

    self.drag_moved = false;
    self.dispatch.dispatch(ControlEvent::Start);
    false
  }

  fn on_touch_move(&mut self, touches: &[Vec2]) -> bool
  {
    match touches.len()
    {
      1 =>
      {
        self.gesture.rotate_end = self.ball_point(touches[0], FixAxis::Free);
      }
      2 =>
      {
        self.gesture.touch_zoom_distance_end = touch_distance(touches).unwrap_or(0.0);
        self.gesture.pan_end = self.touch_centre(touches);
      }
      _ =>
      {
        self.gesture.state = GestureState::None;
      }
    }

    true
  }

  /// `touches` are the fingers still down after the one that lifted.
  fn on_touch_end(&mut self, touches: &[Vec2]) -> bool
  {
    match touches.len()
    {
      1 =>
      {
        let p = self.ball_point(touches[0], FixAxis::Free);
        self.gesture.rotate_end = p;
        self.gesture.rotate_start = p;
      }
      2 =>
      {
        self.gesture.touch_zoom_distance_start = 0.0;
        self.gesture.touch_zoom_distance_end = 0.0;

        let centre = self.touch_centre(touches);
        self.gesture.pan_end = centre;
        self.gesture.pan_start = centre;
      }
      _ =>
      {}
    }

    self.gesture.state = GestureState::None;
    self.drag_moved = false;
    self.dispatch.dispatch(ControlEvent::End);
    false
  }

  /// Held keys force a gesture until released. KeyDown stays unregistered
  /// while the key is held so auto-repeat can't clobber `previous`.
  fn on_key_down(&mut self, key_code: u32) -> bool
  {
    self.tracker.unlisten(&mut self.surface, InputChannel::KeyDown);
    self.gesture.previous = self.gesture.state;

    if self.gesture.state != GestureState::None
    {
      return false;
    }

    let [rotate_key, zoom_key, pan_key] = self.config.keys;
    if key_code == rotate_key && !self.config.no_rotate
    {
      self.gesture.state = GestureState::Rotate;
    }
    else if key_code == zoom_key && !self.config.no_zoom
    {
      self.gesture.state = GestureState::Zoom;
    }
    else if key_code == pan_key && !self.config.no_pan
    {
      self.gesture.state = GestureState::Pan;
    }

    false
  }

  fn on_key_up(&mut self) -> bool
  {
    self.gesture.state = self.gesture.previous;
    self.tracker.listen(&mut self.surface, InputChannel::KeyDown);
    false
  }

  //
  // ── Helpers ────────────────────────────────────────────────
  //

  fn ball_point(&self, page: Vec2, fix_axis: FixAxis) -> Vec3
  {
    let eye = self.camera.position() - self.target;
    project_on_ball(&self.screen, page, self.camera.up(), eye, fix_axis, self.config.no_roll)
  }

  fn touch_centre(&self, touches: &[Vec2]) -> Vec2
  {
    let centre = touch_centroid(touches).unwrap_or(Vec2::ZERO);
    mouse_on_screen(&self.screen, centre)
  }
}

impl<C: CameraAdapter, S: InputSurface> Drop for ArcballControls<C, S>
{
  fn drop(&mut self)
  {
    self.dispose();
  }
}
