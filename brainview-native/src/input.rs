use std::collections::BTreeMap;

use brainview_core::input::ListenerHandle;
use brainview_core::{HeadlessSurface, InputChannel, InputEvent, InputSurface, Modifiers, Screen};
use glam::Vec2;
use log::trace;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::keyboard::Key;

/// Pixels per scroll line, so line-based wheels zoom like pixel-based ones.
const LINE_PIXELS: f32 = 40.0;

//
// ──────────────────────────────────────────────────────────────
//   Window events → controls input
// ──────────────────────────────────────────────────────────────
//

/// Tracks what winit reports incrementally (cursor, modifiers, fingers)
/// so every translated event carries the full picture.
pub struct InputTranslator
{
  cursor: Vec2,
  modifiers: Modifiers,
  touches: BTreeMap<u64, Vec2>,
}

impl InputTranslator
{
  pub fn new() -> Self
  {
    Self { cursor: Vec2::ZERO, modifiers: Modifiers::default(), touches: BTreeMap::new() }
  }

  pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent>
  {
    match event
    {
      WindowEvent::CursorMoved { position, .. } =>
      {
        self.cursor = Vec2::new(position.x as f32, position.y as f32);
        Some(InputEvent::PointerMove { x: self.cursor.x, y: self.cursor.y, modifiers: self.modifiers })
      }

      WindowEvent::MouseInput { state: ElementState::Pressed, button, .. } => Some(InputEvent::PointerDown {
        x: self.cursor.x,
        y: self.cursor.y,
        button: button_index(*button),
        modifiers: self.modifiers,
      }),

      WindowEvent::MouseInput { state: ElementState::Released, .. } => Some(InputEvent::PointerUp),

      // winit scrolls positive away from the user; the wheel convention is the opposite
      WindowEvent::MouseWheel { delta, .. } =>
      {
        let delta_y = match delta
        {
          MouseScrollDelta::LineDelta(_, y) => -y * LINE_PIXELS,
          MouseScrollDelta::PixelDelta(p) => -p.y as f32,
        };
        Some(InputEvent::Wheel { delta_y })
      }

      WindowEvent::ModifiersChanged(modifiers) =>
      {
        let state = modifiers.state();
        self.modifiers = Modifiers { shift: state.shift_key(), ctrl: state.control_key(), alt: state.alt_key() };
        None
      }

      WindowEvent::KeyboardInput { event, .. } =>
      {
        let key_code = key_code(event)?;
        match event.state
        {
          ElementState::Pressed => Some(InputEvent::KeyDown { key_code }),
          ElementState::Released => Some(InputEvent::KeyUp { key_code }),
        }
      }

      WindowEvent::Touch(touch) => self.touch(touch),

      _ => None,
    }
  }

  fn touch(&mut self, touch: &Touch) -> Option<InputEvent>
  {
    let point = Vec2::new(touch.location.x as f32, touch.location.y as f32);

    match touch.phase
    {
      TouchPhase::Started =>
      {
        self.touches.insert(touch.id, point);
        Some(InputEvent::TouchStart { touches: self.fingers() })
      }
      TouchPhase::Moved =>
      {
        self.touches.insert(touch.id, point);
        Some(InputEvent::TouchMove { touches: self.fingers() })
      }
      TouchPhase::Ended | TouchPhase::Cancelled =>
      {
        self.touches.remove(&touch.id);
        Some(InputEvent::TouchEnd { touches: self.fingers() })
      }
    }
  }

  fn fingers(&self) -> Vec<Vec2>
  {
    self.touches.values().copied().collect()
  }
}

/// Button index as the controls number them (0 left, 1 middle, 2 right).
fn button_index(button: MouseButton) -> u16
{
  match button
  {
    MouseButton::Left => 0,
    MouseButton::Middle => 1,
    MouseButton::Right => 2,
    MouseButton::Back => 3,
    MouseButton::Forward => 4,
    MouseButton::Other(n) => n,
  }
}

/// Letters and digits map to their upper-case ASCII code; other keys are
/// not forwarded.
fn key_code(event: &KeyEvent) -> Option<u32>
{
  let Key::Character(text) = &event.logical_key
  else
  {
    return None;
  };

  let c = text.chars().next()?;
  c.is_ascii_alphanumeric().then(|| c.to_ascii_uppercase() as u32)
}

//
// ──────────────────────────────────────────────────────────────
//   Input surface backed by the window
// ──────────────────────────────────────────────────────────────
//

/// The whole window is the canvas, so the screen follows its inner size.
/// winit delivers every event regardless, the registrations only decide
/// which ones the controls act on.
pub struct WinitSurface
{
  ledger: HeadlessSurface,
}

impl WinitSurface
{
  pub fn new(width: u32, height: u32) -> Self
  {
    Self { ledger: HeadlessSurface::top_level(Vec2::new(width as f32, height as f32)) }
  }

  pub fn resize(&mut self, width: u32, height: u32)
  {
    self.ledger.set_viewport(Vec2::new(width as f32, height as f32));
  }

  pub fn listener_count(&self) -> usize
  {
    self.ledger.listener_count()
  }
}

impl InputSurface for WinitSurface
{
  fn bounding_rect(&self) -> Option<Screen>
  {
    None
  }

  fn viewport_size(&self) -> Vec2
  {
    self.ledger.viewport_size()
  }

  fn add_listener(&mut self, channel: InputChannel) -> ListenerHandle
  {
    let handle = self.ledger.add_listener(channel);
    trace!("window listener {} on {channel:?}", handle.id);
    handle
  }

  fn remove_listener(&mut self, handle: ListenerHandle)
  {
    self.ledger.remove_listener(handle);
  }
}
