use std::collections::HashMap;

use glam::Vec2;

use super::{InputChannel, InputSurface, ListenerHandle};
use crate::screen::Screen;

/// An input surface with no platform behind it.
///
/// Keeps a ledger of live listener registrations so tests (and hosts that
/// push events by hand) can see exactly what the controls are subscribed to.
#[derive(Debug, Clone)]
pub struct HeadlessSurface
{
  rect: Option<Screen>,
  viewport: Vec2,
  next_id: u64,
  live: HashMap<u64, InputChannel>,
}

impl HeadlessSurface
{
  /// A canvas element occupying `rect` inside a viewport of the same size.
  pub fn new(rect: Screen) -> Self
  {
    Self { rect: Some(rect), viewport: Vec2::new(rect.width, rect.height), next_id: 1, live: HashMap::new() }
  }

  /// The top-level window itself; the screen follows the viewport.
  pub fn top_level(viewport: Vec2) -> Self
  {
    Self { rect: None, viewport, next_id: 1, live: HashMap::new() }
  }

  pub fn set_rect(&mut self, rect: Screen)
  {
    self.rect = Some(rect);
  }

  pub fn set_viewport(&mut self, viewport: Vec2)
  {
    self.viewport = viewport;
  }

  pub fn is_listening(&self, channel: InputChannel) -> bool
  {
    self.live.values().any(|c| *c == channel)
  }

  pub fn listener_count(&self) -> usize
  {
    self.live.len()
  }

  /// Live channels, sorted.
  pub fn live_channels(&self) -> Vec<InputChannel>
  {
    let mut channels: Vec<InputChannel> = self.live.values().copied().collect();
    channels.sort();
    channels
  }
}

impl InputSurface for HeadlessSurface
{
  fn bounding_rect(&self) -> Option<Screen>
  {
    self.rect
  }

  fn viewport_size(&self) -> Vec2
  {
    self.viewport
  }

  fn add_listener(&mut self, channel: InputChannel) -> ListenerHandle
  {
    let id = self.next_id;
    self.next_id += 1;
    self.live.insert(id, channel);
    ListenerHandle { id, channel }
  }

  fn remove_listener(&mut self, handle: ListenerHandle)
  {
    self.live.remove(&handle.id);
  }
}
