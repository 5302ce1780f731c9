use std::collections::HashMap;

use glam::Vec2;
use log::trace;

use super::{InputChannel, InputSurface, ListenerHandle};

/// Registry of every listener the controls hold on their surface.
///
/// One registration per channel. Events on a channel that is not
/// registered are dropped by the controls, which is how a disposed
/// controller goes inert and how mouse-move outside a drag is ignored.
#[derive(Debug, Default)]
pub struct InputTracker
{
  registry: HashMap<InputChannel, ListenerHandle>,
}

impl InputTracker
{
  pub fn new() -> Self
  {
    Self::default()
  }

  /// Element and keyboard listeners that live as long as the controls.
  pub fn attach(&mut self, surface: &mut impl InputSurface)
  {
    for channel in InputChannel::ELEMENT.into_iter().chain(InputChannel::KEYBOARD)
    {
      self.listen(surface, channel);
    }
  }

  pub fn listen(&mut self, surface: &mut impl InputSurface, channel: InputChannel)
  {
    if self.registry.contains_key(&channel)
    {
      return;
    }

    let handle = surface.add_listener(channel);
    trace!("listening on {:?} ({:?})", channel, channel.target());
    self.registry.insert(channel, handle);
  }

  pub fn unlisten(&mut self, surface: &mut impl InputSurface, channel: InputChannel)
  {
    if let Some(handle) = self.registry.remove(&channel)
    {
      surface.remove_listener(handle);
      trace!("stopped listening on {:?}", channel);
    }
  }

  pub fn is_listening(&self, channel: InputChannel) -> bool
  {
    self.registry.contains_key(&channel)
  }

  pub fn begin_drag(&mut self, surface: &mut impl InputSurface)
  {
    for channel in InputChannel::DRAG
    {
      self.listen(surface, channel);
    }
  }

  pub fn end_drag(&mut self, surface: &mut impl InputSurface)
  {
    for channel in InputChannel::DRAG
    {
      self.unlisten(surface, channel);
    }
  }

  /// Removes every registration, whatever its channel.
  pub fn detach_all(&mut self, surface: &mut impl InputSurface)
  {
    for (_, handle) in self.registry.drain()
    {
      surface.remove_listener(handle);
    }
  }

  pub fn registration_count(&self) -> usize
  {
    self.registry.len()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Touch helpers
// ──────────────────────────────────────────────────────────────
//

/// Midpoint of the first two touches.
pub fn touch_centroid(touches: &[Vec2]) -> Option<Vec2>
{
  match touches
  {
    [a, b, ..] => Some((*a + *b) * 0.5),
    _ => None,
  }
}

/// Distance between the first two touches.
pub fn touch_distance(touches: &[Vec2]) -> Option<f32>
{
  match touches
  {
    [a, b, ..] => Some(a.distance(*b)),
    _ => None,
  }
}
