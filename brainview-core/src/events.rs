use std::collections::HashMap;
use std::rc::Rc;

/// What the controls tell the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEvent
{
  /// A gesture began altering the camera.
  Start,
  /// Camera parameters changed this tick.
  Change,
  /// A gesture concluded or was interrupted.
  End,
}

pub type Listener = Rc<dyn Fn(ControlEvent)>;

/// Synchronous publish/subscribe keyed by event kind.
///
/// Listeners are compared by `Rc` identity: registering the same handle
/// twice stores it once, and removing an unknown handle does nothing.
#[derive(Default)]
pub struct EventDispatch
{
  listeners: HashMap<ControlEvent, Vec<Listener>>,
}

impl EventDispatch
{
  pub fn new() -> Self
  {
    Self::default()
  }

  pub fn on(&mut self, kind: ControlEvent, listener: &Listener)
  {
    let slot = self.listeners.entry(kind).or_default();
    if !slot.iter().any(|l| Rc::ptr_eq(l, listener))
    {
      slot.push(listener.clone());
    }
  }

  pub fn off(&mut self, kind: ControlEvent, listener: &Listener)
  {
    if let Some(slot) = self.listeners.get_mut(&kind)
    {
      slot.retain(|l| !Rc::ptr_eq(l, listener));
    }
  }

  pub fn has_listener(&self, kind: ControlEvent, listener: &Listener) -> bool
  {
    self.listeners.get(&kind).is_some_and(|slot| slot.iter().any(|l| Rc::ptr_eq(l, listener)))
  }

  pub fn listener_count(&self, kind: ControlEvent) -> usize
  {
    self.listeners.get(&kind).map_or(0, Vec::len)
  }

  pub fn clear(&mut self)
  {
    self.listeners.clear();
  }

  /// Calls every listener for `kind` on the calling thread, in
  /// registration order.
  pub fn dispatch(&self, kind: ControlEvent)
  {
    let Some(slot) = self.listeners.get(&kind)
    else
    {
      return;
    };

    // Snapshot, so a listener holding its own Rc can't be dropped mid-call
    let snapshot: Vec<Listener> = slot.clone();
    for listener in snapshot
    {
      listener(kind);
    }
  }
}

impl std::fmt::Debug for EventDispatch
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
  {
    f.debug_struct("EventDispatch")
      .field("start", &self.listener_count(ControlEvent::Start))
      .field("change", &self.listener_count(ControlEvent::Change))
      .field("end", &self.listener_count(ControlEvent::End))
      .finish()
  }
}
