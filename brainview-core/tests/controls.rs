use std::cell::{Cell, RefCell};
use std::rc::Rc;

use brainview_core::gesture::angle_between;
use brainview_core::{
  ArcballControls, CameraAdapter, ControlEvent, ControlsConfig, ControlsError, ControlsSnapshot, FrustumBounds,
  GestureState, HeadlessSurface, InputChannel, InputEvent, Listener, LookAt, Modifiers, OrthographicCamera, Screen,
};
use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Controls = ArcballControls<OrthographicCamera, HeadlessSurface>;

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

fn rig(config: ControlsConfig) -> Controls
{
  let camera = OrthographicCamera::new(800.0, 600.0);
  let surface = HeadlessSurface::new(Screen::new(0.0, 0.0, 800.0, 600.0));
  ArcballControls::new(camera, surface, config).expect("valid controls")
}

fn static_config() -> ControlsConfig
{
  ControlsConfig { static_moving: true, ..Default::default() }
}

fn record(controls: &mut Controls) -> Rc<RefCell<Vec<ControlEvent>>>
{
  let log = Rc::new(RefCell::new(Vec::new()));
  let sink = log.clone();
  let listener: Listener = Rc::new(move |event: ControlEvent| sink.borrow_mut().push(event));

  for kind in [ControlEvent::Start, ControlEvent::Change, ControlEvent::End]
  {
    controls.on(kind, &listener);
  }
  log
}

fn down(x: f32, y: f32, button: u16) -> InputEvent
{
  InputEvent::PointerDown { x, y, button, modifiers: Modifiers::default() }
}

fn moved(x: f32, y: f32) -> InputEvent
{
  InputEvent::PointerMove { x, y, modifiers: Modifiers::default() }
}

fn drag(controls: &mut Controls, from: Vec2, to: Vec2, button: u16)
{
  controls.handle_event(&down(from.x, from.y, button));
  controls.handle_event(&moved(to.x, to.y));
  controls.update();
  controls.handle_event(&InputEvent::PointerUp);
}

fn bits(s: &ControlsSnapshot) -> Vec<u32>
{
  let mut out = Vec::new();
  for v in [s.target, s.position, s.up, s.pan_offset]
  {
    out.extend(v.to_array().map(f32::to_bits));
  }
  out.push(s.zoom.to_bits());
  out.extend([s.bounds.left, s.bounds.right, s.bounds.top, s.bounds.bottom].map(f32::to_bits));
  out
}

fn settle(controls: &mut Controls) -> usize
{
  (0..1000).take_while(|_| controls.update()).count()
}

//
// ──────────────────────────────────────────────────────────────
//   Construction
// ──────────────────────────────────────────────────────────────
//

#[test]
fn inverted_zoom_bounds_fail_fast()
{
  let config = ControlsConfig { zoom_min: 5.0, zoom_max: 1.0, ..Default::default() };
  let surface = HeadlessSurface::new(Screen::new(0.0, 0.0, 800.0, 600.0));

  let result = ArcballControls::new(OrthographicCamera::new(800.0, 600.0), surface, config);
  assert!(matches!(result, Err(ControlsError::InvertedZoomBounds { .. })));
}

#[test]
fn camera_on_the_target_is_rejected()
{
  let mut camera = OrthographicCamera::new(800.0, 600.0);
  camera.position = Vec3::ZERO;
  let surface = HeadlessSurface::new(Screen::new(0.0, 0.0, 800.0, 600.0));

  let result = ArcballControls::new(camera, surface, ControlsConfig::default());
  assert!(matches!(result, Err(ControlsError::InvalidCamera { field: "position", .. })));
}

#[test]
fn out_of_range_initial_zoom_is_clamped()
{
  let mut camera = OrthographicCamera::new(800.0, 600.0);
  camera.zoom = 50.0;
  let surface = HeadlessSurface::new(Screen::new(0.0, 0.0, 800.0, 600.0));

  let controls = ArcballControls::new(camera, surface, ControlsConfig::default()).expect("valid controls");
  assert_eq!(controls.camera().zoom, 10.0);
}

//
// ──────────────────────────────────────────────────────────────
//   Listener lifecycle
// ──────────────────────────────────────────────────────────────
//

#[test]
fn drag_listeners_only_live_during_a_drag()
{
  let mut controls = rig(ControlsConfig::default());
  assert_eq!(controls.surface().listener_count(), 8);
  assert!(!controls.surface().is_listening(InputChannel::MouseMove));

  controls.handle_event(&down(400.0, 300.0, 0));
  assert_eq!(controls.surface().listener_count(), 10);
  assert!(controls.surface().is_listening(InputChannel::MouseUp));

  controls.handle_event(&InputEvent::PointerUp);
  assert_eq!(controls.surface().listener_count(), 8);
}

#[test]
fn mouse_move_outside_a_drag_is_ignored()
{
  let mut controls = rig(static_config());
  let before = controls.snapshot();

  assert!(!controls.handle_event(&moved(600.0, 100.0)));
  assert!(!controls.update());
  assert_eq!(controls.state(), GestureState::None);
  assert_eq!(bits(&controls.snapshot()), bits(&before));
}

#[test]
fn dispose_leaves_no_listeners_and_makes_input_inert()
{
  let mut controls = rig(static_config());
  let log = record(&mut controls);
  controls.handle_event(&down(400.0, 300.0, 0));
  log.borrow_mut().clear();

  controls.dispose();
  assert!(controls.is_disposed());
  assert_eq!(controls.surface().listener_count(), 0);

  let before = controls.snapshot();
  let events = [
    down(100.0, 100.0, 0),
    moved(500.0, 500.0),
    InputEvent::PointerUp,
    InputEvent::Wheel { delta_y: 500.0 },
    InputEvent::TouchStart { touches: vec![Vec2::new(10.0, 10.0)] },
    InputEvent::KeyDown { key_code: 65 },
    InputEvent::ContextMenu,
  ];
  for event in &events
  {
    assert!(!controls.handle_event(event));
  }

  assert!(!controls.update());
  controls.dispose();

  assert_eq!(bits(&controls.snapshot()), bits(&before));
  assert!(log.borrow().is_empty());
}

#[test]
fn context_menu_is_suppressed()
{
  let mut controls = rig(ControlsConfig::default());
  assert!(controls.handle_event(&InputEvent::ContextMenu));
}

//
// ──────────────────────────────────────────────────────────────
//   Events
// ──────────────────────────────────────────────────────────────
//

#[test]
fn click_without_motion_emits_start_but_no_end()
{
  let mut controls = rig(static_config());
  let log = record(&mut controls);

  controls.handle_event(&down(400.0, 300.0, 0));
  controls.handle_event(&InputEvent::PointerUp);
  settle(&mut controls);

  assert_eq!(*log.borrow(), vec![ControlEvent::Start]);
}

#[test]
fn one_change_per_tick()
{
  let mut controls = rig(static_config());
  let log = record(&mut controls);

  // rotate and zoom pending in the same tick
  controls.handle_event(&InputEvent::Wheel { delta_y: -100.0 });
  controls.handle_event(&down(400.0, 300.0, 0));
  controls.handle_event(&moved(500.0, 250.0));
  log.borrow_mut().clear();

  assert!(controls.update());
  let changes = log.borrow().iter().filter(|e| **e == ControlEvent::Change).count();
  assert_eq!(changes, 1);
}

#[test]
fn change_listener_can_read_a_shared_camera()
{
  let camera = Rc::new(RefCell::new(OrthographicCamera::new(800.0, 600.0)));
  let surface = HeadlessSurface::new(Screen::new(0.0, 0.0, 800.0, 600.0));
  let mut controls = ArcballControls::new(camera.clone(), surface, static_config()).expect("valid controls");

  let seen = Rc::new(Cell::new(0.0_f32));
  let (sink, view) = (seen.clone(), camera.clone());
  let listener: Listener = Rc::new(move |_: ControlEvent| sink.set(view.borrow().zoom));
  controls.on(ControlEvent::Change, &listener);

  controls.handle_event(&InputEvent::Wheel { delta_y: 100.0 });
  assert!(controls.update());

  assert!(seen.get() > 1.0);
  assert_eq!(seen.get(), camera.borrow().zoom);
}

//
// ──────────────────────────────────────────────────────────────
//   Zoom
// ──────────────────────────────────────────────────────────────
//

#[test]
fn huge_wheel_lands_exactly_on_zoom_max()
{
  // At the default zoom_speed of 0.02 a 1000px notch only gives factor 0.8
  // (zoom 1.25); 0.5 drives the factor below zero, which saturates.
  let config = ControlsConfig { zoom_speed: 0.5, zoom_min: 0.5, zoom_max: 10.0, static_moving: true, ..Default::default() };
  let mut controls = rig(config);

  controls.handle_event(&InputEvent::Wheel { delta_y: 1000.0 });
  controls.update();

  assert_eq!(controls.camera().zoom, 10.0);
}

#[test]
fn zoom_stays_bounded_under_random_input()
{
  for seed in 0..8_u64
  {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = ControlsConfig { static_moving: seed % 2 == 0, zoom_speed: 0.3, ..Default::default() };
    let mut controls = rig(config);

    for _ in 0..400
    {
      let event = random_event(&mut rng);
      controls.handle_event(&event);
      controls.update();

      let zoom = controls.camera().zoom;
      assert!((0.5..=10.0).contains(&zoom), "seed {seed}: zoom {zoom}");

      let position = controls.camera().position;
      assert!(position.is_finite(), "seed {seed}: {position:?}");
      assert!((position.length() - 500.0).abs() < 1.0, "seed {seed}: {position:?}");
    }
  }
}

fn random_event(rng: &mut StdRng) -> InputEvent
{
  let mut point = || Vec2::new(rng.random_range(-100.0..900.0), rng.random_range(-100.0..700.0));
  let (a, b) = (point(), point());

  match rng.random_range(0..8_u32)
  {
    0 => down(a.x, a.y, rng.random_range(0..3)),
    1 | 2 => moved(a.x, a.y),
    3 => InputEvent::PointerUp,
    4 => InputEvent::Wheel { delta_y: rng.random_range(-2000.0..2000.0) },
    5 => InputEvent::TouchStart { touches: vec![a, b] },
    6 => InputEvent::TouchMove { touches: vec![a, b] },
    _ => InputEvent::TouchEnd { touches: vec![] },
  }
}

#[test]
fn damped_zoom_converges_monotonically()
{
  let mut controls = rig(ControlsConfig::default());

  controls.handle_event(&down(400.0, 300.0, 1));
  controls.handle_event(&moved(400.0, 200.0));
  controls.handle_event(&InputEvent::PointerUp);

  let mut last = controls.camera().zoom;
  let mut steps = Vec::new();
  for _ in 0..200
  {
    if !controls.update()
    {
      break;
    }
    let zoom = controls.camera().zoom;
    steps.push((zoom - last).abs());
    last = zoom;
  }

  assert!(steps.len() > 2 && steps.len() < 200, "{} ticks", steps.len());
  for pair in steps.windows(2)
  {
    assert!(pair[1] < pair[0], "{pair:?}");
  }

  let before = controls.snapshot();
  for _ in 0..5
  {
    assert!(!controls.update());
  }
  assert_eq!(bits(&controls.snapshot()), bits(&before));
}

//
// ──────────────────────────────────────────────────────────────
//   Rotate
// ──────────────────────────────────────────────────────────────
//

#[test]
fn rotate_there_and_back_returns_home()
{
  let mut controls = rig(static_config());
  let home = controls.snapshot();
  let (a, b) = (Vec2::new(400.0, 300.0), Vec2::new(500.0, 250.0));

  drag(&mut controls, a, b, 0);
  assert!((controls.camera().position - home.position).length() > 1.0);

  drag(&mut controls, b, a, 0);
  let back = controls.snapshot();

  assert!((back.position - home.position).length() < 1e-2, "{:?}", back.position);
  assert!((back.up - home.up).length() < 1e-4, "{:?}", back.up);
}

#[test]
fn damped_rotation_slows_down_and_stops()
{
  let mut controls = rig(ControlsConfig::default());

  controls.handle_event(&down(400.0, 300.0, 0));
  controls.handle_event(&moved(550.0, 300.0));
  controls.handle_event(&InputEvent::PointerUp);

  let mut last = controls.camera().position;
  let mut deltas = Vec::new();
  let mut ticks = 0;
  while controls.update()
  {
    let position = controls.camera().position;
    deltas.push(angle_between(last, position));
    last = position;

    ticks += 1;
    assert!(ticks < 500, "rotation never settled");
  }

  let large: Vec<f32> = deltas.into_iter().filter(|d| *d > 1e-4).collect();
  assert!(large.len() > 2);
  for pair in large.windows(2)
  {
    assert!(pair[1] < pair[0], "{pair:?}");
  }

  let before = controls.snapshot();
  controls.update();
  assert_eq!(bits(&controls.snapshot()), bits(&before));
}

#[test]
fn stationary_touch_changes_nothing()
{
  let mut controls = rig(ControlsConfig::default());
  let log = record(&mut controls);
  let before = controls.snapshot();

  let finger = vec![Vec2::new(100.0, 100.0)];
  controls.handle_event(&InputEvent::TouchStart { touches: finger.clone() });
  controls.handle_event(&InputEvent::TouchMove { touches: finger.clone() });
  assert!(!controls.update());
  controls.handle_event(&InputEvent::TouchMove { touches: finger });
  assert!(!controls.update());

  assert!(!log.borrow().contains(&ControlEvent::Change));
  assert_eq!(bits(&controls.snapshot()), bits(&before));
}

//
// ──────────────────────────────────────────────────────────────
//   Pan
// ──────────────────────────────────────────────────────────────
//

#[test]
fn pan_shifts_left_and_right_by_the_same_amount()
{
  let mut controls = rig(static_config());
  controls.camera_mut().bounds = FrustumBounds::new(-10.0, 10.0, 7.5, -7.5);
  controls.camera_mut().zoom = 1.0;

  // normalized (0.5, 0.5) → (0.6, 0.5) on an 800x600 screen
  drag(&mut controls, Vec2::new(400.0, 300.0), Vec2::new(480.0, 300.0), 2);

  let bounds = controls.camera().bounds;
  let (dl, dr) = (bounds.left + 10.0, bounds.right - 10.0);
  assert!((dl - dr).abs() < 1e-5, "{dl} vs {dr}");
  assert!((dl + 2.0).abs() < 1e-4, "{dl}");
  assert_eq!(bounds.top, 7.5);
  assert_eq!(bounds.bottom, -7.5);
  assert!(controls.snapshot().pan_offset.length() > 0.0);
}

//
// ──────────────────────────────────────────────────────────────
//   Reset / retarget
// ──────────────────────────────────────────────────────────────
//

#[test]
fn reset_restores_the_baseline_bit_for_bit()
{
  let mut controls = rig(static_config());
  let home = controls.snapshot();

  drag(&mut controls, Vec2::new(400.0, 300.0), Vec2::new(600.0, 100.0), 0);
  drag(&mut controls, Vec2::new(400.0, 300.0), Vec2::new(300.0, 350.0), 2);
  controls.handle_event(&InputEvent::Wheel { delta_y: -300.0 });
  controls.update();
  assert_ne!(bits(&controls.snapshot()), bits(&home));

  controls.reset();

  assert_eq!(bits(&controls.snapshot()), bits(&home));
  assert!(!controls.update());
}

#[test]
fn remembered_look_at_survives_reset()
{
  let mut controls = rig(static_config());
  let log = record(&mut controls);

  controls.look_at(LookAt { x: Some(10.0), z: Some(-5.0), remember: true, ..Default::default() });
  assert_eq!(controls.target(), Vec3::new(10.0, 0.0, -5.0));
  assert_eq!(*log.borrow(), vec![ControlEvent::Change]);
  let remembered = controls.snapshot();

  drag(&mut controls, Vec2::new(400.0, 300.0), Vec2::new(550.0, 200.0), 0);
  controls.look_at(LookAt { y: Some(3.0), ..Default::default() });
  controls.reset();

  assert_eq!(bits(&controls.snapshot()), bits(&remembered));
}

#[test]
fn remember_state_moves_the_baseline()
{
  let mut controls = rig(static_config());
  drag(&mut controls, Vec2::new(400.0, 300.0), Vec2::new(450.0, 300.0), 0);
  controls.remember_state();
  let remembered = controls.snapshot();

  drag(&mut controls, Vec2::new(400.0, 300.0), Vec2::new(400.0, 100.0), 0);
  controls.reset();

  assert_eq!(bits(&controls.snapshot()), bits(&remembered));
}

//
// ──────────────────────────────────────────────────────────────
//   Keyboard
// ──────────────────────────────────────────────────────────────
//

#[test]
fn held_key_forces_a_gesture_until_released()
{
  let mut controls = rig(ControlsConfig::default());

  controls.handle_event(&InputEvent::KeyDown { key_code: 68 });
  assert_eq!(controls.state(), GestureState::Pan);
  assert!(!controls.surface().is_listening(InputChannel::KeyDown));

  // auto-repeat while held is not seen
  assert!(!controls.handle_event(&InputEvent::KeyDown { key_code: 65 }));
  assert_eq!(controls.state(), GestureState::Pan);

  controls.handle_event(&InputEvent::KeyUp { key_code: 68 });
  assert_eq!(controls.state(), GestureState::None);
  assert!(controls.surface().is_listening(InputChannel::KeyDown));
}

#[test]
fn key_during_a_drag_keeps_the_drag()
{
  let mut controls = rig(ControlsConfig::default());

  controls.handle_event(&down(400.0, 300.0, 1));
  controls.handle_event(&InputEvent::KeyDown { key_code: 65 });
  assert_eq!(controls.state(), GestureState::Zoom);

  controls.handle_event(&InputEvent::KeyUp { key_code: 65 });
  assert_eq!(controls.state(), GestureState::Zoom);
}

#[test]
fn disabled_gesture_keys_do_nothing()
{
  let config = ControlsConfig { no_rotate: true, ..Default::default() };
  let mut controls = rig(config);

  controls.handle_event(&InputEvent::KeyDown { key_code: 65 });
  assert_eq!(controls.state(), GestureState::None);
}

//
// ──────────────────────────────────────────────────────────────
//   Resize
// ──────────────────────────────────────────────────────────────
//

#[test]
fn resize_rereads_the_surface()
{
  let mut controls = rig(ControlsConfig::default());
  controls.surface_mut().set_rect(Screen::new(20.0, 10.0, 400.0, 400.0));
  assert_eq!(controls.screen().width, 800.0);

  controls.handle_resize();
  assert_eq!(controls.screen(), Screen::new(20.0, 10.0, 400.0, 400.0));
}

#[test]
fn reset_after_resize_keeps_the_new_aspect()
{
  let camera = OrthographicCamera::new(800.0, 400.0);
  let surface = HeadlessSurface::new(Screen::new(0.0, 0.0, 800.0, 400.0));
  let mut controls = ArcballControls::new(camera, surface, static_config()).expect("valid controls");

  controls.camera_mut().handle_viewport_resize(800.0, 800.0);
  controls.surface_mut().set_rect(Screen::new(0.0, 0.0, 800.0, 800.0));
  controls.handle_resize();
  let resized = controls.camera().bounds;

  drag(&mut controls, Vec2::new(400.0, 400.0), Vec2::new(300.0, 450.0), 2);
  controls.reset();

  let bounds = controls.camera().bounds;
  assert_eq!(bounds, resized);
  assert!((bounds.top - 150.0).abs() < 1e-4, "{bounds:?}");
  assert!((bounds.bottom + 150.0).abs() < 1e-4, "{bounds:?}");
}

#[test]
fn update_reaims_a_camera_moved_from_outside()
{
  let mut controls = rig(static_config());
  controls.look_at(LookAt { x: Some(5.0), ..Default::default() });

  controls.camera_mut().position = Vec3::new(0.0, -500.0, 0.0);
  assert!(!controls.update());

  let camera = controls.camera();
  assert_eq!(camera.view_matrix(), Mat4::look_at_rh(camera.position, Vec3::new(5.0, 0.0, 0.0), camera.up));
}

#[test]
fn top_level_surface_uses_the_viewport()
{
  let camera = OrthographicCamera::new(1024.0, 768.0);
  let surface = HeadlessSurface::top_level(Vec2::new(1024.0, 768.0));
  let controls = ArcballControls::new(camera, surface, ControlsConfig::default()).expect("valid controls");

  assert_eq!(controls.screen(), Screen::new(0.0, 0.0, 1024.0, 768.0));
  assert_eq!(controls.camera().view_proj(), controls.camera().projection_matrix() * controls.camera().view_matrix());
}
