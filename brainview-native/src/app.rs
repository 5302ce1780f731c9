use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use brainview_core::{
  AnatomicalView, ArcballControls, CameraUniform, ControlEvent, ControlsConfig, Listener, LookAt,
  OrthographicCamera,
};
use log::{debug, error, info, trace};
use winit::{
  application::ApplicationHandler,
  event::{ElementState, WindowEvent},
  event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
  keyboard::Key,
  window::{Window, WindowId},
};

use crate::input::{InputTranslator, WinitSurface};

type SharedCamera = Rc<RefCell<OrthographicCamera>>;

pub fn run(config: ControlsConfig) -> anyhow::Result<()>
{
  let event_loop = EventLoop::new().context("creating event loop")?;

  // Damping keeps moving the camera after input stops, so keep ticking
  event_loop.set_control_flow(ControlFlow::Poll);

  let mut app = BrainviewApp::new(config);
  event_loop.run_app(&mut app).context("running event loop")?;

  match app.failure.take()
  {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

struct BrainviewApp
{
  config: ControlsConfig,
  window: Option<Arc<Window>>,
  camera: Option<SharedCamera>,
  controls: Option<ArcballControls<SharedCamera, WinitSurface>>,
  input: InputTranslator,

  /// Set by the change listener, cleared once the frame picked it up.
  dirty: Rc<Cell<bool>>,
  failure: Option<anyhow::Error>,
}

impl BrainviewApp
{
  fn new(config: ControlsConfig) -> Self
  {
    Self {
      config,
      window: None,
      camera: None,
      controls: None,
      input: InputTranslator::new(),
      dirty: Rc::new(Cell::new(true)),
      failure: None,
    }
  }

  fn init_window_and_controls(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()>
  {
    if self.window.is_some()
    {
      return Ok(());
    }

    let attrs = Window::default_attributes().with_title("brainview");
    let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

    let size = window.inner_size();
    let camera = Rc::new(RefCell::new(OrthographicCamera::new(size.width as f32, size.height as f32)));
    let surface = WinitSurface::new(size.width, size.height);

    let mut controls = ArcballControls::new(camera.clone(), surface, self.config.clone()).context("attaching controls")?;

    let dirty = self.dirty.clone();
    let on_change: Listener = Rc::new(move |_: ControlEvent| dirty.set(true));
    controls.on(ControlEvent::Change, &on_change);

    let on_gesture: Listener = Rc::new(|event: ControlEvent| debug!("controls {event:?}"));
    controls.on(ControlEvent::Start, &on_gesture);
    controls.on(ControlEvent::End, &on_gesture);

    info!("window {}x{}, {} input listeners", size.width, size.height, controls.surface().listener_count());

    self.window = Some(window);
    self.camera = Some(camera);
    self.controls = Some(controls);
    Ok(())
  }

  fn handle_window_event(&mut self, elwt: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    match &self.window
    {
      Some(w) if w.id() == window_id =>
      {}
      _ => return,
    }

    if let Some(input) = self.input.translate(&event)
    {
      if let Some(controls) = &mut self.controls
      {
        controls.handle_event(&input);
      }
    }

    match event
    {
      WindowEvent::CloseRequested =>
      {
        if let Some(controls) = &mut self.controls
        {
          controls.dispose();
        }
        elwt.exit();
      }

      WindowEvent::Resized(size) =>
      {
        if size.width == 0 || size.height == 0
        {
          return;
        }

        if let Some(camera) = &self.camera
        {
          camera.borrow_mut().handle_viewport_resize(size.width as f32, size.height as f32);
        }

        if let Some(controls) = &mut self.controls
        {
          controls.surface_mut().resize(size.width, size.height);
          controls.handle_resize();
        }

        self.dirty.set(true);
      }

      WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat =>
      {
        if let Key::Character(text) = &event.logical_key
        {
          self.view_shortcut(text.as_str());
        }
      }

      WindowEvent::RedrawRequested =>
      {
        self.frame();
      }

      _ =>
      {}
    }
  }

  /// 1-6 jump to an anatomical view, 0 resets the controls.
  fn view_shortcut(&mut self, key: &str)
  {
    let (Some(camera), Some(controls)) = (&self.camera, &mut self.controls)
    else
    {
      return;
    };

    let view = match key
    {
      "0" =>
      {
        controls.reset();
        return;
      }
      "1" => AnatomicalView::Right,
      "2" => AnatomicalView::Left,
      "3" => AnatomicalView::Anterior,
      "4" => AnatomicalView::Posterior,
      "5" => AnatomicalView::Superior,
      "6" => AnatomicalView::Inferior,
      _ => return,
    };

    info!("view {view:?}");
    camera.borrow_mut().set_anatomical_view(view);
    controls.look_at(LookAt::default());
  }

  /// Hands the camera to whatever draws the scene.
  fn frame(&mut self)
  {
    let Some(camera) = &self.camera
    else
    {
      return;
    };

    let camera = camera.borrow();
    let uniform = CameraUniform::from_camera(&*camera);
    trace!("camera uniform ({} bytes) {:?}", uniform.as_bytes().len(), uniform.view_proj);
  }

  fn tick(&mut self)
  {
    let (Some(window), Some(controls)) = (&self.window, &mut self.controls)
    else
    {
      return;
    };

    controls.update();

    if !self.dirty.replace(false)
    {
      return;
    }

    let snapshot = controls.snapshot();
    window.set_title(&format!(
      "brainview | zoom {:.2} | eye ({:.0}, {:.0}, {:.0})",
      snapshot.zoom, snapshot.position.x, snapshot.position.y, snapshot.position.z
    ));
    window.request_redraw();
  }
}

impl ApplicationHandler for BrainviewApp
{
  fn resumed(&mut self, event_loop: &ActiveEventLoop)
  {
    if let Err(err) = self.init_window_and_controls(event_loop)
    {
      error!("{err:#}");
      self.failure = Some(err);
      event_loop.exit();
    }
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    self.handle_window_event(event_loop, window_id, event);
  }

  fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop)
  {
    self.tick();
  }
}
