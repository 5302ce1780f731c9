//! Headless arcball camera controls.
//!
//! The controls turn pointer, wheel, touch and keyboard input into
//! rotation, zoom and pan of an orthographic (or any [`CameraAdapter`])
//! camera looking at a target point. Nothing here touches a window or a
//! GPU: hosts feed [`InputEvent`]s in, call [`ArcballControls::update`]
//! once per frame, and redraw when it reports a change.

pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod events;
pub mod gesture;
pub mod input;
pub mod projector;
pub mod screen;

pub use camera::{AnatomicalView, CameraAdapter, CameraUniform, FrustumBounds, OrthographicCamera, PerspectiveCamera};
pub use config::ControlsConfig;
pub use controls::{ArcballControls, ControlsSnapshot, LookAt};
pub use error::ControlsError;
pub use events::{ControlEvent, Listener};
pub use gesture::GestureState;
pub use input::{FixAxis, HeadlessSurface, InputChannel, InputEvent, InputSurface, Modifiers};
pub use screen::Screen;
