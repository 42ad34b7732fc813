use std::sync::Arc;

use anyhow::Context;
use carview_core::{Camera, RenderContext};
use log::{info, trace, warn};
use winit::{
  application::ApplicationHandler,
  dpi::LogicalSize,
  event::{DeviceEvent, DeviceId, WindowEvent},
  event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
  window::{CursorGrabMode, Window, WindowId},
};

use crate::config::ViewerConfig;
use crate::hud;
use crate::input::{self, bindings, InputState};
use crate::renderer::Renderer;

pub fn run(config: ViewerConfig) -> anyhow::Result<()>
{
  let event_loop = EventLoop::new().context("creating event loop")?;
  let mut app = ViewerApp::new(config);

  event_loop.run_app(&mut app).context("running event loop")?;

  match app.fatal.take()
  {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

struct ViewerApp
{
  config: ViewerConfig,
  window: Option<Arc<Window>>,
  renderer: Option<Renderer>,
  ctx: RenderContext,
  input: InputState,

  focused: bool,
  cursor_captured: bool,

  /// Set when startup or rendering fails; `run` returns it after the loop exits.
  fatal: Option<anyhow::Error>,
}

impl ViewerApp
{
  fn new(config: ViewerConfig) -> Self
  {
    let cam = &config.camera;
    let camera = Camera::new(cam.position, cam.target, cam.up);
    let ctx = RenderContext::new(camera, cam.speeds);

    Self {
      config,
      window: None,
      renderer: None,
      ctx,
      input: InputState::new(),
      focused: true,
      cursor_captured: false,
      fatal: None,
    }
  }

  fn init_window_and_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()>
  {
    if self.window.is_some()
    {
      return Ok(());
    }

    let win = &self.config.window;
    let attrs = Window::default_attributes()
      .with_title(win.title.clone())
      .with_inner_size(LogicalSize::new(win.width, win.height));
    let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

    let renderer = pollster::block_on(Renderer::new(window.clone(), &self.ctx, &self.config))
      .context("initialising renderer")?;

    info!("viewer ready, press 5 for the flythrough, hold R to free the cursor");

    self.window = Some(window);
    self.renderer = Some(renderer);
    Ok(())
  }

  fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error)
  {
    self.fatal = Some(err);
    event_loop.exit();
  }

  fn handle_window_event(&mut self, elwt: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    let (window, renderer) = match (&self.window, &mut self.renderer)
    {
      (Some(w), Some(r)) if w.id() == window_id => (w, r),
      _ => return,
    };

    let consumed = renderer.gui.on_window_event(window, &event);
    if input::forward_to_scene(&event, consumed, self.input.cursor_released())
    {
      self.input.handle_event(&event);
    }

    match event
    {
      WindowEvent::CloseRequested =>
      {
        elwt.exit();
      }

      WindowEvent::Resized(size) =>
      {
        if size.width == 0 || size.height == 0
        {
          return;
        }

        renderer.resize(size.width, size.height);
        window.request_redraw();
      }

      WindowEvent::Focused(focused) =>
      {
        self.focused = focused;
      }

      _ =>
      {}
    }
  }

  fn frame(&mut self, event_loop: &ActiveEventLoop)
  {
    if self.input.exit_requested
    {
      event_loop.exit();
      return;
    }

    let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer)
    else
    {
      return;
    };

    for action in bindings::frame_actions(&self.input, self.config.camera.sensitivity)
    {
      if !self.ctx.apply(action)
      {
        trace!("ignored {action:?} during flythrough");
      }
    }

    self.ctx.frame();

    let wants_capture = self.focused && !self.input.cursor_released();
    if wants_capture != self.cursor_captured
    {
      set_cursor_captured(window, wants_capture);
      self.cursor_captured = wants_capture;

      // Keyboard focus left on a HUD widget would keep egui consuming key presses.
      if wants_capture
      {
        renderer.gui.release_focus();
      }
    }

    let ctx = &self.ctx;
    let mut hud_actions = Vec::new();
    let gui_output = renderer.gui.run(window, |ui_ctx| hud_actions = hud::draw(ui_ctx, ctx));

    for action in hud_actions
    {
      if !self.ctx.apply(action)
      {
        trace!("ignored HUD {action:?} during flythrough");
      }
    }

    let result = renderer.render(&self.ctx, window, gui_output);
    window.request_redraw();
    self.input.end_frame();

    if let Err(err) = result
    {
      self.fail(event_loop, err);
    }
  }
}

/// Grab and hide the cursor for mouse look, or hand it back.
fn set_cursor_captured(window: &Window, captured: bool)
{
  if captured
  {
    // Locked is not available everywhere (X11, Windows); confine instead.
    let grab = window
      .set_cursor_grab(CursorGrabMode::Locked)
      .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

    if let Err(err) = grab
    {
      warn!("could not grab cursor: {err}");
    }
  }
  else if let Err(err) = window.set_cursor_grab(CursorGrabMode::None)
  {
    warn!("could not release cursor: {err}");
  }

  window.set_cursor_visible(!captured);
}

impl ApplicationHandler for ViewerApp
{
  fn resumed(&mut self, event_loop: &ActiveEventLoop)
  {
    event_loop.set_control_flow(ControlFlow::Poll);

    if let Err(err) = self.init_window_and_renderer(event_loop)
    {
      self.fail(event_loop, err);
    }
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    self.handle_window_event(event_loop, window_id, event);
  }

  fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent)
  {
    if self.focused
    {
      self.input.handle_device_event(&event);
    }
  }

  fn about_to_wait(&mut self, event_loop: &ActiveEventLoop)
  {
    self.frame(event_loop);
  }
}
