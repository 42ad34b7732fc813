pub mod bindings;

use std::collections::HashSet;

use winit::event::{DeviceEvent, ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub struct InputState
{
  held: HashSet<KeyCode>,

  pub mouse_dx: f32,
  pub mouse_dy: f32,

  pub exit_requested: bool,
}

impl InputState
{
  pub fn new() -> Self
  {
    Self { held: HashSet::new(), mouse_dx: 0.0, mouse_dy: 0.0, exit_requested: false }
  }

  pub fn handle_event(&mut self, event: &WindowEvent)
  {
    match event
    {
      WindowEvent::KeyboardInput { event, .. } =>
      {
        if let PhysicalKey::Code(code) = event.physical_key
        {
          self.set_key(code, event.state == ElementState::Pressed);
        }
      }

      // Releases are lost while unfocused; drop everything rather than keep flying.
      WindowEvent::Focused(false) => self.held.clear(),

      _ =>
      {}
    }
  }

  /// Raw mouse motion. Arrives even while the cursor is grabbed and hidden.
  pub fn handle_device_event(&mut self, event: &DeviceEvent)
  {
    if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event
    {
      self.mouse_dx += *dx as f32;
      self.mouse_dy += *dy as f32;
    }
  }

  pub fn set_key(&mut self, code: KeyCode, pressed: bool)
  {
    if pressed
    {
      if code == KeyCode::Escape
      {
        self.exit_requested = true;
      }
      self.held.insert(code);
    }
    else
    {
      self.held.remove(&code);
    }
  }

  pub fn is_held(&self, code: KeyCode) -> bool
  {
    self.held.contains(&code)
  }

  /// While R is held the cursor is free and mouse look is paused.
  pub fn cursor_released(&self) -> bool
  {
    self.is_held(KeyCode::KeyR)
  }

  pub fn end_frame(&mut self)
  {
    self.mouse_dx = 0.0;
    self.mouse_dy = 0.0;
  }
}

/// Whether a window event egui has already seen should also reach `InputState`.
///
/// Releases and focus changes always get through, otherwise a key released
/// while egui holds keyboard focus stays held forever. egui only keeps key
/// presses for itself while the cursor is free (R held), the only time the
/// HUD can be used.
pub fn forward_to_scene(event: &WindowEvent, consumed: bool, cursor_released: bool) -> bool
{
  let key_state = match event
  {
    WindowEvent::KeyboardInput { event, .. } => Some(event.state),
    _ => None,
  };

  scene_gets_key(key_state, consumed, cursor_released)
}

fn scene_gets_key(key_state: Option<ElementState>, consumed: bool, cursor_released: bool) -> bool
{
  match key_state
  {
    Some(ElementState::Pressed) => !(consumed && cursor_released),
    Some(ElementState::Released) | None => true,
  }
}
