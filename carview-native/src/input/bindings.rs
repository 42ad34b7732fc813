use carview_core::{Action, Direction, RenderMode, SkyboxVariant, ZoomDirection};
use winit::keyboard::KeyCode;

use crate::input::InputState;

//
// ──────────────────────────────────────────────────────────────
//   Key bindings
//
//   Keys are polled once per frame: a held key repeats its
//   action every frame, the way the viewer has always behaved.
// ──────────────────────────────────────────────────────────────
//

const SPIN_STEP: f32 = 1.0; // degrees per frame

#[rustfmt::skip]
const HELD_KEYS: &[(KeyCode, Action)] = &[
  (KeyCode::KeyW,      Action::Move(Direction::Forward)),
  (KeyCode::KeyS,      Action::Move(Direction::Backward)),
  (KeyCode::KeyA,      Action::Move(Direction::Left)),
  (KeyCode::KeyD,      Action::Move(Direction::Right)),
  (KeyCode::KeyQ,      Action::SpinModel(-SPIN_STEP)),
  (KeyCode::KeyE,      Action::SpinModel(SPIN_STEP)),
  (KeyCode::ArrowUp,   Action::Zoom(ZoomDirection::In)),
  (KeyCode::ArrowDown, Action::Zoom(ZoomDirection::Out)),
  (KeyCode::Digit1,    Action::SetRenderMode(RenderMode::Wireframe)),
  (KeyCode::Digit2,    Action::SetRenderMode(RenderMode::Points)),
  (KeyCode::Digit3,    Action::SetSkybox(SkyboxVariant::Night)),
  (KeyCode::Digit4,    Action::SetSkybox(SkyboxVariant::Day)),
  (KeyCode::Digit5,    Action::StartFlythrough),
  (KeyCode::Digit6,    Action::SetFog(false)),
  (KeyCode::Digit7,    Action::SetFog(true)),
  (KeyCode::Digit8,    Action::SetShadows(false)),
  (KeyCode::Digit9,    Action::SetPointLight(false)),
  (KeyCode::Digit0,    Action::SetRenderMode(RenderMode::Fill)),
  (KeyCode::Digit0,    Action::SetPointLight(true)),
  (KeyCode::KeyC,      Action::CancelFlythrough),
];

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

/// Everything the held keys and this frame's mouse motion ask for, in table order.
/// `sensitivity` is degrees per pixel of mouse motion.
pub fn frame_actions(input: &InputState, sensitivity: f32) -> Vec<Action>
{
  let mut actions: Vec<Action> = HELD_KEYS
    .iter()
    .filter(|(key, _)| input.is_held(*key))
    .map(|(_, action)| *action)
    .collect();

  if let Some(look) = mouse_look(input, sensitivity)
  {
    actions.push(look);
  }

  actions
}

fn mouse_look(input: &InputState, sensitivity: f32) -> Option<Action>
{
  if input.cursor_released()
  {
    return None;
  }

  if input.mouse_dx == 0.0 && input.mouse_dy == 0.0
  {
    return None;
  }

  // Screen y grows downwards; moving the mouse up looks up.
  let pitch = -input.mouse_dy * sensitivity;
  let yaw = input.mouse_dx * sensitivity;

  Some(Action::Look { pitch, yaw })
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn nothing_held_means_no_actions()
  {
    let input = InputState::new();
    assert!(frame_actions(&input, 0.1).is_empty());
  }

  #[test]
  fn held_keys_repeat_until_released()
  {
    let mut input = InputState::new();
    input.set_key(KeyCode::KeyW, true);

    assert_eq!(frame_actions(&input, 0.1), vec![Action::Move(Direction::Forward)]);
    assert_eq!(frame_actions(&input, 0.1), vec![Action::Move(Direction::Forward)]);

    input.set_key(KeyCode::KeyW, false);
    assert!(frame_actions(&input, 0.1).is_empty());
  }

  #[test]
  fn zero_restores_fill_and_point_light()
  {
    let mut input = InputState::new();
    input.set_key(KeyCode::Digit0, true);

    assert_eq!(
      frame_actions(&input, 0.1),
      vec![Action::SetRenderMode(RenderMode::Fill), Action::SetPointLight(true)]
    );
  }

  #[test]
  fn mouse_motion_becomes_scaled_look()
  {
    let mut input = InputState::new();
    input.mouse_dx = 20.0;
    input.mouse_dy = -10.0;

    let actions = frame_actions(&input, 0.1);
    assert_eq!(actions.len(), 1);

    let Action::Look { pitch, yaw } = actions[0]
    else
    {
      panic!("expected a look action, got {:?}", actions[0]);
    };
    assert!((pitch - 1.0).abs() < 1e-6);
    assert!((yaw - 2.0).abs() < 1e-6);
  }

  #[test]
  fn released_cursor_pauses_mouse_look()
  {
    let mut input = InputState::new();
    input.set_key(KeyCode::KeyR, true);
    input.mouse_dx = 20.0;

    assert!(frame_actions(&input, 0.1).is_empty());
  }

  #[test]
  fn end_frame_clears_mouse_motion()
  {
    let mut input = InputState::new();
    input.mouse_dx = 3.0;
    input.mouse_dy = 4.0;

    input.end_frame();
    assert!(frame_actions(&input, 0.1).is_empty());
  }

  #[test]
  fn escape_requests_exit()
  {
    let mut input = InputState::new();
    input.set_key(KeyCode::Escape, true);
    assert!(input.exit_requested);
  }
}
