use glam::{Mat4, Vec3};

//
// ──────────────────────────────────────────────────────────────
//   Car patrol
//
//   The car drives along X between two turn points. At each end
//   it keeps pressing against the limit while turning one degree
//   per frame; once it has turned half a circle it drives back.
//
//     -2300 ◀──────────────── offset ────────────────▶ 2500
//     rotation 180..360 on the way back, 0..180 going out
// ──────────────────────────────────────────────────────────────
//

const SPEED: f32 = 2.0; // world units per frame
const TURN_RATE: f32 = 1.0; // degrees per frame
const OFFSET_MIN: f32 = -2300.0;
const OFFSET_MAX: f32 = 2500.0;

const ROAD_HEIGHT: f32 = -200.0;
const LANE_Z: f32 = 50.0;

// The model pivots off-centre; on the return leg it is shifted back onto the lane.
const RETURN_LANE_SHIFT: f32 = 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CarPatrol
{
  offset: f32,
  direction: f32,
  rotation: f32,
}

impl Default for CarPatrol
{
  fn default() -> Self
  {
    Self { offset: 0.0, direction: 1.0, rotation: 0.0 }
  }
}

impl CarPatrol
{
  pub fn new() -> Self
  {
    Self::default()
  }

  /// One frame of driving.
  pub fn advance(&mut self)
  {
    self.offset += SPEED * self.direction;

    let past_far_end = self.offset > OFFSET_MAX;
    let past_near_end = self.offset < OFFSET_MIN;

    if (past_far_end && self.rotation >= 180.0) || (past_near_end && self.rotation <= 0.0)
    {
      self.direction = -self.direction;
    }
    else if past_far_end || past_near_end
    {
      self.rotation += TURN_RATE;
    }

    self.offset = self.offset.clamp(OFFSET_MIN, OFFSET_MAX);

    if self.rotation == 360.0
    {
      self.rotation = 0.0;
    }
  }

  /// World transform of the car, relative to the scene transform `base`.
  pub fn model_matrix(&self, base: Mat4) -> Mat4
  {
    let mut model = base
      * Mat4::from_translation(Vec3::new(self.offset, ROAD_HEIGHT, LANE_Z))
      * Mat4::from_rotation_y(self.rotation.to_radians());

    if self.rotation == 180.0
    {
      model *= Mat4::from_translation(Vec3::new(0.0, 0.0, RETURN_LANE_SHIFT));
    }

    model
  }

  pub fn offset(&self) -> f32
  {
    self.offset
  }

  pub fn rotation(&self) -> f32
  {
    self.rotation
  }

  pub fn direction(&self) -> f32
  {
    self.direction
  }
}

#[cfg(test)]
mod tests
{
  use super::*;

  fn drive_until(car: &mut CarPatrol, limit: usize, done: impl Fn(&CarPatrol) -> bool) -> usize
  {
    for frame in 1..=limit
    {
      car.advance();
      if done(car)
      {
        return frame;
      }
    }
    panic!("condition not reached within {limit} frames");
  }

  #[test]
  fn drives_outward_first()
  {
    let mut car = CarPatrol::new();
    car.advance();

    assert_eq!(car.offset(), 2.0);
    assert_eq!(car.rotation(), 0.0);
  }

  #[test]
  fn turns_at_far_end_then_reverses()
  {
    let mut car = CarPatrol::new();

    drive_until(&mut car, 2000, |c| c.rotation() > 0.0);
    assert_eq!(car.offset(), OFFSET_MAX);

    drive_until(&mut car, 500, |c| c.direction() < 0.0);
    assert_eq!(car.rotation(), 180.0);
    assert_eq!(car.offset(), OFFSET_MAX);

    car.advance();
    assert!(car.offset() < OFFSET_MAX);
  }

  #[test]
  fn full_lap_wraps_rotation()
  {
    let mut car = CarPatrol::new();

    drive_until(&mut car, 10_000, |c| c.direction() < 0.0);
    drive_until(&mut car, 10_000, |c| c.direction() > 0.0);

    assert_eq!(car.rotation(), 0.0);
    assert_eq!(car.offset(), OFFSET_MIN);
  }

  #[test]
  fn offset_stays_within_limits()
  {
    let mut car = CarPatrol::new();

    for _ in 0..20_000
    {
      car.advance();
      assert!(car.offset() >= OFFSET_MIN && car.offset() <= OFFSET_MAX);
      assert!(car.rotation() >= 0.0 && car.rotation() < 360.0);
    }
  }

  #[test]
  fn return_leg_shifts_lane()
  {
    let mut car = CarPatrol::new();
    drive_until(&mut car, 10_000, |c| c.direction() < 0.0);
    car.advance();

    let origin = car.model_matrix(Mat4::IDENTITY).transform_point3(Vec3::ZERO);

    // Rotated 180° about Y, so the +Z shift lands on -Z in world space.
    assert!((origin.x - car.offset()).abs() < 1e-2);
    assert!((origin.y - ROAD_HEIGHT).abs() < 1e-3);
    assert!((origin.z - (LANE_Z - RETURN_LANE_SHIFT)).abs() < 1e-2);
  }

  #[test]
  fn model_matrix_applies_base()
  {
    let car = CarPatrol::new();
    let base = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));

    let origin = car.model_matrix(base).transform_point3(Vec3::ZERO);
    assert!(origin.abs_diff_eq(Vec3::new(10.0, ROAD_HEIGHT, LANE_Z), 1e-4));
  }
}
