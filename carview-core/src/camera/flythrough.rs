use glam::Vec3;
use log::debug;

use super::free_look::Camera;

//
// ──────────────────────────────────────────────────────────────
//   Flythrough
//
//   A fixed tour of camera poses. Each frame the camera closes
//   1/APPROACH_DIVISOR of the remaining gap to the active
//   waypoint. The approach is geometric and never lands exactly,
//   so after SNAP_AFTER_STEPS frames the camera is placed on the
//   waypoint and the arrival is picked up on the next step.
//
//   Idle ──start──▶ Approaching(0) ─▶ … ─▶ Approaching(n-1) ─▶ Done
//
//   Timing is counted in frames, not seconds.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint
{
  pub position: Vec3,
  pub target: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase
{
  Idle,
  Approaching(usize),
  Done,
}

#[derive(Debug, Clone)]
pub struct Flythrough
{
  waypoints: Vec<Waypoint>,
  phase: Phase,
  step_count: u32,
}

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

pub const APPROACH_DIVISOR: f32 = 100.0;
pub const SNAP_AFTER_STEPS: u32 = 300;
pub const ARRIVAL_EPSILON: f32 = 1e-3;

const fn waypoint(position: [f32; 3], target: [f32; 3]) -> Waypoint
{
  Waypoint {
    position: Vec3::new(position[0], position[1], position[2]),
    target: Vec3::new(target[0], target[1], target[2]),
  }
}

/// The map tour. Starts and ends on the same pose above the start line.
#[rustfmt::skip]
pub const TOUR: [Waypoint; 10] = [
  waypoint([-873.189514, 361.486603, 242.407684],  [-872.200745, 361.538806, 242.386978]),
  waypoint([1236.275269, 248.056732, 248.817230],  [1237.258545, 247.974496, 248.824097]),
  waypoint([1887.446167, 196.989548, 227.696182],  [1887.487915, 197.004129, 228.691650]),
  waypoint([1897.893555, 166.479889, 1553.789551], [1897.905640, 166.544177, 1554.780273]),
  waypoint([2027.540039, 151.412918, 1974.046631], [2026.542969, 151.546649, 1974.084961]),
  waypoint([-371.095947, 137.647247, 1974.052734], [-372.095734, 137.826297, 1974.056274]),
  waypoint([-641.115234, 137.647247, 2055.281738], [-641.137939, 137.847247, 2054.281982]),
  waypoint([-673.982056, 132.169037, 545.668579],  [-673.996033, 132.355075, 544.668762]),
  waypoint([-849.188354, 138.553558, 224.872681],  [-848.189270, 138.781482, 224.839539]),
  waypoint([-873.189514, 361.486603, 242.407684],  [-872.200745, 361.538806, 242.386978]),
];

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

impl Waypoint
{
  pub fn reached_by(&self, camera: &Camera) -> bool
  {
    camera.position().abs_diff_eq(self.position, ARRIVAL_EPSILON)
      && camera.target().abs_diff_eq(self.target, ARRIVAL_EPSILON)
  }
}

impl Flythrough
{
  pub fn new(waypoints: Vec<Waypoint>) -> Self
  {
    Self { waypoints, phase: Phase::Idle, step_count: 0 }
  }

  pub fn tour() -> Self
  {
    Self::new(TOUR.to_vec())
  }

  /// (Re)start from the first waypoint, whatever the current phase.
  pub fn start(&mut self)
  {
    self.step_count = 0;
    self.phase = Phase::Approaching(0);
    debug!("flythrough started ({} waypoints)", self.waypoints.len());
  }

  /// Back to `Idle`. Used both to interrupt a running tour and to clear `Done`.
  pub fn reset(&mut self)
  {
    if self.phase != Phase::Idle
    {
      debug!("flythrough reset from {:?}", self.phase);
    }

    self.step_count = 0;
    self.phase = Phase::Idle;
  }

  /// Advance one frame. No-op outside `Approaching`.
  pub fn step(&mut self, camera: &mut Camera) -> Phase
  {
    let index = match self.phase
    {
      Phase::Approaching(index) => index,
      other => return other,
    };

    let Some(waypoint) = self.waypoints.get(index).copied()
    else
    {
      self.phase = Phase::Done;
      return self.phase;
    };

    // The first waypoint seeds the tour: jump straight onto it.
    if index == 0
    {
      camera.set_pose(waypoint.position, waypoint.target);
      self.advance_from(index);
      return self.phase;
    }

    if waypoint.reached_by(camera)
    {
      self.advance_from(index);
      return self.phase;
    }

    approach(camera, &waypoint);
    self.step_count += 1;

    if self.step_count >= SNAP_AFTER_STEPS
    {
      camera.set_pose(waypoint.position, waypoint.target);
      debug!("flythrough snapped onto waypoint {index}");
    }

    self.phase
  }

  pub fn phase(&self) -> Phase
  {
    self.phase
  }

  pub fn is_active(&self) -> bool
  {
    matches!(self.phase, Phase::Approaching(_))
  }

  pub fn is_done(&self) -> bool
  {
    self.phase == Phase::Done
  }

  /// Index of the waypoint being approached, if any.
  pub fn active_index(&self) -> Option<usize>
  {
    match self.phase
    {
      Phase::Approaching(index) => Some(index),
      _ => None,
    }
  }

  pub fn step_count(&self) -> u32
  {
    self.step_count
  }

  pub fn waypoints(&self) -> &[Waypoint]
  {
    &self.waypoints
  }
}

impl Default for Flythrough
{
  fn default() -> Self
  {
    Self::tour()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

impl Flythrough
{
  fn advance_from(&mut self, index: usize)
  {
    self.step_count = 0;

    self.phase = if index + 1 >= self.waypoints.len()
    {
      Phase::Done
    }
    else
    {
      Phase::Approaching(index + 1)
    };

    debug!("flythrough reached waypoint {index}, now {:?}", self.phase);
  }
}

fn approach(camera: &mut Camera, waypoint: &Waypoint)
{
  let position = camera.position();
  let target = camera.target();

  let position_step = (waypoint.position - position) / APPROACH_DIVISOR;
  let target_step = (waypoint.target - target) / APPROACH_DIVISOR;

  camera.set_pose(position + position_step, target + target_step);
}

#[cfg(test)]
mod tests
{
  use super::*;

  fn startup_camera() -> Camera
  {
    Camera::new(Vec3::new(0.0, 100.0, 3.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 50.0, 0.0))
  }

  #[test]
  fn idle_step_is_noop()
  {
    let mut cam = startup_camera();
    let before = cam.clone();
    let mut fly = Flythrough::tour();

    assert_eq!(fly.step(&mut cam), Phase::Idle);
    assert_eq!(cam, before);
    assert!(!fly.is_active());
  }

  #[test]
  fn first_step_seeds_waypoint_zero()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();

    fly.start();
    assert_eq!(fly.active_index(), Some(0));

    assert_eq!(fly.step(&mut cam), Phase::Approaching(1));
    assert_eq!(cam.position(), TOUR[0].position);
    assert_eq!(cam.target(), TOUR[0].target);
    assert_eq!(fly.step_count(), 0);
  }

  #[test]
  fn approach_covers_one_percent_per_step()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();
    fly.start();
    fly.step(&mut cam);

    let gap = TOUR[1].position - cam.position();
    fly.step(&mut cam);
    let remaining = TOUR[1].position - cam.position();

    assert!(remaining.abs_diff_eq(gap * 0.99, 1e-2));
    assert_eq!(fly.step_count(), 1);
    assert_eq!(cam.pitch(), 50.0);
  }

  #[test]
  fn leg_snaps_after_step_budget()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();
    fly.start();
    fly.step(&mut cam);

    for _ in 0..SNAP_AFTER_STEPS - 1
    {
      assert_eq!(fly.step(&mut cam), Phase::Approaching(1));
    }

    // Geometric approach leaves a visible gap before the budget runs out
    assert!(!TOUR[1].reached_by(&cam));

    fly.step(&mut cam);
    assert_eq!(fly.step_count(), SNAP_AFTER_STEPS);
    assert_eq!(cam.position(), TOUR[1].position);
    assert_eq!(cam.target(), TOUR[1].target);
    assert_eq!(fly.phase(), Phase::Approaching(1));

    // Arrival is noticed on the next frame
    assert_eq!(fly.step(&mut cam), Phase::Approaching(2));
    assert_eq!(fly.step_count(), 0);
  }

  #[test]
  fn exact_arrival_advances_without_moving()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();
    fly.start();
    fly.step(&mut cam);

    cam.set_pose(TOUR[1].position, TOUR[1].target);
    let before = cam.clone();

    assert_eq!(fly.step(&mut cam), Phase::Approaching(2));
    assert_eq!(cam, before);
  }

  #[test]
  fn full_tour_finishes_and_stays_done()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();
    fly.start();

    let mut steps = 0;
    while !fly.is_done()
    {
      fly.step(&mut cam);
      steps += 1;
      assert!(steps < 10_000, "tour never finished");
    }

    // seed + (budget + arrival frame) per remaining leg
    let legs = (TOUR.len() - 1) as u32;
    assert!(steps <= 1 + legs * (SNAP_AFTER_STEPS + 1));
    assert_eq!(cam.position(), TOUR[9].position);
    assert_eq!(cam.target(), TOUR[9].target);

    let before = cam.clone();
    assert_eq!(fly.step(&mut cam), Phase::Done);
    assert_eq!(cam, before);
    assert_eq!(fly.active_index(), None);
  }

  #[test]
  fn reset_returns_to_idle()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();
    fly.start();
    fly.step(&mut cam);
    fly.step(&mut cam);

    fly.reset();
    assert_eq!(fly.phase(), Phase::Idle);
    assert_eq!(fly.step_count(), 0);

    let before = cam.clone();
    fly.step(&mut cam);
    assert_eq!(cam, before);
  }

  #[test]
  fn start_restarts_mid_tour()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::tour();
    fly.start();
    for _ in 0..5
    {
      fly.step(&mut cam);
    }

    fly.start();
    assert_eq!(fly.phase(), Phase::Approaching(0));
    assert_eq!(fly.step_count(), 0);
  }

  #[test]
  fn single_waypoint_tour_is_done_after_seed()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::new(vec![TOUR[3]]);
    fly.start();

    assert_eq!(fly.step(&mut cam), Phase::Done);
    assert_eq!(cam.position(), TOUR[3].position);
  }

  #[test]
  fn empty_tour_finishes_immediately()
  {
    let mut cam = startup_camera();
    let mut fly = Flythrough::new(Vec::new());
    fly.start();

    assert_eq!(fly.step(&mut cam), Phase::Done);
  }

  #[test]
  fn tour_loops_back_to_start()
  {
    assert_eq!(TOUR.len(), 10);
    assert_eq!(TOUR[0], TOUR[9]);
  }
}
