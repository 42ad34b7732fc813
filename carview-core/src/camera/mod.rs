mod flythrough;
mod free_look;

pub use flythrough::{Flythrough, Phase, Waypoint, APPROACH_DIVISOR, ARRIVAL_EPSILON, SNAP_AFTER_STEPS, TOUR};
pub use free_look::{Camera, Direction, ZoomDirection, FOV_MAX, FOV_MIN, PITCH_LIMIT};
