//! Scene state for the carview viewer: the free-look camera, the scripted
//! flythrough, the car patrol and the per-frame render context.
//!
//! Nothing in this crate touches the GPU. The native binary owns the window
//! and the wgpu resources and reads everything it draws from a
//! [`RenderContext`].

pub mod camera;
pub mod car;
pub mod context;
pub mod lighting;

pub use camera::{Camera, Direction, Flythrough, Phase, Waypoint, ZoomDirection};
pub use car::CarPatrol;
pub use context::{Action, RenderContext, RenderMode, SceneSettings, SkyboxVariant, Speeds};
pub use lighting::{Light, ShadowVolume};
