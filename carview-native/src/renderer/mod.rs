mod core;
mod depth;
mod gui;
mod model;
mod shadow;
mod skybox;
mod texture;
mod uniforms;

pub use self::core::Renderer;
