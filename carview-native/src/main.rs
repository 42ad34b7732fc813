mod app;
mod config;
mod hud;
mod input;
mod renderer;

use anyhow::Context;

fn main() -> anyhow::Result<()>
{
  // Initialise the logger so wgpu validation errors and warnings appear in the console.
  // RUST_LOG overrides the default filter, e.g. RUST_LOG=carview=debug,wgpu=warn.

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,wgpu_hal=off,naga=warn"))
    .init();

  let config = config::ViewerConfig::discover(std::env::args_os().nth(1))
    .context("failed to load viewer configuration")?;

  app::run(config)
}
