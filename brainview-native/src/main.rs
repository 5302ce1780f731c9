mod app;
mod input;

use anyhow::Context;
use brainview_core::ControlsConfig;

fn main() -> anyhow::Result<()>
{
  // RUST_LOG overrides; winit is noisy at debug.
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,winit=warn")).init();

  let config = match std::env::args().nth(1)
  {
    Some(path) => ControlsConfig::load(&path).with_context(|| format!("loading controls config {path}"))?,
    None => ControlsConfig::default(),
  };

  log::info!("controls config: {}", serde_json::to_string(&config)?);

  app::run(config)
}
