mod app;
mod vsync;

use trigon_engine::logging::{LoggingConfig, init_logging};

use crate::app::{Studio, StudioConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());
    Studio::run(StudioConfig::default())
}
