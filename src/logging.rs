use flexi_logger::Logger;

use crate::{Error, Result};

/// Start the logger, honoring `RUST_LOG` with an `info` fallback.
pub fn setup_logging() -> Result<()> {
    Logger::try_with_env_or_str("info")
        .map_err(|e| Error::Config(e.to_string()))?
        .format(flexi_logger::colored_default_format)
        .start()
        .map_err(|e| Error::Config(e.to_string()))?;
    Ok(())
}
