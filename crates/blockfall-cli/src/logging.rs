//! File logging.
//!
//! The terminal belongs to the game screen, so log records only go to a file
//! and only when one is requested. Without `--log-file` no logger is
//! installed and the `log` macros in the engine are no-ops.

use std::path::PathBuf;

use anyhow::Context as _;
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LogArg {
    /// Append log records to this file
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
    /// Minimum level of records written to the log file
    #[clap(long, global = true, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

pub(crate) fn init(arg: &LogArg) -> anyhow::Result<()> {
    let Some(path) = &arg.log_file else {
        return Ok(());
    };

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}",
        )))
        .build(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(arg.log_level))?;
    log4rs::init_config(config)?;

    log::info!("logging to {} at level {}", path.display(), arg.log_level);
    Ok(())
}
