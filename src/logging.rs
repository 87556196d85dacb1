use std::error::Error;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

use crate::preferences::state_dir;

const LOG_ENV: &str = "JOURNAL_LOG";
const LOG_FILE: &str = "journal.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
	Stderr,
	StateFile,
}

pub fn init_logging(target: LogTarget) -> Result<(), Box<dyn Error>> {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

	match target {
		LogTarget::Stderr => {
			fmt()
				.with_env_filter(filter)
				.with_writer(std::io::stderr)
				.try_init()
				.map_err(|err| -> Box<dyn Error> { err })?;
		}
		LogTarget::StateFile => {
			let dir = state_dir();
			fs::create_dir_all(&dir)?;
			let file = OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE))?;
			fmt()
				.with_env_filter(filter)
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.try_init()
				.map_err(|err| -> Box<dyn Error> { err })?;
		}
	}

	Ok(())
}
