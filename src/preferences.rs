use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::JournalError;

const PREFERENCES_FILE: &str = "preferences.toml";
pub const QUICK_EMOJI_SLOTS: usize = 5;
const DEFAULT_QUICK_EMOJIS: [&str; QUICK_EMOJI_SLOTS] = ["🙂", "😀", "😐", "🙁", "😢"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
	#[default]
	System,
	Light,
	Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
	#[default]
	None,
	Openai,
	Gemini,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
	pub theme: ThemeMode,
	pub provider: AiProvider,
	pub openai_key: String,
	pub gemini_key: String,
	pub require_biometric: bool,
	pub quick_emojis: Vec<String>,
}

impl Default for Preferences {
	fn default() -> Self {
		Self {
			theme: ThemeMode::default(),
			provider: AiProvider::default(),
			openai_key: String::new(),
			gemini_key: String::new(),
			require_biometric: false,
			quick_emojis: DEFAULT_QUICK_EMOJIS.iter().map(|emoji| emoji.to_string()).collect(),
		}
	}
}

impl Preferences {
	// Blank or missing slots fall back to the defaults.
	pub fn quick_emojis(&self) -> Vec<String> {
		(0..QUICK_EMOJI_SLOTS)
			.map(|slot| {
				self.quick_emojis
					.get(slot)
					.map(|emoji| emoji.trim())
					.filter(|emoji| !emoji.is_empty())
					.unwrap_or(DEFAULT_QUICK_EMOJIS[slot])
					.to_string()
			})
			.collect()
	}

	// `slot` is 1-based.
	pub fn set_quick_emoji(&mut self, slot: usize, emoji: &str) -> Result<(), JournalError> {
		if slot == 0 || slot > QUICK_EMOJI_SLOTS {
			return Err(JournalError::InvalidSlot {
				slot,
				slots: QUICK_EMOJI_SLOTS,
			});
		}

		let mut slots = self.quick_emojis();
		slots[slot - 1] = emoji.trim().to_string();
		self.quick_emojis = slots;
		Ok(())
	}

	pub fn set_api_key(&mut self, provider: AiProvider, key: &str) -> Result<(), JournalError> {
		let slot = match provider {
			AiProvider::Openai => &mut self.openai_key,
			AiProvider::Gemini => &mut self.gemini_key,
			AiProvider::None => return Err(JournalError::NoKeyForProvider),
		};
		*slot = key.trim().to_string();
		Ok(())
	}

	pub fn api_key(&self, provider: AiProvider) -> Option<&str> {
		match provider {
			AiProvider::Openai => Some(&self.openai_key),
			AiProvider::Gemini => Some(&self.gemini_key),
			AiProvider::None => None,
		}
	}
}

pub fn mask_key(key: &str) -> String {
	if key.is_empty() {
		return "(unset)".to_string();
	}

	let tail = key.chars().rev().take(4).collect::<Vec<_>>();
	let tail = tail.into_iter().rev().collect::<String>();
	format!("****{tail}")
}

pub fn load_preferences(path: &Path) -> Result<Preferences, JournalError> {
	let raw = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Preferences::default()),
		Err(err) => return Err(JournalError::Io(err)),
	};

	if raw.trim().is_empty() {
		return Ok(Preferences::default());
	}

	toml::from_str(&raw).map_err(JournalError::TomlDecode)
}

pub fn save_preferences(path: &Path, preferences: &Preferences) -> Result<(), JournalError> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}

	let encoded = toml::to_string_pretty(preferences).map_err(JournalError::TomlEncode)?;
	fs::write(path, encoded)?;
	debug!(path = %path.display(), "preferences saved");
	Ok(())
}

pub fn resolve_preferences_path(cli_path: Option<PathBuf>) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = env::var_os("JOURNAL_PREFS") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	state_dir().join(PREFERENCES_FILE)
}

pub fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os("JOURNAL_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join("journal_metrics");
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join("journal_metrics");
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path)
			.join(".local")
			.join("state")
			.join("journal_metrics");
	}

	PathBuf::from(".journal_metrics")
}

fn absolutize(path: PathBuf) -> PathBuf {
	if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	}
}

#[cfg(test)]
mod tests {
	use std::fs;
	use std::path::PathBuf;

	use super::{AiProvider, Preferences, ThemeMode, load_preferences, mask_key, save_preferences};
	use crate::errors::JournalError;

	fn temp_file(name: &str) -> PathBuf {
		let mut path = std::env::temp_dir();
		path.push(format!("{}_{}", name, std::process::id()));
		path
	}

	#[test]
	fn missing_file_loads_defaults() {
		let path = temp_file("journal_prefs_missing.toml");
		let _ = fs::remove_file(&path);
		let preferences = load_preferences(&path).expect("load should succeed");
		assert_eq!(preferences, Preferences::default());
		assert_eq!(preferences.quick_emojis().len(), 5);
	}

	#[test]
	fn saves_and_loads_settings() {
		let mut preferences = Preferences::default();
		preferences.theme = ThemeMode::Dark;
		preferences.provider = AiProvider::Gemini;
		preferences.require_biometric = true;
		preferences
			.set_quick_emoji(2, "🤩")
			.expect("slot should be valid");

		let path = temp_file("journal_prefs_roundtrip.toml");
		save_preferences(&path, &preferences).expect("save should succeed");
		let loaded = load_preferences(&path).expect("load should succeed");
		assert_eq!(loaded, preferences);
		assert_eq!(loaded.quick_emojis()[1], "🤩");
		let _ = fs::remove_file(path);
	}

	#[test]
	fn saves_and_loads_provider_keys_and_biometric() {
		let mut preferences = Preferences::default();
		preferences.provider = AiProvider::Openai;
		preferences
			.set_api_key(AiProvider::Openai, " sk-live-9876 ")
			.expect("openai takes a key");
		preferences
			.set_api_key(AiProvider::Gemini, "gm-5555")
			.expect("gemini takes a key");
		preferences.require_biometric = true;

		let path = temp_file("journal_prefs_keys.toml");
		save_preferences(&path, &preferences).expect("save should succeed");
		let loaded = load_preferences(&path).expect("load should succeed");
		assert_eq!(loaded.provider, AiProvider::Openai);
		assert_eq!(loaded.api_key(AiProvider::Openai), Some("sk-live-9876"));
		assert_eq!(loaded.api_key(AiProvider::Gemini), Some("gm-5555"));
		assert!(loaded.require_biometric);
		assert_eq!(mask_key(&loaded.openai_key), "****9876");
		let _ = fs::remove_file(path);
	}

	#[test]
	fn provider_none_has_no_key() {
		let mut preferences = Preferences::default();
		assert!(matches!(
			preferences.set_api_key(AiProvider::None, "sk-1"),
			Err(JournalError::NoKeyForProvider)
		));
		assert_eq!(preferences.api_key(AiProvider::None), None);
		assert_eq!(preferences, Preferences::default());
	}

	#[test]
	fn partial_file_fills_missing_fields() {
		let path = temp_file("journal_prefs_partial.toml");
		fs::write(&path, "theme = \"light\"\nquick_emojis = [\"😎\", \"\"]\n").expect("write should succeed");
		let loaded = load_preferences(&path).expect("load should succeed");
		assert_eq!(loaded.theme, ThemeMode::Light);
		assert_eq!(loaded.provider, AiProvider::None);
		assert_eq!(loaded.quick_emojis(), ["😎", "😀", "😐", "🙁", "😢"]);
		let _ = fs::remove_file(path);
	}

	#[test]
	fn rejects_out_of_range_slots() {
		let mut preferences = Preferences::default();
		assert!(preferences.set_quick_emoji(0, "🙂").is_err());
		assert!(preferences.set_quick_emoji(6, "🙂").is_err());
	}

	#[test]
	fn masks_provider_keys() {
		assert_eq!(mask_key(""), "(unset)");
		assert_eq!(mask_key("sk-abcdef1234"), "****1234");
	}
}
