mod chart;
mod domain;
mod errors;
mod logging;
mod metrics;
mod preferences;
mod store;
mod surface;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};

use crate::chart::{ChartMode, Primitive, Series, Viewport, layout_chart};
use crate::errors::JournalError;
use crate::logging::{LogTarget, init_logging};
use crate::metrics::{DayAggregate, aggregate, average_sleep};
use crate::preferences::{
	AiProvider, ThemeMode, load_preferences, mask_key, resolve_preferences_path, save_preferences,
};
use crate::store::EntryStore;
use crate::ui::run_dashboard;

#[derive(Debug, Parser)]
#[command(name = "journal-metrics", about = "Mood, sleep and habit journal with trend charts")]
struct Cli {
	#[arg(long, global = true)]
	prefs: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Dashboard,
	Demo {
		#[arg(long)]
		start: Option<String>,
		#[arg(long)]
		end: Option<String>,
		#[arg(long)]
		json: bool,
	},
	Chart {
		#[arg(long)]
		start: Option<String>,
		#[arg(long)]
		end: Option<String>,
		#[arg(long, default_value_t = ChartMode::Totals)]
		mode: ChartMode,
		#[arg(long, default_value_t = 400.0)]
		width: f64,
		#[arg(long, default_value_t = 260.0)]
		height: f64,
	},
	Prefs {
		#[command(subcommand)]
		action: PrefsAction,
	},
}

#[derive(Debug, Subcommand)]
enum PrefsAction {
	Show,
	SetEmoji {
		#[arg(long)]
		slot: usize,
		#[arg(long)]
		emoji: String,
	},
	SetTheme {
		#[arg(long, value_parser = parse_theme)]
		theme: ThemeMode,
	},
	SetProvider {
		#[arg(long, value_parser = parse_provider)]
		provider: AiProvider,
	},
	SetKey {
		#[arg(long, value_parser = parse_provider)]
		provider: AiProvider,
		#[arg(long)]
		key: String,
	},
	SetBiometric {
		#[arg(long, action = ArgAction::Set)]
		enabled: bool,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let command = cli.command.unwrap_or(Command::Dashboard);
	let target = match command {
		Command::Dashboard => LogTarget::StateFile,
		_ => LogTarget::Stderr,
	};
	if let Err(err) = init_logging(target) {
		eprintln!("warning: logging disabled: {err}");
	}

	let prefs_path = resolve_preferences_path(cli.prefs);

	match command {
		Command::Dashboard => {
			let preferences = load_preferences(&prefs_path)?;
			let mut store = EntryStore::new();
			run_dashboard(&mut store, preferences.quick_emojis())?;
		}
		Command::Demo { start, end, json } => {
			let (start, end) = parse_range(start.as_deref(), end.as_deref())?;
			let mut store = EntryStore::new();
			store.generate_dummy(start, end);
			let days = aggregate(&store.entries().entries, start, end);
			if json {
				println!("{}", serde_json::to_string_pretty(&days).map_err(JournalError::Json)?);
			} else {
				print_days(&days);
			}
		}
		Command::Chart {
			start,
			end,
			mode,
			width,
			height,
		} => {
			let (start, end) = parse_range(start.as_deref(), end.as_deref())?;
			let mut store = EntryStore::new();
			store.generate_dummy(start, end);
			let days = aggregate(&store.entries().entries, start, end);
			print_chart_summary(&days, mode, &Viewport::new(width, height));
		}
		Command::Prefs { action } => run_prefs(&prefs_path, action)?,
	}

	Ok(())
}

fn run_prefs(path: &std::path::Path, action: PrefsAction) -> Result<(), Box<dyn Error>> {
	let mut preferences = load_preferences(path)?;
	match action {
		PrefsAction::Show => {
			println!("file: {}", path.display());
			println!("theme: {:?}", preferences.theme);
			println!("provider: {:?}", preferences.provider);
			println!("openai key: {}", mask_key(&preferences.openai_key));
			println!("gemini key: {}", mask_key(&preferences.gemini_key));
			println!("require biometric: {}", preferences.require_biometric);
			println!("quick emojis: {}", preferences.quick_emojis().join(" "));
		}
		PrefsAction::SetEmoji { slot, emoji } => {
			preferences.set_quick_emoji(slot, &emoji)?;
			save_preferences(path, &preferences)?;
			println!("slot {slot} set to {}", emoji.trim());
		}
		PrefsAction::SetTheme { theme } => {
			preferences.theme = theme;
			save_preferences(path, &preferences)?;
			println!("theme set to {theme:?}");
		}
		PrefsAction::SetProvider { provider } => {
			preferences.provider = provider;
			save_preferences(path, &preferences)?;
			println!("provider set to {provider:?}");
		}
		PrefsAction::SetKey { provider, key } => {
			preferences.set_api_key(provider, &key)?;
			save_preferences(path, &preferences)?;
			println!("{provider:?} key set to {}", mask_key(key.trim()));
		}
		PrefsAction::SetBiometric { enabled } => {
			preferences.require_biometric = enabled;
			save_preferences(path, &preferences)?;
			println!("require biometric: {enabled}");
		}
	}

	Ok(())
}

fn parse_theme(input: &str) -> Result<ThemeMode, String> {
	match input.trim().to_ascii_lowercase().as_str() {
		"system" => Ok(ThemeMode::System),
		"light" => Ok(ThemeMode::Light),
		"dark" => Ok(ThemeMode::Dark),
		other => Err(format!("unknown theme: {other} (expected system, light or dark)")),
	}
}

fn parse_provider(input: &str) -> Result<AiProvider, String> {
	match input.trim().to_ascii_lowercase().as_str() {
		"none" => Ok(AiProvider::None),
		"openai" => Ok(AiProvider::Openai),
		"gemini" => Ok(AiProvider::Gemini),
		other => Err(format!("unknown provider: {other} (expected none, openai or gemini)")),
	}
}

fn parse_day(input: &str) -> Result<NaiveDate, JournalError> {
	NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
		.map_err(|_| JournalError::InvalidDate(input.to_string()))
}

fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate), JournalError> {
	let end = match end {
		Some(raw) => parse_day(raw)?,
		None => Local::now().date_naive(),
	};
	let start = match start {
		Some(raw) => parse_day(raw)?,
		None => end - Duration::days(14),
	};
	Ok((start, end))
}

fn print_days(days: &[DayAggregate]) {
	if days.is_empty() {
		println!("empty range");
		return;
	}

	println!("date       | sleep | mood | x y z w");
	for day in days {
		let mood = day
			.mood_avg
			.map(|mood| format!("{mood:>4.1}"))
			.unwrap_or_else(|| "   –".to_string());
		println!(
			"{} | {:>5.1} | {} | {} {} {} {}",
			day.date.format("%Y-%m-%d"),
			day.sleep_avg,
			mood,
			day.count_x,
			day.count_y,
			day.count_z,
			day.count_w
		);
	}

	match average_sleep(days) {
		Some(hours) => println!("avg sleep: {hours:.1} h"),
		None => println!("avg sleep: –"),
	}
}

fn print_chart_summary(days: &[DayAggregate], mode: ChartMode, viewport: &Viewport) {
	let layout = layout_chart(days, mode, viewport);
	if layout.is_empty() {
		println!("nothing to draw");
		return;
	}

	println!("mode: {mode}");
	println!("ball diameter: {:.3}", layout.ball_diameter);
	for stack in &layout.stacks {
		println!(
			"{} | total {:>2} | stack height {:>8.3}",
			days[stack.day_index].date.format("%Y-%m-%d"),
			stack.total,
			stack.height
		);
	}

	for primitive in &layout.primitives {
		match primitive {
			Primitive::Path {
				series,
				path,
				stroke_width,
				..
			} => {
				let name = match series {
					Series::Mood => "mood",
					Series::Sleep => "sleep",
				};
				println!("{name} curve: {} segments, stroke {stroke_width}", path.segments.len());
			}
			Primitive::Text { text, .. } => println!("label: {text}"),
			Primitive::RoundedRect { .. } | Primitive::Circle { .. } => {}
		}
	}
}
