use std::cell::Cell;
use std::error::Error;
use std::io;
use std::rc::Rc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::Canvas;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

use crate::chart::{ChartMode, Margins, Rgba, Viewport, channel_color};
use crate::domain::{Channel, Entry, EntryDraft, MAX_MOOD_EMOJIS, TodoItem};
use crate::metrics::{MetricsPipeline, average_sleep};
use crate::store::{EntriesSnapshot, EntryStore, StoreChange};
use crate::surface::{CanvasSurface, render_layout};

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const DEFAULT_RANGE_DAYS: i64 = 14;
const SLEEP_STEP_HOURS: f32 = 0.5;

pub fn run_dashboard(store: &mut EntryStore, quick_emojis: Vec<String>) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, store, quick_emojis);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	store: &mut EntryStore,
	quick_emojis: Vec<String>,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::new(quick_emojis);
	let mut pipeline = MetricsPipeline::new();
	let changed = Rc::new(Cell::new(false));
	let sink = Rc::clone(&changed);
	let subscription = store.subscribe(move |change| {
		let version = match change {
			StoreChange::Entries(snapshot) => snapshot.version,
			StoreChange::Todos(snapshot) => snapshot.version,
		};
		debug!(version, "store changed");
		sink.set(true);
	});

	let mut view = build_view(&app, store);
	let mut view_day = app.selected_day;
	let result = loop {
		if changed.replace(false) || view_day != app.selected_day {
			view = build_view(&app, store);
			view_day = app.selected_day;
		}
		app.clamp_selection(&view);
		if let Err(err) = terminal.draw(|frame| draw_dashboard(frame, &app, &view, &mut pipeline)) {
			break Err(err.into());
		}

		match poll_key() {
			Ok(Some(code)) => {
				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, code, store),
					InputMode::Normal => handle_normal_key(&mut app, code, store, &view),
				};

				if should_quit {
					break Ok(());
				}
			}
			Ok(None) => {}
			Err(err) => break Err(err),
		}
	};

	store.unsubscribe(subscription);
	info!(
		version = store.version(),
		recomputations = pipeline.recomputations(),
		"dashboard closed"
	);
	result
}

fn poll_key() -> Result<Option<KeyCode>, Box<dyn Error>> {
	if !event::poll(StdDuration::from_millis(250))? {
		return Ok(None);
	}

	match event::read()? {
		CEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.code)),
		_ => Ok(None),
	}
}

fn draw_dashboard(frame: &mut Frame, app: &App, view: &ViewModel, pipeline: &mut MetricsPipeline) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(5)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
		.split(layout[0]);

	let left = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(8), Constraint::Length(7), Constraint::Length(8)])
		.split(body[0]);

	render_timeline_panel(frame, left[0], app, view);
	render_draft_panel(frame, left[1], app);
	render_todos_panel(frame, left[2], app, view);
	render_chart_panel(frame, body[1], app, view, pipeline);
	render_footer(frame, layout[1], app);
}

fn render_timeline_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let mut items = view
		.timeline
		.iter()
		.map(|entry| ListItem::new(timeline_line(entry)))
		.collect::<Vec<_>>();

	if items.is_empty() {
		items.push(ListItem::new("(no entries yet)"));
	}

	let mut state = ListState::default();
	if !view.timeline.is_empty() {
		state.select(Some(app.timeline_index.min(view.timeline.len() - 1)));
	}

	let title = match &app.undo {
		Some(entry) => format!("Timeline | deleted \"{}\" (u undo)", entry.display_title()),
		None => format!("Timeline | {} entries", view.timeline.len()),
	};
	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(title)
				.border_style(border_style(app.focus == FocusPane::Timeline)),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));

	frame.render_stateful_widget(list, area, &mut state);
}

fn timeline_line(entry: &Entry) -> Line<'static> {
	let stamp = entry.created_at.with_timezone(&Local).format("%b %-d, %H:%M").to_string();
	let mut spans = vec![
		Span::styled(format!("{stamp} "), Style::default().fg(Color::Gray)),
		Span::styled(entry.display_title().to_string(), Style::default().add_modifier(Modifier::BOLD)),
	];

	if !entry.mood_emojis.is_empty() {
		spans.push(Span::raw(format!(" {}", entry.mood_emojis.as_slice().join(""))));
	}

	if entry.toggles.any() {
		spans.push(Span::raw(" "));
		for channel in [Channel::X, Channel::Y, Channel::Z, Channel::W] {
			if entry.toggles.get(channel) {
				spans.push(Span::styled("●", Style::default().fg(rgb(channel_color(channel)))));
			}
		}
	}

	spans.push(Span::raw(format!(" Sleep: {:.1}h", entry.sleep_hours)));
	if entry.is_test {
		spans.push(Span::styled(" [test]", Style::default().fg(Color::DarkGray)));
	}

	Line::from(spans)
}

fn render_draft_panel(frame: &mut Frame, area: Rect, app: &App) {
	let draft = &app.draft;
	let mut emoji_spans = vec![Span::raw("Mood: ")];
	for (index, emoji) in app.quick_emojis.iter().enumerate() {
		let style = if draft.mood_emojis.contains(emoji) {
			Style::default().bg(Color::Yellow).fg(Color::Black)
		} else {
			Style::default()
		};
		emoji_spans.push(Span::styled(format!("{}{} ", index + 1, emoji), style));
	}

	let mut toggle_spans = vec![Span::raw("Toggles: ")];
	for channel in [Channel::X, Channel::Y, Channel::Z, Channel::W] {
		let marker = if draft.toggles.get(channel) { "●" } else { "○" };
		toggle_spans.push(Span::styled(
			format!("{}{} ", channel.label().to_ascii_lowercase(), marker),
			Style::default().fg(rgb(channel_color(channel))),
		));
	}

	let selected = if draft.mood_emojis.is_empty() {
		"(none)".to_string()
	} else {
		draft.mood_emojis.as_slice().join(" ")
	};
	let rating = draft
		.mood_emojis
		.rating()
		.map(|rating| rating.to_string())
		.unwrap_or_else(|| "–".to_string());

	let lines = vec![
		Line::from(emoji_spans),
		Line::from(format!(
			"Selected ({}/{MAX_MOOD_EMOJIS}): {selected} | rating {rating}",
			draft.mood_emojis.len()
		)),
		Line::from(toggle_spans),
		Line::from(format!("Sleep hours: {:.1}h", draft.sleep_hours)),
	];

	let panel = Paragraph::new(lines).block(
		Block::default()
			.borders(Borders::ALL)
			.title("New entry (e save)")
			.border_style(border_style(app.focus == FocusPane::Draft)),
	);
	frame.render_widget(panel, area);
}

fn render_todos_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let mut items = view
		.todos
		.iter()
		.map(|todo| {
			let marker = if todo.done { "[x]" } else { "[ ]" };
			ListItem::new(format!("{marker} {}", todo.text))
		})
		.collect::<Vec<_>>();

	if items.is_empty() {
		items.push(ListItem::new("(no todos)"));
	}

	let mut state = ListState::default();
	if !view.todos.is_empty() {
		state.select(Some(app.todo_index.min(view.todos.len() - 1)));
	}

	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(format!("Todos {}", app.selected_day.format("%a %d %b")))
				.border_style(border_style(app.focus == FocusPane::Todos)),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));

	frame.render_stateful_widget(list, area, &mut state);
}

fn render_chart_panel(
	frame: &mut Frame,
	area: Rect,
	app: &App,
	view: &ViewModel,
	pipeline: &mut MetricsPipeline,
) {
	let block = Block::default().borders(Borders::ALL);
	let inner = block.inner(area);
	let viewport = canvas_viewport(inner);
	pipeline.refresh(&view.snapshot, app.range_start, app.range_end, app.chart_mode, viewport);
	let layout = pipeline.layout();

	let average = average_sleep(pipeline.days())
		.map(|hours| format!("{hours:.1} h"))
		.unwrap_or_else(|| "–".to_string());
	let title = format!(
		"{} | {} - {} | Avg sleep: {}",
		mode_title(app.chart_mode),
		app.range_start.format("%Y-%m-%d"),
		app.range_end.format("%Y-%m-%d"),
		average
	);

	let canvas = Canvas::default()
		.block(block.title(title))
		.marker(Marker::Braille)
		.x_bounds([0.0, viewport.width])
		.y_bounds([0.0, viewport.height])
		.paint(|ctx| {
			let mut surface = CanvasSurface::new(ctx, viewport.height);
			render_layout(layout, &mut surface);
		});
	frame.render_widget(canvas, area);
}

// Braille cells are 2 dots wide and 4 tall; the chart works in dots.
fn canvas_viewport(inner: Rect) -> Viewport {
	let width = f64::from(inner.width.max(1)) * 2.0;
	let height = f64::from(inner.height.max(1)) * 4.0;
	Viewport::new(width, height)
		.with_margins(Margins {
			left: 6.0,
			top: 4.0,
			right: 6.0,
			bottom: 8.0,
		})
		.with_labels(4.0, 2.0)
}

fn mode_title(mode: ChartMode) -> &'static str {
	match mode {
		ChartMode::Mood => "Mood",
		ChartMode::Sleep => "Sleep hours",
		ChartMode::Totals => "Totals",
	}
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from(
				"Tab pane | j/k move | v chart mode | [ ] range start | { } range end | < > todo day | q quit",
			),
			Line::from(
				"1-5 mood | 0 clear mood | x/y/z/w toggles | +/- sleep | e save entry | d delete | u undo | g dummy data | c clear test | t todo | space done",
			),
			Line::from(app.status.clone()),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from("Enter submit | Esc cancel"),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn handle_normal_key(app: &mut App, code: KeyCode, store: &mut EntryStore, view: &ViewModel) -> bool {
	match code {
		KeyCode::Char('q') | KeyCode::Esc => return true,
		KeyCode::Tab => app.focus = app.focus.next(),
		KeyCode::BackTab => app.focus = app.focus.prev(),
		KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1, view),
		KeyCode::Down | KeyCode::Char('j') => app.move_selection(1, view),
		KeyCode::Char('v') => {
			app.chart_mode = app.chart_mode.next();
			app.status = format!("chart: {}", mode_title(app.chart_mode));
		}
		KeyCode::Char('[') => app.shift_range(-1, 0),
		KeyCode::Char(']') => app.shift_range(1, 0),
		KeyCode::Char('{') => app.shift_range(0, -1),
		KeyCode::Char('}') => app.shift_range(0, 1),
		KeyCode::Char('<') => app.shift_selected_day(-1),
		KeyCode::Char('>') => app.shift_selected_day(1),
		KeyCode::Char(digit @ '1'..='5') => {
			let slot = digit as usize - '1' as usize;
			if let Some(emoji) = app.quick_emojis.get(slot).cloned() {
				app.draft.mood_emojis.select(emoji);
			}
		}
		KeyCode::Char('0') => app.draft.mood_emojis.clear(),
		KeyCode::Char(letter @ ('x' | 'y' | 'z' | 'w')) => {
			let channel = match letter {
				'x' => Channel::X,
				'y' => Channel::Y,
				'z' => Channel::Z,
				_ => Channel::W,
			};
			app.draft.toggles.flip(channel);
		}
		KeyCode::Char('+') | KeyCode::Char('=') => {
			let hours = app.draft.sleep_hours + SLEEP_STEP_HOURS;
			app.draft.set_sleep_hours(hours);
		}
		KeyCode::Char('-') => {
			let hours = app.draft.sleep_hours - SLEEP_STEP_HOURS;
			app.draft.set_sleep_hours(hours);
		}
		KeyCode::Char('e') => {
			app.mode = InputMode::Prompt(PromptState::new("Entry title (optional)", PromptKind::EntryTitle));
		}
		KeyCode::Char('t') => {
			app.mode = InputMode::Prompt(PromptState::new(
				format!("Todo for {}", app.selected_day.format("%Y-%m-%d")),
				PromptKind::TodoText {
					date: app.selected_day,
				},
			));
		}
		KeyCode::Char('d') => {
			if app.focus != FocusPane::Timeline {
				app.status = "focus the timeline to delete".to_string();
			} else if let Some(entry) = view.timeline.get(app.timeline_index) {
				app.status = match store.delete_entry(entry.id) {
					Some(removed) => {
						let message = format!("deleted: {} (u to undo)", removed.display_title());
						app.undo = Some(removed);
						message
					}
					None => "entry already gone".to_string(),
				};
			}
		}
		KeyCode::Char('u') => {
			app.status = match app.undo.take() {
				Some(entry) if store.find(entry.id).is_some() => "entry is already present".to_string(),
				Some(entry) => {
					let message = format!("restored: {}", entry.display_title());
					store.restore_entry(entry);
					message
				}
				None => "nothing to undo".to_string(),
			};
		}
		KeyCode::Char('g') => {
			let added = store.generate_dummy(app.range_start, app.range_end);
			app.status = format!("generated {added} dummy entries");
		}
		KeyCode::Char('c') => {
			let removed = store.clear_test_data();
			app.undo = app.undo.take().filter(|entry| !entry.is_test);
			app.status = format!("removed {removed} test entries");
		}
		KeyCode::Char(' ') => {
			if app.focus == FocusPane::Todos {
				if let Some(todo) = view.todos.get(app.todo_index) {
					store.toggle_todo(todo.id);
				}
			}
		}
		_ => {}
	}

	false
}

fn handle_prompt_key(app: &mut App, code: KeyCode, store: &mut EntryStore) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				InputMode::Normal => return false,
			};

			match submit_prompt(prompt.clone(), app, store) {
				Ok(PromptOutcome::NextPrompt(next_prompt)) => app.mode = InputMode::Prompt(next_prompt),
				Ok(PromptOutcome::Done(message)) => {
					app.mode = InputMode::Normal;
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn submit_prompt(prompt: PromptState, app: &mut App, store: &mut EntryStore) -> Result<PromptOutcome, String> {
	match prompt.kind {
		PromptKind::EntryTitle => Ok(PromptOutcome::NextPrompt(PromptState::new(
			"Entry body (optional)",
			PromptKind::EntryBody {
				title: prompt.input.trim().to_string(),
			},
		))),
		PromptKind::EntryBody { title } => {
			let draft = std::mem::take(&mut app.draft);
			let id = store.add_entry(EntryDraft {
				title,
				body: prompt.input.trim().to_string(),
				..draft
			});
			info!(entry_id = id, "entry saved from dashboard");
			Ok(PromptOutcome::Done(format!("saved entry #{id}")))
		}
		PromptKind::TodoText { date } => {
			let text = required_text(&prompt.input, "todo text")?;
			store.add_todo(date, text);
			Ok(PromptOutcome::Done(format!("added todo for {}", date.format("%Y-%m-%d"))))
		}
	}
}

fn required_text(input: &str, field_name: &str) -> Result<String, String> {
	let value = input.trim();
	if value.is_empty() {
		Err(format!("{field_name} is required"))
	} else {
		Ok(value.to_string())
	}
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default()
			.fg(FOCUSED_PANEL_BORDER_COLOR)
			.add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

fn rgb(color: Rgba) -> Color {
	Color::Rgb(color.r, color.g, color.b)
}

fn build_view(app: &App, store: &EntryStore) -> ViewModel {
	let snapshot = store.entries();
	let timeline = snapshot.entries.iter().rev().cloned().collect();
	ViewModel {
		timeline,
		todos: store.todos_on(app.selected_day),
		snapshot,
	}
}

#[derive(Debug, Clone)]
enum PromptOutcome {
	NextPrompt(PromptState),
	Done(String),
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
	kind: PromptKind,
}

impl PromptState {
	fn new(title: impl Into<String>, kind: PromptKind) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
			kind,
		}
	}
}

#[derive(Debug, Clone)]
enum PromptKind {
	EntryTitle,
	EntryBody { title: String },
	TodoText { date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusPane {
	Timeline,
	Draft,
	Todos,
}

impl FocusPane {
	fn next(self) -> Self {
		match self {
			FocusPane::Timeline => FocusPane::Draft,
			FocusPane::Draft => FocusPane::Todos,
			FocusPane::Todos => FocusPane::Timeline,
		}
	}

	fn prev(self) -> Self {
		match self {
			FocusPane::Timeline => FocusPane::Todos,
			FocusPane::Draft => FocusPane::Timeline,
			FocusPane::Todos => FocusPane::Draft,
		}
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
}

#[derive(Debug, Clone)]
struct App {
	focus: FocusPane,
	chart_mode: ChartMode,
	range_start: NaiveDate,
	range_end: NaiveDate,
	selected_day: NaiveDate,
	timeline_index: usize,
	todo_index: usize,
	draft: EntryDraft,
	quick_emojis: Vec<String>,
	undo: Option<Entry>,
	mode: InputMode,
	status: String,
}

impl App {
	fn new(quick_emojis: Vec<String>) -> Self {
		let today = Local::now().date_naive();
		Self {
			focus: FocusPane::Timeline,
			chart_mode: ChartMode::Sleep,
			range_start: today - Duration::days(DEFAULT_RANGE_DAYS),
			range_end: today,
			selected_day: today,
			timeline_index: 0,
			todo_index: 0,
			draft: EntryDraft::default(),
			quick_emojis,
			undo: None,
			mode: InputMode::Normal,
			status: "Ready".to_string(),
		}
	}

	fn clamp_selection(&mut self, view: &ViewModel) {
		self.timeline_index = self.timeline_index.min(view.timeline.len().saturating_sub(1));
		self.todo_index = self.todo_index.min(view.todos.len().saturating_sub(1));
	}

	fn move_selection(&mut self, delta: i32, view: &ViewModel) {
		let (index, len) = match self.focus {
			FocusPane::Timeline => (&mut self.timeline_index, view.timeline.len()),
			FocusPane::Todos => (&mut self.todo_index, view.todos.len()),
			FocusPane::Draft => return,
		};

		if len == 0 {
			*index = 0;
		} else if delta > 0 {
			*index = (*index + delta as usize).min(len - 1);
		} else {
			*index = index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn shift_range(&mut self, start_days: i64, end_days: i64) {
		self.range_start += Duration::days(start_days);
		self.range_end += Duration::days(end_days);
		self.status = if self.range_end < self.range_start {
			"range is reversed: nothing to chart".to_string()
		} else {
			format!(
				"range {} - {}",
				self.range_start.format("%Y-%m-%d"),
				self.range_end.format("%Y-%m-%d")
			)
		};
	}

	fn shift_selected_day(&mut self, delta_days: i64) {
		self.selected_day += Duration::days(delta_days);
		self.todo_index = 0;
	}
}

struct ViewModel {
	timeline: Vec<Entry>,
	todos: Vec<TodoItem>,
	snapshot: EntriesSnapshot,
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};
	use crossterm::event::KeyCode;

	use crate::domain::EntryDraft;
	use crate::store::EntryStore;

	use super::{App, FocusPane, build_view, handle_normal_key};

	fn app() -> App {
		App::new(vec!["🙂".into(), "😀".into(), "😐".into(), "🙁".into(), "😢".into()])
	}

	#[test]
	fn delete_then_undo_restores_the_entry() {
		let mut store = EntryStore::new();
		store.add_entry_at(
			EntryDraft {
				title: "walk".to_string(),
				..EntryDraft::default()
			},
			Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
		);
		let mut app = app();

		let view = build_view(&app, &store);
		handle_normal_key(&mut app, KeyCode::Char('d'), &mut store, &view);
		assert!(store.entries().entries.is_empty());
		assert!(app.undo.is_some());

		let view = build_view(&app, &store);
		handle_normal_key(&mut app, KeyCode::Char('u'), &mut store, &view);
		assert_eq!(store.entries().entries.len(), 1);
		assert!(app.undo.is_none());
	}

	#[test]
	fn quick_emoji_keys_toggle_draft_moods() {
		let mut store = EntryStore::new();
		let mut app = app();
		let view = build_view(&app, &store);

		for key in ['1', '2', '3', '4'] {
			handle_normal_key(&mut app, KeyCode::Char(key), &mut store, &view);
		}
		assert_eq!(app.draft.mood_emojis.as_slice(), ["😀", "😐", "🙁"]);

		handle_normal_key(&mut app, KeyCode::Char('x'), &mut store, &view);
		assert!(app.draft.toggles.x);
	}

	#[test]
	fn delete_only_acts_on_a_focused_timeline() {
		let mut store = EntryStore::new();
		store.add_entry_at(EntryDraft::default(), Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
		let mut app = app();
		app.focus = FocusPane::Todos;

		let view = build_view(&app, &store);
		handle_normal_key(&mut app, KeyCode::Char('d'), &mut store, &view);
		assert_eq!(store.entries().entries.len(), 1);
		assert!(app.undo.is_none());

		app.focus = FocusPane::Timeline;
		handle_normal_key(&mut app, KeyCode::Char('d'), &mut store, &view);
		assert!(store.entries().entries.is_empty());
	}

	#[test]
	fn focus_cycles_through_panes() {
		let mut store = EntryStore::new();
		let mut app = app();
		let view = build_view(&app, &store);
		handle_normal_key(&mut app, KeyCode::Tab, &mut store, &view);
		assert_eq!(app.focus, FocusPane::Draft);
		handle_normal_key(&mut app, KeyCode::BackTab, &mut store, &view);
		assert_eq!(app.focus, FocusPane::Timeline);
	}
}
