use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_MOOD_EMOJIS: usize = 3;
pub const MAX_SLEEP_HOURS: f32 = 14.0;
const DST_GAP_SEARCH_MINUTES: usize = 180;

pub const DUMMY_MOOD_POOL: [&str; 10] = ["🙂", "😀", "😐", "🙁", "😢", "😴", "🥰", "🤩", "😤", "🤯"];

const MOOD_RATINGS: [(&str, u8); 13] = [
    ("😀", 5),
    ("🤩", 5),
    ("🥰", 5),
    ("🙂", 4),
    ("😎", 4),
    ("😐", 3),
    ("🙁", 2),
    ("😤", 2),
    ("😢", 1),
    ("😵", 1),
    ("😴", 1),
    ("🤯", 1),
    ("😵‍💫", 1),
];

pub fn mood_rating_for(emoji: &str) -> Option<u8> {
    MOOD_RATINGS
        .iter()
        .find(|(candidate, _)| *candidate == emoji)
        .map(|(_, rating)| *rating)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    W,
    Z,
    Y,
    X,
}

impl Channel {
    pub const STACK_ORDER: [Channel; 4] = [Channel::W, Channel::Z, Channel::Y, Channel::X];

    pub fn label(self) -> &'static str {
        match self {
            Channel::X => "X",
            Channel::Y => "Y",
            Channel::Z => "Z",
            Channel::W => "W",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub w: bool,
}

impl Toggles {
    pub fn get(&self, channel: Channel) -> bool {
        match channel {
            Channel::X => self.x,
            Channel::Y => self.y,
            Channel::Z => self.z,
            Channel::W => self.w,
        }
    }

    pub fn flip(&mut self, channel: Channel) {
        let slot = match channel {
            Channel::X => &mut self.x,
            Channel::Y => &mut self.y,
            Channel::Z => &mut self.z,
            Channel::W => &mut self.w,
        };
        *slot = !*slot;
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z || self.w
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodSelection(Vec<String>);

impl MoodSelection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    // Reselecting removes; past the limit the oldest pick is evicted.
    pub fn select(&mut self, emoji: impl Into<String>) {
        let emoji = emoji.into();
        if let Some(index) = self.0.iter().position(|current| *current == emoji) {
            self.0.remove(index);
            return;
        }

        self.0.push(emoji);
        if self.0.len() > MAX_MOOD_EMOJIS {
            let overflow = self.0.len() - MAX_MOOD_EMOJIS;
            self.0.drain(..overflow);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, emoji: &str) -> bool {
        self.0.iter().any(|current| current == emoji)
    }

    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn rating(&self) -> Option<u8> {
        self.primary().and_then(mood_rating_for)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MoodSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = MoodSelection::new();
        for emoji in iter {
            selection.select(emoji);
        }
        selection
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub mood_emojis: MoodSelection,
    pub mood_rating: Option<u8>,
    pub toggles: Toggles,
    pub sleep_hours: f32,
    pub is_test: bool,
}

impl Entry {
    pub fn local_day(&self) -> NaiveDate {
        local_day_for_timestamp(self.created_at)
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub title: String,
    pub body: String,
    pub mood_emojis: MoodSelection,
    pub toggles: Toggles,
    pub sleep_hours: f32,
    pub is_test: bool,
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            mood_emojis: MoodSelection::new(),
            toggles: Toggles::default(),
            sleep_hours: 7.0,
            is_test: false,
        }
    }
}

impl EntryDraft {
    pub fn set_sleep_hours(&mut self, hours: f32) {
        self.sleep_hours = if hours.is_finite() {
            hours.clamp(0.0, MAX_SLEEP_HOURS)
        } else {
            0.0
        };
    }

    pub fn into_entry(self, id: u64, created_at: DateTime<Utc>) -> Entry {
        let mood_rating = self.mood_emojis.rating();
        Entry {
            id,
            created_at,
            title: self.title,
            body: self.body,
            mood_emojis: self.mood_emojis,
            mood_rating,
            toggles: self.toggles,
            sleep_hours: self.sleep_hours.max(0.0),
            is_test: self.is_test,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub date: NaiveDate,
    pub text: String,
    pub done: bool,
}

pub fn local_day_for_timestamp(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

pub fn local_day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN);
    local_naive_to_utc_resolved(midnight)
}

fn local_naive_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(local_datetime) => Some(local_datetime.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => Some(first.min(second).with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn local_naive_to_utc_resolved(naive: NaiveDateTime) -> DateTime<Utc> {
    resolve_forward(naive, local_naive_to_utc)
}

// Midnight can fall inside a DST gap; walk forward to the first valid minute.
fn resolve_forward(
    naive: NaiveDateTime,
    convert: impl Fn(NaiveDateTime) -> Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    let mut cursor = naive;
    for _ in 0..=DST_GAP_SEARCH_MINUTES {
        if let Some(timestamp) = convert(cursor) {
            return timestamp;
        }
        cursor += Duration::minutes(1);
    }

    Utc.from_utc_datetime(&naive)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

    use super::{Channel, EntryDraft, MoodSelection, Toggles, mood_rating_for, resolve_forward};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 29)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn fourth_emoji_evicts_the_oldest() {
        let mut moods = MoodSelection::new();
        moods.select("🙂");
        moods.select("😐");
        moods.select("😢");
        moods.select("🤩");

        assert_eq!(moods.as_slice().len(), 3);
        assert_eq!(moods.as_slice(), ["😐", "😢", "🤩"]);
    }

    #[test]
    fn reselecting_an_emoji_removes_it() {
        let mut moods: MoodSelection = ["🙂", "😐"].into_iter().collect();
        moods.select("🙂");
        assert_eq!(moods.as_slice(), ["😐"]);
        assert_eq!(moods.rating(), Some(3));
    }

    #[test]
    fn rating_uses_primary_emoji_and_is_absent_outside_table() {
        let moods: MoodSelection = ["😀", "😢"].into_iter().collect();
        assert_eq!(moods.rating(), Some(5));

        let unknown: MoodSelection = ["🔥"].into_iter().collect();
        assert_eq!(unknown.rating(), None);
        assert_eq!(MoodSelection::new().rating(), None);
        assert_eq!(mood_rating_for("😴"), Some(1));
    }

    #[test]
    fn draft_clamps_sleep_and_derives_rating() {
        let mut draft = EntryDraft::default();
        draft.set_sleep_hours(20.0);
        assert_eq!(draft.sleep_hours, 14.0);
        draft.set_sleep_hours(f32::NAN);
        assert_eq!(draft.sleep_hours, 0.0);

        draft.mood_emojis.select("🙁");
        let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let entry = draft.into_entry(4, created_at);
        assert_eq!(entry.id, 4);
        assert_eq!(entry.mood_rating, Some(2));
    }

    #[test]
    fn toggles_flip_per_channel() {
        let mut toggles = Toggles::default();
        toggles.flip(Channel::Z);
        assert!(toggles.get(Channel::Z));
        assert!(!toggles.get(Channel::X));
        assert!(toggles.any());
        assert_eq!(Channel::STACK_ORDER[0], Channel::W);
    }

    #[test]
    fn midnight_inside_a_gap_resolves_to_first_valid_minute() {
        // Wall-clock times before 00:30 do not exist in this zone.
        let gap_end = at(0, 30);
        let convert = |naive: NaiveDateTime| -> Option<DateTime<Utc>> {
            (naive >= gap_end).then(|| Utc.from_utc_datetime(&naive))
        };

        let resolved = resolve_forward(at(0, 0), convert);
        assert_eq!(resolved, Utc.from_utc_datetime(&gap_end));

        let direct = resolve_forward(at(6, 0), convert);
        assert_eq!(direct, Utc.from_utc_datetime(&at(6, 0)));
    }

    #[test]
    fn unresolvable_gap_falls_back_to_utc_reading() {
        let resolved = resolve_forward(at(0, 0), |_| None);
        assert_eq!(resolved, Utc.from_utc_datetime(&at(0, 0)));
    }
}
