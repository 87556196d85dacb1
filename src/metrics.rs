use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::chart::{ChartLayout, ChartMode, Viewport, layout_chart};
use crate::domain::{Channel, Entry};
use crate::store::EntriesSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAggregate {
    pub date: NaiveDate,
    pub sleep_avg: f32,
    pub mood_avg: Option<f32>,
    pub count_x: u32,
    pub count_y: u32,
    pub count_z: u32,
    pub count_w: u32,
}

impl DayAggregate {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_avg: 0.0,
            mood_avg: None,
            count_x: 0,
            count_y: 0,
            count_z: 0,
            count_w: 0,
        }
    }

    pub fn count(&self, channel: Channel) -> u32 {
        match channel {
            Channel::X => self.count_x,
            Channel::Y => self.count_y,
            Channel::Z => self.count_z,
            Channel::W => self.count_w,
        }
    }

    pub fn total(&self) -> u32 {
        self.count_x + self.count_y + self.count_z + self.count_w
    }
}

// Empty days still get a record; a reversed range yields nothing.
pub fn aggregate(entries: &[Entry], start: NaiveDate, end: NaiveDate) -> Vec<DayAggregate> {
    if end < start {
        return Vec::new();
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        let day = entry.local_day();
        if (start..=end).contains(&day) {
            by_day.entry(day).or_default().push(entry);
        }
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| match by_day.get(&day) {
            Some(day_entries) => aggregate_day(day, day_entries),
            None => DayAggregate::empty(day),
        })
        .collect()
}

fn aggregate_day(date: NaiveDate, entries: &[&Entry]) -> DayAggregate {
    let mut aggregate = DayAggregate::empty(date);
    if entries.is_empty() {
        return aggregate;
    }

    let sleep_sum: f64 = entries.iter().map(|entry| f64::from(entry.sleep_hours)).sum();
    aggregate.sleep_avg = (sleep_sum / entries.len() as f64) as f32;

    let ratings = entries
        .iter()
        .filter_map(|entry| entry.mood_rating)
        .map(f64::from)
        .collect::<Vec<_>>();
    if !ratings.is_empty() {
        aggregate.mood_avg = Some((ratings.iter().sum::<f64>() / ratings.len() as f64) as f32);
    }

    for entry in entries {
        aggregate.count_x += u32::from(entry.toggles.x);
        aggregate.count_y += u32::from(entry.toggles.y);
        aggregate.count_z += u32::from(entry.toggles.z);
        aggregate.count_w += u32::from(entry.toggles.w);
    }

    aggregate
}

pub fn average_sleep(days: &[DayAggregate]) -> Option<f32> {
    let slept = days
        .iter()
        .map(|day| day.sleep_avg)
        .filter(|sleep| *sleep > 0.0)
        .collect::<Vec<_>>();
    if slept.is_empty() {
        return None;
    }

    Some(slept.iter().sum::<f32>() / slept.len() as f32)
}

#[derive(Debug, Clone, PartialEq)]
struct PipelineKey {
    entries_version: u64,
    start: NaiveDate,
    end: NaiveDate,
    mode: ChartMode,
    viewport: Viewport,
}

#[derive(Debug, Default)]
pub struct MetricsPipeline {
    key: Option<PipelineKey>,
    days: Vec<DayAggregate>,
    layout: ChartLayout,
    recomputations: u64,
}

impl MetricsPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(
        &mut self,
        snapshot: &EntriesSnapshot,
        start: NaiveDate,
        end: NaiveDate,
        mode: ChartMode,
        viewport: Viewport,
    ) -> &ChartLayout {
        let key = PipelineKey {
            entries_version: snapshot.version,
            start,
            end,
            mode,
            viewport,
        };

        if self.key.as_ref() != Some(&key) {
            let data_changed = self.key.as_ref().is_none_or(|previous| {
                previous.entries_version != key.entries_version
                    || previous.start != start
                    || previous.end != end
            });
            if data_changed {
                self.days = aggregate(&snapshot.entries, start, end);
            }
            self.layout = layout_chart(&self.days, mode, &viewport);
            self.recomputations += 1;
            debug!(
                days = self.days.len(),
                primitives = self.layout.primitives.len(),
                %mode,
                "chart recomputed"
            );
            self.key = Some(key);
        }

        &self.layout
    }

    pub fn days(&self) -> &[DayAggregate] {
        &self.days
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

    use crate::chart::{ChartMode, Viewport};
    use crate::domain::{EntryDraft, MoodSelection, Toggles};
    use crate::store::EntryStore;

    use super::{MetricsPipeline, aggregate, average_sleep};

    fn local(day: u32, hour: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2026, 3, day, hour, 0, 0)
            .earliest()
            .expect("local time should exist")
            .with_timezone(&Utc)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn draft(sleep: f32, toggles: Toggles, moods: &[&str]) -> EntryDraft {
        EntryDraft {
            sleep_hours: sleep,
            toggles,
            mood_emojis: moods.iter().copied().collect::<MoodSelection>(),
            ..EntryDraft::default()
        }
    }

    #[test]
    fn groups_by_local_day_and_fills_gaps() {
        let mut store = EntryStore::new();
        let x = Toggles {
            x: true,
            ..Toggles::default()
        };
        let y = Toggles {
            y: true,
            ..Toggles::default()
        };
        store.add_entry_at(draft(8.0, x, &[]), local(1, 9));
        store.add_entry_at(draft(6.0, y, &[]), local(1, 22));
        store.add_entry_at(draft(7.0, Toggles::default(), &[]), local(3, 0));

        let days = aggregate(&store.entries().entries, date(1), date(3));
        assert_eq!(days.len(), 3);

        assert_eq!(days[0].date, date(1));
        assert_eq!(days[0].sleep_avg, 7.0);
        assert_eq!((days[0].count_x, days[0].count_y), (1, 1));
        assert_eq!((days[0].count_z, days[0].count_w), (0, 0));

        assert_eq!(days[1].date, date(2));
        assert_eq!(days[1].sleep_avg, 0.0);
        assert_eq!(days[1].mood_avg, None);
        assert_eq!(days[1].total(), 0);

        assert_eq!(days[2].sleep_avg, 7.0);
        assert_eq!(days[2].total(), 0);
    }

    #[test]
    fn mood_average_ignores_unrated_entries() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(7.0, Toggles::default(), &["😀"]), local(4, 8));
        store.add_entry_at(draft(7.0, Toggles::default(), &["😐"]), local(4, 12));
        store.add_entry_at(draft(7.0, Toggles::default(), &[]), local(4, 18));
        store.add_entry_at(draft(7.0, Toggles::default(), &["🔥"]), local(5, 18));

        let days = aggregate(&store.entries().entries, date(4), date(5));
        assert_eq!(days[0].mood_avg, Some(4.0));
        assert_eq!(days[1].mood_avg, None);
        assert_eq!(days[1].sleep_avg, 7.0);
    }

    #[test]
    fn covers_every_day_of_the_range() {
        let days = aggregate(&[], date(1), date(31));
        assert_eq!(days.len(), 31);
        assert!(days.windows(2).all(|pair| pair[0].date < pair[1].date));
        assert!(days.iter().all(|day| day.sleep_avg == 0.0 && day.mood_avg.is_none()));

        assert_eq!(aggregate(&[], date(5), date(5)).len(), 1);
    }

    #[test]
    fn reversed_range_is_empty() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(7.0, Toggles::default(), &[]), local(4, 8));
        assert!(aggregate(&store.entries().entries, date(9), date(1)).is_empty());
    }

    #[test]
    fn entries_outside_range_are_ignored() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(9.0, Toggles::default(), &[]), local(1, 8));
        store.add_entry_at(draft(5.0, Toggles::default(), &[]), local(10, 8));

        let days = aggregate(&store.entries().entries, date(2), date(9));
        assert!(days.iter().all(|day| day.sleep_avg == 0.0));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(6.5, Toggles::default(), &["🙂"]), local(2, 7));
        store.add_entry_at(draft(8.5, Toggles::default(), &["😢"]), local(2, 23));
        let snapshot = store.entries();

        assert_eq!(
            aggregate(&snapshot.entries, date(1), date(3)),
            aggregate(&snapshot.entries, date(1), date(3))
        );
    }

    #[test]
    fn average_sleep_skips_empty_days() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(6.0, Toggles::default(), &[]), local(1, 8));
        store.add_entry_at(draft(8.0, Toggles::default(), &[]), local(3, 8));

        let days = aggregate(&store.entries().entries, date(1), date(4));
        assert_eq!(average_sleep(&days), Some(7.0));
        assert_eq!(average_sleep(&aggregate(&[], date(1), date(4))), None);
    }

    #[test]
    fn pipeline_recomputes_only_on_change() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(6.0, Toggles::default(), &[]), local(1, 8));
        let viewport = Viewport::new(400.0, 260.0);
        let mut pipeline = MetricsPipeline::new();

        pipeline.refresh(&store.entries(), date(1), date(7), ChartMode::Sleep, viewport);
        pipeline.refresh(&store.entries(), date(1), date(7), ChartMode::Sleep, viewport);
        assert_eq!(pipeline.recomputations(), 1);
        assert_eq!(pipeline.days().len(), 7);

        pipeline.refresh(&store.entries(), date(1), date(7), ChartMode::Totals, viewport);
        assert_eq!(pipeline.recomputations(), 2);

        store.add_entry_at(draft(8.0, Toggles::default(), &[]), local(2, 8));
        pipeline.refresh(&store.entries(), date(1), date(7), ChartMode::Totals, viewport);
        assert_eq!(pipeline.recomputations(), 3);
        assert_eq!(pipeline.days()[1].sleep_avg, 8.0);

        pipeline.refresh(&store.entries(), date(1), date(3), ChartMode::Totals, viewport);
        assert_eq!(pipeline.days().len(), 3);
        assert_eq!(pipeline.layout().stacks.len(), 3);
    }

    #[test]
    fn todo_changes_do_not_trigger_recompute() {
        let mut store = EntryStore::new();
        store.add_entry_at(draft(6.0, Toggles::default(), &[]), local(1, 8));
        let viewport = Viewport::new(400.0, 260.0);
        let mut pipeline = MetricsPipeline::new();

        pipeline.refresh(&store.entries(), date(1), date(7), ChartMode::Mood, viewport);
        let todo = store.add_todo(date(1), "water plants");
        store.toggle_todo(todo);
        pipeline.refresh(&store.entries(), date(1), date(7), ChartMode::Mood, viewport);

        assert_eq!(pipeline.recomputations(), 1);
    }
}
