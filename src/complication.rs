//! Complication data as delivered by providers, and the slots holding it.

use std::fmt::Display;

use chrono::{DateTime, Datelike, Local, TimeZone};
use debug_print::debug_println;
use serde::{Deserialize, Serialize};

use crate::{
    log,
    style::{AssetRef, ComplicationKind, COMPLICATION_COUNT},
};

/// Host identifier of a complication slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl SlotId {
    pub const FIRST: SlotId = SlotId(101);
    pub const SECOND: SlotId = SlotId(102);
    pub const THIRD: SlotId = SlotId(103);

    pub const ALL: [SlotId; COMPLICATION_COUNT] = [SlotId::FIRST, SlotId::SECOND, SlotId::THIRD];

    pub fn index(self) -> Option<usize> {
        SlotId::ALL.iter().position(|slot| *slot == self)
    }

    pub fn from_index(index: usize) -> Option<SlotId> {
        SlotId::ALL.get(index).copied()
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifferenceFormat {
    /// `D:H`
    DaysHours,
    /// `M:S`, what's left after the whole hours.
    MinutesSeconds,
}

/// Text that is either fixed or computed from the frame time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplicationText {
    Plain(String),
    TimeDifference {
        target_ms: i64,
        format: DifferenceFormat,
    },
}

const SECONDS_IN_DAY: i64 = 86_400;

impl ComplicationText {
    pub fn plain(text: &str) -> Self {
        ComplicationText::Plain(text.to_string())
    }

    pub fn text(&self, now_ms: i64) -> String {
        match self {
            ComplicationText::Plain(text) => text.clone(),
            ComplicationText::TimeDifference { target_ms, format } => {
                let diff = (target_ms - now_ms).max(0) / 1000;
                let in_day = diff % SECONDS_IN_DAY;
                match format {
                    DifferenceFormat::DaysHours => {
                        format!("{}:{}", diff / SECONDS_IN_DAY, in_day / 3600)
                    }
                    DifferenceFormat::MinutesSeconds => {
                        format!("{}:{}", (in_day / 60) % 60, in_day % 60)
                    }
                }
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangedValue {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl RangedValue {
    /// Share of the range covered by `value`, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplicationData {
    pub kind: ComplicationKind,
    pub short_text: Option<ComplicationText>,
    pub short_title: Option<ComplicationText>,
    pub long_text: Option<ComplicationText>,
    pub long_title: Option<ComplicationText>,
    pub icon: Option<AssetRef>,
    pub small_image: Option<AssetRef>,
    pub large_image: Option<AssetRef>,
    pub ranged: Option<RangedValue>,
    pub tap_action: Option<String>,
}

impl ComplicationData {
    pub fn new(kind: ComplicationKind) -> Self {
        Self {
            kind,
            short_text: None,
            short_title: None,
            long_text: None,
            long_title: None,
            icon: None,
            small_image: None,
            large_image: None,
            ranged: None,
            tap_action: None,
        }
    }

    pub fn short_text(mut self, text: ComplicationText) -> Self {
        self.short_text = Some(text);
        self
    }

    pub fn short_title(mut self, title: ComplicationText) -> Self {
        self.short_title = Some(title);
        self
    }

    pub fn long_text(mut self, text: ComplicationText) -> Self {
        self.long_text = Some(text);
        self
    }

    /// Long title, falling back to the short one.
    pub fn title(&self) -> Option<&ComplicationText> {
        self.long_title.as_ref().or(self.short_title.as_ref())
    }
}

/// Latest data per slot. Updates simply replace what was there.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComplicationSlots {
    data: [Option<ComplicationData>; COMPLICATION_COUNT],
}

impl ComplicationSlots {
    /// Returns `false` for an unknown slot id.
    pub fn update(&mut self, slot: SlotId, data: Option<ComplicationData>) -> bool {
        let Some(index) = slot.index() else {
            println!("{} Ignoring data for unknown slot {}", log::WARN, slot);
            return false;
        };
        debug_println!(
            "{} slot {} <- {:?}",
            log::COMPLICATION,
            slot,
            data.as_ref().map(|data| data.kind)
        );
        self.data[index] = data;
        true
    }

    pub fn get(&self, index: usize) -> Option<&ComplicationData> {
        self.data.get(index).and_then(Option::as_ref)
    }
}

/// Source of complication data, asked for a specific kind.
pub trait ComplicationProvider: Send {
    fn name(&self) -> &str;

    /// Whether `update` can ever answer for `kind`.
    fn serves(&self, kind: ComplicationKind) -> bool;

    fn update(&mut self, kind: ComplicationKind, now: DateTime<Local>) -> Option<ComplicationData>;
}

/// Counts down to the next October 31st.
pub struct DaysToEndProvider;

impl DaysToEndProvider {
    pub const NAME: &'static str = "days_to_end";

    /// Midnight on October 31st, this year or next once it's November.
    pub fn target(now: DateTime<Local>) -> Option<DateTime<Local>> {
        let year = if now.month() > 10 { now.year() + 1 } else { now.year() };
        Local.with_ymd_and_hms(year, 10, 31, 0, 0, 0).earliest()
    }
}

impl ComplicationProvider for DaysToEndProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn serves(&self, kind: ComplicationKind) -> bool {
        kind == ComplicationKind::ShortText
    }

    fn update(&mut self, kind: ComplicationKind, now: DateTime<Local>) -> Option<ComplicationData> {
        if !self.serves(kind) {
            return None;
        }
        let target_ms = Self::target(now)?.timestamp_millis();
        Some(
            ComplicationData::new(ComplicationKind::ShortText)
                .short_text(ComplicationText::TimeDifference {
                    target_ms,
                    format: DifferenceFormat::DaysHours,
                })
                .short_title(ComplicationText::TimeDifference {
                    target_ms,
                    format: DifferenceFormat::MinutesSeconds,
                }),
        )
    }
}

pub const QUOTES: [&str; 5] = [
    "Every living creature on earth dies alone.",
    "Why are you wearing that stupid bunny suit?",
    "I hope that when the world comes to an end, I can breathe a sigh of relief.",
    "Time is running out.",
    "Deus ex machina. Our saviour.",
];

/// Long text quotes, a different one on every update.
#[derive(Default)]
pub struct QuoteProvider {
    next: usize,
}

impl QuoteProvider {
    pub const NAME: &'static str = "quote";
}

impl ComplicationProvider for QuoteProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn serves(&self, kind: ComplicationKind) -> bool {
        kind == ComplicationKind::LongText
    }

    fn update(&mut self, kind: ComplicationKind, _now: DateTime<Local>) -> Option<ComplicationData> {
        if !self.serves(kind) {
            return None;
        }
        let quote = QUOTES[self.next % QUOTES.len()];
        self.next = self.next.wrapping_add(1);
        Some(ComplicationData::new(ComplicationKind::LongText).long_text(ComplicationText::plain(quote)))
    }
}

/// Looks up one of the bundled providers by name.
pub fn provider_by_name(name: &str) -> Option<Box<dyn ComplicationProvider>> {
    match name {
        DaysToEndProvider::NAME => Some(Box::new(DaysToEndProvider)),
        QuoteProvider::NAME => Some(Box::new(QuoteProvider::default())),
        _ => None,
    }
}
