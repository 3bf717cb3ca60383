use chrono::{Timelike, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Time-of-day label derived from the local wall-clock hour.
///
/// The rendered pages put this label on the `<body>` element as its sole
/// class attribute so the stylesheet can swap palettes through the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLabel {
    Morning,
    Day,
    Evening,
    Night,
}

impl TimeLabel {
    /// Map an hour in [0,23] to a label.
    ///
    /// Ranges are inclusive on the lower bound, exclusive on the upper:
    /// [5,12) morning, [12,17) day, [17,21) evening, everything else night.
    pub fn from_hour(hour: u32) -> TimeLabel {
        match hour {
            5..=11 => TimeLabel::Morning,
            12..=16 => TimeLabel::Day,
            17..=20 => TimeLabel::Evening,
            _ => TimeLabel::Night,
        }
    }

    /// Label for the current wall-clock hour in the given timezone
    pub fn current(tz: Tz) -> TimeLabel {
        TimeLabel::from_hour(Utc::now().with_timezone(&tz).hour())
    }

    /// CSS class name written to the page body
    pub fn css_class(self) -> &'static str {
        match self {
            TimeLabel::Morning => "morning",
            TimeLabel::Day => "day",
            TimeLabel::Evening => "evening",
            TimeLabel::Night => "night",
        }
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}
