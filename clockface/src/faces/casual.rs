//! A face that phrases the time the way people say it.

use super::TimeFormatter;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

const HOUR_WORDS: [&str; 12] = [
    "twelve", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven",
];

/// Human-phrased time, rounded to the nearest five minutes.
///
/// Examples: "half past\nten", "quarter to\neleven", "nine\no'clock",
/// "noon", "midnight". The varying line counts are intentional; they
/// exercise the widget's line-budget handling.
pub struct CasualFace;

impl TimeFormatter for CasualFace {
    fn format(&self, instant: DateTime<Utc>, zone: Tz) -> String {
        let local = instant.with_timezone(&zone);
        let nearest = (local.minute() + 2) / 5 * 5;
        let (minute, carry) = if nearest == 60 { (0, 1) } else { (nearest, 0) };
        let hour = local.hour() + carry;

        match minute {
            0 => match hour % 24 {
                0 => "midnight".to_string(),
                12 => "noon".to_string(),
                h => format!("{}\no'clock", hour_word(h)),
            },
            m @ 5..=30 => format!("{} past\n{}", minute_word(m), hour_word(hour)),
            m => format!("{} to\n{}", minute_word(60 - m), hour_word(hour + 1)),
        }
    }
}

fn hour_word(hour: u32) -> &'static str {
    HOUR_WORDS[(hour % 12) as usize]
}

fn minute_word(minute: u32) -> &'static str {
    match minute {
        5 => "five",
        10 => "ten",
        15 => "quarter",
        20 => "twenty",
        25 => "twenty-five",
        _ => "half",
    }
}
