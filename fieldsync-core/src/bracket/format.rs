//! Structural rules of each playoff format.

use fieldsync_sdk::objects::{Color, CompLevel, PlayoffFormat, SeriesKey};

/// How many series a level holds under `format`.
///
/// `Some(0)` means the level does not exist in the format; `None` means the
/// format places no bound on set numbers.
pub fn series_count(format: PlayoffFormat, level: CompLevel) -> Option<u16> {
    let counts: [u16; 4] = match format {
        PlayoffFormat::Custom if level == CompLevel::Qual => return Some(0),
        PlayoffFormat::Custom => return None,
        // [eighth, quarter, semi, final]
        PlayoffFormat::Bracket16Team => [8, 4, 2, 1],
        PlayoffFormat::Bracket8Team => [0, 4, 2, 1],
        PlayoffFormat::Bracket4Team => [0, 0, 2, 1],
        PlayoffFormat::Bracket2Team => [0, 0, 0, 1],
    };
    Some(match level {
        CompLevel::Qual => 0,
        CompLevel::Eighth => counts[0],
        CompLevel::Quarter => counts[1],
        CompLevel::Semi => counts[2],
        CompLevel::Final => counts[3],
    })
}

/// Whether `series` can exist under `format`.
pub fn is_valid_series(format: PlayoffFormat, series: SeriesKey) -> bool {
    if series.set_number == 0 {
        return false;
    }
    match series_count(format, series.comp_level) {
        None => true,
        Some(count) => series.set_number <= count,
    }
}

/// Where the winner of `series` plays next: the series it feeds and the
/// color it takes there. Odd sets fill the red slot, even sets the blue slot.
pub fn advancement_target(format: PlayoffFormat, series: SeriesKey) -> Option<(SeriesKey, Color)> {
    if !is_valid_series(format, series) {
        return None;
    }
    let next = SeriesKey::new(series.comp_level.next()?, series.set_number.div_ceil(2));
    if !is_valid_series(format, next) {
        return None;
    }
    let color = if series.set_number % 2 == 1 {
        Color::Red
    } else {
        Color::Blue
    };
    Some((next, color))
}
