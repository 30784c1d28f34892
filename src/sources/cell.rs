use calamine::{Data, DataType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Display format for date-time cells whose style carries no date tokens.
pub(crate) const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// `DATE_TIME_FORMAT` in the vocabulary of [`NaiveDateTime::format`].
const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a decoded cell the way it reads in a sheet. Date-times use [`DATE_TIME_FORMAT`].
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        Data::DateTime(dt) => match typed_date_time(cell) {
            Some(date_time) => date_time.format(DATE_TIME_PATTERN).to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(iso) => match typed_date_time(cell) {
            Some(date_time) => date_time.format(DATE_TIME_PATTERN).to_string(),
            None => iso.clone(),
        },
        other => other.to_string(),
    }
}

/// The calendar date-time of a cell the decoder typed as a date, if any.
pub(crate) fn typed_date_time(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) if !dt.is_duration() => dt.as_datetime(),
        Data::DateTimeIso(iso) => iso
            .parse::<NaiveDateTime>()
            .ok()
            .or_else(|| iso.parse::<NaiveDate>().ok().map(|date| date.and_time(NaiveTime::MIN))),
        _ => None,
    }
}

/// The date-time a date display format shows for a cell: typed dates, durations and serial
/// day numbers.
pub(crate) fn date_time_value(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime(),
        Data::Float(_) | Data::Int(_) => cell.as_datetime(),
        _ => typed_date_time(cell),
    }
}

pub(crate) fn is_empty(cell: &Data) -> bool {
    matches!(cell, Data::Empty)
}
