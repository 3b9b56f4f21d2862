//! Typed cell values.
//!
//! A [`CellValue`] is what a row projects into one column. Values carry enough
//! type information to sort correctly (sizes compare as numbers, not as
//! "1.2 MB" strings) and to be rendered as plain text.

use std::cmp::Ordering;
use std::time::Duration;

/// A single cell value projected by a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value. Sorts before everything else.
    #[default]
    Empty,
    /// Free text (file names, host names).
    Text(String),
    /// A plain integer (counts, queue positions).
    Integer(i64),
    /// A plain floating point number.
    Float(f64),
    /// A size in bytes.
    Bytes(u64),
    /// A transfer rate in bytes per second.
    Rate(f64),
    /// Completion fraction in `0.0..=1.0`.
    Progress(f32),
    /// Estimated time remaining; `None` when it cannot be estimated.
    Remaining(Option<Duration>),
    /// A state label with an explicit sort rank.
    Status { rank: u16, label: String },
}

impl CellValue {
    /// Returns `true` if this is `CellValue::Empty`.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Create a status value.
    pub fn status(rank: u16, label: impl Into<String>) -> Self {
        CellValue::Status {
            rank,
            label: label.into(),
        }
    }

    /// Create a progress value, clamping into `0.0..=1.0`.
    ///
    /// A NaN fraction becomes `0.0`.
    pub fn progress(fraction: f32) -> Self {
        if fraction.is_nan() {
            return CellValue::Progress(0.0);
        }
        CellValue::Progress(fraction.clamp(0.0, 1.0))
    }

    /// Completion fraction for `done` out of `total`, or `Empty` when the
    /// total is unknown.
    pub fn progress_of(done: u64, total: u64) -> Self {
        if total == 0 {
            return CellValue::Empty;
        }
        Self::progress(done as f32 / total as f32)
    }

    /// Returns the text if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Integer` value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            CellValue::Empty => 0,
            CellValue::Integer(_) => 1,
            CellValue::Float(_) => 2,
            CellValue::Bytes(_) => 3,
            CellValue::Rate(_) => 4,
            CellValue::Progress(_) => 5,
            CellValue::Remaining(_) => 6,
            CellValue::Status { .. } => 7,
            CellValue::Text(_) => 8,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Values of the same kind compare naturally. Text compares
    /// case-insensitively first so "apple" and "Banana" sort as a user
    /// expects. An unknown remaining time sorts after every known one. Values
    /// of different kinds order by kind, with `Empty` first.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Text(a), CellValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::Bytes(a), CellValue::Bytes(b)) => a.cmp(b),
            (CellValue::Rate(a), CellValue::Rate(b)) => a.total_cmp(b),
            (CellValue::Progress(a), CellValue::Progress(b)) => a.total_cmp(b),
            (CellValue::Remaining(a), CellValue::Remaining(b)) => match (a, b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (
                CellValue::Status { rank: a, label: la },
                CellValue::Status { rank: b, label: lb },
            ) => a.cmp(b).then_with(|| la.cmp(lb)),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// Plain-text rendering of the value.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Float(n) => format!("{n:.2}"),
            CellValue::Bytes(n) => format_bytes(*n),
            CellValue::Rate(r) => format!("{}/s", format_bytes(r.max(0.0) as u64)),
            CellValue::Progress(p) => format!("{}%", (p * 100.0).floor() as u32),
            CellValue::Remaining(Some(d)) => format_duration(*d),
            CellValue::Remaining(None) => String::new(),
            CellValue::Status { label, .. } => label.clone(),
        }
    }
}

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Humanized byte size using binary multiples ("1.5 MB").
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// `H:MM:SS` for durations of an hour or more, `M:SS` otherwise.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_ordering() {
        assert_eq!(CellValue::Integer(1).compare(&CellValue::Integer(2)), Ordering::Less);
        assert_eq!(CellValue::Bytes(10).compare(&CellValue::Bytes(10)), Ordering::Equal);
        assert_eq!(
            CellValue::from("apple").compare(&CellValue::from("Banana")),
            Ordering::Less
        );
    }

    #[test]
    fn test_empty_sorts_first() {
        assert_eq!(CellValue::Empty.compare(&CellValue::Integer(-5)), Ordering::Less);
        assert_eq!(CellValue::from("a").compare(&CellValue::Empty), Ordering::Greater);
    }

    #[test]
    fn test_unknown_remaining_sorts_last() {
        let known = CellValue::Remaining(Some(Duration::from_secs(3600)));
        let unknown = CellValue::Remaining(None);
        assert_eq!(known.compare(&unknown), Ordering::Less);
    }

    #[test]
    fn test_status_orders_by_rank() {
        let a = CellValue::status(1, "Zeta");
        let b = CellValue::status(2, "Alpha");
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(CellValue::progress(1.7), CellValue::Progress(1.0));
        assert_eq!(CellValue::progress(f32::NAN), CellValue::Progress(0.0));
        assert_eq!(CellValue::progress_of(5, 0), CellValue::Empty);
        assert_eq!(CellValue::progress_of(1, 4), CellValue::Progress(0.25));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Bytes(512).display_text(), "512 B");
        assert_eq!(CellValue::Bytes(1536).display_text(), "1.5 KB");
        assert_eq!(CellValue::Rate(2048.0).display_text(), "2.0 KB/s");
        assert_eq!(CellValue::Progress(0.426).display_text(), "42%");
        assert_eq!(
            CellValue::Remaining(Some(Duration::from_secs(3723))).display_text(),
            "1:02:03"
        );
        assert_eq!(CellValue::Remaining(Some(Duration::from_secs(65))).display_text(), "1:05");
        assert_eq!(CellValue::Empty.display_text(), "");
    }
}
