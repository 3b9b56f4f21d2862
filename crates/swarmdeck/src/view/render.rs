//! Pure cell rendering descriptions and the clipping tooltip policy.
//!
//! Nothing here holds state. A toolkit backend turns a [`CellDescription`]
//! into pixels; this module only decides *what* a cell shows.

use unicode_segmentation::UnicodeSegmentation;

use crate::model::{CellValue, ColumnSpec};

/// Text placed at the end of truncated cell text.
pub const ELLIPSIS: &str = "...";

/// Horizontal alignment of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Visual state of a cell at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellState {
    pub selected: bool,
    pub hovered: bool,
    /// The row is inactive (finished, aborted); drawn dimmed.
    pub inactive: bool,
}

/// Foreground treatment of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Normal,
    Highlighted,
    Dimmed,
}

/// Everything a backend needs to draw one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDescription {
    pub text: String,
    pub alignment: Alignment,
    /// Fill fraction when the cell draws a progress bar.
    pub progress: Option<f32>,
    pub tone: Tone,
    /// Truncate with an ellipsis instead of cutting the text off.
    pub elide: bool,
}

/// Describe how to draw `value` in `column`.
pub fn describe_cell(value: &CellValue, column: &ColumnSpec, state: CellState) -> CellDescription {
    let alignment = match value {
        CellValue::Integer(_)
        | CellValue::Float(_)
        | CellValue::Bytes(_)
        | CellValue::Rate(_)
        | CellValue::Remaining(_) => Alignment::Right,
        CellValue::Progress(_) => Alignment::Center,
        CellValue::Empty | CellValue::Text(_) | CellValue::Status { .. } => Alignment::Left,
    };
    let progress = match value {
        CellValue::Progress(p) => Some(*p),
        _ => None,
    };
    let tone = if state.selected {
        Tone::Highlighted
    } else if state.inactive {
        Tone::Dimmed
    } else {
        Tone::Normal
    };
    CellDescription {
        text: value.display_text(),
        alignment,
        progress,
        tone,
        elide: column.clippable,
    }
}

/// Measures rendered text width.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f32;
}

/// Width estimate of grapheme count times an average advance.
///
/// Good enough for tooltip decisions when no font system is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphemeMetrics {
    pub average_advance: f32,
    /// Horizontal padding inside a cell, both sides combined.
    pub padding: f32,
}

impl Default for GraphemeMetrics {
    fn default() -> Self {
        Self {
            average_advance: 7.0,
            padding: 8.0,
        }
    }
}

impl TextMeasure for GraphemeMetrics {
    fn text_width(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        text.graphemes(true).count() as f32 * self.average_advance + self.padding
    }
}

/// The tooltip for a cell, if its text is clipped.
///
/// Only clippable columns get a tooltip, and only when `width` is smaller
/// than the rendered width of `text`. The tooltip is the untruncated text.
pub fn clipped_tooltip(
    text: &str,
    column: &ColumnSpec,
    width: f32,
    measure: &dyn TextMeasure,
) -> Option<String> {
    if !column.clippable || text.is_empty() {
        return None;
    }
    (measure.text_width(text) > width).then(|| text.to_owned())
}

/// Truncate `text` on a grapheme boundary so that it fits `width` with a
/// trailing [`ELLIPSIS`].
pub fn elide_right(text: &str, width: f32, measure: &dyn TextMeasure) -> String {
    if measure.text_width(text) <= width {
        return text.to_owned();
    }
    let boundaries: Vec<usize> = text
        .grapheme_indices(true)
        .map(|(i, _)| i)
        .skip(1)
        .chain(std::iter::once(text.len()))
        .collect();

    // Binary search for the longest prefix that fits.
    let mut low = 0;
    let mut high = boundaries.len();
    while low < high {
        let mid = (low + high).div_ceil(2);
        let candidate = format!("{}{ELLIPSIS}", &text[..boundaries[mid - 1]]);
        if measure.text_width(&candidate) <= width {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    if low == 0 {
        ELLIPSIS.to_owned()
    } else {
        format!("{}{ELLIPSIS}", &text[..boundaries[low - 1]])
    }
}
