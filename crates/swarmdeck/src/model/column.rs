//! Static column declarations.

use std::cmp::Ordering;

use super::cell::CellValue;

/// Custom comparator for a column's values.
pub type CellComparator = fn(&CellValue, &CellValue) -> Ordering;

/// Declaration of one table column.
///
/// Column specs are declared once per row type as a `&'static [ColumnSpec]`;
/// they are a capability of the row type, never of a row instance.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Stable identifier, used by settings files (`hidden_columns = ["speed"]`).
    pub id: &'static str,
    /// Header title.
    pub title: &'static str,
    /// Whether the value may change between refreshes.
    pub dynamic: bool,
    /// Whether the rendered text may be clipped and so needs a tooltip.
    pub clippable: bool,
    /// Initial width in pixels.
    pub default_width: f32,
    /// Whether the column is shown when no settings say otherwise.
    pub visible_by_default: bool,
    /// Comparator override; `None` uses [`CellValue::compare`].
    pub comparator: Option<CellComparator>,
}

impl ColumnSpec {
    /// A static, non-clippable, visible column 100px wide.
    pub const fn new(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            dynamic: false,
            clippable: false,
            default_width: 100.0,
            visible_by_default: true,
            comparator: None,
        }
    }

    pub const fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub const fn clippable(mut self) -> Self {
        self.clippable = true;
        self
    }

    pub const fn width(mut self, width: f32) -> Self {
        self.default_width = width;
        self
    }

    pub const fn hidden_by_default(mut self) -> Self {
        self.visible_by_default = false;
        self
    }

    pub const fn with_comparator(mut self, comparator: CellComparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Compare two values of this column.
    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        match self.comparator {
            Some(compare) => compare(a, b),
            None => a.compare(b),
        }
    }
}

/// Find a column's index by its id.
pub fn column_index(columns: &[ColumnSpec], id: &str) -> Option<usize> {
    columns.iter().position(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnSpec] = &[
        ColumnSpec::new("name", "Name").clippable().width(240.0),
        ColumnSpec::new("speed", "Speed").dynamic(),
        ColumnSpec::new("host", "Host").hidden_by_default(),
    ];

    #[test]
    fn test_builder_flags() {
        assert!(COLUMNS[0].clippable);
        assert!(!COLUMNS[0].dynamic);
        assert_eq!(COLUMNS[0].default_width, 240.0);
        assert!(COLUMNS[1].dynamic);
        assert!(!COLUMNS[2].visible_by_default);
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index(COLUMNS, "speed"), Some(1));
        assert_eq!(column_index(COLUMNS, "missing"), None);
    }

    #[test]
    fn test_custom_comparator() {
        fn reversed(a: &CellValue, b: &CellValue) -> Ordering {
            b.compare(a)
        }
        let column = ColumnSpec::new("n", "N").with_comparator(reversed);
        assert_eq!(
            column.compare(&CellValue::Integer(1), &CellValue::Integer(2)),
            Ordering::Greater
        );
    }
}
