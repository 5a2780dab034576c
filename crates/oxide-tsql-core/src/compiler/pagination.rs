//! Pagination strategy.
//!
//! This dialect has no trailing LIMIT/OFFSET. A plain limit becomes a
//! leading `TOP n`; an offset becomes the `OFFSET ... ROWS` clause on 2012+
//! engines and a ROW_NUMBER() wrapper on older ones.

use crate::capability::Capabilities;

/// The row-window rendering chosen for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowWindow {
    /// No limiting at all.
    All,
    /// `TOP n` immediately after the leading keyword.
    Top(u64),
    /// Native trailing `OFFSET ... ROWS [FETCH FIRST ... ROWS ONLY]`.
    OffsetFetch {
        /// Rows to skip.
        skip: u64,
        /// Rows to fetch; `None` means "no maximum".
        fetch: Option<u64>,
    },
    /// ROW_NUMBER() emulation wrapping the statement in a derived table.
    Emulated {
        /// 0-based first row index.
        low: u64,
        /// Exclusive upper bound, when limited.
        high: Option<u64>,
    },
}

impl RowWindow {
    /// Returns whether the emulated strategy was chosen.
    pub(crate) const fn is_emulated(&self) -> bool {
        matches!(self, Self::Emulated { .. })
    }
}

/// Decides the row-window strategy for the given marks.
pub(crate) fn plan(low_mark: u64, high_mark: Option<u64>, caps: &Capabilities) -> RowWindow {
    match (low_mark, high_mark) {
        (0, None) => RowWindow::All,
        (0, Some(high)) => RowWindow::Top(high),
        (low, high) => {
            if caps.supports_offset_fetch {
                RowWindow::OffsetFetch {
                    skip: low,
                    fetch: high.map(|h| h - low),
                }
            } else {
                RowWindow::Emulated { low, high }
            }
        }
    }
}
