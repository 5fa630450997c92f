//! Shared types for the key-value scan protocol.

/// Position token for paged key scans.
///
/// A scan begins at [`ScanCursor::START`] and continues with whatever cursor
/// the previous page handed back. A completed scan hands back no cursor at
/// all ([`ScanPage::next_cursor`] is `None`), so "done" and "start over" have
/// distinct representations and can never be confused at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanCursor(u64);

impl ScanCursor {
    /// The cursor that begins an iteration.
    pub const START: Self = Self(0);

    /// Wraps a raw backend cursor.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw backend cursor value.
    #[must_use]
    pub fn into_raw(self) -> u64 {
        self.0
    }
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::START
    }
}

/// One page of a key scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next page, or `None` when the scan is complete.
    pub next_cursor: Option<ScanCursor>,
    /// Keys matched in this page. May be empty even mid-scan.
    pub keys: Vec<String>,
}

impl ScanPage {
    /// A final page with no keys.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            next_cursor: None,
            keys: Vec::new(),
        }
    }
}
