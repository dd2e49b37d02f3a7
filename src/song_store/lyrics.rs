//! Verse pagination of stored lyric text.

use super::filters::{parse_bounded, MAX_PAGE, MAX_PAGE_SIZE};
use super::validation::{ValidationError, ValidationErrors, Validator};

/// Verses are separated by a blank line.
pub const VERSE_DELIMITER: &str = "\n\n";

/// A validated (page, verses-per-page) pair. Both are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LyricsPage {
    page: u32,
    size: u32,
}

impl LyricsPage {
    pub fn new(page: u32, size: u32) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        v.check(page >= 1, "page", ValidationError::NotPositiveInteger);
        v.check(size >= 1, "size", ValidationError::NotPositiveInteger);
        v.finish()?;
        Ok(Self { page, size })
    }

    /// Parses raw query-string values; missing values default to the first
    /// page with one verse.
    pub fn parse(page: Option<&str>, size: Option<&str>) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let page = parse_bounded(&mut v, "page", page, 1, MAX_PAGE);
        let size = parse_bounded(&mut v, "size", size, 1, MAX_PAGE_SIZE);
        v.finish()?;
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Default for LyricsPage {
    fn default() -> Self {
        Self { page: 1, size: 1 }
    }
}

/// Returns the verses of `text` that fall on the requested page, in order
/// of appearance. A page past the last verse is empty, not an error.
pub fn paginate_verses<'a>(text: &'a str, page: &LyricsPage) -> Vec<&'a str> {
    let start = (page.page as usize - 1).saturating_mul(page.size as usize);
    text.split(VERSE_DELIMITER)
        .skip(start)
        .take(page.size as usize)
        .collect()
}
