use serde::Serialize;

/// Pagination summary of a listing.
///
/// The all-zero value means "no matching records", which keeps it distinct
/// from a populated single-page result (`first_page == last_page == 1`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: u32,
    pub page_size: u32,
    pub first_page: u32,
    pub last_page: u32,
    pub total_records: u64,
}

impl Metadata {
    pub fn zero() -> Self {
        Self::default()
    }

    /// `page` and `page_size` are echoed back unclamped: a page past
    /// `last_page` is still reported as requested.
    pub fn compute(total_records: u64, page: u32, page_size: u32) -> Self {
        if total_records == 0 || page_size == 0 {
            return Self::zero();
        }
        let last_page = total_records.div_ceil(page_size as u64);
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            total_records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}
