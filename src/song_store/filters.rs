//! Sorting and pagination parameters of a song listing.

use super::validation::{ValidationError, ValidationErrors, Validator};

/// Sort keys accepted by the listing endpoint. A leading `-` means
/// descending order.
pub const SORT_SAFELIST: &[&str] = &["id", "group", "name", "-id", "-group", "-name"];

pub const MAX_PAGE: u32 = 10_000_000;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Defaults and bounds applied when parsing raw listing parameters.
#[derive(Clone, Debug)]
pub struct FilterRules {
    pub sort_safelist: &'static [&'static str],
    pub default_sort: &'static str,
    pub default_page_size: u32,
    pub max_page: u32,
    pub max_page_size: u32,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            sort_safelist: SORT_SAFELIST,
            default_sort: "id",
            default_page_size: 20,
            max_page: MAX_PAGE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Columns a listing can be ordered by. Only these identifiers are ever
/// interpolated into SQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Group,
    Title,
}

impl SortColumn {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(SortColumn::Id),
            "group" => Some(SortColumn::Group),
            "name" => Some(SortColumn::Title),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Group => "group_name",
            SortColumn::Title => "title",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parses an optional positive integer in `1..=max`. Missing or empty
/// input yields `default`; anything else invalid is recorded on `field`.
pub(crate) fn parse_bounded(
    v: &mut Validator,
    field: &'static str,
    raw: Option<&str>,
    default: u32,
    max: u32,
) -> u32 {
    match raw {
        None | Some("") => default,
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) if n >= 1 && n <= max as u64 => n as u32,
            Ok(0) | Err(_) => {
                v.add_error(field, ValidationError::NotPositiveInteger);
                default
            }
            Ok(_) => {
                v.add_error(
                    field,
                    ValidationError::OutOfRange {
                        min: 1,
                        max: max as u64,
                    },
                );
                default
            }
        },
    }
}

/// A validated listing request: which page, how big, in which order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    page: u32,
    page_size: u32,
    sort: String,
    sort_column: SortColumn,
    sort_direction: SortDirection,
}

impl FilterSpec {
    /// Builds the listing parameters from raw query-string values.
    ///
    /// Every invalid parameter is reported, keyed by `page`, `page_size`
    /// or `sort`.
    pub fn parse(
        rules: &FilterRules,
        page: Option<&str>,
        page_size: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();

        let page = parse_bounded(&mut v, "page", page, 1, rules.max_page);
        let page_size = parse_bounded(
            &mut v,
            "page_size",
            page_size,
            rules.default_page_size,
            rules.max_page_size,
        );

        let sort = match sort {
            None | Some("") => rules.default_sort,
            Some(sort) => sort,
        };
        let parsed_sort = if rules.sort_safelist.iter().any(|allowed| *allowed == sort) {
            let (key, direction) = match sort.strip_prefix('-') {
                Some(key) => (key, SortDirection::Desc),
                None => (sort, SortDirection::Asc),
            };
            SortColumn::from_key(key).map(|column| (column, direction))
        } else {
            None
        };
        if parsed_sort.is_none() {
            v.add_error("sort", ValidationError::NotInSafelist);
        }

        v.finish()?;
        let (sort_column, sort_direction) =
            parsed_sort.unwrap_or((SortColumn::Id, SortDirection::Asc));
        Ok(Self {
            page,
            page_size,
            sort: sort.to_string(),
            sort_column,
            sort_direction,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn sort_column(&self) -> SortColumn {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: FilterRules::default().default_page_size,
            sort: "id".to_string(),
            sort_column: SortColumn::Id,
            sort_direction: SortDirection::Asc,
        }
    }
}
