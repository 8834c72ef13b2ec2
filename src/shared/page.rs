//! Paging and sorting for list endpoints
//!
//! Query strings look like `?page=0&size=10&sort=id&direction=ASC`. Every
//! parameter is optional. `direction` is `ASC` (case-insensitive) or anything
//! else, which means descending. `sort` is checked against the fields the
//! entity actually has so it can be used as a column name safely.

use serde::Deserialize;

use crate::shared::error::SharedError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Raw paging parameters as they arrive in the query string
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_sort() -> String {
    "id".to_string()
}

fn default_direction() -> String {
    "ASC".to_string()
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_size(),
            sort: default_sort(),
            direction: default_direction(),
        }
    }
}

/// Sortable entity fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Name,
    Email,
    Description,
    Version,
    CreatedDate,
    ModifiedDate,
}

impl SortField {
    /// Fields a permission listing may be sorted by
    pub const PERMISSION: &'static [SortField] = &[
        SortField::Id,
        SortField::Name,
        SortField::Description,
        SortField::Version,
        SortField::CreatedDate,
        SortField::ModifiedDate,
    ];

    /// Fields a user listing may be sorted by
    pub const USER: &'static [SortField] = &[
        SortField::Id,
        SortField::Name,
        SortField::Email,
        SortField::Version,
        SortField::CreatedDate,
        SortField::ModifiedDate,
    ];

    /// Parse the JSON field name used by clients
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" | "_id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "description" => Some(Self::Description),
            "version" => Some(Self::Version),
            "createdDate" => Some(Self::CreatedDate),
            "modifiedDate" => Some(Self::ModifiedDate),
            _ => None,
        }
    }

    /// SQL column backing this field
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Description => "description",
            Self::Version => "version",
            Self::CreatedDate => "created_date",
            Self::ModifiedDate => "modified_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("ASC") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Validated paging request handed to repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortField,
    pub direction: Direction,
}

impl PageRequest {
    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortField::Id,
            direction: Direction::Asc,
        }
    }
}

impl PageQuery {
    /// Validate against the sortable fields of one entity
    pub fn into_request(self, allowed: &[SortField]) -> Result<PageRequest, SharedError> {
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Err(SharedError::validation(
                "size",
                format!("size must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        let sort = SortField::parse(&self.sort)
            .filter(|field| allowed.contains(field))
            .ok_or_else(|| {
                SharedError::validation("sort", format!("cannot sort by '{}'", self.sort))
            })?;

        Ok(PageRequest {
            page: self.page,
            size: self.size,
            sort,
            direction: Direction::parse(&self.direction),
        })
    }
}
