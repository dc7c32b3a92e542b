//! Query engine - search, sort, and paginate over a snapshot of posts.
//!
//! Everything here is a pure function of `(snapshot, parameters)`. Parameters
//! are parsed and validated before any post is looked at, so a bad `sort` or
//! `page` never costs a store read.
//!
//! Listing applies sort then paginate. Search is a separate read path that
//! only filters.

use std::num::IntErrorKind;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::Post;
use crate::error::DomainError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 5;

/// Allow-listed sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Content,
    Author,
    Date,
}

impl SortField {
    pub const ALLOWED: [&'static str; 4] = ["title", "content", "author", "date"];

    fn key(self, post: &Post) -> SortKey {
        match self {
            SortField::Title => SortKey::Text(post.title.to_lowercase()),
            SortField::Content => SortKey::Text(post.content.to_lowercase()),
            SortField::Author => {
                SortKey::Text(post.author.as_deref().unwrap_or_default().to_lowercase())
            }
            SortField::Date => SortKey::Date(post.date),
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "content" => Ok(SortField::Content),
            "author" => Ok(SortField::Author),
            "date" => Ok(SortField::Date),
            other => Err(DomainError::Validation(format!(
                "Invalid sort field '{}'. Use one of: {}",
                other,
                Self::ALLOWED.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::Validation(format!(
                "Invalid sort direction '{}'. Use 'asc' or 'desc'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Sort in place. Ascending is stable; descending is its exact reverse.
pub fn sort_posts(posts: &mut [Post], spec: SortSpec) {
    posts.sort_by_cached_key(|post| spec.field.key(post));
    if spec.direction == SortDirection::Desc {
        posts.reverse();
    }
}

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Result<Self, DomainError> {
        if page == 0 || limit == 0 {
            return Err(DomainError::validation(
                "page and limit must be positive integers",
            ));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn offset(&self) -> usize {
        usize::try_from((self.page - 1).saturating_mul(self.limit)).unwrap_or(usize::MAX)
    }

    fn limit_len(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}

/// One page of results plus the totals of the full sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total_posts: usize,
    pub total_pages: usize,
}

/// Slice `[(page-1)*limit, (page-1)*limit + limit)`. Out-of-range pages are empty.
pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let total_posts = items.len();
    let limit = pagination.limit_len();

    let items = items
        .into_iter()
        .skip(pagination.offset())
        .take(limit)
        .collect();

    Page {
        items,
        page: pagination.page,
        limit: pagination.limit,
        total_posts,
        total_pages: total_posts.div_ceil(limit),
    }
}

/// Validated parameters of a listing request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: Option<SortSpec>,
    pub pagination: Pagination,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Values past `u64::MAX` saturate: they are still positive, just out of range.
fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64, DomainError> {
    let Some(v) = non_blank(raw) else {
        return Ok(default);
    };
    match v.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        _ => Err(DomainError::Validation(format!(
            "{name} must be a positive integer"
        ))),
    }
}

impl ListQuery {
    /// Parse raw query-string values. Blank values count as absent.
    pub fn parse(
        sort: Option<&str>,
        direction: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, DomainError> {
        let direction = non_blank(direction)
            .map(SortDirection::from_str)
            .transpose()?
            .unwrap_or_default();
        let sort = non_blank(sort)
            .map(SortField::from_str)
            .transpose()?
            .map(|field| SortSpec::new(field, direction));

        let pagination = Pagination::new(
            parse_positive("page", page, DEFAULT_PAGE)?,
            parse_positive("limit", limit, DEFAULT_LIMIT)?,
        )?;

        Ok(Self { sort, pagination })
    }

    /// Sort (if requested) then paginate.
    pub fn apply(&self, mut snapshot: Vec<Post>) -> Page<Post> {
        if let Some(spec) = self.sort {
            sort_posts(&mut snapshot, spec);
        }
        paginate(snapshot, self.pagination)
    }
}

/// Search criteria. A post matches when any supplied criterion is contained,
/// case-insensitively, in its field. `query` is checked against every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

struct Needles {
    any: Option<String>,
    title: Option<String>,
    content: Option<String>,
    author: Option<String>,
    date: Option<String>,
}

fn needle(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_deref()
        .is_some_and(|n| haystack.to_lowercase().contains(n))
}

impl SearchQuery {
    pub fn combined(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// True when every criterion is absent or empty.
    pub fn is_empty(&self) -> bool {
        [
            &self.query,
            &self.title,
            &self.content,
            &self.author,
            &self.date,
        ]
        .iter()
        .all(|v| v.as_deref().is_none_or(str::is_empty))
    }

    fn needles(&self) -> Needles {
        Needles {
            any: needle(&self.query),
            title: needle(&self.title),
            content: needle(&self.content),
            author: needle(&self.author),
            date: needle(&self.date),
        }
    }
}

impl Needles {
    fn matches(&self, post: &Post) -> bool {
        let author = post.author.as_deref().unwrap_or_default();
        let date = post.date.to_string();

        let any = [post.title.as_str(), post.content.as_str(), author, date.as_str()]
            .iter()
            .any(|field| contains(field, &self.any));

        any || contains(&post.title, &self.title)
            || contains(&post.content, &self.content)
            || contains(author, &self.author)
            || contains(&date, &self.date)
    }
}

/// Filter a snapshot. An empty query yields no posts, not the whole collection.
pub fn search(snapshot: Vec<Post>, query: &SearchQuery) -> Vec<Post> {
    if query.is_empty() {
        return Vec::new();
    }
    let needles = query.needles();
    snapshot.into_iter().filter(|p| needles.matches(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64, title: &str, content: &str, author: Option<&str>, date: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            content: content.to_string(),
            author: author.map(str::to_string),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: None,
            tags: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post(1, "banana", "Second", Some("Zed"), "2024-01-10"),
            post(2, "Apple", "first", Some("amy"), "2023-12-31"),
            post(3, "cherry", "third", None, "2024-01-02"),
            post(4, "apple", "fourth", Some("Bob"), "2024-01-10"),
        ]
    }

    fn ids(posts: &[Post]) -> Vec<u64> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_sort_title_is_case_insensitive_and_stable() {
        let mut posts = sample();
        sort_posts(&mut posts, SortSpec::new(SortField::Title, SortDirection::Asc));
        // "Apple" (2) and "apple" (4) tie and keep input order.
        assert_eq!(ids(&posts), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_date_is_chronological() {
        let mut posts = sample();
        sort_posts(&mut posts, SortSpec::new(SortField::Date, SortDirection::Asc));
        assert_eq!(ids(&posts), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_sort_author_treats_missing_as_empty() {
        let mut posts = sample();
        sort_posts(&mut posts, SortSpec::new(SortField::Author, SortDirection::Asc));
        assert_eq!(ids(&posts), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_descending_is_reverse_of_ascending() {
        for field in SortField::ALLOWED {
            let field: SortField = field.parse().unwrap();

            let mut asc = sample();
            sort_posts(&mut asc, SortSpec::new(field, SortDirection::Asc));
            asc.reverse();

            let mut desc = sample();
            sort_posts(&mut desc, SortSpec::new(field, SortDirection::Desc));

            assert_eq!(asc, desc, "{field:?}");
        }
    }

    #[test]
    fn test_parse_rejects_unknown_sort_field_and_direction() {
        assert!(matches!(
            ListQuery::parse(Some("id"), None, None, None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ListQuery::parse(Some("title"), Some("up"), None, None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ListQuery::parse(None, Some("sideways"), None, None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_defaults() {
        let query = ListQuery::parse(None, None, None, None).unwrap();
        assert_eq!(query.sort, None);
        assert_eq!(query.pagination.page(), 1);
        assert_eq!(query.pagination.limit(), 5);

        let query = ListQuery::parse(Some("title"), Some(""), Some(""), None).unwrap();
        assert_eq!(
            query.sort,
            Some(SortSpec::new(SortField::Title, SortDirection::Asc))
        );
    }

    #[test]
    fn test_parse_rejects_non_positive_pagination() {
        for (page, limit) in [("0", "5"), ("1", "0"), ("-1", "5"), ("two", "5")] {
            assert!(
                ListQuery::parse(None, None, Some(page), Some(limit)).is_err(),
                "{page}/{limit}"
            );
        }
    }

    #[test]
    fn test_no_sort_keeps_insertion_order() {
        let query = ListQuery::parse(None, None, None, Some("10")).unwrap();
        assert_eq!(ids(&query.apply(sample()).items), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_pages_rebuild_sequence() {
        let limit = 3;
        let total = sample().len();
        let first = paginate(sample(), Pagination::new(1, limit).unwrap());
        assert_eq!(first.total_pages, 2);

        let mut rebuilt = Vec::new();
        for page in 1..=first.total_pages as u64 {
            let result = paginate(sample(), Pagination::new(page, limit).unwrap());
            assert!(result.items.len() <= limit as usize);
            assert_eq!(result.total_posts, total);
            rebuilt.extend(result.items);
        }
        assert_eq!(rebuilt, sample());
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let page = paginate(sample(), Pagination::new(9, 5).unwrap());
        assert!(page.items.is_empty());
        assert_eq!(page.total_posts, 4);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_huge_page_is_empty_not_rejected() {
        for page in ["4294967296", "18446744073709551616"] {
            let query = ListQuery::parse(None, None, Some(page), None).unwrap();
            let result = query.apply(sample());
            assert!(result.items.is_empty(), "{page}");
            assert_eq!(result.total_posts, 4);
        }

        let query = ListQuery::parse(None, None, Some("4294967296"), None).unwrap();
        assert_eq!(query.pagination.page(), 4_294_967_296);
    }

    #[test]
    fn test_empty_collection_has_no_pages() {
        let page = paginate(Vec::<Post>::new(), Pagination::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_worked_example() {
        let snapshot = vec![
            post(1, "A", "a", None, "2024-01-01"),
            post(2, "B", "b", None, "2024-01-01"),
            post(3, "C", "c", None, "2024-01-01"),
        ];

        let desc = ListQuery::parse(Some("title"), Some("desc"), None, None).unwrap();
        let titles: Vec<_> = desc
            .apply(snapshot.clone())
            .items
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);

        let paged = ListQuery::parse(None, None, Some("1"), Some("2")).unwrap();
        let page = paged.apply(snapshot);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_search_empty_query_returns_nothing() {
        assert!(search(sample(), &SearchQuery::default()).is_empty());
        assert!(search(sample(), &SearchQuery::combined("")).is_empty());
        let blanks = SearchQuery {
            title: Some(String::new()),
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(search(sample(), &blanks).is_empty());
    }

    #[test]
    fn test_search_combined_matches_any_field() {
        assert_eq!(ids(&search(sample(), &SearchQuery::combined("APPLE"))), vec![2, 4]);
        assert_eq!(ids(&search(sample(), &SearchQuery::combined("zed"))), vec![1]);
        assert_eq!(ids(&search(sample(), &SearchQuery::combined("2024-01"))), vec![1, 3, 4]);
    }

    #[test]
    fn test_search_field_queries_are_inclusive() {
        let query = SearchQuery {
            title: Some("cher".to_string()),
            content: Some("FIRST".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&search(sample(), &query)), vec![2, 3]);
    }

    #[test]
    fn test_search_field_query_only_checks_its_field() {
        let query = SearchQuery {
            title: Some("second".to_string()),
            ..Default::default()
        };
        assert!(search(sample(), &query).is_empty());
    }
}
