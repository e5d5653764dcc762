//! This modules defines the common functionality for searching and paging data.

use maud::{Markup, html};
use serde::Deserialize;

/// The maximum number of items to display on a single page.
pub const ITEMS_PER_PAGE: u64 = 6;

/// The total number of pages (including ellipses) at or below which every
/// page is shown.
const MAX_INDICATORS: u64 = 7;

/// The search and page parameters accepted by the searchable pages.
///
/// Both values are kept as strings so that malformed input falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// The search string, an empty or missing query matches everything.
    pub query: Option<String>,
    /// The 1-based page number.
    pub page: Option<String>,
}

impl SearchQuery {
    /// The search string, or the empty string if none was given.
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }

    /// The requested page, or 1 if the page is missing, malformed or less than 1.
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse::<u64>().ok())
            .filter(|&page| page >= 1)
            .unwrap_or(1)
    }
}

/// Build the URL for `page` of `endpoint` that keeps the search `query`.
pub fn page_url(endpoint: &str, query: &str, page: u64) -> String {
    let page = page.to_string();
    let mut params = Vec::with_capacity(2);

    if !query.is_empty() {
        params.push(("query", query));
    }
    params.push(("page", page.as_str()));

    match serde_urlencoded::to_string(&params) {
        Ok(params) => format!("{endpoint}?{params}"),
        Err(error) => {
            tracing::error!("could not encode pagination parameters: {error}");
            format!("{endpoint}?page={page}")
        }
    }
}

/// The number of pages needed to show `item_count` items.
pub fn page_count(item_count: u64) -> u64 {
    item_count.div_ceil(ITEMS_PER_PAGE)
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
}

/// Decide which page numbers to show for the page `curr_page` of `page_count` pages.
///
/// At most seven indicators are produced: the first and last pages are
/// always present and gaps are collapsed into an ellipsis.
pub fn generate_pagination(curr_page: u64, page_count: u64) -> Vec<PaginationIndicator> {
    let pages: Vec<Option<u64>> = if page_count <= MAX_INDICATORS {
        (1..=page_count).map(Some).collect()
    } else if curr_page <= 3 {
        vec![
            Some(1),
            Some(2),
            Some(3),
            None,
            Some(page_count - 1),
            Some(page_count),
        ]
    } else if curr_page >= page_count - 2 {
        vec![
            Some(1),
            Some(2),
            None,
            Some(page_count - 2),
            Some(page_count - 1),
            Some(page_count),
        ]
    } else {
        vec![
            Some(1),
            None,
            Some(curr_page - 1),
            Some(curr_page),
            Some(curr_page + 1),
            None,
            Some(page_count),
        ]
    };

    pages
        .into_iter()
        .map(|page| match page {
            Some(page) if page == curr_page => PaginationIndicator::CurrPage(page),
            Some(page) => PaginationIndicator::Page(page),
            None => PaginationIndicator::Ellipsis,
        })
        .collect()
}

const PAGE_LINK_STYLE: &str = "flex h-10 w-10 items-center justify-center border \
    border-gray-200 text-sm text-gray-700 hover:bg-gray-100 dark:border-gray-700 \
    dark:text-gray-300 dark:hover:bg-gray-700";
const CURRENT_PAGE_STYLE: &str = "z-10 flex h-10 w-10 items-center justify-center \
    border border-blue-600 bg-blue-600 text-sm text-white";
const ELLIPSIS_STYLE: &str = "flex h-10 w-10 items-center justify-center border \
    border-gray-200 text-sm text-gray-300 dark:border-gray-700";
const ARROW_STYLE: &str = "flex h-10 w-10 items-center justify-center rounded-md \
    border border-gray-200 text-gray-700 hover:bg-gray-100 dark:border-gray-700 \
    dark:text-gray-300 dark:hover:bg-gray-700";
const ARROW_DISABLED_STYLE: &str = "pointer-events-none flex h-10 w-10 items-center \
    justify-center rounded-md border border-gray-200 text-gray-300 dark:border-gray-700";

/// Render the page links for a paged view of `endpoint`.
///
/// Nothing is rendered when there is only a single page.
pub fn pagination_view(endpoint: &str, query: &str, curr_page: u64, page_count: u64) -> Markup {
    if page_count <= 1 {
        return html!();
    }

    let prev_url = (curr_page > 1).then(|| page_url(endpoint, query, curr_page - 1));
    let next_url = (curr_page < page_count).then(|| page_url(endpoint, query, curr_page + 1));

    html! {
        nav class="pagination flex justify-center" aria-label="Pagination"
        {
            ul class="pagination inline-flex items-center gap-2"
            {
                li
                {
                    @if let Some(url) = prev_url {
                        a href=(url) class=(ARROW_STYLE) aria-label="Previous page" { "←" }
                    } @else {
                        span class=(ARROW_DISABLED_STYLE) aria-disabled="true" { "←" }
                    }
                }

                @for indicator in generate_pagination(curr_page, page_count) {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(endpoint, query, page)) class=(PAGE_LINK_STYLE)
                                { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(CURRENT_PAGE_STYLE) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(ELLIPSIS_STYLE) { "…" }
                            }
                        }
                    }
                }

                li
                {
                    @if let Some(url) = next_url {
                        a href=(url) class=(ARROW_STYLE) aria-label="Next page" { "→" }
                    } @else {
                        span class=(ARROW_DISABLED_STYLE) aria-disabled="true" { "→" }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod search_query_tests {
    use crate::pagination::{SearchQuery, page_url};

    fn query_with_page(page: Option<&str>) -> SearchQuery {
        SearchQuery {
            query: None,
            page: page.map(str::to_owned),
        }
    }

    #[test]
    fn invalid_page_defaults_to_first() {
        assert_eq!(query_with_page(None).page(), 1);
        assert_eq!(query_with_page(Some("abc")).page(), 1);
        assert_eq!(query_with_page(Some("0")).page(), 1);
        assert_eq!(query_with_page(Some("-3")).page(), 1);
        assert_eq!(query_with_page(Some("4")).page(), 4);
    }

    #[test]
    fn missing_query_is_empty() {
        assert_eq!(SearchQuery::default().query(), "");
    }

    #[test]
    fn page_url_keeps_query() {
        assert_eq!(
            page_url("/dashboard/invoices", "Lee Robinson", 2),
            "/dashboard/invoices?query=Lee+Robinson&page=2"
        );
        assert_eq!(
            page_url("/dashboard/invoices", "", 3),
            "/dashboard/invoices?page=3"
        );
    }
}

#[cfg(test)]
mod pagination_view_tests {
    use scraper::{Html, Selector};

    use crate::pagination::pagination_view;

    #[test]
    fn hidden_for_single_page() {
        let html = pagination_view("/dashboard/invoices", "", 1, 1).into_string();

        assert!(html.is_empty());
    }

    #[test]
    fn disables_previous_on_first_page() {
        let html = pagination_view("/dashboard/invoices", "foo", 1, 3).into_string();
        let fragment = Html::parse_fragment(&html);

        let disabled = Selector::parse("span[aria-disabled=true]").unwrap();
        assert_eq!(fragment.select(&disabled).count(), 1);

        let next = Selector::parse("a[aria-label='Next page']").unwrap();
        let next_link = fragment.select(&next).next().expect("missing next link");
        assert_eq!(
            next_link.value().attr("href"),
            Some("/dashboard/invoices?query=foo&page=2")
        );
    }

    #[test]
    fn renders_ellipsis_glyph() {
        let html = pagination_view("/dashboard/invoices", "", 5, 10).into_string();

        assert_eq!(html.matches('…').count(), 2);
    }
}
