//! Card filtering, ordering and paging

use crate::document::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use folio_content::{paginate, Page, PageInfo};
use folio_schema::{DraftPolicy, ListingRule, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a caller asks of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page, 0 reads as 1
    pub page: usize,
    /// Page size override
    pub page_size: Option<usize>,
    /// Viewer is an authenticated editor
    pub editor: bool,
}

impl ListQuery {
    /// Query for a page
    #[must_use]
    pub fn page(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// With page size override
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// As seen by an authenticated editor
    #[must_use]
    pub fn as_editor(mut self) -> Self {
        self.editor = true;
        self
    }
}

/// A listing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Cards on this page
    pub data: Vec<Record>,
    /// Pages the listing spans
    pub total_page: usize,
    /// Section header
    pub header_page_info: PageInfo,
}

/// Apply a listing rule to cards in scan order
#[must_use]
pub fn arrange(
    cards: Vec<Record>,
    rule: ListingRule,
    query: ListQuery,
    default_page_size: usize,
) -> Page<Record> {
    let mut cards: Vec<Record> = cards
        .into_iter()
        .filter(|card| visible(card, rule.drafts, query.editor))
        .collect();
    sort(&mut cards, rule.order);
    if rule.paginated {
        paginate(cards, query.page, query.page_size.unwrap_or(default_page_size))
    } else {
        Page::all(cards)
    }
}

fn visible(card: &Record, policy: DraftPolicy, editor: bool) -> bool {
    let draft = card.get("draft").and_then(Value::as_bool).unwrap_or(false);
    match policy {
        DraftPolicy::Shown => true,
        DraftPolicy::Hidden => !draft,
        DraftPolicy::VisibleToEditors => editor || !draft,
    }
}

fn sort(cards: &mut [Record], order: SortOrder) {
    match order {
        SortOrder::FileOrder => {}
        SortOrder::PublishDateDesc => cards.sort_by(|a, b| publish_date(b).cmp(&publish_date(a))),
        SortOrder::WeightAsc => cards.sort_by(|a, b| weight(a).total_cmp(&weight(b))),
        SortOrder::WeightDesc => cards.sort_by(|a, b| weight(b).total_cmp(&weight(a))),
        SortOrder::LaunchThenWeightDesc => cards.sort_by(|a, b| {
            launched(a)
                .cmp(&launched(b))
                .then_with(|| weight(b).total_cmp(&weight(a)))
        }),
    }
}

/// Layouts accepted for `publishDate` besides RFC 3339, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

fn publish_date(card: &Record) -> Option<DateTime<Utc>> {
    card.get("publishDate")
        .and_then(Value::as_str)
        .and_then(parse_date)
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Missing or null weight counts as 0
fn weight(card: &Record) -> f64 {
    card.get("weight").and_then(Value::as_f64).unwrap_or(0.0)
}

fn launched(card: &Record) -> bool {
    card.get("isLaunch").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use folio_schema::Vertical;
    use serde_json::json;

    fn card(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn ids(page: &Page<Record>) -> Vec<&str> {
        page.data.iter().filter_map(|c| c["id"].as_str()).collect()
    }

    fn rule(order: SortOrder, drafts: DraftPolicy, paginated: bool) -> ListingRule {
        ListingRule {
            order,
            drafts,
            paginated,
        }
    }

    #[test]
    fn newest_first() {
        let cards = vec![
            card(json!({"id": "old", "publishDate": "2023-01-01T00:00:00.000Z"})),
            card(json!({"id": "new", "publishDate": "2024-06-01T00:00:00.000Z"})),
            card(json!({"id": "mid", "publishDate": "2023-12-31T23:00:00+07:00"})),
        ];
        let page = arrange(
            cards,
            rule(SortOrder::PublishDateDesc, DraftPolicy::Hidden, true),
            ListQuery::page(1),
            6,
        );
        assert_eq!(ids(&page), vec!["new", "mid", "old"]);
    }

    #[test]
    fn plain_dates_sort_with_rfc3339_dates() {
        let cards = vec![
            card(json!({"id": "old", "publishDate": "2023-01-01"})),
            card(json!({"id": "new", "publishDate": "2024-06-01"})),
            card(json!({"id": "rfc", "publishDate": "2023-06-01T00:00:00.000Z"})),
            card(json!({"id": "spaced", "publishDate": "2023-09-15 08:30"})),
            card(json!({"id": "undated"})),
        ];
        let page = arrange(cards, Vertical::News.listing(), ListQuery::page(1), 10);
        assert_eq!(ids(&page), vec!["new", "spaced", "rfc", "old", "undated"]);
    }

    #[test]
    fn date_layouts_parse_as_utc() {
        let midnight = parse_date("2024-06-01").unwrap();
        assert_eq!(midnight, parse_date("2024-06-01T00:00:00Z").unwrap());
        assert_eq!(
            parse_date("2024-06-01 07:00:00").unwrap(),
            parse_date("2024-06-01T14:00:00+07:00").unwrap()
        );
        assert!(parse_date("01/06/2024").is_none());
    }

    #[test]
    fn drafts_visible_to_editors_only() {
        let cards = || {
            vec![
                card(json!({"id": "a", "draft": true})),
                card(json!({"id": "b", "draft": false})),
            ]
        };
        let policy = rule(SortOrder::FileOrder, DraftPolicy::VisibleToEditors, true);
        assert_eq!(ids(&arrange(cards(), policy, ListQuery::page(1), 6)), vec!["b"]);
        assert_eq!(
            ids(&arrange(cards(), policy, ListQuery::page(1).as_editor(), 6)),
            vec!["a", "b"]
        );
        let hidden = rule(SortOrder::FileOrder, DraftPolicy::Hidden, true);
        assert_eq!(
            ids(&arrange(cards(), hidden, ListQuery::page(1).as_editor(), 6)),
            vec!["b"]
        );
    }

    #[test]
    fn null_weight_sorts_as_zero() {
        let cards = vec![
            card(json!({"id": "neg", "weight": -2})),
            card(json!({"id": "none", "weight": null})),
            card(json!({"id": "top", "weight": 5})),
        ];
        let page = arrange(
            cards,
            rule(SortOrder::WeightDesc, DraftPolicy::Hidden, true),
            ListQuery::page(1),
            6,
        );
        assert_eq!(ids(&page), vec!["top", "none", "neg"]);
    }

    #[test]
    fn competitions_not_launched_first() {
        let cards = vec![
            card(json!({"id": "launched-heavy", "isLaunch": true, "weight": 9})),
            card(json!({"id": "open-light", "isLaunch": false, "weight": 1})),
            card(json!({"id": "open-heavy", "isLaunch": false, "weight": 3})),
        ];
        let page = arrange(
            cards,
            rule(SortOrder::LaunchThenWeightDesc, DraftPolicy::Hidden, true),
            ListQuery::page(1),
            6,
        );
        assert_eq!(ids(&page), vec!["open-heavy", "open-light", "launched-heavy"]);
    }

    #[test]
    fn unpaginated_listing_is_one_page() {
        let cards: Vec<Record> = (0..10).map(|i| card(json!({"id": i.to_string()}))).collect();
        let page = arrange(
            cards,
            rule(SortOrder::FileOrder, DraftPolicy::Hidden, false),
            ListQuery::page(2),
            6,
        );
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total_page, 1);
    }

    #[test]
    fn listing_serializes_camel_case() {
        let listing = Listing {
            data: Vec::new(),
            total_page: 0,
            header_page_info: PageInfo::default().with_title("News"),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["totalPage"], 0);
        assert_eq!(json["headerPageInfo"]["title"], "News");
    }

    proptest! {
        #[test]
        fn weight_asc_is_sorted(weights in proptest::collection::vec(-50i64..50, 0..30)) {
            let cards: Vec<Record> = weights
                .iter()
                .map(|w| card(json!({"weight": w})))
                .collect();
            let page = arrange(
                cards,
                rule(SortOrder::WeightAsc, DraftPolicy::Hidden, false),
                ListQuery::default(),
                6,
            );
            let sorted: Vec<f64> = page.data.iter().map(weight).collect();
            prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
