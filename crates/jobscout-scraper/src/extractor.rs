use jobscout_browser::{resolve_link, ElementHandle};
use jobscout_core::{JobRecord, POSTED_TODAY, SENTINEL};
use scraper::{Html, Selector};

/// Markers of a listing posted today.
const POSTED_TODAY_MARKERS: &[&str] = &["Today", "Just", "ongoing"];

/// How one field of a [`JobRecord`] is read from listing markup.
struct FieldRule {
    name: &'static str,
    selector: &'static str,
    slot: fn(&mut JobRecord) -> &mut String,
    normalize: fn(&str) -> Option<String>,
    fallback: &'static str,
}

fn slot_title(record: &mut JobRecord) -> &mut String {
    &mut record.title
}

fn slot_company(record: &mut JobRecord) -> &mut String {
    &mut record.company
}

fn slot_location(record: &mut JobRecord) -> &mut String {
    &mut record.location
}

fn slot_salary(record: &mut JobRecord) -> &mut String {
    &mut record.salary
}

fn slot_rating(record: &mut JobRecord) -> &mut String {
    &mut record.rating
}

fn slot_posted_date(record: &mut JobRecord) -> &mut String {
    &mut record.posted_date
}

fn slot_description(record: &mut JobRecord) -> &mut String {
    &mut record.description
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "title",
        selector: ".jobTitle",
        slot: slot_title,
        normalize: non_empty,
        fallback: SENTINEL,
    },
    FieldRule {
        name: "company",
        selector: "[data-testid=\"company-name\"]",
        slot: slot_company,
        normalize: non_empty,
        fallback: SENTINEL,
    },
    FieldRule {
        name: "location",
        selector: "[data-testid=\"text-location\"]",
        slot: slot_location,
        normalize: non_empty,
        fallback: SENTINEL,
    },
    FieldRule {
        name: "salary",
        selector: ".salary-snippet-container",
        slot: slot_salary,
        normalize: non_empty,
        fallback: SENTINEL,
    },
    FieldRule {
        name: "rating",
        selector: "div.companyInfo span.ratingsDisplay",
        slot: slot_rating,
        normalize: non_empty,
        fallback: SENTINEL,
    },
    FieldRule {
        name: "date",
        selector: "span[data-testid=\"myJobsStateDate\"]",
        slot: slot_posted_date,
        normalize: normalize_posted_date,
        fallback: SENTINEL,
    },
    FieldRule {
        name: "description",
        selector: ".job-snippet",
        slot: slot_description,
        normalize: non_empty,
        fallback: "",
    },
];

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Normalize a posting-age label to `"N days ago"`.
///
/// Labels containing "ago" keep their last three words, and need at
/// least three; "posted today" labels become [`POSTED_TODAY`]. Anything
/// else is unrecognized.
pub fn normalize_posted_date(raw: &str) -> Option<String> {
    if raw.contains("ago") {
        let words: Vec<&str> = raw.split_whitespace().collect();
        if words.len() < 3 {
            return None;
        }
        return Some(words[words.len() - 3..].join(" "));
    }
    if POSTED_TODAY_MARKERS.iter().any(|marker| raw.contains(marker)) {
        return Some(POSTED_TODAY.to_string());
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read every field except the link from a listing's inner markup.
///
/// Each rule runs in isolation; a missing node or unusable text leaves
/// that field at its fallback.
pub fn extract_fields(markup: &str) -> JobRecord {
    let fragment = Html::parse_fragment(markup);
    let mut record = JobRecord::default();

    for rule in FIELD_RULES {
        let value = Selector::parse(rule.selector)
            .ok()
            .and_then(|selector| {
                fragment
                    .select(&selector)
                    .next()
                    .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            })
            .and_then(|text| (rule.normalize)(&text));

        *(rule.slot)(&mut record) = match value {
            Some(value) => value,
            None => {
                tracing::trace!("Field {} not found, using fallback", rule.name);
                rule.fallback.to_string()
            }
        };
    }

    record
}

/// Turns rendered listing elements into [`JobRecord`]s.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    origin: String,
}

impl RecordExtractor {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    /// Extract one record, or `None` if the element itself is unusable.
    pub async fn extract<E: ElementHandle>(&self, element: &E) -> Option<JobRecord> {
        let markup = match element.inner_html().await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::warn!("Skipping job element: {}", e);
                return None;
            }
        };

        let mut record = extract_fields(&markup);
        record.detail_url = self.detail_link(element).await;
        Some(record)
    }

    async fn detail_link<E: ElementHandle>(&self, element: &E) -> String {
        let href = match element.query_child("a").await {
            Ok(Some(anchor)) => anchor.attribute("href").await.ok().flatten(),
            _ => None,
        };

        href.and_then(|href| resolve_link(&self.origin, &href).ok())
            .unwrap_or_else(|| SENTINEL.to_string())
    }
}
