use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::paginate::Page;
use crate::record::{JobFields, JobRecord};
use crate::{Error, Result};

/// Structural markers of the listing site. When the site's markup changes these
/// change, not the extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// One match per job block.
    pub container: String,
    pub title: String,
    pub company: String,
    /// First match inside the block is the description paragraph.
    pub description: String,
    /// Holds "{posting date} {separator} {deadline}".
    pub posting_info: String,
    /// Location is the first `div` whose own text contains this.
    pub location_needle: String,
    /// Job type is the first `div` whose own text contains this.
    pub job_type_needle: String,
    pub qualification: String,
    pub date_separator: char,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            container: "div.job-preview".into(),
            title: "h1.sc-jmHipa".into(),
            company: "div.sc-jPipnV".into(),
            description: "div.sc-cZWPfn p".into(),
            posting_info: "div.sc-fNALa".into(),
            location_needle: "Onsite".into(),
            job_type_needle: "Cooperative".into(),
            qualification: "li".into(),
            date_separator: '∙',
        }
    }
}

/// Turns a listing page into job records. Selectors are compiled once; extraction
/// itself never fails.
#[derive(Debug)]
pub struct Extractor {
    container: Selector,
    title: Selector,
    company: Selector,
    description: Selector,
    posting_info: Selector,
    qualification: Selector,
    div: Selector,
    location_needle: String,
    job_type_needle: String,
    date_separator: char,
}

impl Extractor {
    pub fn new(markers: Markers) -> Result<Self> {
        Ok(Self {
            container: create_selector(&markers.container)?,
            title: create_selector(&markers.title)?,
            company: create_selector(&markers.company)?,
            description: create_selector(&markers.description)?,
            posting_info: create_selector(&markers.posting_info)?,
            qualification: create_selector(&markers.qualification)?,
            div: create_selector("div")?,
            location_needle: markers.location_needle,
            job_type_needle: markers.job_type_needle,
            date_separator: markers.date_separator,
        })
    }

    /// One record per job block, in document order. No block means no records.
    pub fn extract(&self, document: &[u8]) -> Vec<JobRecord> {
        let html = String::from_utf8_lossy(document);
        let doc = Html::parse_document(&html);

        let records: Vec<JobRecord> = doc
            .select(&self.container)
            .map(|element| self.extract_block(Block(element)).into_record())
            .collect();
        if records.is_empty() {
            debug!("no job block found in document");
        }
        records
    }

    fn extract_block(&self, block: Block<'_>) -> JobFields {
        let (posting_date, deadline) = block
            .first_text(&self.posting_info, "")
            .map(|info| split_dates(&info, self.date_separator))
            .unwrap_or_default();

        JobFields {
            title: block.first_text(&self.title, ""),
            company: block.first_text(&self.company, ""),
            location: block.own_text_containing(&self.div, &self.location_needle),
            description: block.first_text(&self.description, " "),
            posting_date,
            deadline,
            job_type: block.own_text_containing(&self.div, &self.job_type_needle),
            qualifications: block.all_texts(&self.qualification),
        }
    }
}

/// Lookups scoped to one job block. Every lookup answers `None` (or an empty
/// list) instead of failing, and empty text counts as no match.
#[derive(Clone, Copy)]
struct Block<'a>(ElementRef<'a>);

impl Block<'_> {
    /// Text of the first element matching `selector`, text nodes joined by `separator`.
    fn first_text(&self, selector: &Selector, separator: &str) -> Option<String> {
        self.0
            .select(selector)
            .next()
            .map(|el| element_text(el, separator))
            .filter(|text| !text.is_empty())
    }

    /// Text of the first element matching `selector` whose own text nodes contain `needle`.
    fn own_text_containing(&self, selector: &Selector, needle: &str) -> Option<String> {
        self.0
            .select(selector)
            .find(|el| {
                el.children()
                    .filter_map(|child| child.value().as_text())
                    .any(|text| text.contains(needle))
            })
            .map(|el| element_text(el, ""))
            .filter(|text| !text.is_empty())
    }

    fn all_texts(&self, selector: &Selector) -> Vec<String> {
        self.0
            .select(selector)
            .map(|el| element_text(el, ""))
            .filter(|text| !text.is_empty())
            .collect()
    }
}

/// Splits "{posting} {sep} {deadline}" at the first separator. A missing separator
/// or an empty half leaves that half `None`.
fn split_dates(info: &str, separator: char) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    match info.split_once(separator) {
        Some((posted, deadline)) => (non_empty(posted), non_empty(deadline)),
        None => (None, None),
    }
}

fn element_text(el: ElementRef<'_>, separator: &str) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(separator))
}

/// Collapse whitespace runs into a single space and trim.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

/// Extracts a fetched page on the blocking pool; `Html` is not `Send`.
pub async fn parse_page(extractor: Arc<Extractor>, page: Page) -> Result<Vec<JobRecord>> {
    let index = page.index;
    let records = spawn_blocking(move || extractor.extract(&page.body)).await?;
    info!(page = index, records = records.len(), "parsed page");
    Ok(records)
}
