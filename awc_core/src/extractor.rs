//! This extractor reads the collection dates from the Afvalwijzer page.
//!
//! Every collection date is an anchor like
//! `<a href="#waste-gft" class="wasteInfoIcon textDecorationNone"><p class="gft">dinsdag 02 januari
//! <span class="afvaldescr">Groente-, Fruit- en Tuinafval</span></p></a>`.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{
    error::ParseError,
    waste_type::{CategorySelection, WasteType},
};

static ANCHOR_SELECTOR: &str = "a.wasteInfoIcon.textDecorationNone";
static DESCRIPTION_CLASS: &str = "afvaldescr";
static PLACEHOLDER_HREF: &str = "javascript:void(0);";

static MONTHS: [(&str, u32); 12] = [
    ("januari", 1),
    ("februari", 2),
    ("maart", 3),
    ("april", 4),
    ("mei", 5),
    ("juni", 6),
    ("juli", 7),
    ("augustus", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
];

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// The parts of a markup element the extractor looks at.
pub trait MarkupNode: Sized {
    fn attr(&self, name: &str) -> Option<&str>;

    fn first_class(&self) -> Option<&str> {
        self.attr("class")?.split_whitespace().next()
    }

    /// The first descendant with the tag and, if given, the class.
    fn descendant(&self, tag: &str, class: Option<&str>) -> Option<Self>;

    /// All text below the node, each text fragment trimmed and joined by a space.
    fn text_content(&self) -> String;

    /// Like [`MarkupNode::text_content`], but leaving out descendants with the class.
    fn text_without(&self, class: &str) -> String;
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

impl<'a> MarkupNode for ElementRef<'a> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn descendant(&self, tag: &str, class: Option<&str>) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| {
                element.value().name() == tag
                    && class.map_or(true, |class| has_class(element, class))
            })
    }

    fn text_content(&self) -> String {
        self.text()
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<&str>>()
            .join(" ")
    }

    fn text_without(&self, class: &str) -> String {
        self.descendants()
            .filter(|node| {
                !node
                    .ancestors()
                    .take_while(|ancestor| ancestor.id() != self.id())
                    .filter_map(ElementRef::wrap)
                    .any(|element| has_class(&element, class))
            })
            .filter_map(|node| node.value().as_text())
            .map(|text| text.trim())
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<&str>>()
            .join(" ")
    }
}

/// One collection day read from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    pub waste_type: WasteType,
    pub date: NaiveDate,
    pub description: String,
}

pub struct Extractor {
    anchor_selector: Selector,
    date_regex: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Extractor {
            anchor_selector: Selector::parse(ANCHOR_SELECTOR).expect("anchor selector is valid"),
            date_regex: Regex::new(
                r"(?x)
                    ^\s*
                    (?P<weekday>\w+)\s # the day of the week, e.g. maandag
                    (?P<day>\d+)\s # the day, with or without leading zero
                    (?P<month>\w+) # the month name
                    (\x20(?P<year>\d+))? # the year, only given for dates not in the current year
                ",
            )
            .expect("date regex is valid"),
        }
    }

    /// Read the collection days of the selected waste types in document order.
    ///
    /// Dates without a year are placed in `current_year`.
    pub fn extract<'a>(
        &'a self,
        dom: &'a Html,
        selection: &'a CategorySelection,
        current_year: i32,
    ) -> impl Iterator<Item = Result<CollectionRecord, ParseError>> + 'a {
        dom.select(&self.anchor_selector)
            .filter_map(move |anchor| self.resolve(&anchor, selection, current_year))
    }

    /// Turn one anchor into a record, or `None` if the anchor is not wanted.
    pub fn resolve<N: MarkupNode>(
        &self,
        anchor: &N,
        selection: &CategorySelection,
        current_year: i32,
    ) -> Option<Result<CollectionRecord, ParseError>> {
        let Some(waste_type) = resolve_waste_type(anchor) else {
            debug!(href = anchor.attr("href"), "skipping anchor without known waste type");
            return None;
        };
        if !selection.contains(waste_type) {
            debug!(%waste_type, "skipping unselected waste type");
            return None;
        }
        Some(self.parse_record(anchor, waste_type, current_year))
    }

    fn parse_record<N: MarkupNode>(
        &self,
        anchor: &N,
        waste_type: WasteType,
        current_year: i32,
    ) -> Result<CollectionRecord, ParseError> {
        let date_text = anchor
            .descendant("p", None)
            .map(|paragraph| paragraph.text_without(DESCRIPTION_CLASS))
            .ok_or_else(|| ParseError::MissingDateText(waste_type.to_string()))?;
        let date = self.parse_date(&date_text, current_year)?;
        let description = anchor
            .descendant("span", Some(DESCRIPTION_CLASS))
            .map(|span| span.text_content().replace(r"\,", ","))
            .ok_or_else(|| ParseError::MissingDescription(date_text.clone()))?;
        Ok(CollectionRecord {
            waste_type,
            date,
            description,
        })
    }

    /// Parse text like `maandag 5 maart 2024` or `dinsdag 06 maart`.
    pub fn parse_date(&self, text: &str, current_year: i32) -> Result<NaiveDate, ParseError> {
        let captures = self
            .date_regex
            .captures(text)
            .ok_or_else(|| ParseError::MalformedDate(text.to_string()))?;
        let month = month_number(&captures["month"]).ok_or_else(|| ParseError::UnknownMonth {
            month: captures["month"].to_string(),
            text: text.to_string(),
        })?;
        let invalid = || ParseError::InvalidDate(text.to_string());
        let day: u32 = captures["day"].parse().map_err(|_| invalid())?;
        let year: i32 = match captures.name("year") {
            Some(year) => year.as_str().parse().map_err(|_| invalid())?,
            None => current_year,
        };
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }
}

/// The waste type from the `href` fragment, or from the class of the nested paragraph if the
/// fragment is a placeholder.
fn resolve_waste_type<N: MarkupNode>(anchor: &N) -> Option<WasteType> {
    let fragment = anchor
        .attr("href")
        .unwrap_or_default()
        .replace('#', "")
        .replace("waste-", "");
    let identifier = if fragment.is_empty() || fragment == PLACEHOLDER_HREF {
        anchor.descendant("p", None)?.first_class()?.to_string()
    } else {
        fragment
    };
    identifier.parse().ok()
}

/// The title of the page.
pub fn page_title(dom: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;
    dom.select(&title_selector)
        .next()
        .map(|title| title.text_content())
        .filter(|title| !title.is_empty())
}
