//! This client fetches the Afvalwijzer page of an address and turns it into a calendar.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDateTime};
use ical::generator::IcalCalendar;
use regex::Regex;
use scraper::Html;
use tracing::info;

use crate::{
    alarm::AlarmPolicy,
    calendar::{self, CalendarSource},
    error::Error,
    extractor::{page_title, CollectionRecord, Extractor},
    waste_type::CategorySelection,
};

static URL: &str = "https://www.mijnafvalwijzer.nl/nl";

/// The address the collection days are requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub postal_code: String,
    pub house_number: String,
    pub house_number_suffix: String,
}

impl Address {
    /// Split a house number like `12a` into number and suffix.
    pub fn new(postal_code: &str, house_number: &str) -> Self {
        let (number, suffix) = house_number_regex()
            .captures(house_number)
            .map(|captures| (captures[1].to_string(), captures[2].to_string()))
            .unwrap_or_else(|| (house_number.to_string(), String::new()));
        Address {
            postal_code: postal_code.to_string(),
            house_number: number,
            house_number_suffix: suffix,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{URL}/{}/{}/{}",
            self.postal_code, self.house_number, self.house_number_suffix
        )
    }
}

fn house_number_regex() -> &'static Regex {
    static HOUSE_NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    HOUSE_NUMBER_REGEX
        .get_or_init(|| Regex::new(r"^(\d+)(\D*)$").expect("house number regex is valid"))
}

/// Get the calendar for a specific address.
pub async fn get(
    address: &Address,
    selection: &CategorySelection,
    alarm_policy: &AlarmPolicy,
) -> Result<IcalCalendar, Error> {
    let url = address.url();
    let html = get_page(&url).await?;
    calendar_from_html(
        &html,
        &url,
        selection,
        alarm_policy,
        chrono::Local::now().naive_local(),
    )
}

/// Get the HTML page from the official server.
async fn get_page(url: &str) -> Result<String, Error> {
    info!(url, "fetching collection days");
    let retrieval_error = |source: reqwest::Error| Error::Retrieval {
        url: url.to_string(),
        source,
    };
    let response = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(retrieval_error)?;
    response.text().await.map_err(retrieval_error)
}

/// Build the calendar from an already fetched page.
///
/// `now` decides the year of dates without one and the stamp of the events.
pub fn calendar_from_html(
    html: &str,
    url: &str,
    selection: &CategorySelection,
    alarm_policy: &AlarmPolicy,
    now: NaiveDateTime,
) -> Result<IcalCalendar, Error> {
    let dom = Html::parse_document(html);
    let extractor = Extractor::new();
    let records = extractor
        .extract(&dom, selection, now.year())
        .collect::<Result<Vec<CollectionRecord>, _>>()?;
    info!(records = records.len(), "extracted collection days");
    let source = CalendarSource {
        title: page_title(&dom),
        url: url.to_string(),
        generated: now,
    };
    Ok(calendar::build(&records, alarm_policy, &source))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use ical::generator::{Emitter, IcalEvent};

    use crate::{
        alarm::{AlarmDirective, AlarmPolicy},
        error::{Error, ParseError},
        garbage_client::{calendar_from_html, get, Address},
        waste_type::{CategorySelection, WasteTypeBitmask},
    };

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn get_property_value<'a>(event: &'a IcalEvent, name: &str) -> &'a str {
        event
            .properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_deref())
            .unwrap()
    }

    #[test]
    fn test_address() {
        let address = Address::new("1234AB", "12a");
        assert_eq!(address.house_number, "12");
        assert_eq!(address.house_number_suffix, "a");
        assert_eq!(address.url(), "https://www.mijnafvalwijzer.nl/nl/1234AB/12/a");

        let address = Address::new("1234AB", "5");
        assert_eq!(address.house_number, "5");
        assert_eq!(address.house_number_suffix, "");
        assert_eq!(address.url(), "https://www.mijnafvalwijzer.nl/nl/1234AB/5/");

        let address = Address::new("1234AB", "a12");
        assert_eq!(address.house_number, "a12");
        assert_eq!(address.house_number_suffix, "");
    }

    /// Test the whole pipeline on a saved page.
    ///
    /// This test is offline.
    #[test]
    fn test_calendar_from_html() {
        let html = include_str!("garbage_client/tests/two_collections.html");
        let selection =
            CategorySelection::Only(WasteTypeBitmask::Organic | WasteTypeBitmask::Residual);
        let alarm_policy = AlarmPolicy::from_directive(&AlarmDirective::DefaultForAll).unwrap();
        let calendar = calendar_from_html(
            html,
            "https://www.mijnafvalwijzer.nl/nl/1234AB/5/",
            &selection,
            &alarm_policy,
            now(),
        )
        .unwrap();
        assert_eq!(calendar.events.len(), 2);
        let dates: Vec<(&str, &str)> = calendar
            .events
            .iter()
            .map(|event| {
                (
                    get_property_value(event, "DTSTART"),
                    get_property_value(event, "DTEND"),
                )
            })
            .collect();
        assert_eq!(
            dates,
            vec![("20240305", "20240306"), ("20240306", "20240307")]
        );
        assert_eq!(get_property_value(&calendar.events[0], "UID"), "2024-65-gft");
        assert_eq!(
            get_property_value(&calendar.events[1], "UID"),
            "2024-66-restafval"
        );
        for event in &calendar.events {
            assert_eq!(event.alarms.len(), 1);
            let action = event.alarms[0]
                .properties
                .iter()
                .find(|property| property.name == "ACTION")
                .and_then(|property| property.value.as_deref());
            assert_eq!(action, Some("DISPLAY"));
            let trigger = event.alarms[0]
                .properties
                .iter()
                .find(|property| property.name == "TRIGGER")
                .and_then(|property| property.value.as_deref());
            assert_eq!(trigger, Some("PT8H"));
        }
        let ics = calendar.generate();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn test_calendar_from_html_is_idempotent() {
        let html = include_str!("garbage_client/tests/two_collections.html");
        let alarm_policy = AlarmPolicy::from_directive(&AlarmDirective::Disabled).unwrap();
        let uids = || -> Vec<String> {
            calendar_from_html(html, "", &CategorySelection::All, &alarm_policy, now())
                .unwrap()
                .events
                .iter()
                .map(|event| get_property_value(event, "UID").to_string())
                .collect()
        };
        assert_eq!(uids(), uids());
        assert_eq!(uids(), vec!["2024-65-gft", "2024-66-restafval"]);
    }

    #[test]
    fn test_calendar_from_html_parse_error() {
        let html = r##"<a href="#waste-gft" class="wasteInfoIcon textDecorationNone"><p class="gft">maandag 5 mrt 2024<span class="afvaldescr">GFT</span></p></a>"##;
        let alarm_policy = AlarmPolicy::from_directive(&AlarmDirective::Disabled).unwrap();
        let result = calendar_from_html(html, "", &CategorySelection::All, &alarm_policy, now());
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::UnknownMonth { .. }))
        ));
    }

    /// Test whether requests can be sent and the resulting calendar contains something.
    ///
    /// This is an online test!
    #[tokio::test]
    #[ignore = "online"]
    async fn test_get() {
        let alarm_policy = AlarmPolicy::from_directive(&AlarmDirective::Disabled).unwrap();
        let calendar = get(
            &Address::new("3825AL", "41"),
            &CategorySelection::All,
            &alarm_policy,
        )
        .await
        .unwrap();
        assert!(!calendar.events.is_empty());
    }
}
