//! Build the iCalendar document from the collection records.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, Property},
    ical_param, ical_property,
    parser::ical::component::IcalAlarm,
};
use tracing::debug;

use crate::{alarm::AlarmPolicy, extractor::CollectionRecord, waste_type::WasteType};

static PROD_ID: &str = "-//Afvalkalender//mijnafvalwijzer.nl//NL";
static CALENDAR_NAME: &str = "Afvalkalender";
static TIMEZONE: &str = "Europe/Amsterdam";
static SUMMARY_PREFIX: &str = "Afval - ";
static DATE_FORMAT: &str = "%Y%m%d";
static DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Where the calendar comes from.
#[derive(Debug, Clone)]
pub struct CalendarSource {
    /// the title of the page, used as calendar description
    pub title: Option<String>,
    pub url: String,
    pub generated: NaiveDateTime,
}

/// Build the calendar with one all-day event per record.
pub fn build<'r>(
    records: impl IntoIterator<Item = &'r CollectionRecord>,
    alarm_policy: &AlarmPolicy,
    source: &CalendarSource,
) -> IcalCalendar {
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PROD_ID)
        .build();
    calendar.properties.push(ical_property!("NAME", CALENDAR_NAME));
    calendar
        .properties
        .push(ical_property!("X-WR-CALNAME", CALENDAR_NAME));
    calendar
        .properties
        .push(ical_property!("X-WR-TIMEZONE", TIMEZONE));
    if let Some(title) = &source.title {
        calendar
            .properties
            .push(ical_property!("DESCRIPTION", title.as_str()));
    }
    calendar
        .properties
        .push(ical_property!("URL", source.url.as_str()));
    let stamp = source.generated.format(DATE_TIME_FORMAT).to_string();
    for record in records {
        calendar
            .events
            .push(get_event(record, alarm_policy, &stamp));
    }
    debug!(events = calendar.events.len(), "built calendar");
    calendar
}

/// Build the all-day event of a single collection day.
fn get_event(record: &CollectionRecord, alarm_policy: &AlarmPolicy, stamp: &str) -> IcalEvent {
    let summary = format!("{SUMMARY_PREFIX}{}", record.description);
    let end = record.date + Duration::days(1);
    let mut event = IcalEvent::new();
    event.properties.extend([
        ical_property!("UID", uid(record.waste_type, &record.date)),
        ical_property!("DTSTAMP", stamp),
        ical_property!(
            "DTSTART",
            record.date.format(DATE_FORMAT).to_string(),
            ical_param!("VALUE", "DATE")
        ),
        ical_property!(
            "DTEND",
            end.format(DATE_FORMAT).to_string(),
            ical_param!("VALUE", "DATE")
        ),
        ical_property!("SUMMARY", summary.as_str()),
        ical_property!("DESCRIPTION", record.description.as_str()),
        ical_property!("TRANSP", "TRANSPARENT"),
    ]);
    if let Some(trigger) = alarm_policy.effective_rule(record.waste_type).trigger() {
        let mut alarm = IcalAlarm::new();
        alarm.properties.extend([
            ical_property!("ACTION", "DISPLAY"),
            ical_property!("TRIGGER", trigger),
            ical_property!("DESCRIPTION", summary.as_str()),
        ]);
        event.alarms.push(alarm);
    }
    event
}

/// Get a unique id for a collection of a waste type on a day.
///
/// Changing this function is a breaking change!
fn uid(waste_type: WasteType, date: &NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.ordinal(), waste_type)
}
