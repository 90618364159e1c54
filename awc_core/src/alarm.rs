//! Alarm configuration per waste type.
//!
//! A policy is built once from the command line and then handed to the calendar builder.
//! Custom alarms are written as `<waste_type>:[-]HHMM` pairs, e.g. `gft:-1900,papier:0700`,
//! where the time is relative to the midnight the collection day starts with and a leading `-`
//! moves it to the day before.

use std::{collections::HashMap, sync::OnceLock};

use chrono::Duration;
use regex::Regex;

use crate::{error::ConfigError, waste_type::WasteType};

static DEFAULT_ALARM_HOUR: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmRule {
    #[default]
    Unset,
    /// 08:00 on the collection day
    Default,
    Custom {
        /// `0` for the collection day, `-1` for the day before
        day_offset: i8,
        hour: u8,
        minute: u8,
    },
}

impl AlarmRule {
    /// The offset of the alarm from the start of the all-day event.
    pub fn offset(&self) -> Option<Duration> {
        match *self {
            AlarmRule::Unset => None,
            AlarmRule::Default => Some(Duration::hours(DEFAULT_ALARM_HOUR)),
            AlarmRule::Custom {
                day_offset,
                hour,
                minute,
            } => Some(
                Duration::days(i64::from(day_offset))
                    + Duration::hours(i64::from(hour))
                    + Duration::minutes(i64::from(minute)),
            ),
        }
    }

    /// The offset as value of a `TRIGGER` property.
    pub fn trigger(&self) -> Option<String> {
        self.offset().map(format_duration)
    }

    fn parse_custom(waste_type: &str, spec: &str) -> Result<AlarmRule, ConfigError> {
        let invalid = || ConfigError::InvalidAlarmTime {
            waste_type: waste_type.to_string(),
            spec: spec.to_string(),
        };
        let captures = time_regex().captures(spec).ok_or_else(invalid)?;
        let hour: u8 = captures["hour"].parse().map_err(|_| invalid())?;
        let minute: u8 = captures["minute"].parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        let day_offset = if captures.name("previous_day").is_some() {
            -1
        } else {
            0
        };
        Ok(AlarmRule::Custom {
            day_offset,
            hour,
            minute,
        })
    }
}

fn time_regex() -> &'static Regex {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    TIME_REGEX.get_or_init(|| {
        Regex::new(r"^(?P<previous_day>-)?(?P<hour>\d{2})(?P<minute>\d{2})$")
            .expect("alarm time regex is valid")
    })
}

/// Render a duration in the iCalendar duration format, e.g. `PT8H` or `-PT20H1M`.
pub fn format_duration(duration: Duration) -> String {
    let sign = if duration < Duration::zero() { "-" } else { "" };
    let total_minutes = duration.num_minutes().abs();
    let days = total_minutes / (24 * 60);
    let hours = total_minutes % (24 * 60) / 60;
    let minutes = total_minutes % 60;
    if total_minutes == 0 {
        return String::from("PT0S");
    }
    let mut formatted = format!("{sign}P");
    if days > 0 {
        formatted.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 {
        formatted.push('T');
    }
    if hours > 0 {
        formatted.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        formatted.push_str(&format!("{minutes}M"));
    }
    formatted
}

/// How alarms were requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmDirective {
    /// no `--alarm`
    Disabled,
    /// `--alarm` without a value
    DefaultForAll,
    /// `--alarm <spec>`, already split into tokens
    Custom(Vec<String>),
}

impl AlarmDirective {
    /// Split a custom spec; `,` and `:` both separate tokens.
    pub fn from_spec(spec: &str) -> Self {
        AlarmDirective::Custom(
            spec.split(&[',', ':'][..])
                .map(|token| token.trim().to_string())
                .collect(),
        )
    }
}

impl From<Option<Option<String>>> for AlarmDirective {
    fn from(value: Option<Option<String>>) -> Self {
        match value {
            None => AlarmDirective::Disabled,
            Some(None) => AlarmDirective::DefaultForAll,
            Some(Some(spec)) => AlarmDirective::from_spec(&spec),
        }
    }
}

/// The alarm rule of every waste type, plus a global switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmPolicy {
    pub(crate) enabled: bool,
    pub(crate) rules: HashMap<WasteType, AlarmRule>,
}

impl AlarmPolicy {
    pub fn from_directive(directive: &AlarmDirective) -> Result<Self, ConfigError> {
        match directive {
            AlarmDirective::Disabled => Ok(Self::with_rule(false, AlarmRule::Unset)),
            AlarmDirective::DefaultForAll => Ok(Self::with_rule(true, AlarmRule::Default)),
            AlarmDirective::Custom(tokens) => Self::custom(tokens),
        }
    }

    fn with_rule(enabled: bool, rule: AlarmRule) -> Self {
        AlarmPolicy {
            enabled,
            rules: WasteType::ALL
                .into_iter()
                .map(|waste_type| (waste_type, rule))
                .collect(),
        }
    }

    fn custom(tokens: &[String]) -> Result<Self, ConfigError> {
        if tokens.len() % 2 != 0 {
            return Err(ConfigError::OddAlarmTokens(tokens.len()));
        }
        let mut policy = Self::with_rule(true, AlarmRule::Unset);
        for pair in tokens.chunks_exact(2) {
            let waste_type: WasteType = pair[0].parse()?;
            let rule = AlarmRule::parse_custom(&pair[0], &pair[1])?;
            policy.rules.insert(waste_type, rule);
        }
        Ok(policy)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rule(&self, waste_type: WasteType) -> AlarmRule {
        self.rules.get(&waste_type).copied().unwrap_or_default()
    }

    /// The rule to apply to an event, taking the global switch into account.
    pub fn effective_rule(&self, waste_type: WasteType) -> AlarmRule {
        if self.enabled {
            self.rule(waste_type)
        } else {
            AlarmRule::Unset
        }
    }
}
