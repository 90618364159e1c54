use std::{env::current_dir, fs::write};

use anyhow::Result;
use awc_core::{
    alarm::{AlarmDirective, AlarmPolicy},
    garbage_client,
    garbage_client::Address,
    ical::generator::Emitter,
    waste_type::CategorySelection,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Get an iCalendar file with the collection days from Mijn Afvalwijzer.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Arguments {
    /// the postal code, e.g. 1234AB
    pub postal_code: String,
    /// the house number with optional suffix, e.g. 12a
    pub house_number: String,
    /// the waste types: '*' for all or a comma separated list of
    /// gft, glas, kca, papier, pd, pmd, textiel, grofvuil and restafval
    pub waste_types: CategorySelection,
    /// add alarms, at 08:00 on the collection day if no CUSTOM_ALARM is given;
    /// CUSTOM_ALARM is a list like 'gft:-1900,papier:0700' where a leading '-' means the day
    /// before
    #[arg(long, value_name = "CUSTOM_ALARM")]
    pub alarm: Option<Option<String>>,
}

impl Arguments {
    fn alarm_directive(&self) -> AlarmDirective {
        AlarmDirective::from(self.alarm.clone())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Arguments::parse();
    let alarm_policy = match AlarmPolicy::from_directive(&args.alarm_directive()) {
        Ok(alarm_policy) => alarm_policy,
        Err(err) => Arguments::command()
            .error(ErrorKind::ValueValidation, format!("--alarm: {err}"))
            .exit(),
    };
    let address = Address::new(&args.postal_code, &args.house_number);
    let calendar = garbage_client::get(&address, &args.waste_types, &alarm_policy).await?;
    let mut path = current_dir()?;
    path.push("calendar.ics");
    write(&path, calendar.generate())?;
    info!(path = %path.display(), events = calendar.events.len(), "wrote calendar");
    Ok(())
}
