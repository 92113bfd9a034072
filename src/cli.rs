use std::{
    collections::BTreeMap,
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use anyhow::Context;
use chrono::{Datelike, Days, Months, NaiveDate, Utc};

use playroom_booking::{
    booking::{AvailabilityMap, DateRange, FormType, SlotCatalog},
    notify::{build_sink, MessageComposer},
    services::{build_services, ServiceOptions},
    source::AvailabilitySnapshot,
    storage::config::Config,
};

pub const USAGE: &str = "Usage: playroom-booking [--mock] [--seed N]
       playroom-booking --availability [YYYY/MM/DD] [--mock] [--seed N]
       playroom-booking --auth
       playroom-booking --form <party|contact|waiver|partnership|general> [key=value ...]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Tui(ServiceOptions),
    Availability { month: Option<NaiveDate>, options: ServiceOptions },
    Auth,
    Form { form_type: FormType, fields: BTreeMap<String, String> },
    Help,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliMode, String> {
    let mut options = ServiceOptions::default();
    let mut availability = None;
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mock" => options.force_mock = true,
            "--seed" => {
                let value = args.next().ok_or("--seed requires a number")?;
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid seed '{}'", value))?;
                options.seed = Some(seed);
            }
            "--availability" => {
                let month = match args.next_if(|next| !next.starts_with("--")) {
                    Some(date_str) => Some(
                        NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
                            .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))?,
                    ),
                    None => None,
                };
                availability = Some(month);
            }
            "--auth" => return Ok(CliMode::Auth),
            "--form" => {
                let name = args.next().ok_or("--form requires a form type")?;
                let form_type = name.parse::<FormType>()?;
                if form_type == FormType::Reservation {
                    return Err("Reservations are made from the calendar, not --form".to_string());
                }
                let mut fields = BTreeMap::new();
                for pair in args.by_ref() {
                    let (key, value) = pair
                        .split_once('=')
                        .ok_or_else(|| format!("Expected key=value, got '{}'", pair))?;
                    fields.insert(key.to_string(), value.to_string());
                }
                return Ok(CliMode::Form { form_type, fields });
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(match availability {
        Some(month) => CliMode::Availability { month, options },
        None => CliMode::Tui(options),
    })
}

fn month_range(date: NaiveDate) -> Option<DateRange> {
    let first = date.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))?.checked_sub_days(Days::new(1))?;
    Some(DateRange::new(first, last))
}

pub async fn run_availability_mode(month: Option<NaiveDate>, options: ServiceOptions) -> anyhow::Result<()> {
    let config = Config::load_or_create().context("loading config")?;
    let services = build_services(&config, &options).await?;

    let today = Utc::now().with_timezone(&services.tz).date_naive();
    let range = month_range(month.unwrap_or(today)).context("month out of range")?;
    let earliest = today
        .checked_add_days(Days::new(u64::from(config.booking.min_advance_days)))
        .unwrap_or(today);

    let snapshot = services.loader.load(range).await;
    let text = format_availability_text(&snapshot, &services.catalog, earliest);
    display_with_pager(&text)?;
    Ok(())
}

fn format_availability_text(snapshot: &AvailabilitySnapshot, catalog: &SlotCatalog, earliest: NaiveDate) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Availability - {} (source: {})",
        snapshot.range.start.format("%B %Y"),
        snapshot.origin
    ));
    if let Some(warning) = &snapshot.warning {
        lines.push(format!("Note: {}", warning));
    }
    lines.push(String::new());

    for date in snapshot.range.dates() {
        lines.push(format_day_line(&snapshot.map, catalog, date, earliest));
    }

    lines.join("\n")
}

fn format_day_line(map: &AvailabilityMap, catalog: &SlotCatalog, date: NaiveDate, earliest: NaiveDate) -> String {
    let day = date.format("%a %m/%d");
    if date < earliest {
        return format!("{}  Not bookable yet", day);
    }
    let Some(summary) = map.summary(date) else {
        return format!("{}  Fully Booked", day);
    };

    let slots = catalog
        .slots()
        .iter()
        .map(|slot| {
            let mark = if map.is_slot_available(date, &slot.key()) { "open" } else { "booked" };
            format!("{} {}", slot.label, mark)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}  {:<20} {}", day, summary.to_string(), slots)
}

/// Sends a non-reservation form; on failure prints the message to send by hand.
pub async fn run_form_mode(form_type: FormType, fields: BTreeMap<String, String>) -> anyhow::Result<()> {
    let config = Config::load_or_create().context("loading config")?;
    let sink = build_sink(&config.notification);

    match sink.notify(form_type, &fields).await {
        Ok(()) => {
            println!("Your {} form was sent. Thank you!", form_type);
        }
        Err(e) => {
            tracing::warn!("{} form not delivered: {}", form_type, e);
            let message = MessageComposer::new(&config.notification).compose(form_type, &fields);
            println!("We could not send your form automatically ({}).", e);
            println!("Please email the following message:\n");
            println!("{}", message.as_manual_text());
        }
    }
    Ok(())
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let Some(cmd) = parts.next() else {
        println!("{text}");
        return Ok(());
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}
