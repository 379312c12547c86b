use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arrivals::darwin::{DarwinArrivals, DarwinClient, DarwinConfig};
use arrivals::domain::{ArrivalsInfo, NoDataError, StopResult, SystemClock, filter_led_chars};
use arrivals::gtfs::{GtfsArrivals, GtfsClient, GtfsConfig, StopCache, StopCacheConfig};
use arrivals::settings::{Direction, Mode, Settings, SettingsStore};
use arrivals::switcher::Arrivals;
use arrivals::tfl::{TflArrivals, TflClient, TflConfig};

/// How often `--watch` refreshes the board.
const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Width of the destination column; longer names are cut.
const DESTINATION_WIDTH: usize = 24;

#[derive(Parser)]
#[command(name = "arrivals", version, about = "Live departure boards from TfL, GTFS-realtime and Darwin")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// London Underground, Overground, DLR, Elizabeth line and trams
    Tfl {
        /// Station ID (e.g. 910GSHRDHST)
        #[arg(long)]
        station: Option<String>,
        /// Platform filter
        #[arg(long)]
        platform: Option<String>,
        /// Direction filter
        #[arg(long, value_enum)]
        direction: Option<Direction>,
        #[command(flatten)]
        watch: Watch,
    },
    /// Any GTFS-realtime trip updates feed
    Gtfs {
        /// Stop ID (e.g. A42N)
        #[arg(long)]
        station: Option<String>,
        /// GTFS-realtime feed URL
        #[arg(long)]
        realtime: Option<String>,
        /// GTFS schedule zip URL
        #[arg(long)]
        schedule: Option<String>,
        #[command(flatten)]
        watch: Watch,
    },
    /// UK National Rail departures
    Darwin {
        /// Station CRS code (e.g. PMR)
        #[arg(long)]
        station: Option<String>,
        /// Platform filter
        #[arg(long)]
        platform: Option<String>,
        #[command(flatten)]
        watch: Watch,
    },
    /// Look up stop IDs
    Search {
        #[command(subcommand)]
        source: SearchCommand,
    },
}

#[derive(Args)]
struct Watch {
    /// Keep refreshing every minute until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[derive(Subcommand)]
enum SearchCommand {
    /// TfL stops matching a name
    Tfl { query: String },
    /// Child stations of a TfL stop
    TflStop { id: String },
    /// National Rail stations matching a name or code
    Darwin { query: String },
    /// Every stop in a GTFS schedule
    Gtfs {
        /// GTFS schedule zip URL
        #[arg(long)]
        schedule: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;

    let watch = match cli.command {
        Command::Tfl {
            station,
            platform,
            direction,
            watch,
        } => {
            settings.mode = Mode::Tfl;
            override_with(&mut settings.tfl.stop_id, station);
            override_with(&mut settings.tfl.platform, platform);
            if let Some(direction) = direction {
                settings.tfl.direction = direction;
            }
            watch.watch
        }
        Command::Gtfs {
            station,
            realtime,
            schedule,
            watch,
        } => {
            settings.mode = Mode::Gtfs;
            override_with(&mut settings.gtfs.stop_id, station);
            override_with(&mut settings.gtfs.realtime_url, realtime);
            override_with(&mut settings.gtfs.schedule_url, schedule);
            watch.watch
        }
        Command::Darwin {
            station,
            platform,
            watch,
        } => {
            settings.mode = Mode::Darwin;
            override_with(&mut settings.darwin.crs, station);
            override_with(&mut settings.darwin.platform, platform);
            watch.watch
        }
        Command::Search { source } => {
            let schedule_default = settings.gtfs.schedule_url.clone();
            let arrivals = build_arrivals(SettingsStore::new(settings))?;
            let results = match source {
                SearchCommand::Tfl { query } => arrivals.tfl().search_stops(&query).await,
                SearchCommand::TflStop { id } => {
                    arrivals.tfl().stop_details(&id).await.map(|details| {
                        println!("{} ({})", details.name, details.id);
                        details.children
                    })
                }
                SearchCommand::Darwin { query } => arrivals.darwin().search_stops(&query).await,
                SearchCommand::Gtfs { schedule } => {
                    let url = schedule.unwrap_or(schedule_default);
                    arrivals.gtfs().stops(&url).await
                }
            };
            return Ok(exit_code(print_stops(results)));
        }
    };

    let arrivals = build_arrivals(SettingsStore::new(settings))?;

    if !watch {
        return Ok(exit_code(print_board(&arrivals.latest().await)));
    }

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                print_board(&arrivals.latest().await);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                return Ok(ExitCode::SUCCESS);
            }
        }
    }
}

fn override_with(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn credential(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        warn!("{key} not set; requests needing it will fail");
        String::new()
    })
}

fn build_arrivals(settings: SettingsStore) -> Result<Arrivals, Box<dyn Error>> {
    let clock = Arc::new(SystemClock);

    let tfl = TflArrivals::new(
        TflClient::new(TflConfig::new(credential("TFL_APP_KEY")))?,
        settings.clone(),
    );
    let gtfs = GtfsArrivals::new(
        GtfsClient::new(GtfsConfig::default())?,
        StopCache::new(&StopCacheConfig::default()),
        settings.clone(),
        clock.clone(),
    );
    let darwin = DarwinArrivals::new(
        DarwinClient::new(DarwinConfig::new(credential("DARWIN_ACCESS_TOKEN")))?,
        settings.clone(),
        clock,
    );

    Ok(Arrivals::new(tfl, gtfs, darwin, settings))
}

/// Success when the lookup produced a result.
fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Print a board or its error; whether there was a board.
fn print_board(result: &Result<ArrivalsInfo, NoDataError>) -> bool {
    let ok = result.is_ok();
    match result {
        Ok(info) => {
            println!("{}", info.station);
            for arrival in &info.arrivals {
                let destination: String = filter_led_chars(&arrival.destination)
                    .chars()
                    .take(DESTINATION_WIDTH)
                    .collect();
                println!("  {destination:<DESTINATION_WIDTH$}  {:>6}", arrival.time);
            }
        }
        Err(e) => println!("{e}"),
    }
    println!();
    ok
}

fn print_stops(results: Result<Vec<StopResult>, NoDataError>) -> bool {
    let ok = results.is_ok();
    match results {
        Ok(stops) if stops.is_empty() => println!("No stops found"),
        Ok(stops) => {
            for stop in stops {
                let hub = if stop.is_hub { " (hub)" } else { "" };
                println!("{:<14} {}{hub}", stop.id, stop.name);
            }
        }
        Err(e) => println!("{e}"),
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrivals::domain::Arrival;

    #[test]
    fn failed_lookups_report_failure() {
        assert!(!print_board(&Err(NoDataError::new("No arrivals found"))));
        assert!(!print_stops(Err(NoDataError::new("Can't connect to TfL API"))));
    }

    #[test]
    fn results_report_success() {
        let info = ArrivalsInfo {
            station: "Bank".to_string(),
            arrivals: vec![Arrival::new(1, "Stratford".to_string(), 120)],
        };

        assert!(print_board(&Ok(info)));
        assert!(print_stops(Ok(Vec::new())));
    }
}
