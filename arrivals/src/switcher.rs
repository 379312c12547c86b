//! Chooses which source answers, per call, from the current mode.

use tracing::debug;

use crate::darwin::DarwinArrivals;
use crate::domain::{ArrivalsInfo, NoDataError};
use crate::gtfs::GtfsArrivals;
use crate::settings::{Mode, SettingsStore};
use crate::tfl::TflArrivals;

/// One of the arrivals sources.
#[derive(Clone, Copy)]
pub enum Source<'a> {
    Tfl(&'a TflArrivals),
    Gtfs(&'a GtfsArrivals),
    Darwin(&'a DarwinArrivals),
}

impl Source<'_> {
    pub async fn latest(self) -> Result<ArrivalsInfo, NoDataError> {
        match self {
            Source::Tfl(tfl) => tfl.latest().await,
            Source::Gtfs(gtfs) => gtfs.latest().await,
            Source::Darwin(darwin) => darwin.latest().await,
        }
    }

    pub fn mode(self) -> Mode {
        match self {
            Source::Tfl(_) => Mode::Tfl,
            Source::Gtfs(_) => Mode::Gtfs,
            Source::Darwin(_) => Mode::Darwin,
        }
    }
}

/// All three sources behind the mode setting.
///
/// Nothing is cached or merged here; each call goes to exactly one source.
#[derive(Clone)]
pub struct Arrivals {
    tfl: TflArrivals,
    gtfs: GtfsArrivals,
    darwin: DarwinArrivals,
    settings: SettingsStore,
}

impl Arrivals {
    pub fn new(
        tfl: TflArrivals,
        gtfs: GtfsArrivals,
        darwin: DarwinArrivals,
        settings: SettingsStore,
    ) -> Self {
        Self {
            tfl,
            gtfs,
            darwin,
            settings,
        }
    }

    /// The source for a mode.
    pub fn source(&self, mode: Mode) -> Source<'_> {
        match mode {
            Mode::Tfl => Source::Tfl(&self.tfl),
            Mode::Gtfs => Source::Gtfs(&self.gtfs),
            Mode::Darwin => Source::Darwin(&self.darwin),
        }
    }

    /// Latest arrivals from whichever source the mode selects now.
    pub async fn latest(&self) -> Result<ArrivalsInfo, NoDataError> {
        let mode = self.settings.mode().await;
        debug!(%mode, "Fetching arrivals");
        self.source(mode).latest().await
    }

    pub fn tfl(&self) -> &TflArrivals {
        &self.tfl
    }

    pub fn gtfs(&self) -> &GtfsArrivals {
        &self.gtfs
    }

    pub fn darwin(&self) -> &DarwinArrivals {
        &self.darwin
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }
}
