//! Synthetic city snapshot generation.
//!
//! Every metric is an independent draw from the injected
//! [`RandomSource`]: continuous fields are `base + r * spread`, counters
//! are `base + floor(r * spread)`, and labels threshold a single draw. The
//! generator never looks at earlier snapshots.

use chrono::{DateTime, TimeDelta, Utc};
use citywatch_types::{
    AirQualityMetrics, AirQualityStatus, AirQualityTrend, CctvMetrics, CitySnapshot,
    EnergyMetrics, GeoPoint, InfrastructureMetrics, ParkingMetrics, SnapshotId,
    StreetLightMetrics, TrafficMetrics, WasteArea, WasteStatus, WaterMetrics, WifiMetrics,
};
use tokio::sync::Mutex;

use crate::random::RandomSource;

/// Fixed description of one waste collection area.
#[derive(Debug, Clone, Copy)]
pub struct WasteAreaProfile {
    /// Area name.
    pub name: &'static str,
    /// Lowest fill level.
    pub level_base: f64,
    /// Width of the fill level range.
    pub level_spread: f64,
    /// Fill state reported for the area.
    pub status: WasteStatus,
    /// Hours since the last collection.
    pub collected_hours_ago: i64,
    /// Hours until the next collection.
    pub next_in_hours: i64,
    /// Width of the coordinate jitter around the reference point.
    pub jitter: f64,
}

/// Waste areas in the order they appear on every snapshot.
pub const WASTE_AREAS: [WasteAreaProfile; 3] = [
    WasteAreaProfile {
        name: "Downtown",
        level_base: 60.0,
        level_spread: 30.0,
        status: WasteStatus::Normal,
        collected_hours_ago: 4,
        next_in_hours: 8,
        jitter: 0.05,
    },
    WasteAreaProfile {
        name: "Suburbs",
        level_base: 40.0,
        level_spread: 20.0,
        status: WasteStatus::Normal,
        collected_hours_ago: 6,
        next_in_hours: 18,
        jitter: 0.1,
    },
    WasteAreaProfile {
        name: "Industrial",
        level_base: 80.0,
        level_spread: 15.0,
        status: WasteStatus::Warning,
        collected_hours_ago: 10,
        next_in_hours: 2,
        jitter: 0.2,
    },
];

/// Produces one snapshot per call around a fixed reference point.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotGenerator {
    reference: GeoPoint,
}

impl SnapshotGenerator {
    /// Create a generator for the given map center.
    pub const fn new(reference: GeoPoint) -> Self {
        Self { reference }
    }

    /// Map center stamped on every snapshot.
    pub const fn reference(&self) -> GeoPoint {
        self.reference
    }

    /// Build a fully populated snapshot stamped `now`.
    pub fn produce<R>(&self, rng: &mut R, now: DateTime<Utc>) -> CitySnapshot
    where
        R: RandomSource + ?Sized,
    {
        CitySnapshot {
            id: SnapshotId::new(),
            timestamp: now,
            location: self.reference,
            traffic: TrafficMetrics {
                congestion: uniform(rng, 30.0, 40.0),
                avg_speed: uniform(rng, 35.0, 30.0),
                accidents: count(rng, 0, 5),
                active_signals: count(rng, 150, 20),
            },
            energy: EnergyMetrics {
                total_consumption: uniform(rng, 400.0, 200.0),
                renewable_generation: uniform(rng, 150.0, 100.0),
                solar_output: uniform(rng, 60.0, 40.0),
                wind_output: uniform(rng, 90.0, 60.0),
                grid_efficiency: uniform(rng, 85.0, 10.0),
            },
            air_quality: air_quality(rng),
            water: WaterMetrics {
                quality: uniform(rng, 90.0, 8.0),
                pressure: uniform(rng, 70.0, 20.0),
                consumption: uniform(rng, 2.0, 1.0),
                leaks: count(rng, 0, 3),
                treatment_plants: 3,
            },
            waste: WASTE_AREAS
                .iter()
                .map(|profile| self.waste_area(rng, profile, now))
                .collect(),
            infrastructure: infrastructure(rng),
        }
    }

    fn waste_area<R>(
        &self,
        rng: &mut R,
        profile: &WasteAreaProfile,
        now: DateTime<Utc>,
    ) -> WasteArea
    where
        R: RandomSource + ?Sized,
    {
        let level = uniform(rng, profile.level_base, profile.level_spread);
        let lat = self.reference.lat + (rng.next_f64() - 0.5) * profile.jitter;
        let lng = self.reference.lng + (rng.next_f64() - 0.5) * profile.jitter;
        WasteArea {
            area: profile.name.to_owned(),
            level,
            status: profile.status,
            last_collection: shift_hours(now, profile.collected_hours_ago.saturating_neg()),
            next_collection: shift_hours(now, profile.next_in_hours),
            coordinates: GeoPoint::new(lat, lng),
        }
    }
}

fn air_quality<R: RandomSource + ?Sized>(rng: &mut R) -> AirQualityMetrics {
    AirQualityMetrics {
        aqi: uniform(rng, 50.0, 50.0),
        pm25: uniform(rng, 20.0, 30.0),
        pm10: uniform(rng, 30.0, 40.0),
        ozone: uniform(rng, 70.0, 50.0),
        status: if rng.next_f64() > 0.7 {
            AirQualityStatus::Good
        } else {
            AirQualityStatus::Moderate
        },
        trend: if rng.next_f64() > 0.5 {
            AirQualityTrend::Improving
        } else {
            AirQualityTrend::Stable
        },
    }
}

fn infrastructure<R: RandomSource + ?Sized>(rng: &mut R) -> InfrastructureMetrics {
    InfrastructureMetrics {
        street_lights: StreetLightMetrics {
            total: 3000,
            active: count(rng, 2900, 80),
            energy_saved: uniform(rng, 20.0, 10.0),
        },
        parking: ParkingMetrics {
            total: 1800,
            occupied: count(rng, 800, 800),
            revenue: uniform(rng, 12000.0, 8000.0),
        },
        wifi: WifiMetrics {
            hotspots: 156,
            active_users: count(rng, 8000, 2000),
            uptime: uniform(rng, 98.0, 2.0),
        },
        cctv: CctvMetrics {
            total: 245,
            active: count(rng, 240, 5),
            incidents: count(rng, 0, 8),
        },
    }
}

/// `base + r * spread`.
fn uniform<R: RandomSource + ?Sized>(rng: &mut R, base: f64, spread: f64) -> f64 {
    base + rng.next_f64() * spread
}

/// `base + floor(r * spread)`, never reaching `base + spread`.
fn count<R: RandomSource + ?Sized>(rng: &mut R, base: u32, spread: u32) -> u32 {
    let scaled = (rng.next_f64().clamp(0.0, 1.0) * f64::from(spread)).floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let offset = scaled as u32;
    base.saturating_add(offset.min(spread.saturating_sub(1)))
}

fn shift_hours(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    TimeDelta::try_hours(hours)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now)
}

/// A generator paired with the shared random source.
///
/// The scheduler and the lazy-seed read path both draw from the same
/// source, so it sits behind an async mutex.
pub struct SnapshotFactory {
    generator: SnapshotGenerator,
    rng: Mutex<Box<dyn RandomSource + Send>>,
}

impl SnapshotFactory {
    /// Pair `generator` with `rng`.
    pub fn new(generator: SnapshotGenerator, rng: Box<dyn RandomSource + Send>) -> Self {
        Self {
            generator,
            rng: Mutex::new(rng),
        }
    }

    /// Produce the next snapshot stamped `now`.
    pub async fn next(&self, now: DateTime<Utc>) -> CitySnapshot {
        let mut rng = self.rng.lock().await;
        self.generator.produce(&mut **rng, now)
    }

    /// The wrapped generator.
    pub const fn generator(&self) -> &SnapshotGenerator {
        &self.generator
    }
}

impl std::fmt::Debug for SnapshotFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotFactory")
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}
