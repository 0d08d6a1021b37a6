//! Capacities derived from road length and town population.

/// Lanes per direction
const LANES: u64 = 2;
/// Vehicles per kilometre of lane
const VEHICLES_PER_KM: u64 = 20;
/// Travel speed in km/h
const SPEED_KMH: u64 = 70;
const MINUTES_PER_HOUR: u64 = 60;

/// Vehicles per kilometre of lane on the min-cost model's roads
const LANE_CAPACITY_PER_KM: u64 = 150;
/// Roads touching one of this many most populated towns are wider
const MAJOR_TOWNS: usize = 10;

/// Upper asymptote of the junction throughput curve
pub const JUNCTION_CEILING: f64 = 10_000.0;
/// Population scale of the junction throughput curve
const JUNCTION_SCALE: f64 = 20_000.0;

/// How an edge's distance turns into a flow bound in the max-flow and junction formulations
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeCapacity {
    /// `floor(2 * 20 * 70 * distance / 60)`
    #[default]
    Throughput,
    /// The distance itself
    Distance,
}

impl EdgeCapacity {
    /// `None` when the capacity does not fit in a `u64`
    pub fn bound(self, distance: u64) -> Option<u64> {
        match self {
            EdgeCapacity::Throughput => throughput_capacity(distance),
            EdgeCapacity::Distance => Some(distance),
        }
    }
}

pub fn throughput_capacity(distance: u64) -> Option<u64> {
    (LANES * VEHICLES_PER_KM * SPEED_KMH)
        .checked_mul(distance)
        .map(|v| v / MINUTES_PER_HOUR)
}

/// Capacity of the road between vertex indices `from` and `to` in the min-cost formulation.
///
/// Roads with an endpoint among the [`MAJOR_TOWNS`] most populated vertices get three lanes,
/// others two. `None` on overflow.
pub fn road_class_capacity(distance: u64, from: usize, to: usize) -> Option<u64> {
    let lanes: u64 = if from < MAJOR_TOWNS || to < MAJOR_TOWNS { 3 } else { 2 };
    (lanes * LANE_CAPACITY_PER_KM).checked_mul(distance)
}

/// `10000 / (1 + e^(-p / 20000))`, the largest flow a town of population `p` can pass through
pub fn junction_throughput(population: u64) -> f64 {
    JUNCTION_CEILING / (1.0 + (-(population as f64) / JUNCTION_SCALE).exp())
}

/// [`junction_throughput`] rounded to the nearest vehicle
pub fn junction_capacity(population: u64) -> u64 {
    junction_throughput(population).round() as u64
}
