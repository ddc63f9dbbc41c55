//! Board representation: the standard map, units, orders and per-phase
//! positions.

pub mod adjacency;
pub mod order;
pub mod province;
pub mod state;
pub mod unit;
pub mod variant;

pub use adjacency::{
    adj_from, fleet_coasts_to, is_adjacent, provinces_adjacent_to, AdjacencyEntry, EDGES,
    EDGE_COUNT,
};
pub use order::{Location, Order, OrderUnit};
pub use province::{
    Coast, LookupError, Power, Province, ProvinceInfo, ProvinceType, ALL_POWERS, ALL_PROVINCES,
    POWER_COUNT, PROVINCE_COUNT, PROVINCE_INFO, SUPPLY_CENTER_COUNT,
};
pub use state::{Phase, PhaseType, Position, Season};
pub use unit::{Unit, UnitType};
pub use variant::Variant;
