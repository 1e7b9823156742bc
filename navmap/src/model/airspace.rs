//! Airspace categories, drawing priority and fetch filters.

use bitflags::bitflags;
use std::fmt;

/// Category of an airspace boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AirspaceType {
    #[default]
    Unknown,
    Center,
    ClassA,
    ClassB,
    ClassC,
    ClassD,
    ClassE,
    ClassF,
    ClassG,
    Tower,
    Clearance,
    Ground,
    Departure,
    Approach,
    Moa,
    Restricted,
    Prohibited,
    Warning,
    Alert,
    Danger,
    NationalPark,
    ModeC,
    Radar,
    Training,
}

impl AirspaceType {
    /// Every known category in mask bit order.
    pub const ALL: [AirspaceType; 23] = [
        AirspaceType::Center,
        AirspaceType::ClassA,
        AirspaceType::ClassB,
        AirspaceType::ClassC,
        AirspaceType::ClassD,
        AirspaceType::ClassE,
        AirspaceType::ClassF,
        AirspaceType::ClassG,
        AirspaceType::Tower,
        AirspaceType::Clearance,
        AirspaceType::Ground,
        AirspaceType::Departure,
        AirspaceType::Approach,
        AirspaceType::Moa,
        AirspaceType::Restricted,
        AirspaceType::Prohibited,
        AirspaceType::Warning,
        AirspaceType::Alert,
        AirspaceType::Danger,
        AirspaceType::NationalPark,
        AirspaceType::ModeC,
        AirspaceType::Radar,
        AirspaceType::Training,
    ];

    /// Code stored in the `boundary.type` column.
    pub fn db_code(&self) -> &'static str {
        match self {
            AirspaceType::Unknown => "",
            AirspaceType::Center => "C",
            AirspaceType::ClassA => "CA",
            AirspaceType::ClassB => "CB",
            AirspaceType::ClassC => "CC",
            AirspaceType::ClassD => "CD",
            AirspaceType::ClassE => "CE",
            AirspaceType::ClassF => "CF",
            AirspaceType::ClassG => "CG",
            AirspaceType::Tower => "T",
            AirspaceType::Clearance => "CL",
            AirspaceType::Ground => "G",
            AirspaceType::Departure => "D",
            AirspaceType::Approach => "A",
            AirspaceType::Moa => "M",
            AirspaceType::Restricted => "R",
            AirspaceType::Prohibited => "P",
            AirspaceType::Warning => "W",
            AirspaceType::Alert => "AL",
            AirspaceType::Danger => "DA",
            AirspaceType::NationalPark => "NP",
            AirspaceType::ModeC => "MCTR",
            AirspaceType::Radar => "RD",
            AirspaceType::Training => "TR",
        }
    }

    /// Map a `boundary.type` code; unknown codes map to [`AirspaceType::Unknown`].
    pub fn from_db_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.db_code() == code)
            .unwrap_or(AirspaceType::Unknown)
    }

    /// Static drawing priority; lower values are painted first.
    pub fn drawing_priority(&self) -> u8 {
        match self {
            AirspaceType::Unknown => 0,
            AirspaceType::Center => 1,
            AirspaceType::ClassA => 2,
            AirspaceType::ClassG => 3,
            AirspaceType::ClassF => 4,
            AirspaceType::ClassE => 5,
            AirspaceType::Radar => 6,
            AirspaceType::ModeC => 7,
            AirspaceType::ClassD => 8,
            AirspaceType::ClassC => 9,
            AirspaceType::ClassB => 10,
            AirspaceType::Tower => 11,
            AirspaceType::Clearance => 12,
            AirspaceType::Ground => 13,
            AirspaceType::Departure => 14,
            AirspaceType::Approach => 15,
            AirspaceType::NationalPark => 16,
            AirspaceType::Training => 17,
            AirspaceType::Moa => 18,
            AirspaceType::Alert => 19,
            AirspaceType::Warning => 20,
            AirspaceType::Danger => 21,
            AirspaceType::Restricted => 22,
            AirspaceType::Prohibited => 23,
        }
    }

    /// Mask bit of this category; empty for [`AirspaceType::Unknown`].
    pub fn flag(&self) -> AirspaceTypes {
        Self::ALL
            .iter()
            .position(|t| t == self)
            .and_then(|bit| AirspaceTypes::from_bits(1 << bit))
            .unwrap_or_else(AirspaceTypes::empty)
    }
}

impl fmt::Display for AirspaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AirspaceType::Unknown => "Unknown",
            AirspaceType::Center => "Center",
            AirspaceType::ClassA => "Class A",
            AirspaceType::ClassB => "Class B",
            AirspaceType::ClassC => "Class C",
            AirspaceType::ClassD => "Class D",
            AirspaceType::ClassE => "Class E",
            AirspaceType::ClassF => "Class F",
            AirspaceType::ClassG => "Class G",
            AirspaceType::Tower => "Tower",
            AirspaceType::Clearance => "Clearance",
            AirspaceType::Ground => "Ground",
            AirspaceType::Departure => "Departure",
            AirspaceType::Approach => "Approach",
            AirspaceType::Moa => "MOA",
            AirspaceType::Restricted => "Restricted",
            AirspaceType::Prohibited => "Prohibited",
            AirspaceType::Warning => "Warning",
            AirspaceType::Alert => "Alert",
            AirspaceType::Danger => "Danger",
            AirspaceType::NationalPark => "National Park",
            AirspaceType::ModeC => "Mode C",
            AirspaceType::Radar => "Radar",
            AirspaceType::Training => "Training",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// A set of airspace categories to fetch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AirspaceTypes: u32 {
        const CENTER = 1 << 0;
        const CLASS_A = 1 << 1;
        const CLASS_B = 1 << 2;
        const CLASS_C = 1 << 3;
        const CLASS_D = 1 << 4;
        const CLASS_E = 1 << 5;
        const CLASS_F = 1 << 6;
        const CLASS_G = 1 << 7;
        const TOWER = 1 << 8;
        const CLEARANCE = 1 << 9;
        const GROUND = 1 << 10;
        const DEPARTURE = 1 << 11;
        const APPROACH = 1 << 12;
        const MOA = 1 << 13;
        const RESTRICTED = 1 << 14;
        const PROHIBITED = 1 << 15;
        const WARNING = 1 << 16;
        const ALERT = 1 << 17;
        const DANGER = 1 << 18;
        const NATIONAL_PARK = 1 << 19;
        const MODE_C = 1 << 20;
        const RADAR = 1 << 21;
        const TRAINING = 1 << 22;
    }
}

impl AirspaceTypes {
    /// `type like` patterns for a fetch.
    ///
    /// A full set collapses to a single `%`; an empty set yields nothing.
    pub fn like_patterns(&self) -> Vec<&'static str> {
        if self.is_all() {
            vec!["%"]
        } else {
            AirspaceType::ALL
                .iter()
                .filter(|t| self.contains(t.flag()))
                .map(AirspaceType::db_code)
                .collect()
        }
    }
}

/// Altitude restriction applied to an airspace fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AltitudeFilter {
    /// All altitudes.
    #[default]
    None,
    /// Airspaces whose floor is below the altitude in feet.
    Below(i32),
    /// Airspaces whose ceiling is above the altitude in feet.
    Above(i32),
    /// Airspaces containing the flight plan cruise altitude in feet.
    AtFlightPlan(i32),
}

impl AltitudeFilter {
    /// Filter at a flight plan altitude, rounded to whole feet.
    pub fn at_flight_plan(altitude: f32) -> Self {
        AltitudeFilter::AtFlightPlan(altitude.round() as i32)
    }

    /// Altitude bound, if any.
    pub fn altitude(&self) -> Option<i32> {
        match self {
            AltitudeFilter::None => None,
            AltitudeFilter::Below(alt)
            | AltitudeFilter::Above(alt)
            | AltitudeFilter::AtFlightPlan(alt) => Some(*alt),
        }
    }
}

/// Invalidation keys of the airspace cache beyond viewport and layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AirspaceFilter {
    pub types: AirspaceTypes,
    pub altitude: AltitudeFilter,
}

impl AirspaceFilter {
    pub fn new(types: AirspaceTypes, altitude: AltitudeFilter) -> Self {
        Self { types, altitude }
    }
}

impl Default for AirspaceFilter {
    fn default() -> Self {
        Self {
            types: AirspaceTypes::all(),
            altitude: AltitudeFilter::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_code_roundtrip() {
        for t in AirspaceType::ALL {
            assert_eq!(AirspaceType::from_db_code(t.db_code()), t);
        }
        assert_eq!(AirspaceType::from_db_code("XYZ"), AirspaceType::Unknown);
    }

    #[test]
    fn test_priorities_are_unique() {
        let mut priorities: Vec<u8> = AirspaceType::ALL
            .iter()
            .map(AirspaceType::drawing_priority)
            .collect();
        priorities.push(AirspaceType::Unknown.drawing_priority());
        priorities.sort_unstable();
        priorities.dedup();
        assert_eq!(priorities.len(), AirspaceType::ALL.len() + 1);
    }

    #[test]
    fn test_priority_order() {
        assert!(AirspaceType::Center.drawing_priority() < AirspaceType::ClassB.drawing_priority());
        assert!(
            AirspaceType::Restricted.drawing_priority()
                < AirspaceType::Prohibited.drawing_priority()
        );
    }

    #[test]
    fn test_flags_match_bit_order() {
        assert_eq!(AirspaceType::Center.flag(), AirspaceTypes::CENTER);
        assert_eq!(AirspaceType::ClassD.flag(), AirspaceTypes::CLASS_D);
        assert_eq!(AirspaceType::Training.flag(), AirspaceTypes::TRAINING);
        assert_eq!(AirspaceType::Unknown.flag(), AirspaceTypes::empty());
    }

    #[test]
    fn test_like_patterns() {
        assert_eq!(AirspaceTypes::all().like_patterns(), vec!["%"]);
        assert!(AirspaceTypes::empty().like_patterns().is_empty());
        assert_eq!(
            (AirspaceTypes::CLASS_C | AirspaceTypes::RESTRICTED).like_patterns(),
            vec!["CC", "R"]
        );
    }

    #[test]
    fn test_at_flight_plan_rounds() {
        assert_eq!(
            AltitudeFilter::at_flight_plan(9999.6),
            AltitudeFilter::AtFlightPlan(10000)
        );
        assert_eq!(AltitudeFilter::None.altitude(), None);
        assert_eq!(AltitudeFilter::Below(18000).altitude(), Some(18000));
    }
}
