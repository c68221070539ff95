//! Closed NeTEx code lists used by stop places and parkings.
//!
//! Each list is an explicit enum with a string conversion in both
//! directions. Parsing an unlisted value is an error so that malformed
//! exports surface early instead of leaking into the tiles.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A value that does not belong to its code list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{value:?} is not a valid {list}")]
pub struct UnknownCode {
    /// Name of the code list.
    pub list: &'static str,
    /// Offending value.
    pub value: String,
}

macro_rules! code_list {
    (
        $(#[$meta:meta])*
        $name:ident, $list:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$variant_meta])* $variant,)+
        }

        impl $name {
            /// Every member of the list, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// NeTEx spelling of the code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownCode {
                        list: $list,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

code_list! {
    /// Generic classification of a stop place.
    StopType, "stop place type" {
        /// Bus stop on the street.
        OnstreetBus => "onstreetBus",
        /// Tram stop on the street.
        OnstreetTram => "onstreetTram",
        /// Airport.
        Airport => "airport",
        /// Railway station.
        RailStation => "railStation",
        /// Metro station.
        MetroStation => "metroStation",
        /// Bus station.
        BusStation => "busStation",
        /// Coach station.
        CoachStation => "coachStation",
        /// Tram station.
        TramStation => "tramStation",
        /// Harbour port.
        HarbourPort => "harbourPort",
        /// Ferry port.
        FerryPort => "ferryPort",
        /// Ferry stop.
        FerryStop => "ferryStop",
        /// Lift or cable car station.
        LiftStation => "liftStation",
        /// Interchange for rail vehicles.
        VehicleRailInterchange => "vehicleRailInterchange",
        /// Anything else.
        Other => "other",
    }
}

code_list! {
    /// How attractive a stop place is for interchanges.
    InterchangeWeighting, "interchange weighting" {
        /// Interchange is not possible.
        NoInterchange => "noInterchange",
        /// Interchange is possible.
        InterchangeAllowed => "interchangeAllowed",
        /// Interchange is recommended.
        RecommendedInterchange => "recommendedInterchange",
        /// Interchange is preferred.
        PreferredInterchange => "preferredInterchange",
    }
}

code_list! {
    /// Whether a parking is sheltered.
    CoveredCode, "covered code" {
        /// Inside a building.
        Indoors => "indoors",
        /// Open air.
        Outdoors => "outdoors",
        /// Roofed.
        Covered => "covered",
        /// Partly sheltered.
        Mixed => "mixed",
        /// Not recorded.
        Unknown => "unknown",
    }
}

code_list! {
    /// The submode fields a stop place may carry, one per transport mode.
    SubmodeKind, "submode element" {
        /// `AirSubmode`.
        Air => "AirSubmode",
        /// `BusSubmode`.
        Bus => "BusSubmode",
        /// `CoachSubmode`.
        Coach => "CoachSubmode",
        /// `FunicularSubmode`.
        Funicular => "FunicularSubmode",
        /// `MetroSubmode`.
        Metro => "MetroSubmode",
        /// `TramSubmode`.
        Tram => "TramSubmode",
        /// `TelecabinSubmode`.
        Telecabin => "TelecabinSubmode",
        /// `RailSubmode`.
        Rail => "RailSubmode",
        /// `WaterSubmode`.
        Water => "WaterSubmode",
        /// `SnowAndIceSubmode`.
        SnowAndIce => "SnowAndIceSubmode",
    }
}

/// Submode value that never counts as a resolved submode.
pub const UNKNOWN_SUBMODE: &str = "unknown";

/// A submode field as found on a stop place.
///
/// The value is kept verbatim: submode vocabularies differ per mode and
/// are passed straight through to the feature properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submode {
    /// Which submode field carried the value.
    pub kind: SubmodeKind,
    /// Raw submode value, e.g. `localBus`.
    pub value: String,
}

impl Submode {
    /// Build a submode from its field and value.
    pub fn new(kind: SubmodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Return whether the submode carries information.
    #[must_use]
    pub fn is_known(&self) -> bool {
        let value = self.value.trim();
        !value.is_empty() && value != UNKNOWN_SUBMODE
    }
}
