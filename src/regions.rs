// 🗺️ NALD Regions - The fixed eight-region set
//
// Every party, licence and condition in the legacy dataset is scoped to one
// of eight regions. The set never changes, so it is a single enumerated
// constant rather than a magic literal map; the invariant "every region
// bucket always exists" hangs off `Region::ALL`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Anglian,
    Midlands,
    NorthEast,
    NorthWest,
    SouthWest,
    Southern,
    Thames,
    Wales,
}

impl Region {
    /// All eight regions, in legacy code order.
    pub const ALL: [Region; 8] = [
        Region::Anglian,
        Region::Midlands,
        Region::NorthEast,
        Region::NorthWest,
        Region::SouthWest,
        Region::Southern,
        Region::Thames,
        Region::Wales,
    ];

    /// Legacy numeric region code (FGAC_REGION_CODE).
    pub fn code(&self) -> u8 {
        match self {
            Region::Anglian => 1,
            Region::Midlands => 2,
            Region::NorthEast => 3,
            Region::NorthWest => 4,
            Region::SouthWest => 5,
            Region::Southern => 6,
            Region::Thames => 7,
            Region::Wales => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Region::Anglian => "Anglian",
            Region::Midlands => "Midlands",
            Region::NorthEast => "North East",
            Region::NorthWest => "North West",
            Region::SouthWest => "South West",
            Region::Southern => "Southern",
            Region::Thames => "Thames",
            Region::Wales => "Wales",
        }
    }

    /// Parse a legacy region code column.
    pub fn from_code_str(raw: &str) -> Result<Region, ImportError> {
        let code: u8 = raw
            .trim()
            .parse()
            .map_err(|_| ImportError::normalization("FGAC_REGION_CODE", raw, "not a region code"))?;

        Region::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| {
                ImportError::normalization("FGAC_REGION_CODE", raw, "no such region")
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
