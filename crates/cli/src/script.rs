//! JSON action scripts replayed against a bingo session.
//!
//! ```json
//! {
//!   "custom_defect_types": [{ "name": "Glue mark" }],
//!   "actions": [
//!     { "action": "place_part", "row": 0, "col": 0, "code": "B" },
//!     { "action": "place_defect", "row": 0, "col": 0, "code": 4 },
//!     { "action": "mark", "row": 0, "col": 0, "validator": "sup1" }
//!   ]
//! }
//! ```

use qcbingo_core::catalog::{NewDefectType, NewGarmentPart};
use qcbingo_core::types::DefectCode;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Custom garment parts added to the built-in catalog before replay.
    #[serde(default)]
    pub custom_garment_parts: Vec<NewGarmentPart>,
    /// Custom defect types; codes are assigned in listed order.
    #[serde(default)]
    pub custom_defect_types: Vec<NewDefectType>,
    pub actions: Vec<ScriptAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    PlacePart {
        row: usize,
        col: usize,
        code: String,
    },
    PlaceDefect {
        row: usize,
        col: usize,
        code: DefectCode,
    },
    Mark {
        row: usize,
        col: usize,
        #[serde(default)]
        validator: Option<String>,
    },
    Swap {
        from: (usize, usize),
        to: (usize, usize),
    },
    Clear {
        row: usize,
        col: usize,
    },
    Reset,
}

impl Script {
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
