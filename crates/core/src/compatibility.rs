//! Garment part / defect type compatibility rules.
//!
//! A rule restricts which defect types are realistic for one garment part.
//! Parts without a rule accept every defect type.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{validate_garment_code, DefectType, GarmentPart};
use crate::error::CoreError;
use crate::types::DefectCode;

/// Default rules shipped with the built-in catalog, as `(garment code, allowed defects)`.
pub const BUILTIN_RULES: &[(&str, &[DefectCode])] = &[
    ("A", &[2, 3, 4, 7, 8, 14]),
    ("B", &[4, 7, 8, 13]),
    ("C", &[2, 3, 4, 8, 10, 13]),
    ("D", &[2, 3, 5, 6, 8, 14]),
    ("E", &[3, 4, 7, 10, 13]),
    ("F", &[2, 4, 8, 11, 13]),
    ("J", &[1, 5, 14]),
];

/// One serialised rule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRule {
    pub garment_code: String,
    pub defect_codes: Vec<DefectCode>,
}

/// The compatibility table, keyed by upper-case garment code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CompatibilityRule>", into = "Vec<CompatibilityRule>")]
pub struct CompatibilityRules {
    rules: BTreeMap<String, BTreeSet<DefectCode>>,
}

impl CompatibilityRules {
    /// A table with no rules: every pairing is valid.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// The built-in domain rules.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(code, defects)| (code.to_string(), defects.iter().copied().collect()))
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace the rule for a garment part.
    pub fn set_rule(
        &mut self,
        garment_code: &str,
        defect_codes: impl IntoIterator<Item = DefectCode>,
    ) -> Result<(), CoreError> {
        let code = garment_code.trim().to_ascii_uppercase();
        validate_garment_code(&code)?;
        let allowed: BTreeSet<DefectCode> = defect_codes.into_iter().collect();
        if let Some(bad) = allowed.iter().find(|c| **c <= 0) {
            return Err(CoreError::Validation(format!(
                "Defect codes must be positive, got {bad}"
            )));
        }
        self.rules.insert(code, allowed);
        Ok(())
    }

    /// Drop the rule for a garment part, returning it to the permissive default.
    pub fn remove_rule(&mut self, garment_code: &str) -> bool {
        self.rules
            .remove(&garment_code.trim().to_ascii_uppercase())
            .is_some()
    }

    /// Allowed defect codes for a part, or `None` when the part has no rule.
    pub fn allowed_defects(&self, garment_code: &str) -> Option<&BTreeSet<DefectCode>> {
        self.rules.get(&garment_code.to_ascii_uppercase())
    }

    /// Whether `defect` is a realistic defect for `part`.
    ///
    /// Only the part's own rule row is consulted.
    pub fn is_valid_pair(&self, part: &GarmentPart, defect: &DefectType) -> bool {
        match self.allowed_defects(&part.code) {
            Some(allowed) => allowed.contains(&defect.code),
            None => true,
        }
    }
}

impl From<Vec<CompatibilityRule>> for CompatibilityRules {
    fn from(rows: Vec<CompatibilityRule>) -> Self {
        let rules = rows
            .into_iter()
            .map(|row| {
                (
                    row.garment_code.to_ascii_uppercase(),
                    row.defect_codes.into_iter().collect(),
                )
            })
            .collect();
        Self { rules }
    }
}

impl From<CompatibilityRules> for Vec<CompatibilityRule> {
    fn from(table: CompatibilityRules) -> Self {
        table
            .rules
            .into_iter()
            .map(|(garment_code, codes)| CompatibilityRule {
                garment_code,
                defect_codes: codes.into_iter().collect(),
            })
            .collect()
    }
}
