//! Garment part and defect type catalogs.
//!
//! The built-in catalog covers the parts and defects seen on every line.
//! Plants extend it with custom entries; the host persists those and merges
//! them back in at startup via [`Catalog::with_custom_entries`]. Entries are
//! immutable once created and codes are never reused.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DefectCode;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a garment part code.
pub const MAX_GARMENT_CODE_LENGTH: usize = 3;

/// Built-in garment parts as `(code, name)`.
pub const BUILTIN_GARMENT_PARTS: &[(&str, &str)] = &[
    ("A", "Collar"),
    ("B", "Sleeve"),
    ("C", "Cuff"),
    ("D", "Pocket"),
    ("E", "Placket"),
    ("F", "Hem"),
    ("G", "Front Panel"),
    ("H", "Back Panel"),
    ("I", "Waistband"),
    ("J", "Label"),
];

/// Built-in defect types as `(code, name)`.
pub const BUILTIN_DEFECT_TYPES: &[(DefectCode, &str)] = &[
    (1, "Print Defect"),
    (2, "Open Seam"),
    (3, "Broken Stitch"),
    (4, "Skipped Stitch"),
    (5, "Stain"),
    (6, "Hole"),
    (7, "Puckering"),
    (8, "Uneven Stitch"),
    (9, "Shade Variation"),
    (10, "Missing Button"),
    (11, "Wrong Measurement"),
    (12, "Fabric Fault"),
    (13, "Raw Edge"),
    (14, "Loose Thread"),
    (15, "Misaligned Pattern"),
];

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A garment part a defect can be found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentPart {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

impl GarmentPart {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            custom: false,
        }
    }
}

/// A kind of defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectType {
    pub code: DefectCode,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

impl DefectType {
    pub fn new(code: DefectCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            custom: false,
        }
    }
}

/// Input for a user-defined garment part.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGarmentPart {
    #[validate(length(min = 1, max = 3))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Input for a user-defined defect type. The code is assigned by the catalog.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDefectType {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The merged set of garment parts and defect types available to a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    garment_parts: Vec<GarmentPart>,
    defect_types: Vec<DefectType>,
    /// Highest defect code ever issued; custom codes start above it.
    defect_code_high_water: DefectCode,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in catalog with no custom entries.
    pub fn builtin() -> Self {
        let garment_parts = BUILTIN_GARMENT_PARTS
            .iter()
            .map(|(code, name)| GarmentPart::new(*code, *name))
            .collect();
        let defect_types: Vec<DefectType> = BUILTIN_DEFECT_TYPES
            .iter()
            .map(|(code, name)| DefectType::new(*code, *name))
            .collect();
        let defect_code_high_water = defect_types.iter().map(|d| d.code).max().unwrap_or(0);

        Self {
            garment_parts,
            defect_types,
            defect_code_high_water,
        }
    }

    /// Merge previously persisted custom entries into the built-in catalog.
    ///
    /// Entries whose code collides with an existing one are rejected.
    pub fn with_custom_entries(
        parts: Vec<GarmentPart>,
        defects: Vec<DefectType>,
    ) -> Result<Self, CoreError> {
        let mut catalog = Self::builtin();
        for part in parts {
            validate_garment_code(&part.code)?;
            catalog.ensure_garment_code_free(&part.code)?;
            catalog.garment_parts.push(GarmentPart {
                custom: true,
                ..part
            });
        }
        for defect in defects {
            if defect.code <= 0 {
                return Err(CoreError::Validation(format!(
                    "Defect code must be positive, got {}",
                    defect.code
                )));
            }
            if catalog.defect_type(defect.code).is_some() {
                return Err(CoreError::Conflict(format!(
                    "Defect code {} already exists",
                    defect.code
                )));
            }
            catalog.defect_code_high_water = catalog.defect_code_high_water.max(defect.code);
            catalog.defect_types.push(DefectType {
                custom: true,
                ..defect
            });
        }
        Ok(catalog)
    }

    pub fn garment_parts(&self) -> &[GarmentPart] {
        &self.garment_parts
    }

    pub fn defect_types(&self) -> &[DefectType] {
        &self.defect_types
    }

    /// Look up a garment part by code (case-insensitive).
    pub fn garment_part(&self, code: &str) -> Option<&GarmentPart> {
        self.garment_parts
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }

    pub fn defect_type(&self, code: DefectCode) -> Option<&DefectType> {
        self.defect_types.iter().find(|d| d.code == code)
    }

    /// Like [`Catalog::garment_part`] but returns `NotFound` when missing.
    pub fn require_garment_part(&self, code: &str) -> Result<&GarmentPart, CoreError> {
        self.garment_part(code).ok_or_else(|| CoreError::NotFound {
            entity: "garment_part",
            code: code.to_string(),
        })
    }

    pub fn require_defect_type(&self, code: DefectCode) -> Result<&DefectType, CoreError> {
        self.defect_type(code).ok_or_else(|| CoreError::NotFound {
            entity: "defect_type",
            code: code.to_string(),
        })
    }

    /// The code the next custom defect type will receive, or `None` once
    /// the code space is exhausted.
    pub fn next_defect_code(&self) -> Option<DefectCode> {
        self.defect_code_high_water.checked_add(1)
    }

    /// Add a user-defined garment part. The code is stored upper-cased.
    pub fn add_custom_garment_part(
        &mut self,
        input: NewGarmentPart,
    ) -> Result<GarmentPart, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let code = input.code.trim().to_ascii_uppercase();
        validate_garment_code(&code)?;
        self.ensure_garment_code_free(&code)?;

        let part = GarmentPart {
            code,
            name: input.name.trim().to_string(),
            custom: true,
        };
        self.garment_parts.push(part.clone());
        tracing::debug!(code = %part.code, "Custom garment part added");
        Ok(part)
    }

    /// Add a user-defined defect type with the next free code.
    pub fn add_custom_defect_type(&mut self, input: NewDefectType) -> Result<DefectType, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(
                "Defect type name must not be blank".to_string(),
            ));
        }

        let code = self.next_defect_code().ok_or_else(|| {
            CoreError::Conflict("No defect codes left to assign".to_string())
        })?;
        let defect = DefectType {
            code,
            name: name.to_string(),
            custom: true,
        };
        self.defect_code_high_water = defect.code;
        self.defect_types.push(defect.clone());
        tracing::debug!(code = defect.code, "Custom defect type added");
        Ok(defect)
    }

    fn ensure_garment_code_free(&self, code: &str) -> Result<(), CoreError> {
        if self.garment_part(code).is_some() {
            return Err(CoreError::Conflict(format!(
                "Garment part code '{code}' already exists"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a garment part code: 1-3 ASCII uppercase letters.
pub fn validate_garment_code(code: &str) -> Result<(), CoreError> {
    if code.is_empty() || code.len() > MAX_GARMENT_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Garment part code must be 1-{MAX_GARMENT_CODE_LENGTH} letters, got '{code}'"
        )));
    }
    if !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(CoreError::Validation(format!(
            "Garment part code '{code}' must contain only uppercase letters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- builtin --------------------------------------------------------------

    #[test]
    fn builtin_catalog_has_all_entries() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.garment_parts().len(), BUILTIN_GARMENT_PARTS.len());
        assert_eq!(catalog.defect_types().len(), BUILTIN_DEFECT_TYPES.len());
        assert!(catalog.garment_parts().iter().all(|p| !p.custom));
    }

    #[test]
    fn lookup_is_case_insensitive_for_parts() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.garment_part("b").unwrap().name, "Sleeve");
        assert!(catalog.garment_part("Z").is_none());
    }

    #[test]
    fn require_missing_defect_is_not_found() {
        let catalog = Catalog::builtin();
        assert_matches!(
            catalog.require_defect_type(99),
            Err(CoreError::NotFound { entity: "defect_type", .. })
        );
    }

    // -- custom garment parts -------------------------------------------------

    #[test]
    fn custom_garment_part_is_upper_cased() {
        let mut catalog = Catalog::builtin();
        let part = catalog
            .add_custom_garment_part(NewGarmentPart {
                code: "zp".to_string(),
                name: " Zipper ".to_string(),
            })
            .unwrap();
        assert_eq!(part.code, "ZP");
        assert_eq!(part.name, "Zipper");
        assert!(part.custom);
        assert!(catalog.garment_part("ZP").is_some());
    }

    #[test]
    fn duplicate_garment_code_conflicts() {
        let mut catalog = Catalog::builtin();
        let result = catalog.add_custom_garment_part(NewGarmentPart {
            code: "a".to_string(),
            name: "Another collar".to_string(),
        });
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[test]
    fn invalid_garment_codes_rejected() {
        assert!(validate_garment_code("").is_err());
        assert!(validate_garment_code("ABCD").is_err());
        assert!(validate_garment_code("A1").is_err());
        assert!(validate_garment_code("ab").is_err());
        assert!(validate_garment_code("AB").is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        let mut catalog = Catalog::builtin();
        let result = catalog.add_custom_garment_part(NewGarmentPart {
            code: "K".to_string(),
            name: String::new(),
        });
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    // -- custom defect types --------------------------------------------------

    #[test]
    fn custom_defects_get_sequential_codes() {
        let mut catalog = Catalog::builtin();
        let first = catalog
            .add_custom_defect_type(NewDefectType {
                name: "Glue mark".to_string(),
            })
            .unwrap();
        let second = catalog
            .add_custom_defect_type(NewDefectType {
                name: "Needle hole".to_string(),
            })
            .unwrap();
        assert_eq!(first.code, 16);
        assert_eq!(second.code, 17);
        assert_eq!(catalog.next_defect_code(), Some(18));
    }

    #[test]
    fn blank_defect_name_rejected() {
        let mut catalog = Catalog::builtin();
        let result = catalog.add_custom_defect_type(NewDefectType {
            name: "   ".to_string(),
        });
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert_eq!(catalog.next_defect_code(), Some(16));
    }

    // -- merging persisted entries --------------------------------------------

    #[test]
    fn merged_entries_raise_high_water_mark() {
        let catalog = Catalog::with_custom_entries(
            vec![GarmentPart::new("K", "Hood")],
            vec![DefectType::new(40, "Heat scorch")],
        )
        .unwrap();
        assert!(catalog.garment_part("K").unwrap().custom);
        assert!(catalog.defect_type(40).unwrap().custom);
        assert_eq!(catalog.next_defect_code(), Some(41));
    }

    #[test]
    fn exhausted_defect_codes_conflict() {
        let mut catalog = Catalog::with_custom_entries(
            vec![],
            vec![DefectType::new(DefectCode::MAX, "Last code")],
        )
        .unwrap();
        assert_eq!(catalog.next_defect_code(), None);

        let result = catalog.add_custom_defect_type(NewDefectType {
            name: "One too many".to_string(),
        });
        assert_matches!(result, Err(CoreError::Conflict(_)));
        assert_eq!(catalog.defect_types().len(), BUILTIN_DEFECT_TYPES.len() + 1);
    }

    #[test]
    fn merged_duplicate_defect_code_conflicts() {
        let result =
            Catalog::with_custom_entries(vec![], vec![DefectType::new(3, "Duplicate")]);
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }
}
