//! Screenshot manifest (`metadata.json`) model.
//!
//! The manifest is written by the device-side capture process: one record per
//! screenshot with its tile grid size and informational fields consumed by
//! reporters. It is parsed once per run and never mutated.

use crate::result::{ShotcheckError, ShotcheckResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// File name of the manifest inside a source directory
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// File name of tile `(column, row)` of screenshot `name`.
///
/// Tile `(0, 0)` carries the bare screenshot name so single-tile captures
/// need no suffix. The capture side writes tiles under the same names.
#[must_use]
pub fn tile_file_name(name: &str, column: u32, row: u32) -> String {
    if column == 0 && row == 0 {
        format!("{name}.png")
    } else {
        format!("{name}_{column}_{row}.png")
    }
}

/// One screenshot entry of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRecord {
    /// Unique screenshot name, also the file-naming key
    pub name: String,
    /// Optional grouping used for display ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Number of tile columns
    #[serde(deserialize_with = "tile_count")]
    pub tile_width: u32,
    /// Number of tile rows
    #[serde(deserialize_with = "tile_count")]
    pub tile_height: u32,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Error recorded while capturing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Extra key/value annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<BTreeMap<String, String>>,
    /// Test class that produced the screenshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_class: Option<String>,
    /// Test method that produced the screenshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    /// View hierarchy dump file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_hierarchy: Option<String>,
    /// Accessibility issues dump file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ax_issues: Option<String>,
}

impl ScreenshotRecord {
    /// Create a record with the given name and tile grid
    #[must_use]
    pub fn new(name: impl Into<String>, tile_width: u32, tile_height: u32) -> Self {
        Self {
            name: name.into(),
            group: None,
            tile_width,
            tile_height,
            description: None,
            error: None,
            extras: None,
            test_class: None,
            test_name: None,
            view_hierarchy: None,
            ax_issues: None,
        }
    }

    /// Set the group
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// File name of tile `(column, row)`
    #[must_use]
    pub fn tile_file_name(&self, column: u32, row: u32) -> String {
        tile_file_name(&self.name, column, row)
    }

    /// All tile coordinates in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.tile_height).flat_map(move |row| (0..self.tile_width).map(move |col| (col, row)))
    }

    /// File name of the reconstructed image
    #[must_use]
    pub fn image_file_name(&self) -> String {
        format!("{}.png", self.name)
    }

    /// File name of the view hierarchy dump
    #[must_use]
    pub fn hierarchy_file_name(&self) -> String {
        self.view_hierarchy
            .clone()
            .unwrap_or_else(|| format!("{}_dump.json", self.name))
    }

    /// Group used for ordering; absent groups sort as empty
    #[must_use]
    pub fn group_or_empty(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }

    fn validate(&self) -> ShotcheckResult<()> {
        if self.name.is_empty() {
            return Err(ShotcheckError::invalid_metadata("screenshot name is empty"));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ShotcheckError::invalid_metadata(format!(
                "screenshot {} has an empty tile grid ({}x{})",
                self.name, self.tile_width, self.tile_height
            )));
        }
        Ok(())
    }
}

/// Ordered list of screenshot records from one capture run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    records: Vec<ScreenshotRecord>,
}

impl Manifest {
    /// Build a manifest from records, validating them
    ///
    /// # Errors
    ///
    /// Returns `InvalidMetadata` on an empty name, an empty tile grid or a
    /// duplicated name.
    pub fn new(records: Vec<ScreenshotRecord>) -> ShotcheckResult<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            record.validate()?;
            if !seen.insert(record.name.as_str()) {
                return Err(ShotcheckError::invalid_metadata(format!(
                    "duplicate screenshot name {}",
                    record.name
                )));
            }
        }
        Ok(Self { records })
    }

    /// Parse a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns `Json` on malformed input or `InvalidMetadata` on invalid records.
    pub fn from_json(json: &str) -> ShotcheckResult<Self> {
        let records: Vec<ScreenshotRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Load `metadata.json` from a source directory
    ///
    /// # Errors
    ///
    /// Returns `MetadataUnreadable` if the file is absent or does not parse.
    pub fn load(source_dir: &Path) -> ShotcheckResult<Self> {
        let path = Self::path_in(source_dir);
        let unreadable = |message: String| ShotcheckError::MetadataUnreadable {
            path: path.clone(),
            message,
        };

        let json = std::fs::read_to_string(&path).map_err(|e| unreadable(e.to_string()))?;
        let records: Vec<ScreenshotRecord> =
            serde_json::from_str(&json).map_err(|e| unreadable(e.to_string()))?;
        let manifest = Self::new(records)?;

        tracing::info!(
            path = %path.display(),
            screenshots = manifest.len(),
            "loaded screenshot manifest"
        );
        Ok(manifest)
    }

    /// Manifest path inside a source directory
    #[must_use]
    pub fn path_in(source_dir: &Path) -> PathBuf {
        source_dir.join(METADATA_FILE_NAME)
    }

    /// Records in manifest order
    #[must_use]
    pub fn records(&self) -> &[ScreenshotRecord] {
        &self.records
    }

    /// Iterate records in manifest order
    pub fn iter(&self) -> std::slice::Iter<'_, ScreenshotRecord> {
        self.records.iter()
    }

    /// Number of screenshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the manifest lists no screenshots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by `(group, name)` for display
    #[must_use]
    pub fn sorted(&self) -> Vec<&ScreenshotRecord> {
        let mut sorted: Vec<_> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            (a.group_or_empty(), a.name.as_str()).cmp(&(b.group_or_empty(), b.name.as_str()))
        });
        sorted
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ScreenshotRecord;
    type IntoIter = std::slice::Iter<'a, ScreenshotRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Tile counts arrive as integers or, from older writers, as strings
fn tile_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod tile_naming_tests {
        use super::*;

        #[test]
        fn test_origin_tile_has_no_suffix() {
            assert_eq!(tile_file_name("login", 0, 0), "login.png");
        }

        #[test]
        fn test_other_tiles_carry_column_then_row() {
            assert_eq!(tile_file_name("login", 1, 0), "login_1_0.png");
            assert_eq!(tile_file_name("login", 0, 2), "login_0_2.png");
            assert_eq!(tile_file_name("login", 3, 4), "login_3_4.png");
        }

        #[test]
        fn test_record_delegates() {
            let record = ScreenshotRecord::new("a", 2, 2);
            assert_eq!(record.tile_file_name(1, 1), tile_file_name("a", 1, 1));
        }

        #[test]
        fn test_tiles_row_major() {
            let record = ScreenshotRecord::new("a", 2, 2);
            let tiles: Vec<_> = record.tiles().collect();
            assert_eq!(tiles, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_full_record() {
            let json = r#"[{
                "name": "com.example.MainTest_login",
                "group": "login",
                "tileWidth": 2,
                "tileHeight": 3,
                "description": "Login screen",
                "extras": {"locale": "en"},
                "testClass": "com.example.MainTest",
                "testName": "login",
                "viewHierarchy": "com.example.MainTest_login_dump.json"
            }]"#;
            let manifest = Manifest::from_json(json).unwrap();
            let record = &manifest.records()[0];
            assert_eq!(record.name, "com.example.MainTest_login");
            assert_eq!(record.group.as_deref(), Some("login"));
            assert_eq!(record.tile_width, 2);
            assert_eq!(record.tile_height, 3);
            assert_eq!(
                record.extras.as_ref().unwrap().get("locale"),
                Some(&"en".to_string())
            );
            assert_eq!(record.error, None);
        }

        #[test]
        fn test_string_encoded_tile_counts() {
            let json = r#"[{"name": "a", "tileWidth": "3", "tileHeight": " 1 "}]"#;
            let manifest = Manifest::from_json(json).unwrap();
            assert_eq!(manifest.records()[0].tile_width, 3);
            assert_eq!(manifest.records()[0].tile_height, 1);
        }

        #[test]
        fn test_null_optional_fields() {
            let json = r#"[{"name": "a", "group": null, "tileWidth": 1, "tileHeight": 1}]"#;
            let manifest = Manifest::from_json(json).unwrap();
            assert_eq!(manifest.records()[0].group, None);
        }

        #[test]
        fn test_unknown_fields_ignored() {
            let json = r#"[{"name": "a", "tileWidth": 1, "tileHeight": 1, "deviceDensity": 420}]"#;
            assert!(Manifest::from_json(json).is_ok());
        }

        #[test]
        fn test_garbage_tile_count_rejected() {
            let json = r#"[{"name": "a", "tileWidth": "wide", "tileHeight": 1}]"#;
            assert!(matches!(
                Manifest::from_json(json),
                Err(ShotcheckError::Json(_))
            ));
        }

        #[test]
        fn test_empty_name_rejected() {
            let json = r#"[{"name": "", "tileWidth": 1, "tileHeight": 1}]"#;
            assert!(matches!(
                Manifest::from_json(json),
                Err(ShotcheckError::InvalidMetadata { .. })
            ));
        }

        #[test]
        fn test_zero_tiles_rejected() {
            let json = r#"[{"name": "a", "tileWidth": 0, "tileHeight": 1}]"#;
            assert!(matches!(
                Manifest::from_json(json),
                Err(ShotcheckError::InvalidMetadata { .. })
            ));
        }

        #[test]
        fn test_duplicate_names_rejected() {
            let records = vec![ScreenshotRecord::new("a", 1, 1), ScreenshotRecord::new("a", 1, 1)];
            let err = Manifest::new(records).unwrap_err();
            assert!(err.to_string().contains("duplicate"));
        }

        #[test]
        fn test_serialize_skips_absent_fields() {
            let manifest = Manifest::new(vec![ScreenshotRecord::new("a", 1, 2)]).unwrap();
            let json = serde_json::to_string(&manifest).unwrap();
            assert_eq!(json, r#"[{"name":"a","tileWidth":1,"tileHeight":2}]"#);
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_load_from_source_dir() {
            let temp_dir = TempDir::new().unwrap();
            std::fs::write(
                temp_dir.path().join(METADATA_FILE_NAME),
                r#"[{"name": "a", "tileWidth": 1, "tileHeight": 1}]"#,
            )
            .unwrap();

            let manifest = Manifest::load(temp_dir.path()).unwrap();
            assert_eq!(manifest.len(), 1);
            assert_eq!(manifest.records()[0].name, "a");
        }

        #[test]
        fn test_missing_file_is_unreadable() {
            let temp_dir = TempDir::new().unwrap();
            let err = Manifest::load(temp_dir.path()).unwrap_err();
            assert!(matches!(err, ShotcheckError::MetadataUnreadable { .. }));
        }

        #[test]
        fn test_truncated_file_is_unreadable() {
            let temp_dir = TempDir::new().unwrap();
            std::fs::write(
                temp_dir.path().join(METADATA_FILE_NAME),
                r#"[{"name": "a", "tileWid"#,
            )
            .unwrap();

            let err = Manifest::load(temp_dir.path()).unwrap_err();
            assert!(matches!(err, ShotcheckError::MetadataUnreadable { .. }));
            assert!(err.to_string().contains("did not finalize"));
        }
    }

    mod ordering_tests {
        use super::*;

        #[test]
        fn test_sorted_by_group_then_name() {
            let manifest = Manifest::new(vec![
                ScreenshotRecord::new("zeta", 1, 1).with_group("b"),
                ScreenshotRecord::new("beta", 1, 1),
                ScreenshotRecord::new("alpha", 1, 1).with_group("b"),
                ScreenshotRecord::new("omega", 1, 1).with_group("a"),
            ])
            .unwrap();

            let names: Vec<_> = manifest.sorted().iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["beta", "omega", "alpha", "zeta"]);
        }

        #[test]
        fn test_manifest_order_preserved() {
            let manifest = Manifest::new(vec![
                ScreenshotRecord::new("b", 1, 1),
                ScreenshotRecord::new("a", 1, 1),
            ])
            .unwrap();
            let names: Vec<_> = manifest.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["b", "a"]);
        }

        #[test]
        fn test_hierarchy_file_name() {
            let record = ScreenshotRecord::new("a", 1, 1);
            assert_eq!(record.hierarchy_file_name(), "a_dump.json");

            let mut record = record;
            record.view_hierarchy = Some("custom.json".to_string());
            assert_eq!(record.hierarchy_file_name(), "custom.json");
        }
    }
}
