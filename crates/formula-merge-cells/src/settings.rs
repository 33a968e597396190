use serde::{Deserialize, Serialize};

use crate::MergedRegion;

/// The grid's `mergeCells` setting.
///
/// Either a flag (`true` enables merging with no initial regions) or the list of
/// initially merged regions:
///
/// ```json
/// { "mergeCells": [{ "row": 1, "col": 1, "rowspan": 3, "colspan": 3 }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MergeCellsSetting {
    Enabled(bool),
    Regions(Vec<MergedRegion>),
}

impl MergeCellsSetting {
    /// Whether the setting turns the feature on. An empty list still enables it.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            MergeCellsSetting::Enabled(enabled) => *enabled,
            MergeCellsSetting::Regions(_) => true,
        }
    }

    #[must_use]
    pub fn regions(&self) -> &[MergedRegion] {
        match self {
            MergeCellsSetting::Enabled(_) => &[],
            MergeCellsSetting::Regions(regions) => regions,
        }
    }
}

impl Default for MergeCellsSetting {
    fn default() -> Self {
        MergeCellsSetting::Enabled(false)
    }
}

impl From<Vec<MergedRegion>> for MergeCellsSetting {
    fn from(value: Vec<MergedRegion>) -> Self {
        MergeCellsSetting::Regions(value)
    }
}
