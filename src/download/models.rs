//! Canonical datafile kinds and downloadable resources.

use std::fmt;

/// One of the three canonical survey datafiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatafileType {
    /// Administrative-entity (library system) records.
    SystemData,
    /// State summary / state characteristics records.
    StateSummary,
    /// Outlet (individual branch) records.
    OutletData,
}

impl DatafileType {
    /// All kinds, in the order the codebook appendices list them.
    pub const ALL: [Self; 3] = [Self::StateSummary, Self::SystemData, Self::OutletData];

    /// Canonical on-disk filename for the materialized datafile.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::SystemData => "SystemDataFile.csv",
            Self::StateSummary => "StateSummaryAndCharacteristicData.csv",
            Self::OutletData => "OutletData.csv",
        }
    }

    /// Cache file holding this kind's extracted variable table.
    #[must_use]
    pub fn variables_cache_file(self) -> &'static str {
        match self {
            Self::SystemData => "system_data.csv",
            Self::StateSummary => "state_summary.csv",
            Self::OutletData => "outlet_data.csv",
        }
    }

    /// The codebook appendix heading that precedes this kind's record
    /// layout table.
    #[must_use]
    pub fn record_layout_heading(self) -> &'static str {
        match self {
            Self::SystemData => "Record Layout for Public Library System Data File",
            Self::StateSummary => {
                "Record Layout for Public Library State Summary/ State Characteristics Data File"
            }
            Self::OutletData => "Record Layout for Public Library Outlet Data File",
        }
    }
}

impl fmt::Display for DatafileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename())
    }
}

/// A downloadable resource advertised on the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadResource {
    /// The codebook PDF.
    Documentation,
    /// The supplementary data-element-definitions PDF.
    DataElementDefinitions,
    /// The ZIP bundle containing the three canonical CSV tables.
    CsvBundle,
}

impl DownloadResource {
    /// The anchor label this resource is published under.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Documentation => "Documentation",
            Self::DataElementDefinitions => "Data Element Definitions",
            Self::CsvBundle => "CSV",
        }
    }

    /// On-disk filename the fetched body is persisted to.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::Documentation => "Documentation.pdf",
            Self::DataElementDefinitions => "DataElementDefinitions.pdf",
            Self::CsvBundle => "csvs.zip",
        }
    }

    /// Canonical files this resource materializes; the resource is skipped
    /// when all of them already exist.
    #[must_use]
    pub fn targets(self) -> &'static [&'static str] {
        match self {
            Self::Documentation => &["Documentation.pdf"],
            Self::DataElementDefinitions => &["DataElementDefinitions.pdf"],
            Self::CsvBundle => &[
                "SystemDataFile.csv",
                "StateSummaryAndCharacteristicData.csv",
                "OutletData.csv",
            ],
        }
    }
}

/// Ordered `(marker, kind)` pairs used to reclassify extracted archive
/// members by case-insensitive substring match. A member matching several
/// markers resolves to the first match.
pub(crate) const MEMBER_MARKERS: [(&str, DatafileType); 3] = [
    ("_ae_", DatafileType::SystemData),
    ("_outlet_", DatafileType::OutletData),
    ("_state_", DatafileType::StateSummary),
];

/// Classifies an extracted archive member name, if it matches any marker.
#[must_use]
pub fn classify_member(name: &str) -> Option<DatafileType> {
    let lowered = name.to_lowercase();
    MEMBER_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|&(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_deterministic_regardless_of_order() {
        let members = [
            ("pls_fy2017_ae_pud17i.csv", DatafileType::SystemData),
            ("PLS_FY2017_Outlet_pud17i.csv", DatafileType::OutletData),
            ("pls_fy2017_state_pud17i.csv", DatafileType::StateSummary),
        ];

        // Forward and reverse orderings classify identically.
        for (name, expected) in members {
            assert_eq!(classify_member(name), Some(expected), "{name}");
        }
        for (name, expected) in members.iter().rev() {
            assert_eq!(classify_member(name), Some(*expected), "{name}");
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(
            classify_member("PLS_FY2017_AE_PUD17I.CSV"),
            Some(DatafileType::SystemData)
        );
    }

    #[test]
    fn test_unrecognized_member_is_unclassified() {
        assert_eq!(classify_member("readme.txt"), None);
    }

    #[test]
    fn test_multi_marker_member_resolves_to_first_match() {
        assert_eq!(
            classify_member("pls_fy2017_ae_state_pud17i.csv"),
            Some(DatafileType::SystemData)
        );
    }
}
