use serde::Deserialize;

/// HPL-specific launch switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HplSection {
    /// Check that the selected parameter file exists on the host before launching.
    pub verify_dat_file: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawHplSection {
    pub verify_dat_file: Option<bool>,
}

pub fn parse_hpl_section(raw: Option<RawHplSection>) -> HplSection {
    let raw = raw.unwrap_or_default();
    HplSection {
        verify_dat_file: raw.verify_dat_file.unwrap_or(false),
    }
}
