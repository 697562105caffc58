//! nRF chip families and where their settings page lives.

use core::fmt;
use core::str::FromStr;

use dfu_errors::ParseError;

/// nRF IC family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipFamily {
    /// nRF51 series, 256 KiB flash
    Nrf51,
    /// nRF52832, 512 KiB flash
    Nrf52,
    /// nRF52832-QFAB, 256 KiB flash
    Nrf52Qfab,
    /// nRF52810, 192 KiB flash
    Nrf52810,
    /// nRF52840, 1 MiB flash
    Nrf52840,
}

impl ChipFamily {
    /// Every supported family, in the order they are listed to operators.
    pub const ALL: [ChipFamily; 5] = [
        ChipFamily::Nrf51,
        ChipFamily::Nrf52,
        ChipFamily::Nrf52Qfab,
        ChipFamily::Nrf52810,
        ChipFamily::Nrf52840,
    ];

    /// Default settings page address, the last flash page.
    pub const fn settings_address(self) -> u32 {
        match self {
            ChipFamily::Nrf51 => 0x0003_FC00,
            ChipFamily::Nrf52 => 0x0007_F000,
            ChipFamily::Nrf52Qfab => 0x0003_F000,
            ChipFamily::Nrf52810 => 0x0002_F000,
            ChipFamily::Nrf52840 => 0x000F_F000,
        }
    }

    /// Settings structure version understood by bootloaders for this family.
    pub const fn settings_version(self) -> u32 {
        match self {
            ChipFamily::Nrf51 => 1,
            _ => 2,
        }
    }

    /// Canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            ChipFamily::Nrf51 => "NRF51",
            ChipFamily::Nrf52 => "NRF52",
            ChipFamily::Nrf52Qfab => "NRF52QFAB",
            ChipFamily::Nrf52810 => "NRF52810",
            ChipFamily::Nrf52840 => "NRF52840",
        }
    }

    /// Family whose default settings page sits at `address`, if any.
    pub fn from_settings_address(address: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.settings_address() == address)
    }
}

impl fmt::Display for ChipFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let expected = Self::ALL.map(ChipFamily::name).join(", ");
                ParseError::unknown_identifier("family", s, expected)
            })
    }
}
