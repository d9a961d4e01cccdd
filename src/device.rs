//! Device tables for the MC protocol.
//!
//! A device is a named category of PLC memory such as `D` (data register) or
//! `M` (internal relay). Each device carries the textual prefix used in
//! addresses, the numeric base its offset is written in, its one-byte binary
//! code and its two-character ASCII code.
//!
//! Two independent tables exist: [`MelsecDevice`] for standard Mitsubishi
//! controllers and [`KeyenceDevice`] for Keyence controllers speaking MC.
//!
//! # Standard table
//!
//! | Prefix | Binary | ASCII | Base | Unit |
//! |--------|--------|-------|------|------|
//! | X  | 0x9C | `X*` | 16 | bit  |
//! | Y  | 0x9D | `Y*` | 16 | bit  |
//! | M  | 0x90 | `M*` | 10 | bit  |
//! | L  | 0x92 | `L*` | 10 | bit  |
//! | F  | 0x93 | `F*` | 10 | bit  |
//! | V  | 0x94 | `V*` | 10 | bit  |
//! | B  | 0xA0 | `B*` | 16 | bit  |
//! | S  | 0x98 | `S*` | 10 | bit  |
//! | D  | 0xA8 | `D*` | 10 | word |
//! | W  | 0xB4 | `W*` | 16 | word |
//! | R  | 0xAF | `R*` | 10 | word |
//! | Z  | 0xCC | `Z*` | 10 | word |
//! | ZR | 0xB0 | `ZR` | 16 | word |
//! | TN | 0xC2 | `TN` | 10 | word |
//! | TS | 0xC1 | `TS` | 10 | bit  |
//! | TC | 0xC0 | `TC` | 10 | bit  |
//! | SN | 0xC8 | `SN` | 10 | word |
//! | SS | 0xC7 | `SS` | 10 | bit  |
//! | SC | 0xC6 | `SC` | 10 | bit  |
//! | CN | 0xC5 | `CN` | 10 | word |
//! | CS | 0xC4 | `CS` | 10 | bit  |
//! | CC | 0xC3 | `CC` | 10 | bit  |
//!
//! # Example
//!
//! ```
//! use melsec_mc::{McDevice, MelsecDevice};
//!
//! assert_eq!(MelsecDevice::D.binary_code(), 0xA8);
//! assert_eq!(MelsecDevice::X.base(), 16);
//! assert!(MelsecDevice::M.is_bit());
//! assert_eq!(MelsecDevice::ZR.to_string(), "ZR");
//! ```

use std::fmt;

/// Properties shared by every device table.
pub trait McDevice: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Every device in the table.
    const ALL: &'static [Self];

    /// Textual prefix used in addresses (`"D"`, `"ZR"`, ...).
    fn prefix(self) -> &'static str;

    /// One-byte code used in binary frames.
    fn binary_code(self) -> u8;

    /// Two-character code used in ASCII frames.
    fn ascii_code(self) -> &'static str;

    /// Numeric base the offset is written in.
    fn base(self) -> u32;

    /// Whether the device is addressed in bit units.
    fn is_bit(self) -> bool;

    /// Largest offset that fits both the binary and ASCII offset fields.
    fn max_offset(self) -> u32 {
        if self.base() == 16 {
            0xFF_FFFF
        } else {
            999_999
        }
    }
}

/// Standard Mitsubishi MELSEC devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MelsecDevice {
    /// Input relay.
    X,
    /// Output relay.
    Y,
    /// Internal relay.
    M,
    /// Latch relay.
    L,
    /// Annunciator.
    F,
    /// Edge relay.
    V,
    /// Link relay.
    B,
    /// Step relay.
    S,
    /// Data register.
    D,
    /// Link register.
    W,
    /// File register.
    R,
    /// Index register.
    Z,
    /// File register, serial numbering.
    ZR,
    /// Timer current value.
    TN,
    /// Timer contact.
    TS,
    /// Timer coil.
    TC,
    /// Retentive timer current value.
    SN,
    /// Retentive timer contact.
    SS,
    /// Retentive timer coil.
    SC,
    /// Counter current value.
    CN,
    /// Counter contact.
    CS,
    /// Counter coil.
    CC,
}

impl McDevice for MelsecDevice {
    const ALL: &'static [Self] = &[
        Self::X,
        Self::Y,
        Self::M,
        Self::L,
        Self::F,
        Self::V,
        Self::B,
        Self::S,
        Self::D,
        Self::W,
        Self::R,
        Self::Z,
        Self::ZR,
        Self::TN,
        Self::TS,
        Self::TC,
        Self::SN,
        Self::SS,
        Self::SC,
        Self::CN,
        Self::CS,
        Self::CC,
    ];

    fn prefix(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::M => "M",
            Self::L => "L",
            Self::F => "F",
            Self::V => "V",
            Self::B => "B",
            Self::S => "S",
            Self::D => "D",
            Self::W => "W",
            Self::R => "R",
            Self::Z => "Z",
            Self::ZR => "ZR",
            Self::TN => "TN",
            Self::TS => "TS",
            Self::TC => "TC",
            Self::SN => "SN",
            Self::SS => "SS",
            Self::SC => "SC",
            Self::CN => "CN",
            Self::CS => "CS",
            Self::CC => "CC",
        }
    }

    fn binary_code(self) -> u8 {
        match self {
            Self::X => 0x9C,
            Self::Y => 0x9D,
            Self::M => 0x90,
            Self::L => 0x92,
            Self::F => 0x93,
            Self::V => 0x94,
            Self::B => 0xA0,
            Self::S => 0x98,
            Self::D => 0xA8,
            Self::W => 0xB4,
            Self::R => 0xAF,
            Self::Z => 0xCC,
            Self::ZR => 0xB0,
            Self::TN => 0xC2,
            Self::TS => 0xC1,
            Self::TC => 0xC0,
            Self::SN => 0xC8,
            Self::SS => 0xC7,
            Self::SC => 0xC6,
            Self::CN => 0xC5,
            Self::CS => 0xC4,
            Self::CC => 0xC3,
        }
    }

    fn ascii_code(self) -> &'static str {
        match self {
            Self::X => "X*",
            Self::Y => "Y*",
            Self::M => "M*",
            Self::L => "L*",
            Self::F => "F*",
            Self::V => "V*",
            Self::B => "B*",
            Self::S => "S*",
            Self::D => "D*",
            Self::W => "W*",
            Self::R => "R*",
            Self::Z => "Z*",
            other => other.prefix(),
        }
    }

    fn base(self) -> u32 {
        match self {
            Self::X | Self::Y | Self::B | Self::W | Self::ZR => 16,
            _ => 10,
        }
    }

    fn is_bit(self) -> bool {
        !matches!(
            self,
            Self::D | Self::W | Self::R | Self::Z | Self::ZR | Self::TN | Self::SN | Self::CN
        )
    }
}

/// Devices available on Keyence controllers.
///
/// Shares binary codes with the standard table where the devices overlap,
/// and adds the special relays `SM` and special registers `SD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyenceDevice {
    /// Input relay.
    X,
    /// Output relay.
    Y,
    /// Link relay.
    B,
    /// Internal relay.
    M,
    /// Latch relay.
    L,
    /// Special relay.
    SM,
    /// Special register.
    SD,
    /// Data register.
    D,
    /// File register.
    R,
    /// File register, serial numbering.
    ZR,
    /// Link register.
    W,
    /// Timer current value.
    TN,
    /// Timer contact.
    TS,
    /// Counter current value.
    CN,
    /// Counter contact.
    CS,
}

impl McDevice for KeyenceDevice {
    const ALL: &'static [Self] = &[
        Self::X,
        Self::Y,
        Self::B,
        Self::M,
        Self::L,
        Self::SM,
        Self::SD,
        Self::D,
        Self::R,
        Self::ZR,
        Self::W,
        Self::TN,
        Self::TS,
        Self::CN,
        Self::CS,
    ];

    fn prefix(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::B => "B",
            Self::M => "M",
            Self::L => "L",
            Self::SM => "SM",
            Self::SD => "SD",
            Self::D => "D",
            Self::R => "R",
            Self::ZR => "ZR",
            Self::W => "W",
            Self::TN => "TN",
            Self::TS => "TS",
            Self::CN => "CN",
            Self::CS => "CS",
        }
    }

    fn binary_code(self) -> u8 {
        match self {
            Self::X => 0x9C,
            Self::Y => 0x9D,
            Self::B => 0xA0,
            Self::M => 0x90,
            Self::L => 0x92,
            Self::SM => 0x91,
            Self::SD => 0xA9,
            Self::D => 0xA8,
            Self::R => 0xAF,
            Self::ZR => 0xB0,
            Self::W => 0xB4,
            Self::TN => 0xC2,
            Self::TS => 0xC1,
            Self::CN => 0xC5,
            Self::CS => 0xC4,
        }
    }

    fn ascii_code(self) -> &'static str {
        match self {
            Self::X => "X*",
            Self::Y => "Y*",
            Self::B => "B*",
            Self::M => "M*",
            Self::L => "L*",
            Self::D => "D*",
            Self::R => "R*",
            Self::W => "W*",
            other => other.prefix(),
        }
    }

    fn base(self) -> u32 {
        match self {
            Self::X | Self::Y | Self::B | Self::ZR | Self::W => 16,
            _ => 10,
        }
    }

    fn is_bit(self) -> bool {
        matches!(
            self,
            Self::X | Self::Y | Self::B | Self::M | Self::L | Self::SM | Self::TS | Self::CS
        )
    }
}

impl fmt::Display for MelsecDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl fmt::Display for KeyenceDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A resolved device address: device plus numeric offset.
///
/// Displays in the textual form the resolver accepts, with the offset
/// written in the device's base.
///
/// ```
/// use melsec_mc::{McAddress, MelsecDevice};
///
/// assert_eq!(McAddress::new(MelsecDevice::X, 0x1A0).to_string(), "X1A0");
/// assert_eq!(McAddress::new(MelsecDevice::D, 100).to_string(), "D100");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct McAddress<D> {
    /// Device type.
    pub device: D,
    /// Offset within the device, in device units.
    pub offset: u32,
}

impl<D: McDevice> McAddress<D> {
    /// Creates a new address.
    pub fn new(device: D, offset: u32) -> Self {
        Self { device, offset }
    }

    /// Returns the address advanced by `points` device units.
    pub fn advance(self, points: u32) -> Self {
        Self {
            device: self.device,
            offset: self.offset.saturating_add(points),
        }
    }
}

impl<D: McDevice> fmt::Display for McAddress<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.device.base() == 16 {
            write!(f, "{}{:X}", self.device, self.offset)
        } else {
            write!(f, "{}{}", self.device, self.offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_melsec_codes() {
        assert_eq!(MelsecDevice::X.binary_code(), 0x9C);
        assert_eq!(MelsecDevice::D.binary_code(), 0xA8);
        assert_eq!(MelsecDevice::ZR.binary_code(), 0xB0);
        assert_eq!(MelsecDevice::CC.binary_code(), 0xC3);
        assert_eq!(MelsecDevice::D.ascii_code(), "D*");
        assert_eq!(MelsecDevice::TN.ascii_code(), "TN");
    }

    #[test]
    fn test_keyence_codes() {
        assert_eq!(KeyenceDevice::SM.binary_code(), 0x91);
        assert_eq!(KeyenceDevice::SD.binary_code(), 0xA9);
        assert_eq!(KeyenceDevice::SD.ascii_code(), "SD");
        assert!(KeyenceDevice::SM.is_bit());
        assert!(!KeyenceDevice::SD.is_bit());
    }

    #[test]
    fn test_tables_have_unique_codes() {
        let codes: HashSet<u8> = MelsecDevice::ALL.iter().map(|d| d.binary_code()).collect();
        assert_eq!(codes.len(), MelsecDevice::ALL.len());
        let codes: HashSet<u8> = KeyenceDevice::ALL.iter().map(|d| d.binary_code()).collect();
        assert_eq!(codes.len(), KeyenceDevice::ALL.len());
    }

    #[test]
    fn test_ascii_codes_are_two_chars() {
        for device in MelsecDevice::ALL {
            assert_eq!(device.ascii_code().len(), 2, "{device}");
        }
        for device in KeyenceDevice::ALL {
            assert_eq!(device.ascii_code().len(), 2, "{device}");
        }
    }

    #[test]
    fn test_bases() {
        assert_eq!(MelsecDevice::W.base(), 16);
        assert_eq!(MelsecDevice::SN.base(), 10);
        assert_eq!(MelsecDevice::ZR.max_offset(), 0xFF_FFFF);
        assert_eq!(MelsecDevice::D.max_offset(), 999_999);
    }

    #[test]
    fn test_address_display_and_advance() {
        let address = McAddress::new(MelsecDevice::B, 0xFF);
        assert_eq!(address.to_string(), "BFF");
        assert_eq!(address.advance(1).to_string(), "B100");
        assert_eq!(McAddress::new(KeyenceDevice::SD, 5).to_string(), "SD5");
    }
}
