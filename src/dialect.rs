//! Address resolution strategies.
//!
//! A [`Dialect`] turns a textual address such as `"D100"` or `"x1a0"` into a
//! [`McAddress`] over its own device table. It is the only vendor-specific
//! piece of the client: frame building, envelope packing and transport are
//! shared by every dialect.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{Dialect, Keyence, KeyenceDevice, Melsec, MelsecDevice};
//!
//! let address = Melsec::resolve("ZR1F").unwrap();
//! assert_eq!(address.device, MelsecDevice::ZR);
//! assert_eq!(address.offset, 0x1F);
//!
//! let address = Keyence::resolve("sd20").unwrap();
//! assert_eq!(address.device, KeyenceDevice::SD);
//! assert_eq!(address.offset, 20);
//!
//! assert!(Keyence::resolve("F10").is_err());
//! ```

use crate::device::{KeyenceDevice, McAddress, McDevice, MelsecDevice};
use crate::error::{McError, Result};

/// Vendor dialect: a device table plus the rules for reading addresses.
pub trait Dialect: Send + Sync + 'static {
    /// Device table used by this dialect.
    type Device: McDevice;

    /// Human-readable dialect name, used in logs.
    const NAME: &'static str;

    /// Resolves a textual address. Case-insensitive; surrounding whitespace
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`McError::AddressParse`] when the prefix is unknown, a
    /// two-letter prefix has no matching sub-device, or the offset is not a
    /// valid numeral in the device's base.
    fn resolve(address: &str) -> Result<McAddress<Self::Device>>;
}

/// Standard Mitsubishi MELSEC dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Melsec;

/// Keyence dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keyence;

impl Dialect for Melsec {
    type Device = MelsecDevice;
    const NAME: &'static str = "melsec";

    fn resolve(address: &str) -> Result<McAddress<MelsecDevice>> {
        let text = address.trim().to_ascii_uppercase();
        let mut chars = text.chars();
        let first = chars.next();
        let second = chars.next();

        let (device, prefix_len) = match first {
            Some('X') => (MelsecDevice::X, 1),
            Some('Y') => (MelsecDevice::Y, 1),
            Some('M') => (MelsecDevice::M, 1),
            Some('D') => (MelsecDevice::D, 1),
            Some('W') => (MelsecDevice::W, 1),
            Some('L') => (MelsecDevice::L, 1),
            Some('F') => (MelsecDevice::F, 1),
            Some('V') => (MelsecDevice::V, 1),
            Some('B') => (MelsecDevice::B, 1),
            Some('R') => (MelsecDevice::R, 1),
            Some('S') => match second {
                Some('N') => (MelsecDevice::SN, 2),
                Some('S') => (MelsecDevice::SS, 2),
                Some('C') => (MelsecDevice::SC, 2),
                _ => (MelsecDevice::S, 1),
            },
            Some('Z') => match second {
                Some('R') => (MelsecDevice::ZR, 2),
                _ => (MelsecDevice::Z, 1),
            },
            Some('T') => match second {
                Some('N') => (MelsecDevice::TN, 2),
                Some('S') => (MelsecDevice::TS, 2),
                Some('C') => (MelsecDevice::TC, 2),
                _ => return Err(unknown_sub_device(address, "timer", second)),
            },
            Some('C') => match second {
                Some('N') => (MelsecDevice::CN, 2),
                Some('S') => (MelsecDevice::CS, 2),
                Some('C') => (MelsecDevice::CC, 2),
                _ => return Err(unknown_sub_device(address, "counter", second)),
            },
            _ => return Err(unknown_prefix(address)),
        };

        parse_offset(address, device, &text[prefix_len..])
    }
}

impl Dialect for Keyence {
    type Device = KeyenceDevice;
    const NAME: &'static str = "keyence";

    fn resolve(address: &str) -> Result<McAddress<KeyenceDevice>> {
        let text = address.trim().to_ascii_uppercase();
        let mut chars = text.chars();
        let first = chars.next();
        let second = chars.next();

        let (device, prefix_len) = match first {
            Some('M') => (KeyenceDevice::M, 1),
            Some('X') => (KeyenceDevice::X, 1),
            Some('Y') => (KeyenceDevice::Y, 1),
            Some('B') => (KeyenceDevice::B, 1),
            Some('L') => (KeyenceDevice::L, 1),
            Some('D') => (KeyenceDevice::D, 1),
            Some('R') => (KeyenceDevice::R, 1),
            Some('W') => (KeyenceDevice::W, 1),
            Some('S') => match second {
                Some('M') => (KeyenceDevice::SM, 2),
                Some('D') => (KeyenceDevice::SD, 2),
                _ => return Err(unknown_sub_device(address, "special", second)),
            },
            Some('Z') => match second {
                Some('R') => (KeyenceDevice::ZR, 2),
                _ => return Err(unknown_sub_device(address, "file register", second)),
            },
            Some('T') => match second {
                Some('N') => (KeyenceDevice::TN, 2),
                Some('S') => (KeyenceDevice::TS, 2),
                _ => return Err(unknown_sub_device(address, "timer", second)),
            },
            Some('C') => match second {
                Some('N') => (KeyenceDevice::CN, 2),
                Some('S') => (KeyenceDevice::CS, 2),
                _ => return Err(unknown_sub_device(address, "counter", second)),
            },
            _ => return Err(unknown_prefix(address)),
        };

        parse_offset(address, device, &text[prefix_len..])
    }
}

fn unknown_prefix(address: &str) -> McError {
    McError::address_parse(address, "unsupported device prefix")
}

fn unknown_sub_device(address: &str, family: &str, second: Option<char>) -> McError {
    match second {
        Some(c) => McError::address_parse(address, format!("unknown {family} sub-device '{c}'")),
        None => McError::address_parse(address, format!("missing {family} sub-device")),
    }
}

/// Parses the offset part of an address in the device's base.
fn parse_offset<D: McDevice>(address: &str, device: D, digits: &str) -> Result<McAddress<D>> {
    let base = device.base();
    if digits.is_empty() {
        return Err(McError::address_parse(address, "missing offset"));
    }
    // from_str_radix alone would also accept a leading '+'.
    if !digits.chars().all(|c| c.is_digit(base)) {
        return Err(McError::address_parse(
            address,
            format!("offset '{digits}' is not a base-{base} number"),
        ));
    }
    let offset = u32::from_str_radix(digits, base)
        .ok()
        .filter(|offset| *offset <= device.max_offset())
        .ok_or_else(|| McError::address_parse(address, format!("offset '{digits}' out of range")))?;
    Ok(McAddress::new(device, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_z_and_zr_are_distinct() {
        let z = Melsec::resolve("Z99").unwrap();
        let zr = Melsec::resolve("ZR99").unwrap();
        assert_eq!(z.device, MelsecDevice::Z);
        assert_eq!(z.offset, 99);
        assert_eq!(zr.device, MelsecDevice::ZR);
        assert_eq!(zr.offset, 0x99);
        assert_ne!(z.device, zr.device);
    }

    #[test]
    fn test_step_relay_variants() {
        assert_eq!(Melsec::resolve("S10").unwrap().device, MelsecDevice::S);
        assert_eq!(Melsec::resolve("SN10").unwrap().device, MelsecDevice::SN);
        assert_eq!(Melsec::resolve("SS10").unwrap().device, MelsecDevice::SS);
        assert_eq!(Melsec::resolve("SC10").unwrap().device, MelsecDevice::SC);
    }

    #[test]
    fn test_case_and_whitespace() {
        let address = Melsec::resolve("  x1a0 ").unwrap();
        assert_eq!(address, McAddress::new(MelsecDevice::X, 0x1A0));
        let address = Melsec::resolve("tn5").unwrap();
        assert_eq!(address, McAddress::new(MelsecDevice::TN, 5));
    }

    #[test]
    fn test_rejects_bad_addresses() {
        for address in ["", "Q100", "TX10", "T", "C10", "D", "D12A", "D+1", "D-1", "M1000000", "X1000000"] {
            let err = Melsec::resolve(address).unwrap_err();
            assert!(
                matches!(err, McError::AddressParse { .. }),
                "{address} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_keyence_table() {
        assert_eq!(
            Keyence::resolve("SM400").unwrap(),
            McAddress::new(KeyenceDevice::SM, 400)
        );
        assert_eq!(
            Keyence::resolve("ZR10").unwrap(),
            McAddress::new(KeyenceDevice::ZR, 0x10)
        );
        for address in ["S10", "Z10", "TC1", "CC1", "F1", "V1"] {
            assert!(Keyence::resolve(address).is_err(), "{address}");
        }
    }

    #[test]
    fn test_error_message_names_sub_device() {
        let err = Melsec::resolve("TX10").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid address 'TX10': unknown timer sub-device 'X'"
        );
    }

    proptest! {
        #[test]
        fn melsec_round_trip(
            device in proptest::sample::select(MelsecDevice::ALL),
            raw in any::<u32>(),
        ) {
            let address = McAddress::new(device, raw % (device.max_offset() + 1));
            prop_assert_eq!(Melsec::resolve(&address.to_string()).unwrap(), address);
        }

        #[test]
        fn keyence_round_trip(
            device in proptest::sample::select(KeyenceDevice::ALL),
            raw in any::<u32>(),
        ) {
            let address = McAddress::new(device, raw % (device.max_offset() + 1));
            prop_assert_eq!(Keyence::resolve(&address.to_string()).unwrap(), address);
        }

        #[test]
        fn lowercase_resolves_like_uppercase(
            device in proptest::sample::select(MelsecDevice::ALL),
            raw in 0u32..0xFFFF,
        ) {
            let text = McAddress::new(device, raw).to_string();
            prop_assert_eq!(
                Melsec::resolve(&text.to_lowercase()).unwrap(),
                Melsec::resolve(&text).unwrap()
            );
        }
    }
}
