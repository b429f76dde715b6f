//! Parsing of record types and hex payloads given on the command line.
//!
//! # Notation
//!
//! - Record types: `sec`, `gatt`, `device-id`, `any`, or a raw tag in
//!   decimal (`16`) or hex (`0x10`)
//! - Hex data: `0a1b2c`, `0x0a1b2c`, `0a:1b:2c` or `"0a 1b 2c"`

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use blenvm_adapters::RecordType;

/// Parse a record type name or raw tag.
pub fn parse_record_type(spec: &str) -> Result<RecordType> {
    let spec = spec.trim();
    let record_type = match spec.to_ascii_lowercase().as_str() {
        "sec" | "security" => RecordType::SECURITY,
        "gatt" => RecordType::GATT,
        "device-id" | "id" => RecordType::DEVICE_ID,
        "any" => RecordType::ANY,
        _ => {
            let raw = match spec.strip_prefix("0x").or_else(|| spec.strip_prefix("0X")) {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => spec.parse::<u8>(),
            }
            .with_context(|| {
                format!("'{spec}' is not a record type (sec, gatt, device-id, any or 0..=255)")
            })?;
            RecordType::new(raw)
        }
    };
    Ok(record_type)
}

/// Bytes given as hex on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    /// The parsed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for HexBytes {
    type Err = anyhow::Error;

    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let spec = spec
            .strip_prefix("0x")
            .or_else(|| spec.strip_prefix("0X"))
            .unwrap_or(spec);

        let digits: Vec<u8> = spec
            .bytes()
            .filter(|b| !matches!(b, b':' | b' '))
            .collect();

        if digits.len() % 2 != 0 {
            bail!("hex data '{spec}' has an odd number of digits");
        }

        let bytes = digits
            .chunks(2)
            .map(|pair| {
                let pair = std::str::from_utf8(pair).unwrap_or("??");
                u8::from_str_radix(pair, 16)
                    .with_context(|| format!("'{pair}' is not a hex byte"))
            })
            .collect::<Result<Vec<u8>>>()?;

        Ok(Self(bytes))
    }
}

/// Lowercase hex without separators.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_types() {
        assert_eq!(parse_record_type("sec").unwrap(), RecordType::SECURITY);
        assert_eq!(parse_record_type("GATT").unwrap(), RecordType::GATT);
        assert_eq!(parse_record_type("device-id").unwrap(), RecordType::DEVICE_ID);
        assert_eq!(parse_record_type("any").unwrap(), RecordType::ANY);
    }

    #[test]
    fn test_parse_raw_types() {
        assert_eq!(parse_record_type("16").unwrap(), RecordType::new(16));
        assert_eq!(parse_record_type("0x10").unwrap(), RecordType::new(16));
        assert_eq!(parse_record_type("0xff").unwrap(), RecordType::ANY);
    }

    #[test]
    fn test_parse_bad_type() {
        let err = parse_record_type("256").unwrap_err();
        assert!(err.to_string().contains("not a record type"));
        assert!(parse_record_type("bond").is_err());
    }

    #[test]
    fn test_parse_hex_notations() {
        let expected = HexBytes(vec![0x0a, 0x1b, 0x2c]);
        assert_eq!("0a1b2c".parse::<HexBytes>().unwrap(), expected);
        assert_eq!("0x0A1B2C".parse::<HexBytes>().unwrap(), expected);
        assert_eq!("0a:1b:2c".parse::<HexBytes>().unwrap(), expected);
        assert_eq!("0a 1b 2c".parse::<HexBytes>().unwrap(), expected);
        assert_eq!("".parse::<HexBytes>().unwrap(), HexBytes::default());
    }

    #[test]
    fn test_parse_bad_hex() {
        let err = "abc".parse::<HexBytes>().unwrap_err();
        assert!(err.to_string().contains("odd number"));
        assert!("zz".parse::<HexBytes>().is_err());
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(format_hex(&[]), "");
    }
}
