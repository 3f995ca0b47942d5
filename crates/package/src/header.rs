use crate::error::{ErrorKind, Result};

/// Signature found in the first four bytes of every Unreal package.
pub const PACKAGE_MAGIC: u32 = 0x9E2A_83C1;
const HEADER_SIZE: usize = 8;

/// The fixed leading fields of an Unreal package.
///
/// Only the fields needed for sniffing are read; everything past them is
/// the decoder's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageHeader {
    /// Engine file format version (61–69 for Unreal/UT, 100+ for UT2003/4).
    pub version: u16,
    /// Licensee version; non-zero for licensee builds (Unreal 2, Tactical Ops...).
    pub licensee: u16,
}

impl PackageHeader {
    pub fn new(version: u16, licensee: u16) -> Self {
        Self { version, licensee }
    }

    /// Returns `true` if `bytes` start with the package signature.
    ///
    /// ```
    /// use ua_package::PackageHeader;
    /// assert!(PackageHeader::is_package(&[0xC1, 0x83, 0x2A, 0x9E, 0x44, 0x00, 0x00, 0x00]));
    /// assert!(!PackageHeader::is_package(b"PK\x03\x04"));
    /// ```
    pub fn is_package(bytes: &[u8]) -> bool {
        bytes.len() >= 4 && u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) == PACKAGE_MAGIC
    }

    /// Reads the signature and version fields.
    pub fn sniff(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            exn::bail!(ErrorKind::Malformed(format!("header truncated at {} bytes", bytes.len())));
        }
        if !Self::is_package(bytes) {
            exn::bail!(ErrorKind::Malformed("missing package signature".to_string()));
        }
        Ok(Self {
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            licensee: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }

    /// Serializes the header fields, mostly useful for building fixtures.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&PACKAGE_MAGIC.to_le_bytes());
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6..].copy_from_slice(&self.licensee.to_le_bytes());
        out
    }
}
