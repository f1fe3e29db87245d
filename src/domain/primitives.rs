//! Domain primitives: VendorId, BrandId, RetentionBucket.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Vendor identifier assigned by the vendor directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VendorId(pub i64);

impl VendorId {
    /// Create a VendorId from its raw id.
    pub fn new(id: i64) -> Self {
        VendorId(id)
    }

    /// Get the underlying id value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VendorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(VendorId)
    }
}

/// Brand identifier; a brand groups one or more vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BrandId(pub i64);

impl BrandId {
    /// Create a BrandId from its raw id.
    pub fn new(id: i64) -> Self {
        BrandId(id)
    }

    /// Get the underlying id value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BrandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BrandId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(BrandId)
    }
}

/// Deposit-retention horizon at which return-rate is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RetentionBucket {
    /// Next-funded-day rate after the first deposit.
    Nfd,
    D1,
    D3,
    D7,
    D15,
    D30,
}

impl RetentionBucket {
    /// All buckets in scoring order.
    pub const ALL: [RetentionBucket; 6] = [
        RetentionBucket::Nfd,
        RetentionBucket::D1,
        RetentionBucket::D3,
        RetentionBucket::D7,
        RetentionBucket::D15,
        RetentionBucket::D30,
    ];

    /// Stable storage/wire name for this bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionBucket::Nfd => "NFD",
            RetentionBucket::D1 => "D1",
            RetentionBucket::D3 => "D3",
            RetentionBucket::D7 => "D7",
            RetentionBucket::D15 => "D15",
            RetentionBucket::D30 => "D30",
        }
    }
}

impl std::fmt::Display for RetentionBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a retention bucket name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketParseError(pub String);

impl std::fmt::Display for BucketParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown retention bucket: {}", self.0)
    }
}

impl std::error::Error for BucketParseError {}

impl FromStr for RetentionBucket {
    type Err = BucketParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NFD" => Ok(RetentionBucket::Nfd),
            "D1" => Ok(RetentionBucket::D1),
            "D3" => Ok(RetentionBucket::D3),
            "D7" => Ok(RetentionBucket::D7),
            "D15" => Ok(RetentionBucket::D15),
            "D30" => Ok(RetentionBucket::D30),
            other => Err(BucketParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_id_display_and_parse() {
        let id = VendorId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(VendorId::from_str(" 42 ").unwrap(), id);
    }

    #[test]
    fn test_bucket_roundtrip() {
        for bucket in RetentionBucket::ALL {
            let parsed = RetentionBucket::from_str(bucket.as_str()).unwrap();
            assert_eq!(parsed, bucket);
        }
    }

    #[test]
    fn test_bucket_parse_is_case_insensitive() {
        assert_eq!(
            RetentionBucket::from_str("nfd").unwrap(),
            RetentionBucket::Nfd
        );
        assert!(RetentionBucket::from_str("D2").is_err());
    }

    #[test]
    fn test_bucket_serialization() {
        let json = serde_json::to_string(&RetentionBucket::D15).unwrap();
        assert_eq!(json, "\"D15\"");
    }
}
