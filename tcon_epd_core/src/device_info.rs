//! Identity string reported by the TCon.

/// Prefix the MpicoSys firmware puts in front of the panel size and version.
pub const VENDOR_PREFIX: &str = "MpicoSys TC";

/// Length of the answer to the info query.
pub const DEVICE_INFO_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub raw: Vec<u8>,
    pub text: String,
    pub size: Option<String>,
    pub version: Option<String>,
}

impl DeviceInfo {
    /// Best-effort parse; an unrecognised answer keeps only `raw` and `text`.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw)
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_owned();

        let mut fields = text.split('-');
        let (size, version) = match fields.next() {
            Some(VENDOR_PREFIX) => (
                fields.next().map(str::to_owned),
                fields.next().map(str::to_owned),
            ),
            _ => (None, None),
        };

        Self {
            raw: raw.to_vec(),
            text,
            size,
            version,
        }
    }
}
