use serde::{Deserialize, Serialize};

/// Stable identifier of a visitor record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(n: u64) -> Self {
        RecordId(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a cluster produced by a clustering pass.
///
/// Packs the node index and the zoom level the cluster was formed at, so ids
/// are stable for identical input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u64);

impl ClusterId {
    pub fn new(index: u32, zoom: u8) -> Self {
        ClusterId(((index as u64) << 8) | zoom as u64)
    }

    pub fn index(self) -> u32 {
        (self.0 >> 8) as u32
    }

    pub fn zoom(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
