use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Resolved address ─────────────────────────────────────────────────────

/// Province / city / area names resolved from a division code.
///
/// Any component that could not be resolved carries the caller's
/// "unknown" placeholder (默认 "未知"). `city` may also be "市辖区" or empty
/// for municipalities without an intermediate city tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressResult {
    pub province: String,
    pub city: String,
    pub area: String,
}

impl AddressResult {
    /// All three components set to the same placeholder.
    pub fn unknown(placeholder: &str) -> Self {
        Self {
            province: placeholder.to_string(),
            city: placeholder.to_string(),
            area: placeholder.to_string(),
        }
    }
}

// ── ID-number derived facts ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    /// The ID number did not match the 18-character pattern.
    Unknown,
}

impl Gender {
    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::Male => "男",
            Self::Female => "女",
            Self::Unknown => "未知",
        }
    }
}

/// Birthdate digits exactly as they appear in the ID number.
/// Empty strings when the ID number is malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthdate {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl Birthdate {
    pub fn is_empty(&self) -> bool {
        self.year.is_empty() && self.month.is_empty() && self.day.is_empty()
    }
}

/// Everything derivable from one ID number in a single record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdCardInfo {
    pub id_number: String,
    /// Checksum verdict (GB 11643).
    pub valid: bool,
    pub gender: Gender,
    pub birthdate: Birthdate,
    pub address: AddressResult,
}

// ── Cascader tree ────────────────────────────────────────────────────────

/// A node in the province → city → area selector tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub code: String,
    /// `None` only for a province that was never listed on its own.
    pub name: Option<String>,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn new(code: impl Into<String>, name: Option<String>) -> Self {
        Self {
            code: code.into(),
            name,
            children: Vec::new(),
        }
    }
}

// ── Leveled (flat, parent-pointer) form ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledEntry {
    pub name: String,
    /// Code of the parent entry one level up (`"0"` for provinces).
    pub parent: String,
}

/// Divisions split into three flat levels keyed by truncated code:
/// 2 digits (province), 4 digits (city), 6 digits (area).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledMap {
    pub level1: BTreeMap<String, LeveledEntry>,
    pub level2: BTreeMap<String, LeveledEntry>,
    pub level3: BTreeMap<String, LeveledEntry>,
}

impl LeveledMap {
    /// Look up an entry by its truncated code; the level follows from the length.
    pub fn get(&self, code: &str) -> Option<&LeveledEntry> {
        match code.len() {
            2 => self.level1.get(code),
            4 => self.level2.get(code),
            6 => self.level3.get(code),
            _ => None,
        }
    }
}
