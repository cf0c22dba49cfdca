//! Division code → address resolution.
//!
//! Lookup order for an area-level code:
//!   1. `current`    — the code is still in use
//!   2. `diff`       — the code was reassigned to exactly one successor;
//!                     resolve the successor instead (chains are followed)
//!   3. `historical` — the code was retired without a unique successor
//!   4. all components unknown
//!
//! Province and city names are always taken from the same table the area
//! name came from, so current and historical names are never mixed.

use division_types::AddressResult;
use tracing::{trace, warn};

use crate::code::{DIRECT_UNITS_LABEL, city_code, is_area_code, prefix, province_code};
use crate::error::Result;
use crate::store::{DataStore, DivisionMap};

/// Upper bound on diff hops before a chain is treated as unresolvable.
/// Real reassignment chains are one or two hops long; the cap only matters
/// for circular data.
pub const MAX_DIFF_HOPS: usize = 10;

pub struct AddressResolver<'a> {
    store: &'a DataStore,
}

impl<'a> AddressResolver<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Resolve a 6-digit area code to names.
    ///
    /// Codes that are malformed or name a province/city (`..00`) resolve to
    /// all-unknown. Only loading errors are returned as `Err`.
    pub fn resolve(&self, code: &str, include_direct_units: bool, unknown: &str) -> Result<AddressResult> {
        let mut code = code.to_string();
        let mut hops = 0;

        loop {
            if !is_area_code(&code) {
                break;
            }

            let current = self.store.current()?;
            if current.contains(&code) {
                return Ok(compose(current, &code, include_direct_units, unknown));
            }

            if let Some(next) = self.successor(&code)? {
                if hops == MAX_DIFF_HOPS {
                    warn!(code = %code, max_hops = MAX_DIFF_HOPS, "division reassignment chain too long, giving up");
                    break;
                }
                hops += 1;
                trace!(from = %code, to = %next, hops, "following division reassignment");
                code = next;
                continue;
            }

            let historical = self.store.historical()?;
            if historical.contains(&code) {
                return Ok(compose(historical, &code, include_direct_units, unknown));
            }
            break;
        }

        Ok(AddressResult::unknown(unknown))
    }

    /// The unique replacement code for a reassigned division, if any.
    /// Ambiguous (several successors) and empty entries yield `None`.
    /// A single replacement is always followed, even when it is too short to
    /// be a code; the next round then rejects it.
    fn successor(&self, code: &str) -> Result<Option<String>> {
        let diff = self.store.diff()?;
        let next = match diff.get(code).map(Vec::as_slice) {
            Some([only]) => Some(prefix(only, 6).unwrap_or(only.as_str()).to_string()),
            Some(many) if many.len() > 1 => {
                trace!(code, candidates = many.len(), "ambiguous reassignment, not following");
                None
            }
            _ => None,
        };
        Ok(next)
    }
}

/// Build the three names for `code` from a single table.
fn compose(source: &DivisionMap, code: &str, include_direct_units: bool, unknown: &str) -> AddressResult {
    let province = province_code(code)
        .and_then(|pc| source.get(&pc).cloned())
        .unwrap_or_else(|| unknown.to_string());
    let city = match city_code(code).and_then(|cc| source.get(&cc)) {
        Some(name) => name.clone(),
        None if include_direct_units => DIRECT_UNITS_LABEL.to_string(),
        None => String::new(),
    };
    let area = source
        .get(code)
        .cloned()
        .unwrap_or_else(|| unknown.to_string());

    AddressResult {
        province,
        city,
        area,
    }
}
