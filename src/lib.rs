//! # china_division
//!
//! Chinese administrative-division lookups: division codes and resident ID
//! numbers to province / city / area names, ID-number checks, and tree forms
//! of the division table for cascading selectors.
//!
//! The bundled `data/` directory is a sample of the GB/T 2260 table: every
//! province, plus cities and areas for a handful of them (Beijing, Tianjin,
//! Shanghai, Chongqing, and parts of Hebei, Jiangsu, Zhejiang, Anhui, Henan,
//! Hubei, Guangdong and Sichuan). Point [`DataConfig`] or
//! `CHINA_DIVISION_DATA_DIR` at a full export for complete coverage.
//!
//! ```no_run
//! use china_division::{Division, ResolveOptions};
//!
//! let division = Division::shared();
//! let addr = division.resolve_address("11010119800101001X", &ResolveOptions::default())?;
//! assert_eq!(addr.province, "北京市");
//! # Ok::<(), china_division::DivisionError>(())
//! ```

pub mod code;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod id_card;
pub mod resolver;
pub mod store;

use std::sync::LazyLock;

pub use code::{DIRECT_UNITS_LABEL, DivisionLevel, UNKNOWN_PLACEHOLDER};
pub use config::{DataConfig, ResolveOptions};
pub use division_types::{
    AddressResult, Birthdate, Gender, HierarchyNode, IdCardInfo, LeveledEntry, LeveledMap,
};
pub use error::{DivisionError, Result};
pub use hierarchy::HierarchyBuilder;
pub use id_card::IdCardService;
pub use resolver::AddressResolver;
pub use store::{CodeTable, DataStore, DiffMap, DivisionMap};

static SHARED: LazyLock<Division> = LazyLock::new(Division::from_env);

/// Entry point bundling a [`DataStore`] with the services built on it.
#[derive(Debug, Default)]
pub struct Division {
    store: DataStore,
}

impl Division {
    pub fn new(config: DataConfig) -> Self {
        Self::with_store(DataStore::new(config))
    }

    /// Datasets from `CHINA_DIVISION_DATA_DIR`, or the bundled ones.
    pub fn from_env() -> Self {
        Self::with_store(DataStore::from_env())
    }

    pub fn with_store(store: DataStore) -> Self {
        Self { store }
    }

    /// Process-wide instance; its datasets are loaded once for the whole
    /// process.
    pub fn shared() -> &'static Division {
        &SHARED
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DataStore {
        &mut self.store
    }

    // ── Raw datasets ─────────────────────────────────────────────────

    pub fn current_divisions(&self) -> Result<&DivisionMap> {
        self.store.current()
    }

    pub fn historical_divisions(&self) -> Result<&DivisionMap> {
        self.store.historical()
    }

    pub fn diffs(&self) -> Result<&DiffMap> {
        self.store.diff()
    }

    // ── Addresses ────────────────────────────────────────────────────

    /// Issuing area of an ID number. See [`IdCardService::address_of`].
    pub fn resolve_address(&self, id_number: &str, opts: &ResolveOptions) -> Result<AddressResult> {
        IdCardService::new(&self.store).address_of(id_number, opts)
    }

    /// Names for a bare 6-digit area code.
    pub fn resolve_code(&self, code: &str, opts: &ResolveOptions) -> Result<AddressResult> {
        AddressResolver::new(&self.store).resolve(code, opts.include_direct_units, &opts.unknown)
    }

    // ── ID numbers ───────────────────────────────────────────────────

    pub fn validate_id_number(&self, id_number: &str) -> bool {
        id_card::validate(id_number)
    }

    pub fn gender_from_id(&self, id_number: &str) -> Gender {
        id_card::gender_of(id_number)
    }

    pub fn birthdate_from_id(&self, id_number: &str) -> Birthdate {
        id_card::birthdate_of(id_number)
    }

    pub fn inspect(&self, id_number: &str, opts: &ResolveOptions) -> Result<IdCardInfo> {
        IdCardService::new(&self.store).inspect(id_number, opts)
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    pub fn city_levels(&self) -> Result<LeveledMap> {
        HierarchyBuilder::new(&self.store).leveled_map()
    }

    pub fn cascader_tree(&self) -> Result<Vec<HierarchyNode>> {
        HierarchyBuilder::new(&self.store).cascader_tree()
    }
}
