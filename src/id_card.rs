//! 18-digit resident ID numbers (GB 11643-1999).
//!
//! Layout (1-indexed):
//!   1–6   division code of the issuing area
//!   7–14  birthdate, YYYYMMDD
//!   15–17 sequence; digit 17 odd = male, even = female
//!   18    checksum, 0–9 or X
//!
//! Nothing in here panics or errors on malformed input; bad numbers degrade
//! to `false`, `Gender::Unknown`, an empty birthdate or unknown names.

use std::sync::LazyLock;

use chrono::NaiveDate;
use division_types::{AddressResult, Birthdate, Gender, IdCardInfo};
use regex::Regex;

use crate::code::prefix;
use crate::config::ResolveOptions;
use crate::error::Result;
use crate::resolver::AddressResolver;
use crate::store::DataStore;

// `\d` would also accept non-ASCII digits.
static RE_ID_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{17}[0-9X]$").unwrap());

const CHECKSUM_WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
const CHECKSUM_CHARS: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

/// Uppercase the trailing `x`; everything else is left as given.
pub fn normalize(id_number: &str) -> String {
    id_number.to_ascii_uppercase()
}

/// 17 digits followed by a digit or `X` (after normalization).
pub fn matches_pattern(id_number: &str) -> bool {
    RE_ID_NUMBER.is_match(&normalize(id_number))
}

/// Checksum character for the first 17 digits, or `None` if `body` is not
/// exactly 17 ASCII digits.
pub fn checksum_char(body: &str) -> Option<char> {
    if body.len() != 17 {
        return None;
    }
    let mut sum = 0;
    for (c, w) in body.chars().zip(CHECKSUM_WEIGHTS) {
        sum += c.to_digit(10)? * w;
    }
    Some(CHECKSUM_CHARS[(sum % 11) as usize])
}

/// Full validation: pattern plus checksum.
pub fn validate(id_number: &str) -> bool {
    let id = normalize(id_number);
    if !RE_ID_NUMBER.is_match(&id) {
        return false;
    }
    // Pattern guarantees 18 ASCII chars.
    let (body, check) = id.split_at(17);
    checksum_char(body).is_some_and(|expected| check.starts_with(expected))
}

/// Gender from digit 17. Does not look at the checksum.
pub fn gender_of(id_number: &str) -> Gender {
    if !matches_pattern(id_number) {
        return Gender::Unknown;
    }
    match id_number.as_bytes()[16] - b'0' {
        d if d % 2 == 1 => Gender::Male,
        _ => Gender::Female,
    }
}

/// Birthdate digits as written in the number. No calendar check: `19801301`
/// yields month `"13"`.
pub fn birthdate_of(id_number: &str) -> Birthdate {
    if !matches_pattern(id_number) {
        return Birthdate::default();
    }
    Birthdate {
        year: id_number[6..10].to_string(),
        month: id_number[10..12].to_string(),
        day: id_number[12..14].to_string(),
    }
}

/// Calendar-checked birthdate; `None` for malformed numbers or impossible
/// dates such as February 30th.
pub fn birth_date(id_number: &str) -> Option<NaiveDate> {
    let b = birthdate_of(id_number);
    if b.is_empty() {
        return None;
    }
    NaiveDate::from_ymd_opt(b.year.parse().ok()?, b.month.parse().ok()?, b.day.parse().ok()?)
}

/// ID-number operations that need division data.
pub struct IdCardService<'a> {
    resolver: AddressResolver<'a>,
}

impl<'a> IdCardService<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self {
            resolver: AddressResolver::new(store),
        }
    }

    /// Resolve the issuing area of an ID number.
    ///
    /// Unless `skip_validation` is set, a number that does not match the
    /// 18-character pattern resolves to all-unknown without touching the
    /// data. The checksum is not checked here.
    pub fn address_of(&self, id_number: &str, opts: &ResolveOptions) -> Result<AddressResult> {
        if !opts.skip_validation && !matches_pattern(id_number) {
            return Ok(AddressResult::unknown(&opts.unknown));
        }
        let code = prefix(id_number, 6).unwrap_or(id_number);
        self.resolver
            .resolve(code, opts.include_direct_units, &opts.unknown)
    }

    /// Everything derivable from one number.
    pub fn inspect(&self, id_number: &str, opts: &ResolveOptions) -> Result<IdCardInfo> {
        Ok(IdCardInfo {
            id_number: normalize(id_number),
            valid: validate(id_number),
            gender: gender_of(id_number),
            birthdate: birthdate_of(id_number),
            address: self.address_of(id_number, opts)?,
        })
    }
}
