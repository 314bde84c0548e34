//! Country reference data and name-based resolution.
//!
//! The static table backs the country picker on the phone-entry screen.
//! Lookup by calling code goes through the async
//! [`CountryDirectory`](crate::services::verification::CountryDirectory)
//! trait instead, because that source may be network-backed.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Immutable reference data for one country in the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    /// Display name, unique within the table
    pub name: String,
    /// International calling code without the leading `+`
    pub calling_code: u16,
    /// Display template for the national number, `#` per digit
    pub number_format: String,
    /// Asset path of the flag image
    pub flag_asset: String,
}

impl CountryProfile {
    /// The sentinel returned when a name does not match any table entry.
    ///
    /// Callers render it as "no country selected"; it is never an error.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            calling_code: 0,
            number_format: String::new(),
            flag_asset: String::new(),
        }
    }

    /// True for the sentinel produced by [`CountryProfile::empty`].
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.calling_code == 0
    }
}

macro_rules! country {
    ($name:expr, $code:expr, $format:expr, $flag:expr) => {
        CountryProfile {
            name: $name.to_string(),
            calling_code: $code,
            number_format: $format.to_string(),
            flag_asset: concat!("assets/flags/", $flag, ".png").to_string(),
        }
    };
}

/// Static country table used by the phone-entry screen picker.
pub static COUNTRIES: Lazy<Vec<CountryProfile>> = Lazy::new(|| {
    vec![
        country!("Australia", 61, "### ### ###", "au"),
        country!("Brazil", 55, "## #####-####", "br"),
        country!("Canada", 1, "(###) ###-####", "ca"),
        country!("China", 86, "### #### ####", "cn"),
        country!("Egypt", 20, "### ### ####", "eg"),
        country!("France", 33, "# ## ## ## ##", "fr"),
        country!("Germany", 49, "#### #######", "de"),
        country!("India", 91, "##### #####", "in"),
        country!("Indonesia", 62, "###-###-###", "id"),
        country!("Italy", 39, "### ### ####", "it"),
        country!("Japan", 81, "##-####-####", "jp"),
        country!("Mexico", 52, "## #### ####", "mx"),
        country!("Nigeria", 234, "### ### ####", "ng"),
        country!("South Korea", 82, "##-####-####", "kr"),
        country!("Spain", 34, "### ## ## ##", "es"),
        country!("Turkey", 90, "### ### ####", "tr"),
        country!("United Arab Emirates", 971, "## ### ####", "ae"),
        country!("United Kingdom", 44, "#### ######", "gb"),
        country!("United States", 1, "(###) ###-####", "us"),
    ]
});

/// Resolves a country by its exact display name.
///
/// A miss yields the empty sentinel, never an error, so a half-typed
/// country name simply deselects the calling code.
pub fn find_by_name(name: &str) -> CountryProfile {
    COUNTRIES
        .iter()
        .find(|c| c.name == name)
        .cloned()
        .unwrap_or_else(CountryProfile::empty)
}
