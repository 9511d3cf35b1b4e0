// src/catalog.rs
//
// Country reference catalog: names, ISO codes, spoken aliases, and the
// visually-confusable flag groupings used to pick decoy options.
// Countries are immutable shared data; sessions only ever borrow them.

use std::collections::HashMap;
use lazy_static::lazy_static;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    Europe,
    Asia,
    Africa,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    MiddleEast,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Country {
    pub name: &'static str,
    pub code: &'static str,
    pub region: Region,
    /// Alternate spoken names accepted by the voice matcher (may be empty).
    pub aliases: &'static [&'static str],
    /// Codes of countries whose flags look similar, in decoy-preference order.
    pub similar_to: &'static [&'static str],
}

impl Country {
    /// Flag emoji for this country's ISO code (regional indicator symbols).
    pub fn flag_emoji(&self) -> String {
        self.code
            .chars()
            .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32) - ('A' as u32)))
            .collect()
    }
}

/// Countries with similar flags grouped together.
pub static COUNTRIES: &[Country] = &[
    // Middle Eastern similar flags
    Country { name: "Jordan", code: "JO", region: Region::MiddleEast, aliases: &[], similar_to: &["PS", "SY", "IQ", "AE", "KW"] },
    Country { name: "Palestine", code: "PS", region: Region::MiddleEast, aliases: &[], similar_to: &["JO", "SY", "SD", "AE", "KW"] },
    Country { name: "Syria", code: "SY", region: Region::MiddleEast, aliases: &[], similar_to: &["JO", "PS", "IQ", "EG", "YE"] },
    Country { name: "Iraq", code: "IQ", region: Region::MiddleEast, aliases: &[], similar_to: &["JO", "SY", "YE", "EG", "SD"] },
    Country { name: "Egypt", code: "EG", region: Region::MiddleEast, aliases: &[], similar_to: &["SY", "IQ", "YE", "SD", "PS"] },
    Country { name: "Yemen", code: "YE", region: Region::MiddleEast, aliases: &[], similar_to: &["SY", "IQ", "EG", "SD", "PS"] },
    Country { name: "Sudan", code: "SD", region: Region::Africa, aliases: &[], similar_to: &["PS", "IQ", "EG", "YE"] },
    Country { name: "United Arab Emirates", code: "AE", region: Region::MiddleEast, aliases: &["UAE", "Emirates"], similar_to: &["JO", "PS", "KW"] },
    Country { name: "Kuwait", code: "KW", region: Region::MiddleEast, aliases: &[], similar_to: &["JO", "PS", "AE"] },

    // European similar flags
    Country { name: "Romania", code: "RO", region: Region::Europe, aliases: &[], similar_to: &["MD", "BE", "TD", "AD"] },
    Country { name: "Moldova", code: "MD", region: Region::Europe, aliases: &[], similar_to: &["RO", "BE", "AD"] },
    // "DE" is not in the catalog; option assembly must skip it
    Country { name: "Belgium", code: "BE", region: Region::Europe, aliases: &[], similar_to: &["RO", "MD", "DE"] },
    Country { name: "Chad", code: "TD", region: Region::Africa, aliases: &[], similar_to: &["RO", "MD", "AD"] },
    Country { name: "Andorra", code: "AD", region: Region::Europe, aliases: &[], similar_to: &["RO", "MD", "TD"] },

    // Similar tricolor flags
    Country { name: "France", code: "FR", region: Region::Europe, aliases: &[], similar_to: &["NL", "LU", "RU", "SI", "RS"] },
    Country { name: "Netherlands", code: "NL", region: Region::Europe, aliases: &["Holland"], similar_to: &["FR", "LU", "RU", "CR", "PY"] },
    Country { name: "Luxembourg", code: "LU", region: Region::Europe, aliases: &[], similar_to: &["FR", "NL", "RU", "NL"] },
    Country { name: "Russia", code: "RU", region: Region::Europe, aliases: &[], similar_to: &["FR", "NL", "LU", "SI", "SK", "RS"] },
    Country { name: "Slovenia", code: "SI", region: Region::Europe, aliases: &[], similar_to: &["FR", "RU", "SK", "RS"] },
    Country { name: "Slovakia", code: "SK", region: Region::Europe, aliases: &[], similar_to: &["RU", "SI", "RS"] },
    Country { name: "Serbia", code: "RS", region: Region::Europe, aliases: &[], similar_to: &["FR", "RU", "SI", "SK"] },
    Country { name: "Costa Rica", code: "CR", region: Region::NorthAmerica, aliases: &[], similar_to: &["NL", "TH", "PY"] },
    Country { name: "Thailand", code: "TH", region: Region::Asia, aliases: &[], similar_to: &["CR", "FR", "NL"] },
    Country { name: "Paraguay", code: "PY", region: Region::SouthAmerica, aliases: &[], similar_to: &["NL", "CR", "LU"] },

    // Nordic cross flags
    Country { name: "Norway", code: "NO", region: Region::Europe, aliases: &[], similar_to: &["IS", "SE", "FI", "DK"] },
    Country { name: "Iceland", code: "IS", region: Region::Europe, aliases: &[], similar_to: &["NO", "SE", "FI", "DK"] },
    Country { name: "Sweden", code: "SE", region: Region::Europe, aliases: &[], similar_to: &["NO", "IS", "FI", "DK"] },
    Country { name: "Finland", code: "FI", region: Region::Europe, aliases: &[], similar_to: &["NO", "IS", "SE", "DK"] },
    Country { name: "Denmark", code: "DK", region: Region::Europe, aliases: &[], similar_to: &["NO", "IS", "SE", "FI"] },

    // Similar African flags
    Country { name: "Ghana", code: "GH", region: Region::Africa, aliases: &[], similar_to: &["GN", "SN", "ML", "ET"] },
    Country { name: "Guinea", code: "GN", region: Region::Africa, aliases: &[], similar_to: &["GH", "SN", "ML", "ET"] },
    Country { name: "Senegal", code: "SN", region: Region::Africa, aliases: &[], similar_to: &["GH", "GN", "ML", "CM"] },
    Country { name: "Mali", code: "ML", region: Region::Africa, aliases: &[], similar_to: &["GH", "GN", "SN", "CM"] },
    Country { name: "Cameroon", code: "CM", region: Region::Africa, aliases: &[], similar_to: &["SN", "ML", "GN"] },
    Country { name: "Ethiopia", code: "ET", region: Region::Africa, aliases: &[], similar_to: &["GH", "GN", "BO"] },
    Country { name: "Bolivia", code: "BO", region: Region::SouthAmerica, aliases: &[], similar_to: &["ET", "GH", "LT"] },
    Country { name: "Lithuania", code: "LT", region: Region::Europe, aliases: &[], similar_to: &["BO", "ET", "GH"] },

    // Red and white flags
    Country { name: "Poland", code: "PL", region: Region::Europe, aliases: &[], similar_to: &["ID", "MC", "MT"] },
    Country { name: "Indonesia", code: "ID", region: Region::Asia, aliases: &[], similar_to: &["PL", "MC", "MT"] },
    Country { name: "Monaco", code: "MC", region: Region::Europe, aliases: &[], similar_to: &["PL", "ID", "MT"] },
    Country { name: "Malta", code: "MT", region: Region::Europe, aliases: &[], similar_to: &["PL", "ID", "MC"] },
];

lazy_static! {
    /// Index from code to catalog entry, built once.
    static ref CODE_INDEX: HashMap<&'static str, &'static Country> =
        COUNTRIES.iter().map(|country| (country.code, country)).collect();
}

/// Look up a country by its code.
pub fn country_by_code(code: &str) -> Option<&'static Country> {
    CODE_INDEX.get(code).copied()
}

/// Countries with flags similar to the given one, in decoy-preference order,
/// at most `count` entries. Codes that do not resolve are skipped.
pub fn similar_countries(code: &str, count: usize) -> Vec<&'static Country> {
    let country = match country_by_code(code) {
        Some(c) => c,
        None => return Vec::new(),
    };

    country
        .similar_to
        .iter()
        .filter_map(|similar_code| country_by_code(similar_code))
        .take(count)
        .collect()
}
