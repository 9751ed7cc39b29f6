use std::collections::HashMap;

/// ISO 3166-1 numeric code (as found in the geometry document) → record id
pub const NUMERIC_TO_ID: [(&str, &str); 45] = [
    ("764", "THA"), ("702", "SGP"), ("458", "MYS"), ("398", "KAZ"), ("784", "ARE"),
    ("634", "QAT"), ("268", "GEO"), ("860", "UZB"), ("364", "IRN"), ("410", "KOR_JEJU"),
    ("360", "IDN"), ("418", "LAO"), ("116", "KHM"), ("524", "NPL"), ("144", "LKA"),
    ("462", "MDV"), ("048", "BHR"), ("400", "JOR"), ("704", "VNM"), ("504", "MAR"),
    ("788", "TUN"), ("480", "MUS"), ("690", "SYC"), ("818", "EGY"), ("834", "TZA"),
    ("404", "KEN"), ("450", "MDG"), ("024", "AGO"), ("508", "MOZ"), ("688", "SRB"),
    ("070", "BIH"), ("051", "ARM"), ("112", "BLR"), ("008", "ALB"), ("674", "SMR"),
    ("052", "BRB"), ("044", "BHS"), ("218", "ECU"), ("212", "DMA"), ("192", "CUB"),
    ("242", "FJI"), ("776", "TON"), ("882", "WSM"), ("296", "KIR"), ("580", "MNP"),
];

/// Resolves a geometry code to one of our record ids.
///
/// A miss is a normal outcome: the shape is drawn neutral and ignores clicks.
pub trait CodeLookup {
    fn lookup(&self, code: &str) -> Option<&str>;
}

pub struct Crosswalk {
    table: HashMap<String, String>,
}

impl Crosswalk {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = pairs
            .into_iter()
            .map(|(k, v)| {
                let k: String = k.into();
                (normalize_code(&k), v.into())
            })
            .collect();
        Self { table }
    }

    pub fn builtin() -> Self {
        Self::new(NUMERIC_TO_ID)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Reverse direction, used by `list` output
    pub fn code_for(&self, id: &str) -> Option<&str> {
        self.table
            .iter()
            .find(|(_, v)| v.as_str() == id)
            .map(|(k, _)| k.as_str())
    }
}

impl CodeLookup for Crosswalk {
    fn lookup(&self, code: &str) -> Option<&str> {
        self.table.get(&normalize_code(code)).map(String::as_str)
    }
}

/// Numeric codes are zero-padded to three digits ("48" → "048").
pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    if !code.is_empty() && code.len() < 3 && code.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>3}", code)
    } else {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{self, COUNTRIES};
    use std::collections::HashSet;

    #[test]
    fn every_target_is_a_record() {
        for (code, id) in NUMERIC_TO_ID {
            assert!(data::find(id).is_some(), "{code} -> {id} has no record");
        }
    }

    #[test]
    fn table_is_a_bijection_over_records() {
        let codes: HashSet<_> = NUMERIC_TO_ID.iter().map(|(c, _)| *c).collect();
        let ids: HashSet<_> = NUMERIC_TO_ID.iter().map(|(_, i)| *i).collect();
        assert_eq!(codes.len(), NUMERIC_TO_ID.len());
        assert_eq!(ids.len(), NUMERIC_TO_ID.len());
        let walk = Crosswalk::builtin();
        for c in COUNTRIES {
            assert!(walk.code_for(c.id).is_some(), "{} has no code", c.id);
        }
    }

    #[test]
    fn miss_is_none() {
        let walk = Crosswalk::builtin();
        assert_eq!(walk.lookup("156"), None);
        assert_eq!(walk.lookup(""), None);
        assert_eq!(walk.lookup("-99"), None);
    }

    #[test]
    fn short_codes_are_padded() {
        let walk = Crosswalk::builtin();
        assert_eq!(walk.lookup("48"), Some("BHR"));
        assert_eq!(walk.lookup("8"), Some("ALB"));
        assert_eq!(walk.lookup("764"), Some("THA"));
        assert_eq!(normalize_code("-99"), "-99");
    }
}
