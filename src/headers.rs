//! Header collection for logging.
//!
//! hyper hands header names over in lower case. Records use the canonical
//! MIME form instead (`x-request-id` → `X-Request-Id`), so case-sensitive
//! masking words like `Authorization` line up with what clients sent.

use std::collections::BTreeMap;

/// Header name → every value for that name joined with `", "`.
pub type HeaderMap = BTreeMap<String, String>;

/// Canonical MIME form: first letter and every letter after a `-`
/// upper-cased, the rest lower-cased.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Groups `(name, value)` pairs by canonical name, joining repeated values
/// in arrival order.
pub fn collect<'a, I>(pairs: I) -> HeaderMap
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.entry(canonical_name(name))
            .and_modify(|joined: &mut String| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }
    map
}
