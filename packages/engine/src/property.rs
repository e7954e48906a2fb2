//! Accessor-to-property naming.
//!
//! Callers name properties explicitly (`"roleId"`) or by accessor
//! (`"getRoleId"`); both resolve to the same property name.

pub trait PropertyResolver: Send + Sync {
    fn resolve_property(&self, reference: &str) -> String;
}

/// Java-bean style accessor names: `getX`, `isX`, `setX`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessorNames;

impl PropertyResolver for AccessorNames {
    fn resolve_property(&self, reference: &str) -> String {
        property_name(reference)
    }
}

pub fn property_name(reference: &str) -> String {
    let stripped = ["get", "set", "is"]
        .iter()
        .find_map(|prefix| {
            let rest = reference.strip_prefix(prefix)?;
            rest.chars()
                .next()
                .filter(|first| first.is_ascii_uppercase())
                .map(|_| rest)
        })
        .unwrap_or(reference);
    decapitalize(stripped)
}

// `URL` stays `URL`, `Name` becomes `name`.
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let second_is_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    if second_is_upper {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    out.push(first.to_ascii_lowercase());
    out.push_str(&name[first.len_utf8()..]);
    out
}
