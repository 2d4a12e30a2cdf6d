//! Configuration fingerprinting — deterministic identity of a strategy setup.
//!
//! Two strategies with the same name and the same effective parameters hash
//! identically across runs and platforms, so a signal can be traced back to
//! the exact configuration that produced it.

use crate::strategy::ParamMap;

/// BLAKE3 hex digest of a strategy name plus its effective parameters.
///
/// Canonical form: `name|key=value;key=value;...` with keys in `BTreeMap`
/// order and values printed in shortest round-trip form.
pub fn params_hash(name: &str, params: &ParamMap) -> String {
    let mut canonical = String::with_capacity(64);
    canonical.push_str(name);
    canonical.push('|');
    for (key, value) in params {
        canonical.push_str(key);
        canonical.push('=');
        canonical.push_str(&format!("{value:?}"));
        canonical.push(';');
    }
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}
