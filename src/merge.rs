use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::source::RawChoices;
use crate::value::Value;

/// Overlay `overlay` on top of `base`. On a shared key, `overlay`'s value wins.
/// Values are whole: a list replaces a list, it is never concatenated.
pub fn overlay(mut base: BTreeMap<String, Value>, overlay: &RawChoices) -> BTreeMap<String, Value> {
    for (key, value) in overlay.iter() {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Merge sources given highest priority first.
///
/// Sources are overlaid in reverse, so the first one wins on a shared key.
/// Keys outside `registered` are dropped.
pub fn merge_sources<'a>(
    sources: impl DoubleEndedIterator<Item = (String, &'a RawChoices)>,
    registered: &BTreeSet<String>,
) -> BTreeMap<String, Value> {
    let mut merged = BTreeMap::new();
    for (name, raw) in sources.rev() {
        for key in raw.keys().filter(|k| !registered.contains(*k)) {
            trace!(source = %name, key = %key, "dropping unregistered key");
        }
        merged = overlay(merged, raw);
    }
    merged.retain(|key, _| registered.contains(key));
    merged
}
