//! Property bags and component state.

use serde_json::{Map, Value};

/// Properties passed to a component or attached to a host element.
pub type Props = Map<String, Value>;

/// Mutable state owned by one class component instance.
pub type State = Map<String, Value>;

/// Merges a component's default properties with an element's own properties.
///
/// Own properties override defaults. Neither input is modified.
pub fn merge_props(defaults: &Props, own: &Props) -> Props {
    let mut merged = defaults.clone();
    for (key, value) in own {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Shallowly merges `partial` into `target`; keys in `partial` win.
pub fn merge_shallow(target: &mut Map<String, Value>, partial: Map<String, Value>) {
    for (key, value) in partial {
        target.insert(key, value);
    }
}
