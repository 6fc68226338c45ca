use std::collections::HashMap;

///////////////////////////////////////////// Variables ////////////////////////////////////////////

/// [Variables] holds the last value assigned to each variable name.  A name that was never
/// assigned has no value; it does not default to zero.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    values: HashMap<String, f64>,
}

impl Variables {
    /// Bind `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// The value last bound to `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Forget every binding.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(move |name| (name.as_str(), self.values[name]))
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
