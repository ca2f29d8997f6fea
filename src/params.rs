use std::ops::Index;

/// A single URL parameter, consisting of a key and a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: &str, value: &str) -> Param {
        Param {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// The list of parameters extracted by a route match.
///
/// The list is ordered, the first URL parameter is also the first entry.
/// It is therefore safe to read values by index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Params {
        Params(Vec::new())
    }

    /// Returns the value of the first parameter whose key matches the given
    /// name, or `None` if no such parameter exists.
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|param| param.key == name)
            .map(|param| param.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, p: Param) {
        self.0.push(p);
    }

    /// Truncates the parameter list to the given length. Used by the tree to
    /// discard captures from abandoned branches while backtracking.
    pub(crate) fn truncate(&mut self, n: usize) {
        self.0.truncate(n);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns an iterator over the key/value pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|param| (param.key.as_str(), param.value.as_str()))
    }
}

impl Index<usize> for Params {
    type Output = str;

    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i].value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name() {
        let mut params = Params::new();
        params.push(Param::new("user", "gopher"));
        params.push(Param::new("id", "42"));

        assert_eq!(params.by_name("user"), Some("gopher"));
        assert_eq!(params.by_name("id"), Some("42"));
        assert_eq!(params.by_name("missing"), None);
        assert_eq!(&params[1], "42");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn duplicate_keys_return_first() {
        let mut params = Params::new();
        params.push(Param::new("name", "first"));
        params.push(Param::new("name", "second"));

        assert_eq!(params.by_name("name"), Some("first"));
    }

    #[test]
    fn truncate_discards_tail() {
        let mut params = Params::new();
        params.push(Param::new("a", "1"));
        params.push(Param::new("b", "2"));
        params.truncate(1);

        assert_eq!(params.by_name("b"), None);
        assert_eq!(params.len(), 1);
    }
}
