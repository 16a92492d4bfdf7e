use std::fmt;

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathElem {
    Field(String),
    Index(usize),
}

/// Location of a node inside a layout document, rendered as `$.layout.children[0].color`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPath {
    elems: Vec<PathElem>,
}

impl JsonPath {
    /// The document root (`$`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Child path for an object field.
    pub fn field(&self, name: &str) -> Self {
        let mut elems = self.elems.clone();
        elems.push(PathElem::Field(name.to_string()));
        Self { elems }
    }

    /// Child path for an array element.
    pub fn index(&self, i: usize) -> Self {
        let mut elems = self.elems.clone();
        elems.push(PathElem::Index(i));
        Self { elems }
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.elems.len()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for e in &self.elems {
            match e {
                PathElem::Field(name) => write!(f, ".{name}")?,
                PathElem::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/path.rs"]
mod tests;
