use crate::layout::binding::Segment;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::fmt;

/// Data and settings a widget is rendered against.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataContext {
    /// Root data object (`data.*`, and `item.*` outside `forEach`).
    #[serde(default)]
    pub data: Json,
    /// User settings (`config.settings.*`).
    #[serde(default)]
    pub settings: BTreeMap<String, Json>,
}

/// Root of an absolute data path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataRoot {
    /// The data object.
    Data,
    /// The settings map.
    Settings,
}

/// Absolute location inside a [`DataContext`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataPath {
    /// Root.
    pub root: DataRoot,
    /// Steps below the root.
    pub segments: Vec<Segment>,
}

impl DataPath {
    /// Path below the data root.
    pub fn data(segments: Vec<Segment>) -> Self {
        Self {
            root: DataRoot::Data,
            segments,
        }
    }

    /// Path of one setting.
    pub fn setting(key: impl Into<String>) -> Self {
        Self {
            root: DataRoot::Settings,
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// `true` when one path is a prefix of the other, i.e. a change at one may affect the
    /// value read at the other.
    pub fn overlaps(&self, other: &DataPath) -> bool {
        if self.root != other.root {
            return false;
        }
        let n = self.segments.len().min(other.segments.len());
        self.segments[..n] == other.segments[..n]
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.root {
            DataRoot::Data => "data",
            DataRoot::Settings => "settings",
        })?;
        for s in &self.segments {
            write!(f, ".{s}")?;
        }
        Ok(())
    }
}

impl DataContext {
    /// Context with data and no settings.
    pub fn new(data: Json) -> Self {
        Self {
            data,
            settings: BTreeMap::new(),
        }
    }

    /// Builder-style setting insertion.
    pub fn with_setting(mut self, key: impl Into<String>, value: Json) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Resolve an absolute path.
    pub fn lookup(&self, path: &DataPath) -> Option<&Json> {
        let (mut cur, rest) = match path.root {
            DataRoot::Data => (&self.data, path.segments.as_slice()),
            DataRoot::Settings => {
                let (first, rest) = path.segments.split_first()?;
                let Segment::Key(key) = first else {
                    return None;
                };
                (self.settings.get(key)?, rest)
            }
        };
        for seg in rest {
            cur = match (seg, cur) {
                (Segment::Key(k), Json::Object(map)) => map.get(k)?,
                (Segment::Index(i), Json::Array(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Paths whose values differ between `self` and `next`.
    ///
    /// Arrays that changed length are reported as a whole; otherwise the diff descends to the
    /// changed leaves.
    pub fn diff(&self, next: &DataContext) -> Vec<DataPath> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        diff_json(&self.data, &next.data, &mut prefix, DataRoot::Data, &mut out);

        let keys: std::collections::BTreeSet<&String> =
            self.settings.keys().chain(next.settings.keys()).collect();
        for k in keys {
            match (self.settings.get(k), next.settings.get(k)) {
                (Some(a), Some(b)) if a == b => {}
                _ => out.push(DataPath::setting(k.clone())),
            }
        }
        out
    }
}

fn diff_json(
    a: &Json,
    b: &Json,
    prefix: &mut Vec<Segment>,
    root: DataRoot,
    out: &mut Vec<DataPath>,
) {
    if a == b {
        return;
    }
    match (a, b) {
        (Json::Object(ma), Json::Object(mb)) => {
            let keys: std::collections::BTreeSet<&String> = ma.keys().chain(mb.keys()).collect();
            for k in keys {
                prefix.push(Segment::Key(k.clone()));
                match (ma.get(k), mb.get(k)) {
                    (Some(x), Some(y)) => diff_json(x, y, prefix, root, out),
                    _ => out.push(DataPath {
                        root,
                        segments: prefix.clone(),
                    }),
                }
                prefix.pop();
            }
        }
        (Json::Array(xa), Json::Array(xb)) if xa.len() == xb.len() => {
            for (i, (x, y)) in xa.iter().zip(xb).enumerate() {
                prefix.push(Segment::Index(i));
                diff_json(x, y, prefix, root, out);
                prefix.pop();
            }
        }
        _ => out.push(DataPath {
            root,
            segments: prefix.clone(),
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
