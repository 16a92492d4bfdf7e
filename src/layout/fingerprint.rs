use serde_json::Value;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5d1c_7a3e_90b4_2f61;

/// Stable fingerprint of a layout document.
///
/// Object keys are visited in sorted order, so formatting and key order in the source file do
/// not change the result.
pub(crate) fn fingerprint_document(doc: &Value) -> u64 {
    let mut h = StableHasher::new();
    h.write_value(doc);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.inner.update(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.inner.update(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.inner.update(s.as_bytes());
    }

    fn write_value(&mut self, v: &Value) {
        match v {
            Value::Null => self.write_u8(0),
            Value::Bool(b) => {
                self.write_u8(1);
                self.write_u8(u8::from(*b));
            }
            Value::Number(n) => {
                self.write_u8(2);
                self.write_u64(n.as_f64().unwrap_or(0.0).to_bits());
            }
            Value::String(s) => {
                self.write_u8(3);
                self.write_str(s);
            }
            Value::Array(items) => {
                self.write_u8(4);
                self.write_u64(items.len() as u64);
                for i in items {
                    self.write_value(i);
                }
            }
            Value::Object(map) => {
                self.write_u8(5);
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                self.write_u64(entries.len() as u64);
                for (k, v) in entries {
                    self.write_str(k);
                    self.write_value(v);
                }
            }
        }
    }

    fn finish(&self) -> u64 {
        self.inner.digest()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fingerprint.rs"]
mod tests;
