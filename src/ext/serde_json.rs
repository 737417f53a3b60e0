// === Module Header START ===
// purpose: Ergonomic nested JSON fetching via dotted paths and safe typed extraction for serde_json::Value
// role: extension/serde_json
// outputs: JsonFetch trait with JsonFetched wrapper; items() for array traversal
// invariants: No panics; missing paths yield None; to_or_default returns T::default on failure
// === Module Header END ===

use serde::de::DeserializeOwned;

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Treat the fetched value as an array; missing or non-array yields an empty slice.
  pub fn items(&self) -> &'a [serde_json::Value] {
    self.inner.and_then(|v| v.as_array()).map(|a| a.as_slice()).unwrap_or(&[])
  }
}

/// Extension to fetch nested values via dotted paths like "fields.status.name".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
