/// Scope config of a registry entry
/// ## Fields
/// - `singleton`:
///   If `true`, the produced value is memoized in the entry cache and reused.
///   If `false`, every resolution invokes the producer again.
///
/// - `no_cache`:
///   If `true`, nothing is ever written to the entry cache,
///   even though the entry stays a singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub singleton: bool,
    pub no_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            singleton: true,
            no_cache: false,
        }
    }
}

impl Config {
    /// Whether a freshly produced value has to be written into the cache
    #[inline]
    #[must_use]
    pub const fn caches(&self) -> bool {
        self.singleton && !self.no_cache
    }
}
