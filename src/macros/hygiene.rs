//! Hygienic name generation.
//!
//! Generated names are `base + marker + counter`. The marker is chosen per
//! expansion session so that it never occurs in that session's original
//! source text, which keeps every generated name out of the user's namespace.
//! Text produced by rewriting is not consulted.

use std::collections::HashMap;

/// Marker used before any session has been started.
pub const DEFAULT_MARKER: &str = "_0";

/// Returns `_<n>` for the smallest `n >= start` such that `_<n>` does not occur
/// anywhere in `text`.
///
/// ```rust
/// use splice::macros::hygiene::find_absent_counter_name;
/// assert_eq!(find_absent_counter_name("_123 abc def 2324 _2 _23 _43 _0", 0), "_3");
/// ```
pub fn find_absent_counter_name(text: &str, start: u64) -> String {
    (start..)
        .map(|n| format!("_{}", n))
        .find(|name| !text.contains(name.as_str()))
        .unwrap_or_else(|| DEFAULT_MARKER.to_string())
}

/// Per-session generator state: the last suffix issued for every base name
/// plus the current marker.
#[derive(Debug, Clone)]
pub struct Gensym {
    counters: HashMap<String, u64>,
    marker: String,
}

impl Default for Gensym {
    fn default() -> Self {
        Gensym {
            counters: HashMap::new(),
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl Gensym {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Issues the next name for `base`.
    ///
    /// The first request for a base yields suffix `0`, later ones count up.
    pub fn gensym(&mut self, base: &str) -> String {
        let counter = match self.counters.get_mut(base) {
            Some(last) => {
                *last += 1;
                *last
            }
            None => {
                self.counters.insert(base.to_string(), 0);
                0
            }
        };
        format!("{}{}{}", base, self.marker, counter)
    }

    /// Starts a new session seeded by `source`: forgets every counter and picks
    /// a marker absent from the text.
    pub fn reset(&mut self, source: &str) {
        self.counters.clear();
        self.marker = find_absent_counter_name(source, 0);
        log::debug!("gensym marker reset to '{}'", self.marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_name_skips_occurring_counters() {
        assert_eq!(find_absent_counter_name("", 0), "_0");
        assert_eq!(find_absent_counter_name("x_0 y_1", 0), "_2");
        assert_eq!(find_absent_counter_name("_123 abc def 2324 _2 _23 _43 _0", 0), "_3");
    }

    #[test]
    fn absent_name_honours_start() {
        assert_eq!(find_absent_counter_name("_5", 5), "_6");
        assert_eq!(find_absent_counter_name("", 7), "_7");
    }

    #[test]
    fn counters_are_per_base() {
        let mut gensym = Gensym::new();
        assert_eq!(gensym.gensym(""), "_00");
        assert_eq!(gensym.gensym(""), "_01");
        assert_eq!(gensym.gensym("time"), "time_00");
        assert_eq!(gensym.gensym("time"), "time_01");
    }

    #[test]
    fn reset_clears_counters_and_changes_marker() {
        let mut gensym = Gensym::new();
        gensym.gensym("now");
        gensym.reset("now_00 = 1; _1");
        assert_eq!(gensym.marker(), "_2");
        assert_eq!(gensym.gensym("now"), "now_20");
    }
}
