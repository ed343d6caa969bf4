//! Outcome evaluation over captured console text
//!
//! Indicators are advisory: each one is reported present or absent on its
//! own, and no combined pass/fail verdict is derived. Callers that want a
//! hard gate assert on the individual results.

/// A named phrase whose presence in output is evidence of an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    /// Short name used in reports (e.g. "stopped")
    pub name: String,
    /// Substring searched for, case-insensitively
    pub phrase: String,
}

impl Indicator {
    pub fn new(name: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phrase: phrase.into(),
        }
    }
}

/// Presence result for one indicator
#[derive(Debug, Clone)]
pub struct IndicatorResult {
    pub name: String,
    pub phrase: String,
    pub present: bool,
}

/// The full set of indicator results for one session
///
/// Computed exactly once, from the final capture, after draining completes.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    results: Vec<IndicatorResult>,
}

impl Verdict {
    pub fn iter(&self) -> impl Iterator<Item = &IndicatorResult> {
        self.results.iter()
    }

    /// Look up a result by indicator name
    pub fn present(&self, name: &str) -> Option<bool> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.present)
    }

    /// How many indicators were detected
    pub fn detected(&self) -> usize {
        self.results.iter().filter(|r| r.present).count()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Evaluate every indicator against the captured text
///
/// Each indicator is an independent case-insensitive substring search.
pub fn evaluate(text: &str, indicators: &[Indicator]) -> Verdict {
    let haystack = text.to_lowercase();
    let results = indicators
        .iter()
        .map(|indicator| IndicatorResult {
            name: indicator.name.clone(),
            phrase: indicator.phrase.clone(),
            present: haystack.contains(&indicator.phrase.to_lowercase()),
        })
        .collect();
    Verdict { results }
}

/// The built-in indicator set for the smoke script
pub fn default_indicators() -> Vec<Indicator> {
    vec![
        Indicator::new("stopped", "stopped"),
        Indicator::new("exited", "exit"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_indicator_present() {
        let indicators = vec![Indicator::new("stopped", "Stopped.")];
        let verdict = evaluate("animctl stop\nAnimation stopped.\n$ ", &indicators);
        assert_eq!(verdict.present("stopped"), Some(true));
    }

    #[test]
    fn test_stop_indicator_absent() {
        let indicators = vec![Indicator::new("stopped", "Stopped.")];
        let verdict = evaluate("animctl start\nrunning\n$ ", &indicators);
        assert_eq!(verdict.present("stopped"), Some(false));
    }

    #[test]
    fn test_indicators_evaluated_independently() {
        let indicators = vec![
            Indicator::new("stopped", "stopped"),
            Indicator::new("exited", "exiting"),
        ];

        let verdict = evaluate("view exiting cleanly", &indicators);
        assert_eq!(verdict.present("stopped"), Some(false));
        assert_eq!(verdict.present("exited"), Some(true));
        assert_eq!(verdict.detected(), 1);

        let verdict = evaluate("Stopped. exiting", &indicators);
        assert_eq!(verdict.present("stopped"), Some(true));
        assert_eq!(verdict.present("exited"), Some(true));
        assert_eq!(verdict.detected(), 2);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let indicators = vec![Indicator::new("stopped", "STOPPED")];
        let verdict = evaluate("the animation StOpPeD here", &indicators);
        assert_eq!(verdict.present("stopped"), Some(true));
    }

    #[test]
    fn test_unknown_name_lookup() {
        let verdict = evaluate("whatever", &default_indicators());
        assert_eq!(verdict.present("no-such-indicator"), None);
    }
}
