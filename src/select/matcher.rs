//! Generic allow-list matcher.
//!
//! [`ValueMatcher`] filters a collection by an attribute extracted from each
//! candidate. It is parameterized by an explicit extraction function per
//! entity kind rather than probing candidates for attributes at runtime.

/// Ordered allow-list filter over candidates of type `T`, keyed by an
/// extracted value of type `V`.
///
/// With no allow-list, everything passes and [`filter`](Self::filter)
/// returns the input unchanged. With one, output follows *allow-list* order,
/// with input order as the stable tie-break within each allowed value.
#[derive(Debug, Clone)]
pub struct ValueMatcher<T, V> {
    allowed: Option<Vec<V>>,
    value_of: fn(&T) -> Option<V>,
    reject: Option<fn(&T) -> bool>,
    only_first_per_value: bool,
}

impl<T, V: PartialEq> ValueMatcher<T, V> {
    /// Create a matcher over `allowed` values; `None` accepts everything.
    pub fn new(allowed: Option<Vec<V>>, value_of: fn(&T) -> Option<V>) -> Self {
        Self {
            allowed,
            value_of,
            reject: None,
            only_first_per_value: false,
        }
    }

    /// Install a predicate that unconditionally rejects a candidate,
    /// regardless of any value match.
    pub fn with_reject(mut self, reject: fn(&T) -> bool) -> Self {
        self.reject = Some(reject);
        self
    }

    /// Keep at most one candidate per allowed value.
    pub fn only_first_per_value(mut self, only_first: bool) -> Self {
        self.only_first_per_value = only_first;
        self
    }

    /// Whether this candidate would be accepted at all.
    pub fn matches(&self, candidate: &T) -> bool {
        if self.rejected(candidate) {
            return false;
        }
        match (&self.allowed, (self.value_of)(candidate)) {
            (None, _) => true,
            (Some(allowed), Some(value)) => allowed.contains(&value),
            (Some(_), None) => false,
        }
    }

    /// Select candidates in allow-list order.
    ///
    /// For each allowed value in turn, every candidate carrying that value
    /// (and not rejected) is appended in input order. With
    /// `only_first_per_value`, a value already selected is skipped — also
    /// across repeated allow-list entries.
    pub fn filter<'a>(&self, candidates: &'a [T]) -> Vec<&'a T> {
        let Some(allowed) = &self.allowed else {
            return candidates.iter().collect();
        };
        let mut picked = Vec::new();
        let mut seen: Vec<V> = Vec::new();
        for want in allowed {
            for candidate in candidates {
                if self.rejected(candidate) {
                    continue;
                }
                let Some(value) = (self.value_of)(candidate) else {
                    continue;
                };
                if value != *want {
                    continue;
                }
                if self.only_first_per_value && seen.contains(&value) {
                    continue;
                }
                seen.push(value);
                picked.push(candidate);
            }
        }
        picked
    }

    fn rejected(&self, candidate: &T) -> bool {
        self.reject.map_or(false, |reject| reject(candidate))
    }
}
