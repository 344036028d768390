//! Hölder exponents and parameter assignments.

use std::collections::BTreeMap;

use crate::ids::HoelderId;

/// Default exponent handed out for freshly minted parameters (`p = q = 2`).
pub const DEFAULT_HOELDER_VALUE: f64 = 2.0;

/// A free parameter bound to a value.
///
/// For Hölder exponents `value` is `p > 1` with conjugate `q = p / (p - 1)`, so that
/// `1/p + 1/q = 1`. For backlog variables introduced by
/// [`SymbolicFunction::new_parameter`](super::SymbolicFunction::new_parameter) the value is
/// the backlog itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hoelder {
    pub id: HoelderId,
    pub value: f64,
}

impl Hoelder {
    pub fn new(id: HoelderId, value: f64) -> Self {
        Self { id, value }
    }

    /// The conjugate exponent `q = p / (p - 1)`.
    pub fn conjugate(&self) -> f64 {
        self.value / (self.value - 1.0)
    }

    /// True when `value` is a valid Hölder exponent.
    pub fn is_valid_exponent(&self) -> bool {
        self.value > 1.0 && self.value.is_finite()
    }
}

/// Assignment of values to free parameters, ordered by ID.
pub type Parameters = BTreeMap<HoelderId, Hoelder>;

/// Builds a parameter assignment from `(id, value)` pairs.
pub fn parameters<I>(values: I) -> Parameters
where
    I: IntoIterator<Item = (HoelderId, f64)>,
{
    values
        .into_iter()
        .map(|(id, value)| (id, Hoelder::new(id, value)))
        .collect()
}

/// Mints Hölder IDs for one network from a monotonic counter.
#[derive(Debug, Clone)]
pub struct HoelderRegistry {
    next_id: u32,
    hoelders: BTreeMap<HoelderId, Hoelder>,
}

impl Default for HoelderRegistry {
    fn default() -> Self {
        Self {
            next_id: 1,
            hoelders: BTreeMap::new(),
        }
    }
}

impl HoelderRegistry {
    /// Creates a new parameter and returns its ID.
    pub fn create(&mut self) -> HoelderId {
        let id = HoelderId(self.next_id);
        self.next_id += 1;
        self.hoelders
            .insert(id, Hoelder::new(id, DEFAULT_HOELDER_VALUE));
        id
    }

    pub fn get(&self, id: HoelderId) -> Option<&Hoelder> {
        self.hoelders.get(&id)
    }

    pub fn len(&self) -> usize {
        self.hoelders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hoelders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hoelder> {
        self.hoelders.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjugate_satisfies_hoelder_identity() {
        for p in [1.1, 1.5, 2.0, 3.0, 10.0] {
            let h = Hoelder::new(HoelderId(1), p);
            let q = h.conjugate();
            assert!((1.0 / p + 1.0 / q - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn registry_mints_increasing_ids() {
        let mut registry = HoelderRegistry::default();
        let a = registry.create();
        let b = registry.create();
        assert_eq!(a, HoelderId(1));
        assert_eq!(b, HoelderId(2));
        assert_eq!(registry.len(), 2);
    }
}
