//! Query partition descriptors.
//!
//! A [`FilterSpec`] names one slice of the search space (facet value, sex,
//! inclusive age range). Age ranges are only ever built through
//! [`AgeRange::new`], so an inverted or out-of-domain range cannot exist.

use std::fmt;

/// Lowest age accepted by the search API.
pub const AGE_FLOOR: u8 = 0;

/// Highest age accepted by the search API.
pub const AGE_CEILING: u8 = 120;

/// Sex facet values understood by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Unknown.
    Unknown,
}

impl Sex {
    /// Fixed probing order used whenever a partition is split by sex.
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Unknown];

    /// Returns the wire code for this sex value.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }

    /// Parses a wire code (`M`, `F`, `U`), case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            "U" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Inclusive age range within `[AGE_FLOOR, AGE_CEILING]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeRange {
    min: u8,
    max: u8,
}

impl AgeRange {
    /// The whole age domain, `[0, 120]`.
    pub const FULL: AgeRange = AgeRange {
        min: AGE_FLOOR,
        max: AGE_CEILING,
    };

    /// Creates a range, refusing inverted or out-of-domain bounds.
    #[must_use]
    pub fn new(min: u8, max: u8) -> Option<Self> {
        (min <= max && max <= AGE_CEILING).then_some(Self { min, max })
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub fn min(self) -> u8 {
        self.min
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub fn max(self) -> u8 {
        self.max
    }

    /// Number of distinct age values covered.
    #[must_use]
    pub fn len(self) -> usize {
        usize::from(self.max - self.min) + 1
    }

    /// Always false; a range holds at least one age.
    #[must_use]
    pub fn is_empty(self) -> bool {
        false
    }

    /// Returns true if `age` lies in the range.
    #[must_use]
    pub fn contains(self, age: u8) -> bool {
        (self.min..=self.max).contains(&age)
    }

    /// Splits at `floor((min + max) / 2)` into `[min, mid]` and `[mid + 1, max]`.
    ///
    /// Returns `None` for single-age ranges. The halves never overlap and
    /// together cover exactly the original range.
    #[must_use]
    pub fn bisect(self) -> Option<(Self, Self)> {
        if self.min >= self.max {
            return None;
        }
        let mid = u8::try_from((u16::from(self.min) + u16::from(self.max)) / 2).ok()?;
        let low = Self::new(self.min, mid)?;
        let high = Self::new(mid + 1, self.max)?;
        Some((low, high))
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// One query partition of the search space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    /// Facet value (ISO country code for nationality), if bound.
    pub facet: Option<String>,
    /// Sex facet, if bound.
    pub sex: Option<Sex>,
    /// Lower age bound, if bound.
    pub age_min: Option<u8>,
    /// Upper age bound, if bound.
    pub age_max: Option<u8>,
}

impl FilterSpec {
    /// The unfiltered query.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// A query bound to a single facet value.
    #[must_use]
    pub fn for_facet(facet: impl Into<String>) -> Self {
        Self {
            facet: Some(facet.into()),
            ..Self::default()
        }
    }

    /// Returns a copy with the sex facet bound.
    #[must_use]
    pub fn with_sex(&self, sex: Sex) -> Self {
        Self {
            sex: Some(sex),
            ..self.clone()
        }
    }

    /// Returns a copy with both age bounds set to `range`.
    #[must_use]
    pub fn with_ages(&self, range: AgeRange) -> Self {
        Self {
            age_min: Some(range.min()),
            age_max: Some(range.max()),
            ..self.clone()
        }
    }

    /// Effective age range; unbound ends fall back to the domain bounds.
    ///
    /// Returns `None` if the stored bounds are inverted.
    #[must_use]
    pub fn age_range(&self) -> Option<AgeRange> {
        AgeRange::new(
            self.age_min.unwrap_or(AGE_FLOOR),
            self.age_max.unwrap_or(AGE_CEILING).min(AGE_CEILING),
        )
    }

    /// Query parameters for this partition, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(facet) = &self.facet {
            pairs.push(("nationality", facet.clone()));
        }
        if let Some(min) = self.age_min {
            pairs.push(("ageMin", min.to_string()));
        }
        if let Some(max) = self.age_max {
            pairs.push(("ageMax", max.to_string()));
        }
        if let Some(sex) = self.sex {
            pairs.push(("sexId", sex.code().to_string()));
        }
        pairs
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.facet.as_deref().unwrap_or("*"))?;
        if let Some(sex) = self.sex {
            write!(f, "/{sex}")?;
        }
        if self.age_min.is_some() || self.age_max.is_some() {
            let min = self.age_min.map_or_else(|| "..".to_string(), |v| v.to_string());
            let max = self.age_max.map_or_else(|| "..".to_string(), |v| v.to_string());
            write!(f, "/{min}-{max}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_age_range_rejects_inverted_and_out_of_domain() {
        assert!(AgeRange::new(10, 9).is_none());
        assert!(AgeRange::new(0, 121).is_none());
        assert!(AgeRange::new(7, 7).is_some());
    }

    #[test]
    fn test_bisect_single_age_is_terminal() {
        assert!(AgeRange::new(42, 42).unwrap().bisect().is_none());
    }

    #[test]
    fn test_bisect_two_ages_splits_into_singletons() {
        let (low, high) = AgeRange::new(5, 6).unwrap().bisect().unwrap();
        assert_eq!((low.min(), low.max()), (5, 5));
        assert_eq!((high.min(), high.max()), (6, 6));
    }

    #[test]
    fn test_bisect_halves_tile_every_range() {
        for min in 0..=AGE_CEILING {
            for max in min..=AGE_CEILING {
                let range = AgeRange::new(min, max).unwrap();
                let Some((low, high)) = range.bisect() else {
                    assert_eq!(min, max);
                    continue;
                };
                assert_eq!(low.min(), min);
                assert_eq!(high.max(), max);
                assert_eq!(low.max() + 1, high.min(), "gap or overlap in {range}");
                assert_eq!(low.len() + high.len(), range.len());
            }
        }
    }

    #[test]
    fn test_full_range_bisects_at_sixty() {
        let (low, high) = AgeRange::FULL.bisect().unwrap();
        assert_eq!(low, AgeRange::new(0, 60).unwrap());
        assert_eq!(high, AgeRange::new(61, 120).unwrap());
    }

    #[test]
    fn test_filter_age_range_completes_partial_bounds() {
        let filter = FilterSpec {
            age_min: Some(30),
            ..FilterSpec::default()
        };
        assert_eq!(filter.age_range(), AgeRange::new(30, 120));

        let inverted = FilterSpec {
            age_min: Some(50),
            age_max: Some(20),
            ..FilterSpec::default()
        };
        assert!(inverted.age_range().is_none());
    }

    #[test]
    fn test_query_pairs_order_and_names() {
        let filter = FilterSpec::for_facet("FR")
            .with_sex(Sex::Female)
            .with_ages(AgeRange::new(18, 30).unwrap());
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("nationality", "FR".to_string()),
                ("ageMin", "18".to_string()),
                ("ageMax", "30".to_string()),
                ("sexId", "F".to_string()),
            ]
        );
        assert!(FilterSpec::unfiltered().query_pairs().is_empty());
    }

    #[test]
    fn test_filter_display() {
        let filter = FilterSpec::for_facet("RU")
            .with_sex(Sex::Male)
            .with_ages(AgeRange::new(0, 60).unwrap());
        assert_eq!(filter.to_string(), "RU/M/0-60");
        assert_eq!(FilterSpec::unfiltered().to_string(), "*");
    }

    #[test]
    fn test_sex_codes_round_trip_in_fixed_order() {
        let codes: Vec<_> = Sex::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, ["M", "F", "U"]);
        assert_eq!(Sex::from_code(" f "), Some(Sex::Female));
        assert_eq!(Sex::from_code("X"), None);
    }
}
