//! Row selection: ordering, sampling, and capping over parsed records.

use miette::SourceSpan;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{unspanned, ErrorReporting, ExpandError};
use crate::expansion::table::Record;

/// The `random` configuration option: off, shuffle everything, or sample a
/// fixed number of rows. `Sample(n)` doubles as the effective row cap when
/// no explicit `max_examples` is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RandomSpec {
    #[default]
    Off,
    Shuffle,
    Sample(usize),
}

impl RandomSpec {
    pub fn is_random(&self) -> bool {
        !matches!(self, RandomSpec::Off)
    }

    /// Parse the option's string form: an integer becomes `Sample(n)`, the
    /// usual false-ish spellings (`false`, `no`, `off`, `f`, `0`) become
    /// `Off`, the true-ish ones become `Shuffle`. Negative integers are
    /// rejected.
    pub fn parse<R: ErrorReporting>(text: &str, reporter: &R) -> Result<Self, ExpandError> {
        if let Ok(count) = text.trim().parse::<i64>() {
            if count < 0 {
                return Err(reporter.negative_count(count, span_over(text)));
            }
            if count == 0 {
                return Ok(RandomSpec::Off);
            }
            return Ok(RandomSpec::Sample(count as usize));
        }
        match text.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "no" | "off" | "f" => Ok(RandomSpec::Off),
            "true" | "yes" | "on" | "t" => Ok(RandomSpec::Shuffle),
            _ => Err(reporter.invalid_random_option(text, span_over(text))),
        }
    }
}

fn span_over(text: &str) -> SourceSpan {
    if text.is_empty() {
        unspanned()
    } else {
        SourceSpan::from(0..text.len())
    }
}

/// How many rows to expand, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub max_count: Option<usize>,
    pub random: RandomSpec,
}

impl SelectionPolicy {
    pub fn new(max_count: Option<usize>, random: RandomSpec) -> Self {
        Self { max_count, random }
    }

    /// The number of rows this policy selects from `available` records. An
    /// explicit cap wins; otherwise a `Sample(n)` count stands in for it.
    pub fn effective_count(&self, available: usize) -> usize {
        let cap = self.max_count.or(match self.random {
            RandomSpec::Sample(n) => Some(n),
            _ => None,
        });
        match cap {
            Some(n) => n.min(available),
            None => available,
        }
    }
}

/// Apply a selection policy to the full record list. Without randomness this
/// is a head-take in original order; with randomness it is a uniform sample
/// without replacement, in random order, drawn from the given RNG.
pub fn select_rows<G: Rng>(
    records: &[Record],
    policy: &SelectionPolicy,
    rng: &mut G,
) -> Vec<Record> {
    let count = policy.effective_count(records.len());
    if !policy.random.is_random() {
        return records[..count].to_vec();
    }
    rand::seq::index::sample(rng, records.len(), count)
        .iter()
        .map(|i| records[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, ReportContext};
    use crate::expansion::table::build_table;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn five_records() -> Vec<Record> {
        let tokens: Vec<String> = ["n", "--", "1", "2", "3", "4", "5"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        build_table(&tokens, &ReportContext::for_template("t", &tokens))
            .unwrap()
            .records
    }

    fn values(rows: &[Record]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get("n").unwrap().to_string())
            .collect()
    }

    #[test]
    fn ordered_head_take_is_deterministic() {
        let records = five_records();
        let policy = SelectionPolicy::new(Some(2), RandomSpec::Off);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        for _ in 0..3 {
            let rows = select_rows(&records, &policy, &mut rng);
            assert_eq!(values(&rows), vec!["1", "2"]);
        }
    }

    #[test]
    fn no_cap_takes_everything_in_order() {
        let records = five_records();
        let policy = SelectionPolicy::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(
            values(&select_rows(&records, &policy, &mut rng)),
            vec!["1", "2", "3", "4", "5"]
        );
    }

    #[test]
    fn zero_cap_selects_nothing() {
        let records = five_records();
        let policy = SelectionPolicy::new(Some(0), RandomSpec::Off);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert!(select_rows(&records, &policy, &mut rng).is_empty());
    }

    #[test]
    fn cap_larger_than_population_is_clamped() {
        let records = five_records();
        let policy = SelectionPolicy::new(Some(99), RandomSpec::Shuffle);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        assert_eq!(select_rows(&records, &policy, &mut rng).len(), 5);
    }

    #[test]
    fn seeded_sample_is_reproducible() {
        let records = five_records();
        let policy = SelectionPolicy::new(Some(3), RandomSpec::Shuffle);
        let mut rng_a = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut rng_b = Xoshiro256PlusPlus::seed_from_u64(42);
        let a = values(&select_rows(&records, &policy, &mut rng_a));
        let b = values(&select_rows(&records, &policy, &mut rng_b));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        // without replacement: all distinct, all from the population
        let mut sorted = a.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn sample_count_stands_in_for_missing_cap() {
        let policy = SelectionPolicy::new(None, RandomSpec::Sample(3));
        assert_eq!(policy.effective_count(5), 3);
        let explicit = SelectionPolicy::new(Some(4), RandomSpec::Sample(3));
        assert_eq!(explicit.effective_count(5), 4);
    }

    #[test]
    fn random_option_parsing() {
        let reporter = ReportContext::for_config();
        assert_eq!(
            RandomSpec::parse("3", &reporter).unwrap(),
            RandomSpec::Sample(3)
        );
        assert_eq!(
            RandomSpec::parse("true", &reporter).unwrap(),
            RandomSpec::Shuffle
        );
        assert_eq!(
            RandomSpec::parse("yes", &reporter).unwrap(),
            RandomSpec::Shuffle
        );
        assert_eq!(RandomSpec::parse("off", &reporter).unwrap(), RandomSpec::Off);
        assert_eq!(RandomSpec::parse("0", &reporter).unwrap(), RandomSpec::Off);
        assert_eq!(RandomSpec::parse("", &reporter).unwrap(), RandomSpec::Off);
        let err = RandomSpec::parse("-2", &reporter).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NegativeCount { requested: -2 });
        assert!(matches!(
            RandomSpec::parse("sideways", &reporter).unwrap_err().kind,
            ErrorKind::InvalidRandomOption { .. }
        ));
    }
}
