//! Interval catalog, pitch conversion and interval selections.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, TrialError};

/// Tuning reference: A4 (MIDI 69) in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// Largest interval the trainer asks about (one octave).
pub const MAX_INTERVAL: u8 = 12;

/// One entry of the interval catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub semitones: u8,
    /// Human-readable name, e.g. "Perfect Fifth".
    pub name: &'static str,
    /// Short symbol, e.g. "P5".
    pub symbol: &'static str,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

/// Semitone distance 1..=12 → interval. Index `n - 1` holds `n` semitones.
pub static INTERVALS: [Interval; 12] = [
    Interval { semitones: 1, name: "Minor Second", symbol: "m2" },
    Interval { semitones: 2, name: "Major Second", symbol: "M2" },
    Interval { semitones: 3, name: "Minor Third", symbol: "m3" },
    Interval { semitones: 4, name: "Major Third", symbol: "M3" },
    Interval { semitones: 5, name: "Perfect Fourth", symbol: "P4" },
    Interval { semitones: 6, name: "Tritone", symbol: "TT" },
    Interval { semitones: 7, name: "Perfect Fifth", symbol: "P5" },
    Interval { semitones: 8, name: "Minor Sixth", symbol: "m6" },
    Interval { semitones: 9, name: "Major Sixth", symbol: "M6" },
    Interval { semitones: 10, name: "Minor Seventh", symbol: "m7" },
    Interval { semitones: 11, name: "Major Seventh", symbol: "M7" },
    Interval { semitones: 12, name: "Perfect Octave", symbol: "P8" },
];

/// Look up an interval by semitone distance.
pub fn interval(semitones: u8) -> Option<&'static Interval> {
    match semitones {
        1..=MAX_INTERVAL => Some(&INTERVALS[semitones as usize - 1]),
        _ => None,
    }
}

/// Parse one interval token: a semitone count ("7") or a symbol ("P5").
///
/// Symbols are case-sensitive since `m2` and `M2` differ.
pub fn parse_interval(token: &str) -> Result<u8, ParseError> {
    let token = token.trim();
    if let Ok(n) = token.parse::<u8>() {
        return interval(n)
            .map(|i| i.semitones)
            .ok_or_else(|| ParseError::Interval(token.to_string()));
    }
    INTERVALS
        .iter()
        .find(|i| i.symbol == token)
        .map(|i| i.semitones)
        .ok_or_else(|| ParseError::Interval(token.to_string()))
}

/// Convert a MIDI note number to frequency at A4 = 440 Hz.
///
/// Formula: `440 * 2^((midi - 69) / 12)`
pub fn midi_to_frequency(midi: i32) -> f64 {
    A4_FREQUENCY * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

// ── Interval Set ────────────────────────────────────────────

/// The subset of intervals the user is practising.
///
/// Members are always in 1..=12; the set may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct IntervalSet(BTreeSet<u8>);

impl IntervalSet {
    pub fn empty() -> Self {
        IntervalSet(BTreeSet::new())
    }

    /// Every interval in the catalog.
    pub fn all() -> Self {
        IntervalSet((1..=MAX_INTERVAL).collect())
    }

    pub fn from_semitones<I>(semitones: I) -> Result<Self, TrialError>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut set = BTreeSet::new();
        for s in semitones {
            if interval(s).is_none() {
                return Err(TrialError::InvalidInterval(s));
            }
            set.insert(s);
        }
        Ok(IntervalSet(set))
    }

    pub fn contains(&self, semitones: u8) -> bool {
        self.0.contains(&semitones)
    }

    pub fn insert(&mut self, semitones: u8) -> Result<(), TrialError> {
        if interval(semitones).is_none() {
            return Err(TrialError::InvalidInterval(semitones));
        }
        self.0.insert(semitones);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl Default for IntervalSet {
    fn default() -> Self {
        IntervalSet::all()
    }
}

impl TryFrom<Vec<u8>> for IntervalSet {
    type Error = TrialError;

    fn try_from(v: Vec<u8>) -> Result<Self, Self::Error> {
        IntervalSet::from_semitones(v)
    }
}

impl From<IntervalSet> for Vec<u8> {
    fn from(set: IntervalSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// Accepts `all`, comma-separated tokens, and inclusive numeric ranges,
/// e.g. `"1-4,P5,12"`.
impl FromStr for IntervalSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(IntervalSet::all());
        }
        let mut set = BTreeSet::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if let Some((lo, hi)) = token.split_once('-') {
                let lo = parse_interval(lo)?;
                let hi = parse_interval(hi)?;
                if lo > hi {
                    return Err(ParseError::Interval(token.to_string()));
                }
                set.extend(lo..=hi);
            } else {
                set.insert(parse_interval(token)?);
            }
        }
        Ok(IntervalSet(set))
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self
            .iter()
            .filter_map(interval)
            .map(|i| i.symbol)
            .collect();
        write!(f, "{}", symbols.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(midi_to_frequency(69), 440.0);
    }

    #[test]
    fn octave_doubles_frequency() {
        assert_eq!(midi_to_frequency(81), 880.0);
        assert!((midi_to_frequency(57) - 220.0).abs() < 1e-9);
    }

    #[test]
    fn middle_c() {
        assert!((midi_to_frequency(60) - 261.63).abs() < 0.01);
    }

    #[test]
    fn catalog_is_indexed_by_semitones() {
        for (i, entry) in INTERVALS.iter().enumerate() {
            assert_eq!(entry.semitones as usize, i + 1);
        }
        assert_eq!(interval(7).map(|i| i.symbol), Some("P5"));
        assert!(interval(0).is_none());
        assert!(interval(13).is_none());
    }

    #[test]
    fn parse_symbols_and_numbers() {
        assert_eq!(parse_interval("m2").unwrap(), 1);
        assert_eq!(parse_interval("M2").unwrap(), 2);
        assert_eq!(parse_interval(" 12 ").unwrap(), 12);
        assert!(parse_interval("13").is_err());
        assert!(parse_interval("P9").is_err());
    }

    #[test]
    fn parse_set_with_ranges() {
        let set: IntervalSet = "1-3, P5,12".parse().unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2, 3, 7, 12]);
        assert_eq!(set.to_string(), "m2,M2,m3,P5,P8");
    }

    #[test]
    fn parse_all_and_empty() {
        assert_eq!("ALL".parse::<IntervalSet>().unwrap(), IntervalSet::all());
        assert!("".parse::<IntervalSet>().unwrap().is_empty());
        assert!("5-2".parse::<IntervalSet>().is_err());
    }

    #[test]
    fn rejects_out_of_range_members() {
        assert_eq!(
            IntervalSet::from_semitones([3, 0]),
            Err(TrialError::InvalidInterval(0))
        );
        let mut set = IntervalSet::empty();
        assert!(set.insert(13).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn serde_as_plain_list() {
        let set = IntervalSet::from_semitones([7, 4]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[4,7]");
        let back: IntervalSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(serde_json::from_str::<IntervalSet>("[0]").is_err());
    }
}
