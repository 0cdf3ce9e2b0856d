use log::debug;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static LEVEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d\d?)\]").expect("level pattern is valid")
});

/// Renders a real number the way MGXC readers expect: shortest round-trip
/// decimal, and never a negative zero. Integral values carry no fraction
/// (`1`, `-1`), unlike Python-generated charts which write `1.0`.
#[derive(Debug, Clone, Copy)]
pub struct Real(pub f64);

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            write!(f, "0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Pulls the play level out of a difficulty name like `Insane [12]`, falling back to `1`.
pub fn level_from_version(version: &str) -> String {
    match LEVEL_REGEX.captures_iter(version).last() {
        Some(caps) => caps[1].to_string(),
        None => {
            debug!("No level found in difficulty '{}', defaulting to 1..!", version);
            String::from("1")
        }
    }
}

/// Rounds to the nearest integer, with halves going to the even neighbour.
pub fn round_i64(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Rounds to three decimal places, enough to keep BPMs like `133` exact.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
