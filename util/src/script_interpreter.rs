//! # Observation script interpreter module
//!
//! This module provides an interpreter for observation scripts, allowing a
//! recorded (or hand written) sequence of vision observations to be replayed
//! into the approach controller cycle by cycle.
//!
//! A script is a list of `<cycle>: <observation json>;` entries, for example:
//!
//! ```text
//! # Target seen far away, then nearer
//! 0: {"has_target": true, "yaw_deg": 2.0, "pitch_deg": 5.0};
//! 1: {"has_target": true, "yaw_deg": 1.0, "pitch_deg": 3.0};
//! 4: {"has_target": false};
//! ```
//!
//! An entry stays current until the next one, like the "latest result" of a
//! camera pipeline. Lines not matching the entry pattern are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::path::{Path, PathBuf};
use std::fs;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

// Internal
use comms_if::eqpt::vision::{Observation, ObsParseError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Pattern matching one `<cycle>: <observation>;` entry. An entry is confined
/// to a single line.
const ENTRY_PATTERN: &str = r"^[ \t]*(\S+?)[ \t]*:[ \t]*([^;\n]*);";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An observation which is scripted to become current at a specific cycle.
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// The cycle from which this observation is current
    cycle: u64,

    /// The observation itself
    obs: Observation
}

/// An observation script.
///
/// After loading, use `.obs_at` to get the observation current at a given
/// cycle.
#[derive(Debug, Clone)]
pub struct ObsScript {
    script_path: Option<PathBuf>,

    /// Entries sorted by cycle
    entries: Vec<Entry>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("Could not build the script entry pattern: {0}")]
    InvalidPattern(regex::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid cycle number: {0}. \
        Should be a positive integer (like 12)")]
    InvalidCycle(String),

    #[error("Script contains an invalid observation at cycle {0}: {1}")]
    InvalidObs(u64, ObsParseError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ObsScript {

    /// Load a script from the given path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut s = Self::parse(&script)?;
        s.script_path = Some(path);

        Ok(s)
    }

    /// Parse a script from its text.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut entries: Vec<Entry> = vec![];

        // Go through the script executing __the magic regex__.
        let re = entry_regex()?;

        for cap in re.captures_iter(script) {
            let (cycle_str, obs_str) = match (cap.get(1), cap.get(2)) {
                (Some(c), Some(o)) => (c.as_str(), o.as_str()),
                _ => continue
            };

            // Comment lines may happen to contain a colon and semicolon
            if cycle_str.starts_with('#') {
                continue;
            }

            // Parse the cycle number
            let cycle: u64 = cycle_str
                .parse()
                .map_err(|_| ScriptError::InvalidCycle(cycle_str.to_string()))?;

            // Parse the observation from the payload. The scripts contain
            // JSON only.
            let obs = Observation::from_json(obs_str)
                .map_err(|e| ScriptError::InvalidObs(cycle, e))?;

            entries.push(Entry { cycle, obs });
        }

        if entries.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Stable sort, so that for duplicate cycles the last entry written
        // wins in `obs_at`.
        entries.sort_by_key(|e| e.cycle);

        Ok(ObsScript {
            script_path: None,
            entries
        })
    }

    /// Return the observation current at the given cycle, or `None` if the
    /// cycle is before the first entry.
    pub fn obs_at(&self, cycle: u64) -> Option<Observation> {
        // Index of the first entry after the cycle
        let idx = self.entries.partition_point(|e| e.cycle <= cycle);

        match idx {
            0 => None,
            i => Some(self.entries[i - 1].obs)
        }
    }

    /// Get the number of observations in the script
    pub fn get_num_obs(&self) -> usize {
        self.entries.len()
    }

    /// Get the cycle of the last entry in the script.
    pub fn get_last_cycle(&self) -> u64 {
        match self.entries.last() {
            Some(e) => e.cycle,
            None => 0
        }
    }

    /// Get the path the script was loaded from, if any
    pub fn get_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

/// Build the entry regex.
fn entry_regex() -> Result<Regex, ScriptError> {
    RegexBuilder::new(ENTRY_PATTERN)
        .multi_line(true)
        .build()
        .map_err(ScriptError::InvalidPattern)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
# Target seen far away, then nearer
0: {"has_target": true, "yaw_deg": 2.0, "pitch_deg": 5.0};
1: {"has_target": true, "yaw_deg": 1.0, "pitch_deg": 3.0};
   5 : {"has_target": false};
3: {"has_target": true, "yaw_deg": 0.0, "pitch_deg": -9.0};
"#;

    #[test]
    fn test_parse() {
        let s = ObsScript::parse(SCRIPT).unwrap();

        assert_eq!(s.get_num_obs(), 4);
        assert_eq!(s.get_last_cycle(), 5);
        assert!(s.get_path().is_none());
    }

    #[test]
    fn test_obs_at_holds_latest() {
        let s = ObsScript::parse(SCRIPT).unwrap();

        assert_eq!(s.obs_at(0), Some(Observation::target(2.0, 5.0)));
        assert_eq!(s.obs_at(1), Some(Observation::target(1.0, 3.0)));
        assert_eq!(s.obs_at(2), Some(Observation::target(1.0, 3.0)));
        assert_eq!(s.obs_at(3), Some(Observation::target(0.0, -9.0)));
        assert_eq!(s.obs_at(4), Some(Observation::target(0.0, -9.0)));
        assert_eq!(s.obs_at(5), Some(Observation::none()));
        assert_eq!(s.obs_at(500), Some(Observation::none()));

        // Nothing before the first entry
        let s = ObsScript::parse("2: {\"has_target\": true};").unwrap();
        assert_eq!(s.obs_at(1), None);
    }

    #[test]
    fn test_comment_with_colon_above_entry() {
        let s = ObsScript::parse(
            "#phase1: far away\n\
             0: {\"has_target\": true, \"pitch_deg\": 4.0};\n\
             # phase2: nearer\n\
             1: {\"has_target\": true, \"pitch_deg\": 2.0};\n\
             #2: {\"has_target\": false};\n"
        ).unwrap();

        assert_eq!(s.get_num_obs(), 2);
        assert_eq!(s.obs_at(0), Some(Observation::target(0.0, 4.0)));
        assert_eq!(s.obs_at(1), Some(Observation::target(0.0, 2.0)));
        assert_eq!(s.obs_at(2), Some(Observation::target(0.0, 2.0)));
    }

    #[test]
    fn test_entry_regex_is_single_line() {
        let re = entry_regex().unwrap();

        assert!(re.is_match("  12 : {};"));

        // An entry without its terminator doesn't swallow the next line
        let caps: Vec<_> = re
            .captures_iter("3: {\"has_target\": true}\n4: {};")
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();
        assert_eq!(caps, vec!["4".to_string()]);
    }

    #[test]
    fn test_errors() {
        match ObsScript::parse("# nothing here\n") {
            Err(ScriptError::ScriptEmpty) => (),
            r => panic!("Expected ScriptEmpty, got {:?}", r)
        }

        match ObsScript::parse("1.5: {};") {
            Err(ScriptError::InvalidCycle(c)) => assert_eq!(c, "1.5"),
            r => panic!("Expected InvalidCycle, got {:?}", r)
        }

        match ObsScript::parse("3: {\"pitch_deg\": \"low\"};") {
            Err(ScriptError::InvalidObs(3, _)) => (),
            r => panic!("Expected InvalidObs, got {:?}", r)
        }

        match ObsScript::new("/definitely/not/a/script.obs") {
            Err(ScriptError::ScriptNotFound(_)) => (),
            r => panic!("Expected ScriptNotFound, got {:?}", r)
        }
    }
}
