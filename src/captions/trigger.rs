use super::scanner::{NextLine, ScanState};
use super::timing::{cue_start, parse_timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of checking one line while the window is still closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Window stays closed
    Pending,
    /// Window opens and this line is part of it
    OpensHere,
    /// Window opens with the line after this one
    OpensAfter,
}

/// Rule deciding which caption line opens the final-round window.
///
/// The scanner only consults the policy while the window is closed, so a
/// policy never has to worry about closing it again.
pub trait TriggerPolicy {
    fn check(&self, line: &str, next: NextLine<'_>, state: &mut ScanState) -> Trigger;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

impl<P: TriggerPolicy + ?Sized> TriggerPolicy for Box<P> {
    fn check(&self, line: &str, next: NextLine<'_>, state: &mut ScanState) -> Trigger {
        (**self).check(line, next, state)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<P: TriggerPolicy + ?Sized> TriggerPolicy for &P {
    fn check(&self, line: &str, next: NextLine<'_>, state: &mut ScanState) -> Trigger {
        (**self).check(line, next, state)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Opens on the first line starting with a fixed timestamp prefix
#[derive(Debug, Clone)]
pub struct FixedTimestamp {
    pub prefix: String,
}

impl FixedTimestamp {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl TriggerPolicy for FixedTimestamp {
    fn check(&self, line: &str, _next: NextLine<'_>, _state: &mut ScanState) -> Trigger {
        if line.starts_with(&self.prefix) {
            Trigger::OpensHere
        } else {
            Trigger::Pending
        }
    }

    fn name(&self) -> &'static str {
        "fixed-timestamp"
    }
}

/// Opens on the first line starting with any of several prefixes, tried in order
#[derive(Debug, Clone)]
pub struct MultiTimestamp {
    pub prefixes: Vec<String>,
}

impl MultiTimestamp {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl TriggerPolicy for MultiTimestamp {
    fn check(&self, line: &str, _next: NextLine<'_>, _state: &mut ScanState) -> Trigger {
        if self.prefixes.iter().any(|prefix| line.starts_with(prefix.as_str())) {
            Trigger::OpensHere
        } else {
            Trigger::Pending
        }
    }

    fn name(&self) -> &'static str {
        "multi-timestamp"
    }
}

/// Opens after the round announcement cue: once a cue starting at or after
/// `threshold` has been seen, the first line containing `marker` that is
/// followed by a blank line opens the window from the next line on.
#[derive(Debug, Clone)]
pub struct MarkerAfterThreshold {
    pub threshold: Duration,
    pub marker: String,
}

impl MarkerAfterThreshold {
    pub fn new(threshold: Duration, marker: impl Into<String>) -> Self {
        Self {
            threshold,
            marker: marker.into(),
        }
    }
}

impl TriggerPolicy for MarkerAfterThreshold {
    fn check(&self, line: &str, next: NextLine<'_>, state: &mut ScanState) -> Trigger {
        if !state.past_threshold {
            if cue_start(line).is_some_and(|start| start >= self.threshold) {
                state.past_threshold = true;
            }
            return Trigger::Pending;
        }

        if line.contains(&self.marker) && next.is_blank() {
            Trigger::OpensAfter
        } else {
            Trigger::Pending
        }
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}

/// Serializable choice of trigger policy, as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerConfig {
    FixedTimestamp { prefix: String },
    MultiTimestamp { prefixes: Vec<String> },
    Marker { threshold: String, marker: String },
}

impl TriggerConfig {
    pub fn default_fixed() -> Self {
        TriggerConfig::FixedTimestamp {
            prefix: "00:33:".to_string(),
        }
    }

    pub fn default_multi() -> Self {
        TriggerConfig::MultiTimestamp {
            prefixes: vec![
                "00:33:".to_string(),
                "00:32:".to_string(),
                "00:31:".to_string(),
            ],
        }
    }

    pub fn default_marker() -> Self {
        TriggerConfig::Marker {
            threshold: "00:34:00.000".to_string(),
            marker: "<c.cyan>".to_string(),
        }
    }

    /// Look up a default policy by its CLI name
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "fixed" | "fixed_timestamp" => Some(Self::default_fixed()),
            "multi" | "multi_timestamp" => Some(Self::default_multi()),
            "marker" => Some(Self::default_marker()),
            _ => None,
        }
    }

    /// Build the policy value the scanner runs with
    pub fn build(&self) -> Result<Box<dyn TriggerPolicy + Send + Sync>, String> {
        match self {
            TriggerConfig::FixedTimestamp { prefix } => {
                if prefix.is_empty() {
                    return Err("fixed_timestamp trigger needs a non-empty prefix".to_string());
                }
                Ok(Box::new(FixedTimestamp::new(prefix.clone())))
            }
            TriggerConfig::MultiTimestamp { prefixes } => {
                if prefixes.is_empty() || prefixes.iter().any(|p| p.is_empty()) {
                    return Err("multi_timestamp trigger needs non-empty prefixes".to_string());
                }
                Ok(Box::new(MultiTimestamp::new(prefixes.iter().cloned())))
            }
            TriggerConfig::Marker { threshold, marker } => {
                let threshold = parse_timestamp(threshold)
                    .ok_or_else(|| format!("invalid marker threshold '{}'", threshold))?;
                if marker.is_empty() {
                    return Err("marker trigger needs a non-empty marker".to_string());
                }
                Ok(Box::new(MarkerAfterThreshold::new(threshold, marker.clone())))
            }
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::default_marker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_prefix() {
        let policy = FixedTimestamp::new("00:33:");
        let mut state = ScanState::default();
        assert_eq!(
            policy.check("00:32:59.000 --> 00:33:01.000", NextLine::End, &mut state),
            Trigger::Pending
        );
        assert_eq!(
            policy.check("00:33:05.000 --> 00:33:07.000", NextLine::End, &mut state),
            Trigger::OpensHere
        );
    }

    #[test]
    fn test_multi_prefix_any_match() {
        let policy = MultiTimestamp::new(["00:33:", "00:31:"]);
        let mut state = ScanState::default();
        assert_eq!(
            policy.check("00:31:10.000 --> 00:31:12.000", NextLine::End, &mut state),
            Trigger::OpensHere
        );
        assert_eq!(
            policy.check("00:32:10.000 --> 00:32:12.000", NextLine::End, &mut state),
            Trigger::Pending
        );
    }

    #[test]
    fn test_marker_requires_threshold() {
        let policy = MarkerAfterThreshold::new(Duration::from_secs(34 * 60), "<c.cyan>");
        let mut state = ScanState::default();

        assert_eq!(
            policy.check("<c.cyan>", NextLine::Line(""), &mut state),
            Trigger::Pending
        );
        assert!(!state.past_threshold);

        policy.check("00:34:00.000 --> 00:34:02.000", NextLine::Line("<c.cyan>"), &mut state);
        assert!(state.past_threshold);

        assert_eq!(
            policy.check("<c.cyan>", NextLine::Line("   "), &mut state),
            Trigger::OpensAfter
        );
    }

    #[test]
    fn test_marker_needs_blank_next_line() {
        let policy = MarkerAfterThreshold::new(Duration::ZERO, "<c.cyan>");
        let mut state = ScanState {
            past_threshold: true,
            window_open: false,
        };
        assert_eq!(
            policy.check("<c.cyan>Top</c>", NextLine::Line("la suite"), &mut state),
            Trigger::Pending
        );
        assert_eq!(
            policy.check("<c.cyan>Top</c>", NextLine::End, &mut state),
            Trigger::Pending
        );
    }

    #[test]
    fn test_threshold_is_a_floor_not_a_prefix() {
        let policy = MarkerAfterThreshold::new(Duration::from_secs(34 * 60), "<c.cyan>");
        let mut state = ScanState::default();
        policy.check("00:35:12.000 --> 00:35:14.000", NextLine::End, &mut state);
        assert!(state.past_threshold);
    }

    #[test]
    fn test_trigger_config_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            trigger: TriggerConfig,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [trigger]
            kind = "multi_timestamp"
            prefixes = ["00:33:", "00:31:"]
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.trigger,
            TriggerConfig::MultiTimestamp {
                prefixes: vec!["00:33:".to_string(), "00:31:".to_string()]
            }
        );
    }

    #[test]
    fn test_build_rejects_bad_threshold() {
        let config = TriggerConfig::Marker {
            threshold: "soon".to_string(),
            marker: "<c.cyan>".to_string(),
        };
        assert!(config.build().is_err());
        assert_eq!(TriggerConfig::default().build().unwrap().name(), "marker");
        assert!(TriggerConfig::from_kind("bogus").is_none());
    }
}
