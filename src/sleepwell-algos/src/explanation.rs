use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use sleepwell_types::{Component, ComponentScores};
use strum::IntoEnumIterator;

/// Pattern the dashboard uses to read component scores back out of the
/// explanation text.
static COMPONENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Duration|Regularity|Heart rate|HRV|Respiratory) component: (\d+)")
        .expect("valid component regex")
});

/// Renders the score and every computed component as
/// `<Name> component: <value>`, which the dashboard parses back.
pub fn format_explanation(score: u8, scores: &ComponentScores) -> String {
    let computed = Component::iter()
        .filter_map(|c| scores.get(c).map(|v| format!("{} component: {}", c.label(), v)))
        .collect::<Vec<_>>();
    let missing = Component::iter()
        .filter(|c| scores.get(*c).is_none())
        .map(Component::label)
        .collect::<Vec<_>>();

    let mut explanation = format!(
        "Sleep Health Score {}/100 from {} of 5 components. {}.",
        score,
        computed.len(),
        computed.join("; ")
    );
    if !missing.is_empty() {
        explanation.push_str(&format!(" Not scored (no data): {}.", missing.join(", ")));
    }
    explanation
}

pub fn parse_explanation(explanation: &str) -> BTreeMap<Component, u8> {
    COMPONENT_RE
        .captures_iter(explanation)
        .filter_map(|caps| {
            let component = caps[1].parse::<Component>().ok()?;
            let value = caps[2].parse::<u8>().ok()?;
            Some((component, value))
        })
        .collect()
}
