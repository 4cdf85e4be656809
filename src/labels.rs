//! The ten mismatch labels and the per-row label vector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A fixed boolean fault indicator attached to an adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    HelloMismatch,
    DeadMismatch,
    NetworkTypeMismatch,
    AreaMismatch,
    AuthMismatch,
    AuthKeyMismatch,
    #[serde(rename = "MTUMismatch")]
    MtuMismatch,
    PassiveMismatch,
    RedistributeMismatch,
    #[serde(rename = "RouterIDMismatch")]
    RouterIdMismatch,
}

impl Label {
    /// Every label, in report and column order.
    pub const ALL: [Label; 10] = [
        Label::HelloMismatch,
        Label::DeadMismatch,
        Label::NetworkTypeMismatch,
        Label::AreaMismatch,
        Label::AuthMismatch,
        Label::AuthKeyMismatch,
        Label::MtuMismatch,
        Label::PassiveMismatch,
        Label::RedistributeMismatch,
        Label::RouterIdMismatch,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Column / ground-truth spelling of the label.
    pub fn name(self) -> &'static str {
        match self {
            Self::HelloMismatch => "HelloMismatch",
            Self::DeadMismatch => "DeadMismatch",
            Self::NetworkTypeMismatch => "NetworkTypeMismatch",
            Self::AreaMismatch => "AreaMismatch",
            Self::AuthMismatch => "AuthMismatch",
            Self::AuthKeyMismatch => "AuthKeyMismatch",
            Self::MtuMismatch => "MTUMismatch",
            Self::PassiveMismatch => "PassiveMismatch",
            Self::RedistributeMismatch => "RedistributeMismatch",
            Self::RouterIdMismatch => "RouterIDMismatch",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a token is not one of the ten label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .into_iter()
            .find(|label| label.name() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Ten independent booleans, one per [`Label`]. All false by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LabelVector([bool; Label::COUNT]);

impl LabelVector {
    pub fn get(&self, label: Label) -> bool {
        self.0[label.index()]
    }

    pub fn set(&mut self, label: Label, value: bool) {
        self.0[label.index()] = value;
    }

    /// Raise a label (never lowers one).
    pub fn raise(&mut self, label: Label) {
        self.set(label, true);
    }

    /// Labels currently raised, in [`Label::ALL`] order.
    pub fn raised(&self) -> impl Iterator<Item = Label> + '_ {
        Label::ALL.into_iter().filter(|label| self.get(*label))
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|v| *v)
    }
}

impl FromIterator<Label> for LabelVector {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut vector = LabelVector::default();
        for label in iter {
            vector.raise(label);
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for label in Label::ALL {
            assert_eq!(label.name().parse::<Label>().unwrap(), label);
        }
    }

    #[test]
    fn acronym_labels_keep_upper_case_spelling() {
        assert_eq!(Label::MtuMismatch.to_string(), "MTUMismatch");
        assert_eq!(Label::RouterIdMismatch.to_string(), "RouterIDMismatch");
        assert!("MtuMismatch".parse::<Label>().is_err());
    }

    #[test]
    fn vector_defaults_to_all_false() {
        let v = LabelVector::default();
        assert!(!v.any());
        assert_eq!(v.raised().count(), 0);
    }

    #[test]
    fn vector_from_labels() {
        let v: LabelVector = [Label::DeadMismatch, Label::RouterIdMismatch].into_iter().collect();
        assert!(v.get(Label::DeadMismatch));
        assert!(v.get(Label::RouterIdMismatch));
        assert!(!v.get(Label::HelloMismatch));
        assert_eq!(
            v.raised().collect::<Vec<_>>(),
            vec![Label::DeadMismatch, Label::RouterIdMismatch]
        );
    }
}
