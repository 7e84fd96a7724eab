#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Planned")]
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Failed")]
    Failed,
    #[serde(rename = "Aborted")]
    Aborted,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Planned,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::Aborted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Planned => "Planned",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
            TaskStatus::Aborted => "Aborted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Aborted
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionStatus {
    #[default]
    Imaging,
    Acquired,
    Aborted,
    QcFailed,
    QcPassed,
    QcPending,
    ToBeReImaged,
}

impl AcquisitionStatus {
    pub const ALL: [AcquisitionStatus; 7] = [
        AcquisitionStatus::Imaging,
        AcquisitionStatus::Acquired,
        AcquisitionStatus::Aborted,
        AcquisitionStatus::QcFailed,
        AcquisitionStatus::QcPassed,
        AcquisitionStatus::QcPending,
        AcquisitionStatus::ToBeReImaged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AcquisitionStatus::Imaging => "imaging",
            AcquisitionStatus::Acquired => "acquired",
            AcquisitionStatus::Aborted => "aborted",
            AcquisitionStatus::QcFailed => "qc-failed",
            AcquisitionStatus::QcPassed => "qc-passed",
            AcquisitionStatus::QcPending => "qc-pending",
            AcquisitionStatus::ToBeReImaged => "to-be-re-imaged",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// Physical carrier a cutting session collects sections onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Tape,
    Grid,
    Sled,
    Stick,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Tape => "tape",
            MediaType::Grid => "grid",
            MediaType::Sled => "sled",
            MediaType::Stick => "stick",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "tape" => Some(MediaType::Tape),
            "grid" => Some(MediaType::Grid),
            "sled" => Some(MediaType::Sled),
            "stick" => Some(MediaType::Stick),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionQuality {
    Good,
    Broken,
    Thin,
    Thick,
    Empty,
}

impl SectionQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionQuality::Good => "good",
            SectionQuality::Broken => "broken",
            SectionQuality::Thin => "thin",
            SectionQuality::Thick => "thick",
            SectionQuality::Empty => "empty",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "good" => Some(SectionQuality::Good),
            "broken" => Some(SectionQuality::Broken),
            "thin" => Some(SectionQuality::Thin),
            "thick" => Some(SectionQuality::Thick),
            "empty" => Some(SectionQuality::Empty),
            _ => None,
        }
    }
}

pub const DEFAULT_TASK_TYPE: &str = "standard_acquisition";
pub const DEFAULT_SUBSTRATE_STATUS: &str = "new";

/// Tags are trimmed, lowercased, de-duplicated and sorted.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, TagError> {
    let mut out = std::collections::BTreeSet::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(TagError::ContainsControl);
        }
        if trimmed.len() > 64 {
            return Err(TagError::TooLong);
        }
        out.insert(trimmed.to_lowercase());
    }
    Ok(out.into_iter().collect())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagError {
    TooLong,
    ContainsControl,
}

impl TagError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::TooLong => "tag is too long",
            Self::ContainsControl => "tag contains control characters",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_round_trips_through_wire_names() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("in progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("done"), None);
        assert!(TaskStatus::Aborted.is_terminal());
        assert!(!TaskStatus::Planned.is_terminal());
    }

    #[test]
    fn acquisition_status_uses_kebab_case() {
        assert_eq!(AcquisitionStatus::ToBeReImaged.as_str(), "to-be-re-imaged");
        assert_eq!(
            AcquisitionStatus::parse("qc-pending"),
            Some(AcquisitionStatus::QcPending)
        );
        assert_eq!(AcquisitionStatus::parse("QC-PENDING"), None);
        assert_eq!(AcquisitionStatus::default(), AcquisitionStatus::Imaging);
    }

    #[test]
    fn media_type_and_quality_parse() {
        assert_eq!(MediaType::parse("tape"), Some(MediaType::Tape));
        assert_eq!(MediaType::parse("wafer"), None);
        assert_eq!(SectionQuality::parse("broken"), Some(SectionQuality::Broken));
    }

    #[test]
    fn normalize_tags_is_deterministic() {
        let out = normalize_tags(&[
            " Foo ".to_string(),
            "foo".to_string(),
            "BAR".to_string(),
            "".to_string(),
        ])
        .expect("tags");
        assert_eq!(out, vec!["bar".to_string(), "foo".to_string()]);
        assert_eq!(
            normalize_tags(&["bad\u{0000}".to_string()]).unwrap_err(),
            TagError::ContainsControl
        );
    }
}
