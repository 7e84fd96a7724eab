#![forbid(unsafe_code)]

//! Human-readable keys and the composite identifiers derived from them.
//!
//! An ROI key spells out its whole containment chain:
//! `{specimen}.{block}.{section}.{media}.ROI001`, and a nested ROI appends one
//! more `.ROI{n}` segment to its parent's key. Every level pads the number to
//! [`ROI_NUMBER_WIDTH`] digits; wider numbers are written in full.

pub const ROI_MARKER: &str = ".ROI";
pub const ROI_NUMBER_WIDTH: usize = 3;
pub const SECTION_NUMBER_WIDTH: usize = 5;
pub const MAX_KEY_LEN: usize = 128;

pub fn format_roi_id(
    specimen_id: &str,
    block_id: &str,
    section_id: &str,
    substrate_media_id: &str,
    roi_number: u32,
    parent_roi_id: Option<&str>,
) -> String {
    match parent_roi_id {
        Some(parent) => format!("{parent}{ROI_MARKER}{roi_number:0ROI_NUMBER_WIDTH$}"),
        None => format!(
            "{specimen_id}.{block_id}.{section_id}.{substrate_media_id}{ROI_MARKER}{roi_number:0ROI_NUMBER_WIDTH$}"
        ),
    }
}

/// Nesting depth of an ROI key: one per `.ROI` marker.
pub fn parse_hierarchy_level(roi_id: &str) -> usize {
    roi_id.matches(ROI_MARKER).count()
}

pub fn format_section_id(media_id: &str, section_number: u32) -> String {
    format!("{media_id}_S{section_number:0SECTION_NUMBER_WIDTH$}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKeyError {
    Empty,
    TooLong,
    ContainsDot,
    ContainsWhitespace,
    ContainsControl,
    RoiMarkerShape,
}

impl EntityKeyError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "key must not be empty",
            Self::TooLong => "key is too long",
            Self::ContainsDot => "key must not contain '.'",
            Self::ContainsWhitespace => "key must not contain whitespace",
            Self::ContainsControl => "key contains control characters",
            Self::RoiMarkerShape => "key must not look like an ROI segment (ROI<digits>)",
        }
    }
}

/// Trims and validates a human-readable key (specimen, block, media, ...).
///
/// Keys become segments of dotted ROI identifiers, so `.` is rejected, as is
/// anything shaped like an `ROI<digits>` segment.
pub fn canonical_key(value: &str) -> Result<String, EntityKeyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EntityKeyError::Empty);
    }
    if trimmed.len() > MAX_KEY_LEN {
        return Err(EntityKeyError::TooLong);
    }
    if trimmed.contains('.') {
        return Err(EntityKeyError::ContainsDot);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(EntityKeyError::ContainsControl);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EntityKeyError::ContainsWhitespace);
    }
    if is_roi_segment(trimmed) {
        return Err(EntityKeyError::RoiMarkerShape);
    }
    Ok(trimmed.to_string())
}

fn is_roi_segment(segment: &str) -> bool {
    segment
        .strip_prefix("ROI")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberRangeError {
    Zero,
}

impl NumberRangeError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Zero => "number must be greater than zero",
        }
    }
}

pub fn validate_roi_number(value: u32) -> Result<u32, NumberRangeError> {
    if value == 0 {
        return Err(NumberRangeError::Zero);
    }
    Ok(value)
}

pub fn validate_section_number(value: u32) -> Result<u32, NumberRangeError> {
    if value == 0 {
        return Err(NumberRangeError::Zero);
    }
    Ok(value)
}

/// A parsed ROI key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoiId(String);

impl RoiId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, RoiIdError> {
        let value = value.into();
        validate_roi_id(&value)?;
        Ok(Self(value))
    }

    pub fn level(&self) -> usize {
        parse_hierarchy_level(&self.0)
    }

    /// The enclosing ROI key, `None` for a top-level ROI.
    pub fn parent(&self) -> Option<RoiId> {
        if self.level() < 2 {
            return None;
        }
        let cut = self.0.rfind(ROI_MARKER)?;
        Some(RoiId(self.0[..cut].to_string()))
    }

    /// Keys of every ancestor ROI, root first, ending with this one.
    pub fn lineage(&self) -> Vec<RoiId> {
        let mut out = vec![self.clone()];
        let mut current = self.parent();
        while let Some(parent) = current {
            current = parent.parent();
            out.push(parent);
        }
        out.reverse();
        out
    }

    pub fn number(&self) -> Option<u32> {
        let cut = self.0.rfind(ROI_MARKER)?;
        self.0[cut + ROI_MARKER.len()..].parse().ok()
    }
}

impl std::fmt::Display for RoiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoiIdError {
    Empty,
    MissingBase,
    InvalidSegment { index: usize },
}

impl RoiIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "roi id must not be empty",
            Self::MissingBase => "roi id must start with specimen.block.section.media",
            Self::InvalidSegment { .. } => "roi id contains an invalid segment",
        }
    }
}

fn validate_roi_id(value: &str) -> Result<(), RoiIdError> {
    if value.trim().is_empty() {
        return Err(RoiIdError::Empty);
    }
    let segments = value.split('.').collect::<Vec<_>>();
    if segments.len() < 5 {
        return Err(RoiIdError::MissingBase);
    }
    for (index, segment) in segments.iter().enumerate() {
        let ok = if index < 4 {
            canonical_key(segment).is_ok_and(|key| key == *segment)
        } else {
            is_roi_segment(segment)
        };
        if !ok {
            return Err(RoiIdError::InvalidSegment { index });
        }
    }
    Ok(())
}
