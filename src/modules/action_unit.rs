use serde::{Serialize, Serializer};

use crate::config::config::ActionUnitConfig;
use crate::utils::coordinate::{
    BoundingBox, LandmarkSet, EYELID_LOWER, EYELID_UPPER, INNER_LIP_LOWER, INNER_LIP_UPPER,
    LEFT_BROW_INNER, LEFT_LIP_CORNER, RIGHT_BROW_INNER, RIGHT_LIP_CORNER,
};
use crate::utils::utils::normalized_ratio;

/// Highest FACS main code kept in the flag table.
pub const MAX_ACTION_UNIT: usize = 28;

/// The action units derived from landmark geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionUnit {
    BrowLowerer = 4,
    UpperLidRaiser = 5,
    LipCornerPuller = 12,
    JawDrop = 26,
}

impl ActionUnit {
    pub const ALL: [ActionUnit; 4] = [
        ActionUnit::BrowLowerer,
        ActionUnit::UpperLidRaiser,
        ActionUnit::LipCornerPuller,
        ActionUnit::JawDrop,
    ];

    pub const fn code(self) -> usize {
        self as usize
    }
}

/// Presence flags indexed by FACS code 0..=28. Only the codes in `ActionUnit` are ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionUnitFlags {
    flags: [bool; MAX_ACTION_UNIT + 1],
}

impl ActionUnitFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, unit: ActionUnit) -> Self {
        self.flags[unit.code()] = true;
        self
    }

    pub fn is_set(&self, unit: ActionUnit) -> bool {
        self.flags[unit.code()]
    }

    /// Flag by raw code. Codes outside the table read as unset.
    pub fn get(&self, code: usize) -> bool {
        self.flags.get(code).copied().unwrap_or(false)
    }

    /// Codes of the set units, in ascending order.
    pub fn active(&self) -> Vec<usize> {
        ActionUnit::ALL
            .iter()
            .filter(|unit| self.is_set(**unit))
            .map(|unit| unit.code())
            .collect()
    }
}

impl Serialize for ActionUnitFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.active().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionUnitClassifier {
    config: ActionUnitConfig,
}

impl ActionUnitClassifier {
    pub fn new(config: ActionUnitConfig) -> Self {
        ActionUnitClassifier { config }
    }

    /// classify computes the action-unit flags for one face.
    ///
    /// Width-normalized units stay unset when the box width is not positive, and likewise for height.
    ///
    /// # Arguments
    /// * `landmarks` - &LandmarkSet
    /// * `bbox` - &BoundingBox
    ///
    /// # Returns
    /// * `ActionUnitFlags`
    pub fn classify(&self, landmarks: &LandmarkSet, bbox: &BoundingBox) -> ActionUnitFlags {
        let mut flags = ActionUnitFlags::new();

        let lip_spread = landmarks.point(RIGHT_LIP_CORNER).x - landmarks.point(LEFT_LIP_CORNER).x;
        if normalized_ratio(lip_spread, bbox.width)
            .is_some_and(|r| r > self.config.lip_corner_puller)
        {
            flags = flags.with(ActionUnit::LipCornerPuller);
        }

        let eye_opening = landmarks.point(EYELID_LOWER).y - landmarks.point(EYELID_UPPER).y;
        if normalized_ratio(eye_opening, bbox.height)
            .is_some_and(|r| r > self.config.upper_lid_raiser)
        {
            flags = flags.with(ActionUnit::UpperLidRaiser);
        }

        let lip_gap = landmarks.point(INNER_LIP_LOWER).y - landmarks.point(INNER_LIP_UPPER).y;
        if normalized_ratio(lip_gap, bbox.height).is_some_and(|r| r > self.config.jaw_drop) {
            flags = flags.with(ActionUnit::JawDrop);
        }

        let brow_gap = landmarks.point(RIGHT_BROW_INNER).x - landmarks.point(LEFT_BROW_INNER).x;
        if normalized_ratio(brow_gap, bbox.width).is_some_and(|r| r < self.config.brow_lowerer) {
            flags = flags.with(ActionUnit::BrowLowerer);
        }

        flags
    }
}

impl Default for ActionUnitClassifier {
    fn default() -> Self {
        Self::new(ActionUnitConfig::new())
    }
}

/// classify_action_units runs the classifier with the default thresholds.
pub fn classify_action_units(landmarks: &LandmarkSet, bbox: &BoundingBox) -> ActionUnitFlags {
    ActionUnitClassifier::default().classify(landmarks, bbox)
}
