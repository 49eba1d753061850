use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::action_unit::{ActionUnit, ActionUnitFlags};
use crate::utils::coordinate::Coordinate2D;

/// Offset from the face box corner to where the label is drawn.
const LABEL_OFFSET: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    Happiness,
    Surprise,
    Anger,
    Neutral,
}

impl Expression {
    pub fn label(&self) -> &'static str {
        match self {
            Expression::Happiness => "Happiness",
            Expression::Surprise => "Surprise",
            Expression::Anger => "Anger",
            Expression::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// classify_expression picks the first matching expression for a set of flags.
///
/// Happiness is AU12. Surprise is AU5 with AU26. Anger is AU4 with AU5.
/// Anything else is Neutral. The label sits 10px up and left of `anchor`.
///
/// # Arguments
/// * `flags` - &ActionUnitFlags
/// * `anchor` - top-left corner of the face box
///
/// # Returns
/// * `(Expression, Coordinate2D)`
pub fn classify_expression(
    flags: &ActionUnitFlags,
    anchor: Coordinate2D,
) -> (Expression, Coordinate2D) {
    let expression = if flags.is_set(ActionUnit::LipCornerPuller) {
        Expression::Happiness
    } else if flags.is_set(ActionUnit::UpperLidRaiser) && flags.is_set(ActionUnit::JawDrop) {
        Expression::Surprise
    } else if flags.is_set(ActionUnit::BrowLowerer) && flags.is_set(ActionUnit::UpperLidRaiser) {
        Expression::Anger
    } else {
        Expression::Neutral
    };

    let position = Coordinate2D::new(anchor.x - LABEL_OFFSET, anchor.y - LABEL_OFFSET);
    (expression, position)
}
