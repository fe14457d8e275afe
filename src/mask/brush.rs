/// How a stroke composes onto the mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    /// Covered pixels become selected. Additive across strokes.
    #[default]
    Paint,
    /// Covered pixels become unselected regardless of prior state.
    Erase,
}

/// Brush settings for the stroke renderer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Brush {
    /// Diameter in surface pixels. Non-positive diameters draw nothing.
    pub diameter: f64,
    /// Composition mode.
    pub mode: BrushMode,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            diameter: 20.0,
            mode: BrushMode::Paint,
        }
    }
}

impl Brush {
    /// A paint brush of the given diameter.
    pub fn paint(diameter: f64) -> Self {
        Self {
            diameter,
            mode: BrushMode::Paint,
        }
    }

    /// An eraser of the given diameter.
    pub fn erase(diameter: f64) -> Self {
        Self {
            diameter,
            mode: BrushMode::Erase,
        }
    }

    /// Whether strokes with this brush leave any mark.
    pub fn is_drawable(self) -> bool {
        self.diameter.is_finite() && self.diameter > 0.0
    }

    /// Half the diameter.
    pub fn radius(self) -> f64 {
        self.diameter * 0.5
    }
}
