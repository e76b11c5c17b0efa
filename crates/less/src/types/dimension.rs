//! Numbers with units and unit conversion.

/// A group of units that can be converted into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitGroup {
    /// `m cm mm in px pt pc`, base unit metres.
    Length,
    /// `s ms`, base unit seconds.
    Duration,
    /// `rad deg grad turn`, base unit turns.
    Angle,
}

impl UnitGroup {
    /// The group a unit belongs to and its size in the group's base unit.
    pub fn of(unit: &str) -> Option<(UnitGroup, f64)> {
        let factor = match unit.to_ascii_lowercase().as_str() {
            "m" => (UnitGroup::Length, 1.0),
            "cm" => (UnitGroup::Length, 0.01),
            "mm" => (UnitGroup::Length, 0.001),
            "in" => (UnitGroup::Length, 0.0254),
            "px" => (UnitGroup::Length, 0.0254 / 96.0),
            "pt" => (UnitGroup::Length, 0.0254 / 72.0),
            "pc" => (UnitGroup::Length, 0.0254 / 72.0 * 12.0),
            "s" => (UnitGroup::Duration, 1.0),
            "ms" => (UnitGroup::Duration, 0.001),
            "rad" => (UnitGroup::Angle, 1.0 / (2.0 * std::f64::consts::PI)),
            "deg" => (UnitGroup::Angle, 1.0 / 360.0),
            "grad" => (UnitGroup::Angle, 1.0 / 400.0),
            "turn" => (UnitGroup::Angle, 1.0),
            _ => return None,
        };
        Some(factor)
    }
}

/// A number with an optional unit (`""` when unitless).
///
/// # Examples
///
/// ```
/// use less::types::Dimension;
///
/// let inches = Dimension::new(1.0, "in");
/// assert_eq!(inches.convert_to("px").unwrap().to_css(), "96px");
/// assert!(Dimension::new(1.0, "px").convert_to("em").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: String,
}

impl Dimension {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    pub fn unitless(value: f64) -> Self {
        Self::new(value, "")
    }

    pub fn is_unitless(&self) -> bool {
        self.unit.is_empty()
    }

    /// Convert into `unit`. Same-unit and unitless values convert trivially;
    /// otherwise both units must belong to the same [`UnitGroup`].
    pub fn convert_to(&self, unit: &str) -> Option<Dimension> {
        if self.unit.eq_ignore_ascii_case(unit) || self.is_unitless() {
            return Some(Dimension::new(self.value, unit));
        }
        if unit.is_empty() {
            return Some(self.clone());
        }
        let (from_group, from_factor) = UnitGroup::of(&self.unit)?;
        let (to_group, to_factor) = UnitGroup::of(unit)?;
        if from_group != to_group {
            return None;
        }
        Some(Dimension::new(self.value * from_factor / to_factor, unit))
    }

    /// CSS text of a computed number: rounded to 8 decimals.
    pub fn to_css(&self) -> String {
        format!("{}{}", format_number(self.value), self.unit)
    }
}

/// Format a computed number: at most 8 decimal places, trailing zeros and
/// negative zero removed.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1e8).round() / 1e8;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{:.8}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}
