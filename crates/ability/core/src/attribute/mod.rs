//! Attributes: clamped numeric stats with a multiplier pipeline.
//!
//! An attribute stores a raw `current_value` bounded by `[min, max]`. Reads
//! go through the multiplier pipeline:
//!
//! ```text
//! current_value() = clamp(stored × Π Get, min_value(), max_value())
//! max_value()     = max × Π MaxValue
//! min_value()     = min × Π MinValue
//! ```
//!
//! Mutations never fire observers directly. They queue [`AttributeSignal`]s
//! that the owner drains with [`Attribute::take_signals`]; the orchestrator
//! does this through [`AttributeMut`] so signals reach listeners in order.

mod multiplier;
mod set;

pub use multiplier::{AttributeMultiplier, MultiplierKind, Multipliers};
pub use set::{AttributeMut, AttributeSet};

use crate::class::{AttributeClass, MultiplierId};
use crate::error::Result;

/// How [`Attribute::edit_value`] interprets its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifyKind {
    Set,
    Add,
    Remove,
}

/// Something that happened to one attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeSignal {
    /// Current value changed; carries the read value (Get multipliers applied).
    ValueChanged(f32),
    MaxValueChanged(f32),
    MinValueChanged(f32),
    /// A write was clamped to the maximum.
    ReachedMax,
    /// A write was clamped to the minimum.
    ReachedMin,
    MultiplierAdded(MultiplierId),
    MultiplierRemoved(MultiplierId),
}

/// Static definition an attribute is created from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSpec {
    pub class: AttributeClass,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<AttributeClass>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default = "AttributeSpec::default_value"))]
    pub default_value: f32,
    #[cfg_attr(feature = "serde", serde(default = "AttributeSpec::default_value"))]
    pub max_value: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_value: f32,
}

impl AttributeSpec {
    pub const DEFAULT_VALUE: f32 = 100.0;
    pub const DEFAULT_MAX: f32 = 100.0;
    pub const DEFAULT_MIN: f32 = 0.0;

    #[cfg(feature = "serde")]
    fn default_value() -> f32 {
        Self::DEFAULT_VALUE
    }

    /// A `[0, 100]` attribute starting full.
    pub fn new(class: impl Into<AttributeClass>) -> Self {
        Self {
            class: class.into(),
            parent: None,
            display_name: None,
            default_value: Self::DEFAULT_VALUE,
            max_value: Self::DEFAULT_MAX,
            min_value: Self::DEFAULT_MIN,
        }
    }

    #[must_use]
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: f32) -> Self {
        self.default_value = value;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<AttributeClass>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Clamp that tolerates inverted bounds instead of panicking.
///
/// With `min > max` the result is `max`, matching the "accept and let the
/// numbers fall out" contract for malformed ranges.
pub(crate) fn clamp_lenient(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value < max {
        value
    } else {
        max
    }
}

/// A single clamped stat.
#[derive(Clone, Debug)]
pub struct Attribute {
    class: AttributeClass,
    display_name: String,
    current_value: f32,
    max_value: f32,
    min_value: f32,
    default_value: f32,
    multipliers: Multipliers,
    signals: Vec<AttributeSignal>,
}

impl Attribute {
    pub fn new(spec: &AttributeSpec) -> Self {
        let display_name = spec
            .display_name
            .clone()
            .unwrap_or_else(|| spec.class.to_string());
        Self {
            class: spec.class.clone(),
            display_name,
            current_value: clamp_lenient(spec.default_value, spec.min_value, spec.max_value),
            max_value: spec.max_value,
            min_value: spec.min_value,
            default_value: spec.default_value,
            multipliers: Multipliers::new(),
            signals: Vec::new(),
        }
    }

    pub fn class(&self) -> &AttributeClass {
        &self.class
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    /// Stored value, before Get multipliers.
    pub fn raw_value(&self) -> f32 {
        self.current_value
    }

    /// Read value: stored value scaled by Get multipliers, re-clamped.
    pub fn current_value(&self) -> f32 {
        let scaled = self.current_value * self.multiplier_value(MultiplierKind::Get);
        clamp_lenient(scaled, self.min_value(), self.max_value())
    }

    pub fn max_value(&self) -> f32 {
        self.max_value * self.multiplier_value(MultiplierKind::MaxValue)
    }

    pub fn min_value(&self) -> f32 {
        self.min_value * self.multiplier_value(MultiplierKind::MinValue)
    }

    /// Maps the read value from `[min, max]` onto `[0, 1]` without clamping.
    pub fn percent(&self) -> f32 {
        let (min, max) = (self.min_value(), self.max_value());
        let value = self.current_value();
        let span = max - min;
        if span.abs() <= f32::EPSILON {
            return if value >= max { 1.0 } else { 0.0 };
        }
        (value - min) / span
    }

    /// Writes `value`, clamped to the effective bounds.
    ///
    /// Hitting a bound queues `ReachedMax`/`ReachedMin`. Otherwise, with
    /// `use_multiplier`, the value is scaled by the Set product first. Always
    /// finishes with `ValueChanged` carrying the read value.
    pub fn set_current_value(&mut self, value: f32, use_multiplier: bool) {
        let max = self.max_value();
        let min = self.min_value();

        if value >= max {
            self.current_value = max;
            self.signals.push(AttributeSignal::ReachedMax);
        } else if value <= min {
            self.current_value = min;
            self.signals.push(AttributeSignal::ReachedMin);
        } else if use_multiplier {
            let scaled = value * self.multiplier_value(MultiplierKind::Set);
            self.current_value = clamp_lenient(scaled, min, max);
        } else {
            self.current_value = value;
        }

        self.signals
            .push(AttributeSignal::ValueChanged(self.current_value()));
    }

    /// Adds `|delta| × Π Add` to the stored value.
    pub fn add_current_value(&mut self, delta: f32) {
        let scaled = delta.abs() * self.multiplier_value(MultiplierKind::Add);
        self.set_current_value(self.current_value + scaled, false);
    }

    /// Subtracts `|delta| × Π Remove` from the stored value.
    pub fn remove_current_value(&mut self, delta: f32) {
        let scaled = delta.abs() * self.multiplier_value(MultiplierKind::Remove);
        self.set_current_value(self.current_value - scaled, false);
    }

    pub fn edit_value(&mut self, kind: ModifyKind, value: f32) {
        match kind {
            ModifyKind::Set => self.set_current_value(value, false),
            ModifyKind::Add => self.add_current_value(value),
            ModifyKind::Remove => self.remove_current_value(value),
        }
    }

    /// Assigns the raw maximum and pulls the stored value back inside it.
    pub fn set_max_value(&mut self, value: f32) {
        self.max_value = value;
        self.signals.push(AttributeSignal::MaxValueChanged(value));
        self.reclamp();
    }

    /// Assigns the raw minimum and pulls the stored value back inside it.
    pub fn set_min_value(&mut self, value: f32) {
        self.min_value = value;
        self.signals.push(AttributeSignal::MinValueChanged(value));
        self.reclamp();
    }

    fn reclamp(&mut self) {
        let clamped = clamp_lenient(self.current_value, self.min_value(), self.max_value());
        if clamped != self.current_value {
            self.current_value = clamped;
            self.signals
                .push(AttributeSignal::ValueChanged(self.current_value()));
        }
    }

    pub fn multiplier_value(&self, kind: MultiplierKind) -> f32 {
        self.multipliers.product(kind)
    }

    pub fn multipliers(&self) -> &Multipliers {
        &self.multipliers
    }

    pub fn multipliers_of(&self, kind: MultiplierKind) -> Vec<AttributeMultiplier> {
        self.multipliers.of_kind(kind).cloned().collect()
    }

    pub fn multiplier(&self, id: &MultiplierId) -> Option<&AttributeMultiplier> {
        self.multipliers.get(id)
    }

    /// Fails without mutation if the id is already present.
    ///
    /// A MaxValue or MinValue multiplier moves the effective bounds, so the
    /// stored value is pulled back inside them after `MultiplierAdded`.
    pub fn add_multiplier(&mut self, multiplier: AttributeMultiplier) -> Result<()> {
        let id = multiplier.id.clone();
        let kind = multiplier.kind;
        self.multipliers.insert(multiplier)?;
        self.signals.push(AttributeSignal::MultiplierAdded(id));
        if kind.moves_bounds() {
            self.reclamp();
        }
        Ok(())
    }

    /// Reclamps after `MultiplierRemoved` when the multiplier moved a bound.
    pub fn remove_multiplier(&mut self, id: &MultiplierId) -> Result<AttributeMultiplier> {
        let removed = self.multipliers.remove(id)?;
        self.signals
            .push(AttributeSignal::MultiplierRemoved(removed.id.clone()));
        if removed.kind.moves_bounds() {
            self.reclamp();
        }
        Ok(removed)
    }

    /// Drains queued signals in emission order.
    pub fn take_signals(&mut self) -> Vec<AttributeSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn has_pending_signals(&self) -> bool {
        !self.signals.is_empty()
    }
}
