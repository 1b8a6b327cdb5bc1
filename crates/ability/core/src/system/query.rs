//! Read-only HUD snapshots.

use super::AbilitySystem;
use crate::class::{AttributeClass, EffectClass};
use crate::effect::{Color, EffectId, EffectState};
use crate::timer::TimerService;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeData {
    pub class: AttributeClass,
    pub display_name: String,
    pub value: f32,
    pub max_value: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectData {
    pub id: EffectId,
    pub class: EffectClass,
    pub display_name: String,
    pub displayable: bool,
    pub icon: Option<String>,
    pub color: Color,
}

impl<T: TimerService> AbilitySystem<T> {
    /// One entry per attribute, values as read (multipliers applied).
    pub fn attribute_data(&self) -> Vec<AttributeData> {
        self.attributes
            .iter()
            .map(|attribute| AttributeData {
                class: attribute.class().clone(),
                display_name: attribute.display_name().to_owned(),
                value: attribute.current_value(),
                max_value: attribute.max_value(),
            })
            .collect()
    }

    /// One entry per working effect, in creation order.
    pub fn effect_data(&self) -> Vec<EffectData> {
        self.effects
            .iter()
            .filter(|effect| effect.state() == EffectState::Working)
            .map(|effect| EffectData {
                id: effect.id(),
                class: effect.class().clone(),
                display_name: effect.display_name().to_owned(),
                displayable: effect.is_displayable(),
                icon: effect.icon().map(str::to_owned),
                color: effect.color(),
            })
            .collect()
    }
}
