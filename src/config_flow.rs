//! Configuration surface of a face: which complication slots can be
//! configured and which provider feeds each of them.
//!
//! A flow starts from the launch payload the host hands over:
//!
//! ```ignore
//! match config_flow::launch(r#"{"watch_face_component": "frank_classic"}"#) {
//!     ConfigOutcome::Continue(mut session) => {
//!         session.bind(ComplicationLocation::Right, "days_to_end", ComplicationKind::ShortText)?;
//!     }
//!     ConfigOutcome::Finished => {}
//! }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    complication::{provider_by_name, ComplicationProvider, SlotId},
    log,
    style::{
        faces::face_by_name, ComplicationKind, ProviderRef, StyleConfig, WatchFaceComplication,
        COMPLICATION_COUNT,
    },
};

/// Key of the launch payload naming the face to configure.
pub const WATCH_FACE_COMPONENT: &str = "watch_face_component";

#[derive(Error, Debug)]
pub enum ConfigFlowError {
    #[error("{0:?} complication is not on this face")]
    NotConfigurable(ComplicationLocation),
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),
    #[error("Provider '{provider}' doesn't serve {kind:?}")]
    NotServed {
        provider: String,
        kind: ComplicationKind,
    },
    #[error("{location:?} complication doesn't support {kind:?}")]
    Unsupported {
        location: ComplicationLocation,
        kind: ComplicationKind,
    },
    #[error("Unknown complication location '{0}'")]
    UnknownLocation(String),
    #[error("Expected location=provider, got '{0}'")]
    BadRequest(String),
}

/// Where a slot sits on the face, as the configuration screen names it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplicationLocation {
    Left,
    Right,
    Bottom,
}

impl ComplicationLocation {
    pub const ALL: [ComplicationLocation; COMPLICATION_COUNT] = [
        ComplicationLocation::Right,
        ComplicationLocation::Bottom,
        ComplicationLocation::Left,
    ];

    pub fn slot(self) -> SlotId {
        match self {
            ComplicationLocation::Right => SlotId::FIRST,
            ComplicationLocation::Bottom => SlotId::SECOND,
            ComplicationLocation::Left => SlotId::THIRD,
        }
    }

    pub fn from_slot(slot: SlotId) -> Option<ComplicationLocation> {
        ComplicationLocation::ALL
            .into_iter()
            .find(|location| location.slot() == slot)
    }

    fn index(self) -> usize {
        match self {
            ComplicationLocation::Right => 0,
            ComplicationLocation::Bottom => 1,
            ComplicationLocation::Left => 2,
        }
    }
}

impl FromStr for ComplicationLocation {
    type Err = ConfigFlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "left" => Ok(ComplicationLocation::Left),
            "right" => Ok(ComplicationLocation::Right),
            "bottom" => Ok(ComplicationLocation::Bottom),
            _ => Err(ConfigFlowError::UnknownLocation(value.to_string())),
        }
    }
}

/// `location=provider`, or `location=none` to empty the slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingRequest {
    pub location: ComplicationLocation,
    pub provider: Option<String>,
}

impl FromStr for BindingRequest {
    type Err = ConfigFlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((location, provider)) = value.split_once('=') else {
            return Err(ConfigFlowError::BadRequest(value.to_string()));
        };
        let provider = provider.trim();
        if provider.is_empty() {
            return Err(ConfigFlowError::BadRequest(value.to_string()));
        }
        Ok(BindingRequest {
            location: location.trim().parse()?,
            provider: (provider != "none").then(|| provider.to_string()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBinding {
    pub provider: ProviderRef,
    pub kind: ComplicationKind,
}

/// Square preview of a slot on a preview of the face `width` pixels wide.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlotPreview {
    pub left: f32,
    pub top: f32,
    pub size: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurableSlot {
    pub location: ComplicationLocation,
    pub slot: SlotId,
    pub supported_types: Vec<ComplicationKind>,
    pub binding: Option<ProviderBinding>,
    pub preview: SlotPreview,
}

pub enum ConfigOutcome {
    Continue(ConfigSession),
    /// Nothing to configure, the flow ends.
    Finished,
}

/// Long text where both the slot and the provider support it, short text
/// otherwise. Providers we don't know are taken to serve long text.
pub fn preferred_kind(slot: &WatchFaceComplication, provider: &str) -> ComplicationKind {
    let provider_serves_long = provider_by_name(provider)
        .map_or(true, |known| known.serves(ComplicationKind::LongText));
    if slot.supports(ComplicationKind::LongText) && provider_serves_long {
        ComplicationKind::LongText
    } else {
        ComplicationKind::ShortText
    }
}

/// Binds each slot with a default provider to it, as [`preferred_kind`].
pub fn default_provider_bindings(
    style: &StyleConfig,
) -> [Option<ProviderBinding>; COMPLICATION_COUNT] {
    [0, 1, 2].map(|index| {
        let slot = &style.complications[index];
        let provider = slot.default_provider.clone()?;
        let kind = preferred_kind(slot, &provider.0);
        Some(ProviderBinding { provider, kind })
    })
}

fn on_face(slot: &WatchFaceComplication) -> bool {
    slot.width_ratio > 0.0 && slot.height_ratio > 0.0
}

/// Starts a configuration flow. A payload that doesn't name a known face is
/// logged and ends the flow.
pub fn launch(payload: &str) -> ConfigOutcome {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(error) => {
            println!("{} Unreadable launch payload: {}", log::ERROR, error);
            return ConfigOutcome::Finished;
        }
    };
    let Some(component) = value.get(WATCH_FACE_COMPONENT) else {
        println!("{} Launch payload has no {}", log::ERROR, WATCH_FACE_COMPONENT);
        return ConfigOutcome::Finished;
    };
    let Some(component) = component.as_str() else {
        println!(
            "{} Expected {} to be a string, got {}",
            log::ERROR,
            WATCH_FACE_COMPONENT,
            component
        );
        return ConfigOutcome::Finished;
    };
    let style = match face_by_name(component) {
        Some(Ok(style)) => style,
        Some(Err(error)) => {
            println!("{} Face {} failed to build: {}", log::ERROR, component, error);
            return ConfigOutcome::Finished;
        }
        None => {
            println!("{} Unknown face {}", log::ERROR, component);
            return ConfigOutcome::Finished;
        }
    };
    println!("{} Configuring {}", log::CONFIG, component);
    ConfigOutcome::Continue(ConfigSession::new(component, style))
}

pub struct ConfigSession {
    component: String,
    style: StyleConfig,
    bindings: [Option<ProviderBinding>; COMPLICATION_COUNT],
}

impl ConfigSession {
    pub fn new(component: &str, style: StyleConfig) -> Self {
        let bindings = default_provider_bindings(&style);
        Self {
            component: component.to_string(),
            style,
            bindings,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Slots that are on the face, for a preview `preview_width` pixels wide.
    pub fn slots(&self, preview_width: f32) -> Vec<ConfigurableSlot> {
        ComplicationLocation::ALL
            .into_iter()
            .filter_map(|location| {
                let index = location.index();
                let slot = &self.style.complications[index];
                if !on_face(slot) {
                    return None;
                }
                let size = slot.width_ratio.min(slot.height_ratio) * preview_width;
                Some(ConfigurableSlot {
                    location,
                    slot: location.slot(),
                    supported_types: slot.supported_types.iter().copied().collect(),
                    binding: self.bindings[index].clone(),
                    preview: SlotPreview {
                        left: slot.x_pos * preview_width - size / 2.0,
                        top: slot.y_pos * preview_width - size / 2.0,
                        size,
                    },
                })
            })
            .collect()
    }

    pub fn bind(
        &mut self,
        location: ComplicationLocation,
        provider: &str,
        kind: ComplicationKind,
    ) -> Result<(), ConfigFlowError> {
        let index = location.index();
        let slot = &self.style.complications[index];
        if !on_face(slot) {
            return Err(ConfigFlowError::NotConfigurable(location));
        }
        if !slot.supports(kind) {
            return Err(ConfigFlowError::Unsupported { location, kind });
        }
        let Some(known) = provider_by_name(provider) else {
            return Err(ConfigFlowError::UnknownProvider(provider.to_string()));
        };
        if !known.serves(kind) {
            return Err(ConfigFlowError::NotServed {
                provider: provider.to_string(),
                kind,
            });
        }
        println!(
            "{} {:?} ({}) <- {} as {:?}",
            log::CONFIG,
            location,
            location.slot(),
            provider,
            kind
        );
        self.bindings[index] = Some(ProviderBinding {
            provider: ProviderRef::new(provider),
            kind,
        });
        Ok(())
    }

    pub fn clear(&mut self, location: ComplicationLocation) {
        println!("{} {:?} ({}) cleared", log::CONFIG, location, location.slot());
        self.bindings[location.index()] = None;
    }

    /// Applies a request, binding with the [`preferred_kind`] for the slot.
    pub fn apply(&mut self, request: &BindingRequest) -> Result<(), ConfigFlowError> {
        let Some(provider) = &request.provider else {
            self.clear(request.location);
            return Ok(());
        };
        let kind = preferred_kind(&self.style.complications[request.location.index()], provider);
        self.bind(request.location, provider, kind)
    }

    pub fn bindings(&self) -> &[Option<ProviderBinding>; COMPLICATION_COUNT] {
        &self.bindings
    }

    /// Instantiates the bound providers, in slot order.
    pub fn providers(&self) -> Vec<(SlotId, ComplicationKind, Box<dyn ComplicationProvider>)> {
        providers_for(&self.bindings)
    }
}

/// Bound providers that are known, with the slot and kind they feed.
pub fn providers_for(
    bindings: &[Option<ProviderBinding>; COMPLICATION_COUNT],
) -> Vec<(SlotId, ComplicationKind, Box<dyn ComplicationProvider>)> {
    bindings
        .iter()
        .enumerate()
        .filter_map(|(index, binding)| {
            let binding = binding.as_ref()?;
            let slot = SlotId::from_index(index)?;
            match provider_by_name(&binding.provider.0) {
                Some(provider) => Some((slot, binding.kind, provider)),
                None => {
                    println!("{} No provider {} for {}", log::WARN, binding.provider, slot);
                    None
                }
            }
        })
        .collect()
}
