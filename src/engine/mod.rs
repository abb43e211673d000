//! The watch face engine, driven by host lifecycle events.
//!
//! An [`Engine`] is [`EngineState::Uninitialized`] until the host creates it
//! and again after it is destroyed; every other entry point fails with
//! [`EngineError::NotCreated`] in that state.

pub mod host;
pub mod timer;

use chrono::{DateTime, Local};
use embedded_graphics::prelude::Point;
use enum_primitive::FromPrimitive;
use thiserror::Error;
use tokio::sync::mpsc::Sender;

use crate::{
    assets::AssetStore,
    complication::{ComplicationData, ComplicationSlots, SlotId},
    display::{
        components::FrameContext,
        renderer::{FrameRenderer, FrameReport},
        surface::FrameBuffer,
        RenderError,
    },
    geometry::{AssetSizes, GeometryError, GeometryState, Viewport},
    log,
    mode::{ComplicationAppearance, InterruptionFilter, ModeState},
    style::StyleConfig,
};

use self::timer::{EngineMessage, UpdateTimer};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine has not been created")]
    NotCreated,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Leave complications out of ambient frames.
    pub hide_complications_in_ambient: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            hide_complications_in_ambient: true,
        }
    }
}

enum_from_primitive! {
    /// Host touch event types.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum TapType {
        Touch = 0,
        TouchCancel = 1,
        Tap = 2,
    }
}

impl TapType {
    pub fn from_code(code: u32) -> Option<TapType> {
        TapType::from_u32(code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// A complication took the tap and wants its action run.
    Claimed {
        slot: SlotId,
        action: Option<String>,
    },
    NotClaimed,
}

/// Everything that lives between create and destroy.
pub struct FaceState {
    style: StyleConfig,
    mode: ModeState,
    appearance: ComplicationAppearance,
    complications: ComplicationSlots,
    geometry: Option<GeometryState>,
    renderer: FrameRenderer,
    visible: bool,
}

impl FaceState {
    fn new(style: StyleConfig) -> Self {
        let appearance = ComplicationAppearance::resolve(&style, false);
        Self {
            style,
            mode: ModeState::default(),
            appearance,
            complications: ComplicationSlots::default(),
            geometry: None,
            renderer: FrameRenderer::new(),
            visible: false,
        }
    }
}

pub enum EngineState {
    Uninitialized,
    Ready(Box<FaceState>),
}

pub struct Engine<A: AssetStore> {
    style: StyleConfig,
    assets: A,
    settings: EngineSettings,
    state: EngineState,
    timer: UpdateTimer,
    tx: Sender<EngineMessage>,
}

impl<A: AssetStore> Engine<A> {
    /// `tx` receives the timer's update messages.
    pub fn new(
        style: StyleConfig,
        assets: A,
        settings: EngineSettings,
        tx: Sender<EngineMessage>,
    ) -> Self {
        Self {
            style,
            assets,
            settings,
            state: EngineState::Uninitialized,
            timer: UpdateTimer::new(),
            tx,
        }
    }

    pub fn face(&self) -> Result<&FaceState, EngineError> {
        match &self.state {
            EngineState::Ready(face) => Ok(&**face),
            EngineState::Uninitialized => Err(EngineError::NotCreated),
        }
    }

    fn face_mut(&mut self) -> Result<&mut FaceState, EngineError> {
        match &mut self.state {
            EngineState::Ready(face) => Ok(&mut **face),
            EngineState::Uninitialized => Err(EngineError::NotCreated),
        }
    }

    /// Whether the host should be drawing frames right now.
    pub fn should_draw(&self) -> bool {
        match &self.state {
            EngineState::Ready(face) => face.visible && face.geometry.is_some(),
            EngineState::Uninitialized => false,
        }
    }

    /// The timer runs only while visible and interactive.
    fn update_timer(&mut self) {
        let should_run = match &self.state {
            EngineState::Ready(face) => face.visible && !face.mode.ambient,
            EngineState::Uninitialized => false,
        };
        if should_run {
            self.timer.start(self.tx.clone());
        } else {
            self.timer.cancel();
        }
    }

    pub fn on_create(&mut self) {
        if let EngineState::Ready(_) = self.state {
            println!("{} Created twice, starting over", log::WARN);
        }
        self.state = EngineState::Ready(Box::new(FaceState::new(self.style.clone())));
        println!("{} Engine created", log::HOST);
        self.update_timer();
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        let asset_sizes = {
            let style = &self.face()?.style;
            let size_of = |asset: Option<_>| asset.and_then(|asset| self.assets.image_size(asset));
            AssetSizes {
                hour_hand: size_of(style.hour_hand.drawable),
                minute_hand: size_of(style.minute_hand.drawable),
                background: size_of(style.background_image.image),
            }
        };

        let Engine { assets, state, .. } = self;
        let EngineState::Ready(face) = state else {
            return Err(EngineError::NotCreated);
        };
        let geometry =
            GeometryState::resolve(&face.style, Viewport::new(width, height), asset_sizes)?;
        face.renderer.resize(&face.style, &geometry, &*assets)?;
        println!(
            "{} {}x{}, radius {}, hands {:.0}/{:.0}/{:.0}",
            log::GEOMETRY,
            width,
            height,
            geometry.center_radius,
            geometry.hand_lengths.hour,
            geometry.hand_lengths.minute,
            geometry.hand_lengths.second
        );
        face.geometry = Some(geometry);
        Ok(())
    }

    pub fn on_visibility_changed(&mut self, visible: bool) -> Result<(), EngineError> {
        self.face_mut()?.visible = visible;
        println!("{} visible {}", log::HOST, visible);
        self.update_timer();
        Ok(())
    }

    /// Returns whether the mode changed.
    pub fn on_ambient_mode_changed(&mut self, ambient: bool) -> Result<bool, EngineError> {
        let face = self.face_mut()?;
        let changed = face.mode.set_ambient(ambient);
        if changed {
            face.appearance = ComplicationAppearance::resolve(&face.style, ambient);
        }
        self.update_timer();
        Ok(changed)
    }

    pub fn on_properties_changed(
        &mut self,
        low_bit_ambient: bool,
        burn_in_protection: bool,
    ) -> Result<bool, EngineError> {
        let changed = self
            .face_mut()?
            .mode
            .set_properties(low_bit_ambient, burn_in_protection);
        if changed {
            println!(
                "{} low bit {}, burn in protection {}",
                log::MODE,
                low_bit_ambient,
                burn_in_protection
            );
        }
        Ok(changed)
    }

    pub fn on_interruption_filter_changed(
        &mut self,
        filter: InterruptionFilter,
    ) -> Result<bool, EngineError> {
        Ok(self.face_mut()?.mode.set_interruption_filter(filter))
    }

    /// Only completed taps are handled. Slots are tried in order and the
    /// first one with data under the point claims the tap.
    pub fn on_tap(&mut self, kind: TapType, x: i32, y: i32) -> Result<TapOutcome, EngineError> {
        let face = self.face()?;
        if kind != TapType::Tap {
            return Ok(TapOutcome::NotClaimed);
        }
        let Some(geometry) = &face.geometry else {
            return Ok(TapOutcome::NotClaimed);
        };

        for index in geometry.slots_at(Point::new(x, y)) {
            let (Some(data), Some(slot)) = (face.complications.get(index), SlotId::from_index(index))
            else {
                continue;
            };
            println!("{} Tap on {} claimed", log::COMPLICATION, slot);
            return Ok(TapOutcome::Claimed {
                slot,
                action: data.tap_action.clone(),
            });
        }
        Ok(TapOutcome::NotClaimed)
    }

    /// Returns `false` if the slot isn't one of ours.
    pub fn on_complication_data_update(
        &mut self,
        slot: SlotId,
        data: Option<ComplicationData>,
    ) -> Result<bool, EngineError> {
        Ok(self.face_mut()?.complications.update(slot, data))
    }

    /// Minute tick in ambient mode; the face needs a redraw.
    pub fn on_time_tick(&mut self) -> Result<bool, EngineError> {
        let face = self.face()?;
        Ok(face.mode.ambient)
    }

    /// Returns whether a frame is due.
    pub fn on_message(&mut self, message: EngineMessage) -> Result<bool, EngineError> {
        match message {
            EngineMessage::UpdateTime => {
                let face = self.face()?;
                Ok(face.visible && !face.mode.ambient)
            }
        }
    }

    pub fn draw(&mut self, now: DateTime<Local>) -> Result<FrameReport, EngineError> {
        let Engine {
            assets,
            settings,
            state,
            ..
        } = self;
        let EngineState::Ready(face) = state else {
            return Err(EngineError::NotCreated);
        };
        let geometry = face.geometry.as_ref().ok_or(RenderError::NoSurface)?;
        let frame = FrameContext {
            style: &face.style,
            geometry,
            mode: &face.mode,
            appearance: &face.appearance,
            assets: &*assets,
            complications: &face.complications,
            now,
            hide_complications_in_ambient: settings.hide_complications_in_ambient,
        };
        Ok(face.renderer.render(&frame)?)
    }

    /// Last frame drawn.
    pub fn frame(&self) -> Option<&FrameBuffer> {
        self.face().ok().and_then(|face| face.renderer.frame())
    }

    pub fn on_destroy(&mut self) {
        self.timer.cancel();
        self.state = EngineState::Uninitialized;
        println!("{} Engine destroyed", log::HOST);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        assets::MemoryAssetStore,
        complication::ComplicationText,
        style::{builder::analog_watch_face_style, faces, ComplicationKind},
    };

    fn style() -> StyleConfig {
        analog_watch_face_style(|face| {
            face.colors(|_| {});
            face.dimensions(|_| {});
            face.complication1(|slot| {
                slot.width_ratio = 0.25;
                slot.height_ratio = 0.25;
                slot.x_pos = 0.75;
                slot.y_pos = 0.5;
            });
            face.complication2(|slot| {
                slot.width_ratio = 0.25;
                slot.height_ratio = 0.25;
                slot.x_pos = 0.5;
                slot.y_pos = 0.75;
            });
        })
        .unwrap()
    }

    fn engine() -> (Engine<MemoryAssetStore>, mpsc::Receiver<EngineMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let engine = Engine::new(style(), MemoryAssetStore::new(), EngineSettings::default(), tx);
        (engine, rx)
    }

    fn short_text(text: &str) -> ComplicationData {
        ComplicationData::new(ComplicationKind::ShortText).short_text(ComplicationText::plain(text))
    }

    #[tokio::test]
    async fn entry_points_need_create() {
        let (mut engine, _rx) = engine();
        assert!(matches!(engine.on_surface_changed(400, 400), Err(EngineError::NotCreated)));
        assert!(matches!(engine.on_visibility_changed(true), Err(EngineError::NotCreated)));
        assert!(matches!(engine.on_ambient_mode_changed(true), Err(EngineError::NotCreated)));
        assert!(matches!(engine.on_tap(TapType::Tap, 1, 1), Err(EngineError::NotCreated)));
        assert!(matches!(engine.draw(Local::now()), Err(EngineError::NotCreated)));
        assert!(!engine.should_draw());
        assert!(engine.frame().is_none());
    }

    #[tokio::test]
    async fn draws_after_surface_is_known() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        assert!(matches!(
            engine.draw(Local::now()),
            Err(EngineError::Render(RenderError::NoSurface))
        ));

        engine.on_surface_changed(400, 400).unwrap();
        engine.on_visibility_changed(true).unwrap();
        assert!(engine.should_draw());
        let report = engine.draw(Local::now()).unwrap();
        assert_eq!(report.drawn, vec!["background", "clock face"]);
        assert!(engine.frame().is_some());

        let geometry = engine.face().unwrap().geometry.as_ref().unwrap();
        assert_eq!(geometry.complication_bounds[0].left, 250);
    }

    #[tokio::test]
    async fn timer_runs_only_when_visible_and_interactive() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        assert!(!engine.timer.is_running());

        engine.on_visibility_changed(true).unwrap();
        assert!(engine.timer.is_running());

        assert!(engine.on_ambient_mode_changed(true).unwrap());
        assert!(!engine.timer.is_running());
        assert!(!engine.on_ambient_mode_changed(true).unwrap());

        assert!(engine.on_ambient_mode_changed(false).unwrap());
        assert!(engine.timer.is_running());

        engine.on_visibility_changed(false).unwrap();
        assert!(!engine.timer.is_running());

        engine.on_visibility_changed(true).unwrap();
        engine.on_destroy();
        assert!(!engine.timer.is_running());
        assert!(matches!(&engine.state, EngineState::Uninitialized));
    }

    #[tokio::test]
    async fn ambient_swaps_complication_appearance() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        engine.on_ambient_mode_changed(true).unwrap();
        let face = engine.face().unwrap();
        assert_eq!(face.appearance, ComplicationAppearance::resolve(&face.style, true));
        assert!(face.mode.ambient);
    }

    #[tokio::test]
    async fn time_tick_redraws_only_in_ambient() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        assert!(!engine.on_time_tick().unwrap());
        engine.on_ambient_mode_changed(true).unwrap();
        assert!(engine.on_time_tick().unwrap());
    }

    #[tokio::test]
    async fn update_messages_redraw_when_interactive() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        assert!(!engine.on_message(EngineMessage::UpdateTime).unwrap());
        engine.on_visibility_changed(true).unwrap();
        assert!(engine.on_message(EngineMessage::UpdateTime).unwrap());
    }

    #[tokio::test]
    async fn mute_follows_interruption_filter() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        assert!(engine.on_interruption_filter_changed(InterruptionFilter::None).unwrap());
        assert!(engine.face().unwrap().mode.muted);
        assert!(!engine.on_interruption_filter_changed(InterruptionFilter::None).unwrap());
        assert!(engine.on_interruption_filter_changed(InterruptionFilter::All).unwrap());
        assert!(engine.on_properties_changed(true, false).unwrap());
        assert!(!engine.on_properties_changed(true, false).unwrap());
    }

    #[tokio::test]
    async fn taps_are_claimed_by_slots_with_data() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        engine.on_surface_changed(400, 400).unwrap();

        // Slot 101 spans (250, 150) to (350, 250).
        assert_eq!(engine.on_tap(TapType::Tap, 300, 200).unwrap(), TapOutcome::NotClaimed);

        engine
            .on_complication_data_update(SlotId::FIRST, Some(ComplicationData {
                tap_action: Some("open".to_string()),
                ..short_text("1")
            }))
            .unwrap();
        assert_eq!(
            engine.on_tap(TapType::Tap, 300, 200).unwrap(),
            TapOutcome::Claimed {
                slot: SlotId::FIRST,
                action: Some("open".to_string()),
            }
        );
        assert_eq!(engine.on_tap(TapType::Touch, 300, 200).unwrap(), TapOutcome::NotClaimed);
        assert_eq!(engine.on_tap(TapType::Tap, 10, 10).unwrap(), TapOutcome::NotClaimed);

        engine
            .on_complication_data_update(SlotId::SECOND, Some(short_text("2")))
            .unwrap();
        assert_eq!(
            engine.on_tap(TapType::Tap, 200, 300).unwrap(),
            TapOutcome::Claimed {
                slot: SlotId::SECOND,
                action: None,
            }
        );
    }

    #[tokio::test]
    async fn unknown_slot_updates_are_ignored() {
        let (mut engine, _rx) = engine();
        engine.on_create();
        assert!(!engine.on_complication_data_update(SlotId(7), Some(short_text("x"))).unwrap());
        assert!(engine.on_complication_data_update(SlotId::THIRD, None).unwrap());
    }

    #[tokio::test]
    async fn bundled_face_renders() {
        let (tx, _rx) = mpsc::channel(8);
        let mut engine = Engine::new(
            faces::frank_classic().unwrap(),
            MemoryAssetStore::bundled(),
            EngineSettings::default(),
            tx,
        );
        engine.on_create();
        engine.on_surface_changed(320, 320).unwrap();
        let geometry = engine.face().unwrap().geometry.as_ref().unwrap();
        assert!(geometry.hour_hand_bitmap.is_some());
        assert_eq!(geometry.background_size.map(|size| size.width), Some(320));
        engine.draw(Local::now()).unwrap();
    }

    #[test]
    fn tap_type_codes() {
        assert_eq!(TapType::from_code(2), Some(TapType::Tap));
        assert_eq!(TapType::from_code(0), Some(TapType::Touch));
        assert_eq!(TapType::from_code(3), None);
    }
}
