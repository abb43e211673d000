//! Host side of the engine: the lifecycle events a watch host delivers, the
//! loop that feeds them to an [`Engine`] and where finished frames go.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use debug_print::debug_println;
use tokio::sync::mpsc::Receiver;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

use crate::{
    assets::AssetStore,
    complication::{ComplicationData, ComplicationProvider, SlotId},
    display::{renderer::FrameReport, surface::FrameBuffer, RenderError},
    log,
    mode::InterruptionFilter,
    style::ComplicationKind,
};

use super::{timer::EngineMessage, Engine, EngineError, TapOutcome, TapType};

/// Lifecycle callbacks of the watch host. Codes are passed through as the
/// host sends them.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Create,
    SurfaceChanged {
        width: u32,
        height: u32,
    },
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged {
        low_bit_ambient: bool,
        burn_in_protection: bool,
    },
    InterruptionFilterChanged(u32),
    Tap {
        kind: u32,
        x: i32,
        y: i32,
        timestamp: i64,
    },
    ComplicationDataUpdate {
        slot: SlotId,
        data: Option<ComplicationData>,
    },
    TimeTick,
    Destroy,
}

impl<A: AssetStore> Engine<A> {
    /// Applies one host event. Returns whether a frame is due.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<bool, EngineError> {
        debug_println!("{} {:?}", log::HOST, event);
        match event {
            HostEvent::Create => {
                self.on_create();
                Ok(false)
            }
            HostEvent::SurfaceChanged { width, height } => {
                self.on_surface_changed(width, height)?;
                Ok(true)
            }
            HostEvent::VisibilityChanged(visible) => {
                self.on_visibility_changed(visible)?;
                Ok(visible)
            }
            HostEvent::AmbientModeChanged(ambient) => self.on_ambient_mode_changed(ambient),
            HostEvent::PropertiesChanged {
                low_bit_ambient,
                burn_in_protection,
            } => self.on_properties_changed(low_bit_ambient, burn_in_protection),
            HostEvent::InterruptionFilterChanged(code) => match InterruptionFilter::from_code(code) {
                Some(filter) => self.on_interruption_filter_changed(filter),
                None => {
                    println!("{} Unknown interruption filter {}", log::WARN, code);
                    Ok(false)
                }
            },
            HostEvent::Tap {
                kind,
                x,
                y,
                timestamp,
            } => {
                let Some(kind) = TapType::from_code(kind) else {
                    println!("{} Unknown tap type {}", log::WARN, kind);
                    return Ok(false);
                };
                if let TapOutcome::Claimed { slot, action } = self.on_tap(kind, x, y)? {
                    println!(
                        "{} {} tapped at {}: {}",
                        log::HOST,
                        slot,
                        timestamp,
                        action.as_deref().unwrap_or("no action")
                    );
                }
                Ok(false)
            }
            HostEvent::ComplicationDataUpdate { slot, data } => {
                self.on_complication_data_update(slot, data)
            }
            HostEvent::TimeTick => self.on_time_tick(),
            HostEvent::Destroy => {
                self.on_destroy();
                Ok(false)
            }
        }
    }
}

/// Where finished frames go.
pub trait FrameSink {
    fn present(&mut self, frame: &FrameBuffer, report: &FrameReport) -> Result<(), RenderError>;
}

/// Writes every frame to `frame_NNNN.png` in a directory.
pub struct PngSink {
    dir: PathBuf,
    count: usize,
}

impl PngSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl FrameSink for PngSink {
    fn present(&mut self, frame: &FrameBuffer, report: &FrameReport) -> Result<(), RenderError> {
        let path = self.dir.join(format!("frame_{:04}.png", self.count));
        frame.save_png(&path)?;
        debug_println!(
            "{} {} ({})",
            log::SCREEN,
            path.display(),
            report.drawn.join(", ")
        );
        self.count += 1;
        Ok(())
    }
}

/// Stands in for the complication providers bound to a face: each poll asks
/// every bound provider for fresh data.
pub struct ProviderFeed {
    providers: Vec<(SlotId, ComplicationKind, Box<dyn ComplicationProvider>)>,
}

impl ProviderFeed {
    pub fn new(providers: Vec<(SlotId, ComplicationKind, Box<dyn ComplicationProvider>)>) -> Self {
        Self { providers }
    }

    pub fn poll(&mut self, now: DateTime<Local>) -> Vec<HostEvent> {
        self.providers
            .iter_mut()
            .map(|(slot, kind, provider)| {
                let data = provider.update(*kind, now);
                if data.is_none() {
                    println!(
                        "{} {} has nothing for {} as {:?}",
                        log::WARN,
                        provider.name(),
                        slot,
                        kind
                    );
                }
                HostEvent::ComplicationDataUpdate { slot: *slot, data }
            })
            .collect()
    }
}

/// Feeds host events and timer messages to `engine` until the host destroys
/// it or hangs up, drawing a frame into `sink` whenever one is due. Returns
/// the number of frames drawn.
pub async fn run<A, S, C>(
    engine: &mut Engine<A>,
    events: Receiver<HostEvent>,
    mut messages: Receiver<EngineMessage>,
    sink: &mut S,
    clock: C,
) -> Result<usize, EngineError>
where
    A: AssetStore,
    S: FrameSink,
    C: Fn() -> DateTime<Local>,
{
    let mut events = ReceiverStream::new(events);
    let mut frames = 0;

    loop {
        let result = tokio::select! {
            event = events.next() => match event {
                Some(HostEvent::Destroy) => {
                    engine.on_destroy();
                    break;
                }
                Some(event) => engine.handle_event(event),
                None => {
                    println!("{} Host went away", log::WARN);
                    engine.on_destroy();
                    break;
                }
            },
            Some(message) = messages.recv() => engine.on_message(message),
        };

        let redraw = match result {
            Ok(redraw) => redraw,
            Err(EngineError::NotCreated) => {
                println!("{} Event before create, ignored", log::WARN);
                false
            }
            Err(error) => return Err(error),
        };

        if redraw && engine.should_draw() {
            let report = engine.draw(clock())?;
            if let Some(frame) = engine.frame() {
                sink.present(frame, &report)?;
            }
            frames += 1;
        }
    }

    println!("{} Drew {} frames", log::HOST, frames);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        assets::MemoryAssetStore,
        complication::ComplicationText,
        config_flow::{default_provider_bindings, providers_for},
        engine::EngineSettings,
        style::faces::frank_classic,
    };

    #[derive(Default)]
    struct Recorder {
        reports: Vec<FrameReport>,
    }

    impl FrameSink for Recorder {
        fn present(&mut self, _frame: &FrameBuffer, report: &FrameReport) -> Result<(), RenderError> {
            self.reports.push(report.clone());
            Ok(())
        }
    }

    fn clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2021, 3, 14, 10, 10, 30).unwrap()
    }

    fn engine() -> (Engine<MemoryAssetStore>, mpsc::Receiver<EngineMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let engine = Engine::new(
            frank_classic().unwrap(),
            MemoryAssetStore::bundled(),
            EngineSettings::default(),
            tx,
        );
        (engine, rx)
    }

    async fn script(events: Vec<HostEvent>) -> mpsc::Receiver<HostEvent> {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.send(event).await.unwrap();
        }
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn draws_on_state_changes() {
        let (mut engine, messages) = engine();
        let events = script(vec![
            HostEvent::TimeTick,
            HostEvent::Create,
            HostEvent::SurfaceChanged {
                width: 200,
                height: 200,
            },
            HostEvent::VisibilityChanged(true),
            HostEvent::AmbientModeChanged(true),
            HostEvent::AmbientModeChanged(true),
            HostEvent::TimeTick,
            HostEvent::Destroy,
        ])
        .await;
        let mut sink = Recorder::default();

        let frames = run(&mut engine, events, messages, &mut sink, clock).await.unwrap();

        // Visible, ambient on, ambient tick.
        assert_eq!(frames, 3);
        assert_eq!(sink.reports.len(), 3);
        assert!(matches!(&engine.state, crate::engine::EngineState::Uninitialized));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_drives_interactive_frames() {
        let (mut engine, messages) = engine();
        let (tx, events) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send(HostEvent::Create).await.unwrap();
            tx.send(HostEvent::SurfaceChanged {
                width: 100,
                height: 100,
            })
            .await
            .unwrap();
            tx.send(HostEvent::VisibilityChanged(true)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(1500)).await;
            tx.send(HostEvent::Destroy).await.unwrap();
        });
        let mut sink = Recorder::default();

        let frames = run(&mut engine, events, messages, &mut sink, clock).await.unwrap();

        assert!(frames >= 2, "only {} frames", frames);
        assert!(!engine.timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_up_destroys_the_engine() {
        let (mut engine, messages) = engine();
        let events = script(vec![HostEvent::Create]).await;
        let mut sink = Recorder::default();

        let frames = run(&mut engine, events, messages, &mut sink, clock).await.unwrap();
        assert_eq!(frames, 0);
        assert!(engine.face().is_err());
    }

    #[tokio::test]
    async fn complication_updates_and_taps() {
        let (mut engine, _messages) = engine();
        engine.handle_event(HostEvent::Create).unwrap();
        assert!(engine
            .handle_event(HostEvent::SurfaceChanged {
                width: 400,
                height: 400,
            })
            .unwrap());

        let data = ComplicationData {
            tap_action: Some("open".to_string()),
            ..ComplicationData::new(ComplicationKind::ShortText)
                .short_text(ComplicationText::plain("9"))
        };
        assert!(engine
            .handle_event(HostEvent::ComplicationDataUpdate {
                slot: SlotId::FIRST,
                data: Some(data),
            })
            .unwrap());
        assert!(!engine
            .handle_event(HostEvent::ComplicationDataUpdate {
                slot: SlotId(42),
                data: None,
            })
            .unwrap());

        let bounds = engine.face().unwrap().geometry.as_ref().unwrap().complication_bounds[0];
        let tap = HostEvent::Tap {
            kind: TapType::Tap as u32,
            x: bounds.left + 1,
            y: bounds.top + 1,
            timestamp: 0,
        };
        assert!(!engine.handle_event(tap).unwrap());
        assert!(!engine
            .handle_event(HostEvent::Tap {
                kind: 9,
                x: 0,
                y: 0,
                timestamp: 0,
            })
            .unwrap());
    }

    #[tokio::test]
    async fn interruption_filter_codes() {
        let (mut engine, _messages) = engine();
        engine.handle_event(HostEvent::Create).unwrap();
        assert!(engine.handle_event(HostEvent::InterruptionFilterChanged(3)).unwrap());
        assert!(engine.face().unwrap().mode.muted);
        assert!(!engine.handle_event(HostEvent::InterruptionFilterChanged(99)).unwrap());
        assert!(engine.face().unwrap().mode.muted);
    }

    #[test]
    fn feed_polls_bound_providers() {
        let mut feed = ProviderFeed::new(providers_for(&default_provider_bindings(
            &frank_classic().unwrap(),
        )));
        let updates = feed.poll(clock());
        assert_eq!(updates.len(), 2);

        let HostEvent::ComplicationDataUpdate { slot, data } = &updates[0] else {
            panic!("expected a complication update");
        };
        assert_eq!(*slot, SlotId::FIRST);
        assert_eq!(data.as_ref().map(|data| data.kind), Some(ComplicationKind::ShortText));

        let HostEvent::ComplicationDataUpdate { slot, data } = &updates[1] else {
            panic!("expected a complication update");
        };
        assert_eq!(*slot, SlotId::SECOND);
        assert_eq!(data.as_ref().map(|data| data.kind), Some(ComplicationKind::LongText));
    }
}
