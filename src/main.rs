#[macro_use]
extern crate enum_primitive;

mod assets;
mod complication;
mod config_flow;
mod display;
mod engine;
mod geometry;
mod log;
mod mode;
mod style;

use std::{env, fs, path::PathBuf, time::Duration};

use chrono::Local;
use serde_json::{Map, Value};
use tokio::{
    sync::mpsc::{self, Sender},
    time::sleep,
};

use assets::MemoryAssetStore;
use complication::SlotId;
use config_flow::{BindingRequest, ComplicationLocation, ConfigOutcome, ConfigSession};
use engine::{
    host::{self, HostEvent, PngSink, ProviderFeed},
    timer::EngineMessage,
    Engine, EngineSettings, TapType,
};
use mode::InterruptionFilter;
use style::{document::style_from_json, faces, StyleConfig};

const WIDTH: u32 = 400;
const HEIGHT: u32 = 400;

/// Face name or path to a face JSON document.
fn load_face(face: &str) -> Result<ConfigSession, Box<dyn std::error::Error>> {
    if faces::face_by_name(face).is_some() {
        let mut payload = Map::new();
        payload.insert(
            config_flow::WATCH_FACE_COMPONENT.to_string(),
            Value::String(face.to_string()),
        );
        return match config_flow::launch(&Value::Object(payload).to_string()) {
            ConfigOutcome::Continue(session) => Ok(session),
            ConfigOutcome::Finished => Err(format!("Face {} can't be configured", face).into()),
        };
    }
    let (name, style) = style_from_json(&fs::read_to_string(face)?)?;
    Ok(ConfigSession::new(name.as_deref().unwrap_or(face), style))
}

/// Plays a short session: interactive for a few seconds, a dip into ambient,
/// a spell of do not disturb, a tap on the first complication and teardown.
async fn host_script(tx: Sender<HostEvent>, style: StyleConfig, mut feed: ProviderFeed) {
    let slot = &style.complications[0];
    let tap_x = (slot.x_pos * WIDTH as f32) as i32;
    let tap_y = (slot.y_pos * HEIGHT as f32) as i32;

    let mut events = vec![
        HostEvent::Create,
        HostEvent::SurfaceChanged {
            width: WIDTH,
            height: HEIGHT,
        },
        HostEvent::PropertiesChanged {
            low_bit_ambient: false,
            burn_in_protection: false,
        },
    ];
    events.extend(feed.poll(Local::now()));
    events.push(HostEvent::VisibilityChanged(true));
    for event in events {
        if tx.send(event).await.is_err() {
            return;
        }
    }

    sleep(Duration::from_secs(3)).await;
    let ambient = [
        HostEvent::AmbientModeChanged(true),
        HostEvent::TimeTick,
        HostEvent::AmbientModeChanged(false),
    ];
    for event in ambient {
        if tx.send(event).await.is_err() {
            return;
        }
    }

    sleep(Duration::from_secs(1)).await;
    if tx
        .send(HostEvent::InterruptionFilterChanged(InterruptionFilter::None as u32))
        .await
        .is_err()
    {
        return;
    }

    sleep(Duration::from_secs(2)).await;
    let mut events = vec![HostEvent::InterruptionFilterChanged(InterruptionFilter::All as u32)];
    events.extend(feed.poll(Local::now()));
    events.push(HostEvent::Tap {
        kind: TapType::Tap as u32,
        x: tap_x,
        y: tap_y,
        timestamp: Local::now().timestamp_millis(),
    });
    events.push(HostEvent::VisibilityChanged(false));
    events.push(HostEvent::Destroy);
    for event in events {
        if tx.send(event).await.is_err() {
            return;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `location=provider` arguments rebind slots, the rest are positional.
    let (requests, positional): (Vec<String>, Vec<String>) =
        env::args().skip(1).partition(|arg| arg.contains('='));
    let mut args = positional.into_iter();
    let face = args.next().unwrap_or_else(|| faces::FRANK_CLASSIC.to_string());
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "frames".to_string()));
    let asset_dir = args.next().map(PathBuf::from);

    let mut session = load_face(&face)?;
    for request in &requests {
        session.apply(&request.parse::<BindingRequest>()?)?;
    }
    for (index, binding) in session.bindings().iter().enumerate() {
        let (Some(binding), Some(slot)) = (binding, SlotId::from_index(index)) else {
            continue;
        };
        if let Some(location) = ComplicationLocation::from_slot(slot) {
            println!(
                "{} {:?} ({}) fed by {} as {:?}",
                log::CONFIG,
                location,
                slot,
                binding.provider,
                binding.kind
            );
        }
    }
    println!(
        "{} {} with {} configurable complications",
        log::STYLE,
        session.component(),
        session.slots(WIDTH as f32).len()
    );

    let mut assets = MemoryAssetStore::bundled();
    if let Some(dir) = asset_dir {
        assets.load_dir(&dir)?;
    }

    fs::create_dir_all(&out_dir)?;
    let mut sink = PngSink::new(&out_dir);

    let (message_tx, message_rx) = mpsc::channel::<EngineMessage>(16);
    let (event_tx, event_rx) = mpsc::channel::<HostEvent>(64);

    let style = session.style().clone();
    let feed = ProviderFeed::new(session.providers());
    let mut engine = Engine::new(style.clone(), assets, EngineSettings::default(), message_tx);

    tokio::spawn(host_script(event_tx, style, feed));

    host::run(&mut engine, event_rx, message_rx, &mut sink, Local::now).await?;
    println!("{} {} frames in {}", log::SCREEN, sink.count(), out_dir.display());

    Ok(())
}
