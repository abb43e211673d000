use std::time::Duration;

use chrono::Local;
use debug_print::debug_println;
use tokio::{sync::mpsc::Sender, task::JoinHandle, time::sleep};

use crate::log;

/// Interactive mode redraws once a second.
pub const INTERACTIVE_UPDATE_RATE_MS: i64 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineMessage {
    UpdateTime,
}

/// Time left until the next whole second.
pub fn delay_until_next_tick(now_ms: i64) -> Duration {
    let delay = INTERACTIVE_UPDATE_RATE_MS - now_ms.rem_euclid(INTERACTIVE_UPDATE_RATE_MS);
    Duration::from_millis(delay as u64)
}

/// Posts [`EngineMessage::UpdateTime`] on every whole second until cancelled.
#[derive(Default)]
pub struct UpdateTimer {
    handle: Option<JoinHandle<()>>,
}

impl UpdateTimer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Starting a running timer does nothing.
    pub fn start(&mut self, tx: Sender<EngineMessage>) {
        if self.is_running() {
            return;
        }
        println!("{} Started", log::TIMER);
        self.handle = Some(tokio::spawn(async move {
            loop {
                sleep(delay_until_next_tick(Local::now().timestamp_millis())).await;
                debug_println!("{} tick", log::TIMER);
                if tx.send(EngineMessage::UpdateTime).await.is_err() {
                    break;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            println!("{} Cancelled", log::TIMER);
        }
    }
}

impl Drop for UpdateTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
