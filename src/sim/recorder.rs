// Voice recording state: elapsed seconds plus the two timers that drive it.

use super::schedule::TaskHandle;
use crate::models::ChatId;

/// Formats elapsed seconds as `0:SS`. The one minute limit reads `0:60`.
pub fn duration_label(seconds: u32) -> String {
    format!("0:{:02}", seconds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRecording {
    pub chat: ChatId,
    pub tick: TaskHandle,
    pub limit: TaskHandle,
}

/// What a recording left behind once stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedRecording {
    pub chat: ChatId,
    pub seconds: u32,
    pub tick: TaskHandle,
    pub limit: TaskHandle,
}

#[derive(Debug, Default)]
pub struct VoiceRecorder {
    active: Option<ActiveRecording>,
    elapsed_seconds: u32,
    frozen: bool,
}

impl VoiceRecorder {
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn start(&mut self, recording: ActiveRecording) {
        self.active = Some(recording);
        self.elapsed_seconds = 0;
        self.frozen = false;
    }

    /// One tick of the recording clock. Ticks arriving while idle or frozen
    /// are dropped.
    pub fn tick(&mut self) {
        if self.active.is_some() && !self.frozen {
            self.elapsed_seconds += 1;
        }
    }

    /// Stops the clock but keeps the recording open. Returns the tick timer
    /// to cancel, or `None` when idle or already frozen.
    pub fn freeze(&mut self) -> Option<TaskHandle> {
        if self.frozen {
            return None;
        }
        let tick = self.active.as_ref()?.tick;
        self.frozen = true;
        Some(tick)
    }

    /// Ends the recording and resets the counter. `None` when idle.
    pub fn finish(&mut self) -> Option<FinishedRecording> {
        let active = self.active.take()?;
        self.frozen = false;
        let seconds = std::mem::take(&mut self.elapsed_seconds);
        Some(FinishedRecording {
            chat: active.chat,
            seconds,
            tick: active.tick,
            limit: active.limit,
        })
    }
}
