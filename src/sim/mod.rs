//! Interaction simulator
//!
//! Fakes the asynchronous side of a chat: delivery receipts for every
//! outgoing message, a typing indicator followed by an autoresponse after
//! text sends, and the voice recording clock. All of it is a [`Schedule`]
//! of effects read against a virtual millisecond clock, so nothing here
//! sleeps or spawns.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{ChatId, DeliveryStatus, MessageId};

pub mod recorder;
pub mod schedule;

pub use recorder::{duration_label, FinishedRecording, VoiceRecorder};
pub use schedule::{Millis, Schedule, TaskHandle};

use recorder::ActiveRecording;

/// Delays of every simulated effect, measured from the action that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTimings {
    pub sent_after_ms: Millis,
    pub delivered_after_ms: Millis,
    pub read_after_ms: Millis,
    pub typing_after_ms: Millis,
    pub reply_after_ms: Millis,
    pub recording_tick_ms: Millis,
    pub recording_limit_ms: Millis,
}

impl Default for SimTimings {
    fn default() -> Self {
        SimTimings {
            sent_after_ms: 500,
            delivered_after_ms: 1500,
            read_after_ms: 3000,
            typing_after_ms: 4000,
            reply_after_ms: 6000,
            recording_tick_ms: 1000,
            recording_limit_ms: 60_000,
        }
    }
}

impl SimTimings {
    /// Receipt schedule of an outgoing message as `(delay, status)` pairs.
    pub fn status_plan(&self) -> [(Millis, DeliveryStatus); 3] {
        [
            (self.sent_after_ms, DeliveryStatus::Sent),
            (self.delivered_after_ms, DeliveryStatus::Delivered),
            (self.read_after_ms, DeliveryStatus::Read),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AdvanceStatus {
        chat: ChatId,
        message: MessageId,
        status: DeliveryStatus,
    },
    TypingStarted {
        chat: ChatId,
    },
    Autoreply {
        chat: ChatId,
    },
    RecordingTick,
    RecordingLimit,
}

pub struct InteractionSimulator {
    timings: SimTimings,
    now: Millis,
    schedule: Schedule<Effect>,
    status_tasks: HashMap<(ChatId, MessageId), Vec<TaskHandle>>,
    typing: HashSet<ChatId>,
    recorder: VoiceRecorder,
}

impl InteractionSimulator {
    pub fn new(timings: SimTimings) -> Self {
        InteractionSimulator {
            timings,
            now: 0,
            schedule: Schedule::new(),
            status_tasks: HashMap::new(),
            typing: HashSet::new(),
            recorder: VoiceRecorder::default(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    /// Arms the receipt timers for a freshly appended outgoing message.
    /// Each delay counts from now, not from the previous receipt.
    pub fn track_outgoing(&mut self, chat: ChatId, message: MessageId) {
        let handles = self
            .timings
            .status_plan()
            .iter()
            .map(|&(delay, status)| {
                self.schedule.schedule_once(
                    self.now + delay,
                    Effect::AdvanceStatus {
                        chat,
                        message,
                        status,
                    },
                )
            })
            .collect();
        self.status_tasks.insert((chat, message), handles);
    }

    /// Cancels whatever receipts are still pending for a message.
    pub fn forget_message(&mut self, chat: ChatId, message: MessageId) -> usize {
        let handles = self.status_tasks.remove(&(chat, message)).unwrap_or_default();
        let cancelled = handles
            .into_iter()
            .filter(|handle| self.schedule.cancel(*handle))
            .count();
        debug!("Cancelled {} pending receipts for message {} in {}", cancelled, message, chat);
        cancelled
    }

    pub fn schedule_autoreply(&mut self, chat: ChatId) {
        self.schedule
            .schedule_once(self.now + self.timings.typing_after_ms, Effect::TypingStarted { chat });
        self.schedule
            .schedule_once(self.now + self.timings.reply_after_ms, Effect::Autoreply { chat });
    }

    pub fn is_typing(&self, chat: ChatId) -> bool {
        self.typing.contains(&chat)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recording_elapsed_seconds(&self) -> u32 {
        self.recorder.elapsed_seconds()
    }

    /// Starts the recording clock. Returns false if already recording.
    pub fn start_recording(&mut self, chat: ChatId) -> bool {
        if self.recorder.is_recording() {
            return false;
        }
        let tick = self.schedule.schedule_repeating(
            self.now + self.timings.recording_tick_ms,
            self.timings.recording_tick_ms,
            Effect::RecordingTick,
        );
        let limit = self
            .schedule
            .schedule_once(self.now + self.timings.recording_limit_ms, Effect::RecordingLimit);
        self.recorder.start(ActiveRecording { chat, tick, limit });
        true
    }

    /// Ends the recording and cancels whatever of its timers is still armed.
    pub fn stop_recording(&mut self) -> Option<FinishedRecording> {
        let finished = self.recorder.finish()?;
        self.schedule.cancel(finished.tick);
        self.schedule.cancel(finished.limit);
        Some(finished)
    }

    /// Pops the next effect due at or before `until` and moves the clock to
    /// its due time. Simulator-local bookkeeping (typing flag, recording
    /// counter, receipt handles) is applied before the effect is returned;
    /// the caller applies the rest to the conversation store.
    pub fn pop_due(&mut self, until: Millis) -> Option<Effect> {
        let (due, handle, effect) = self.schedule.pop_due(until)?;
        self.now = self.now.max(due);

        match &effect {
            Effect::AdvanceStatus { chat, message, .. } => {
                let key = (*chat, *message);
                if let Some(handles) = self.status_tasks.get_mut(&key) {
                    handles.retain(|h| *h != handle);
                    if handles.is_empty() {
                        self.status_tasks.remove(&key);
                    }
                }
            }
            Effect::TypingStarted { chat } => {
                self.typing.insert(*chat);
            }
            Effect::Autoreply { chat } => {
                self.typing.remove(chat);
            }
            Effect::RecordingTick => self.recorder.tick(),
            Effect::RecordingLimit => {
                if let Some(tick) = self.recorder.freeze() {
                    self.schedule.cancel(tick);
                }
            }
        }

        debug!("t={}ms fired {:?}", self.now, effect);
        Some(effect)
    }

    /// Moves the clock forward without firing anything. Callers drain
    /// [`pop_due`](Self::pop_due) first.
    pub fn settle(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }
}
