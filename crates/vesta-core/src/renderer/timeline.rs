// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Submission epochs and their completion watermark.

use std::collections::BTreeSet;

use crate::renderer::api::Epoch;

/// A cloneable handle used to report that the work of an epoch finished.
///
/// Safe to move into GPU completion callbacks running on other threads.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    sender: flume::Sender<Epoch>,
}

impl CompletionSignal {
    /// Reports `epoch` as complete.
    pub fn signal(&self, epoch: Epoch) {
        if self.sender.send(epoch).is_err() {
            log::trace!(
                target: "vesta::device",
                "Completion of epoch {} arrived after the timeline was dropped",
                epoch.0
            );
        }
    }
}

/// Hands out submission epochs and tracks which of them completed.
///
/// Completions may arrive in any order. The watermark only advances over a
/// contiguous run of completed epochs, so epoch `N` is never reported complete
/// while some epoch below it is still in flight.
#[derive(Debug)]
pub struct SubmissionTimeline {
    sender: flume::Sender<Epoch>,
    receiver: flume::Receiver<Epoch>,
    last_submitted: Epoch,
    completed: Epoch,
    early: BTreeSet<Epoch>,
}

impl Default for SubmissionTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionTimeline {
    /// A timeline where nothing has been submitted.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender,
            receiver,
            last_submitted: Epoch::ZERO,
            completed: Epoch::ZERO,
            early: BTreeSet::new(),
        }
    }

    /// A handle for reporting completions from elsewhere.
    pub fn signal(&self) -> CompletionSignal {
        CompletionSignal {
            sender: self.sender.clone(),
        }
    }

    /// The epoch the next submission will carry.
    pub fn peek_next(&self) -> Epoch {
        self.last_submitted.next()
    }

    /// Records a submission and returns its epoch.
    pub fn advance(&mut self) -> Epoch {
        self.last_submitted = self.last_submitted.next();
        self.last_submitted
    }

    /// The most recent submission.
    pub fn last_submitted(&self) -> Epoch {
        self.last_submitted
    }

    /// Every epoch at or below this one is complete.
    pub fn completed(&self) -> Epoch {
        self.completed
    }

    /// `true` when no submitted work is outstanding.
    pub fn is_idle(&self) -> bool {
        self.completed >= self.last_submitted
    }

    /// Drains pending completion signals and advances the watermark.
    pub fn poll(&mut self) -> Epoch {
        for epoch in self.receiver.try_iter() {
            if epoch > self.completed {
                self.early.insert(epoch);
            }
        }
        while let Some(&next) = self.early.first() {
            if next > self.completed.next() {
                break;
            }
            self.early.remove(&next);
            self.completed = self.completed.max(next);
        }
        self.completed
    }

    /// Marks every epoch up to `epoch` complete, as reported by a backend that
    /// tracks its own ordering.
    pub fn complete_through(&mut self, epoch: Epoch) -> Epoch {
        let epoch = epoch.min(self.last_submitted);
        if epoch > self.completed {
            self.completed = epoch;
            self.early.retain(|e| *e > epoch);
        }
        self.poll()
    }

    /// Marks all submitted work complete. Used once the backend is idle.
    pub fn complete_all(&mut self) {
        while self.receiver.try_recv().is_ok() {}
        self.early.clear();
        self.completed = self.last_submitted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_waits_for_gaps() {
        let mut timeline = SubmissionTimeline::new();
        for _ in 0..4 {
            timeline.advance();
        }
        let signal = timeline.signal();

        signal.signal(Epoch(2));
        signal.signal(Epoch(4));
        assert_eq!(timeline.poll(), Epoch::ZERO);

        signal.signal(Epoch(1));
        assert_eq!(timeline.poll(), Epoch(2));

        signal.signal(Epoch(3));
        assert_eq!(timeline.poll(), Epoch(4));
        assert!(timeline.is_idle());
    }

    #[test]
    fn signals_from_other_threads_are_received() {
        let mut timeline = SubmissionTimeline::new();
        let epochs: Vec<_> = (0..8).map(|_| timeline.advance()).collect();

        let handles: Vec<_> = epochs
            .into_iter()
            .rev()
            .map(|epoch| {
                let signal = timeline.signal();
                std::thread::spawn(move || signal.signal(epoch))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(timeline.poll(), Epoch(8));
    }

    #[test]
    fn complete_through_never_passes_last_submission() {
        let mut timeline = SubmissionTimeline::new();
        timeline.advance();
        timeline.advance();
        assert_eq!(timeline.complete_through(Epoch(10)), Epoch(2));
        assert_eq!(timeline.peek_next(), Epoch(3));

        timeline.advance();
        timeline.complete_all();
        assert_eq!(timeline.completed(), Epoch(3));
    }

    #[test]
    fn backend_reports_alone_drive_the_watermark() {
        let mut timeline = SubmissionTimeline::new();
        for _ in 0..3 {
            timeline.advance();
        }

        assert_eq!(timeline.complete_through(Epoch(2)), Epoch(2));
        assert_eq!(timeline.poll(), Epoch(2));
        // An older report never moves the watermark back.
        assert_eq!(timeline.complete_through(Epoch(1)), Epoch(2));
        assert!(!timeline.is_idle());
        assert_eq!(timeline.complete_through(Epoch(3)), Epoch(3));
        assert!(timeline.is_idle());
    }

    #[test]
    fn stale_and_duplicate_signals_are_ignored() {
        let mut timeline = SubmissionTimeline::new();
        timeline.advance();
        timeline.advance();
        let signal = timeline.signal();
        signal.signal(Epoch(1));
        signal.signal(Epoch(1));
        assert_eq!(timeline.poll(), Epoch(1));
        signal.signal(Epoch(1));
        assert_eq!(timeline.poll(), Epoch(1));
    }
}
