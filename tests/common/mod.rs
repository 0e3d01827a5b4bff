#![allow(dead_code)]

use taskdag::clock::mock::ManualClock;
use taskdag::dag::TaskScheduler;
use taskdag::task::Task;
use taskdag_test_utils::epoch;

/// Scheduler on a manual clock pinned at [`epoch`], plus the clock handle.
pub fn scheduler_at_epoch() -> (TaskScheduler, ManualClock) {
    let clock = ManualClock::new(epoch());
    (TaskScheduler::new().with_clock(clock.clone()), clock)
}

pub fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id().to_string()).collect()
}
