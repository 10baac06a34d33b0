//! Spinner that follows the running pipeline stage

use bookshop_core::{Stage, StageObserver, StageResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new(format: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(format!("Building {}...", format));
        Self { bar }
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }

    /// Observer handle sharing this spinner's bar
    pub fn observer(&self) -> SpinnerObserver {
        SpinnerObserver {
            bar: self.bar.clone(),
        }
    }
}

pub struct SpinnerObserver {
    bar: ProgressBar,
}

impl StageObserver for SpinnerObserver {
    fn stage_started(&self, stage: Stage) {
        self.bar.set_message(format!("{}...", stage));
    }

    fn stage_finished(&self, stage: Stage, result: &StageResult) {
        if let StageResult::Success { warnings, .. } = result {
            for warning in warnings {
                self.bar.println(format!("warning: {}: {}", stage, warning));
            }
        }
    }
}
