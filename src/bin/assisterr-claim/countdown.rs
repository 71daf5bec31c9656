//! Live countdown between cycles

use std::time::Duration;

use assisterr_claim::scheduler::{format_next_run, format_remaining};
use assisterr_claim::CountdownDisplay;
use chrono::{DateTime, Local};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner line showing the next run time and the time left.
/// Cleared from the terminal when the wait ends.
#[derive(Default)]
pub struct SpinnerCountdown {
    bar: Option<ProgressBar>,
}

impl SpinnerCountdown {
    fn bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            let template = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}");
            if let Ok(style) = template {
                pb.set_style(style);
            }
            pb
        })
    }
}

impl CountdownDisplay for SpinnerCountdown {
    fn tick(&mut self, next_run: DateTime<Local>, remaining: Duration) {
        let message = format!(
            "Next Run : {} | Time Remaining : {}",
            style(format_next_run(&next_run)).cyan(),
            style(format_remaining(remaining)).yellow()
        );
        let bar = self.bar();
        bar.set_message(message);
        bar.tick();
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
