use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Visual progress monitor for a running task graph
///
/// One overall bar plus a spinner per in-flight task. In streaming mode the
/// total grows as tasks arrive.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    task_bars: HashMap<u32, ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self::hidden();
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );
        overall.set_message("Starting...");

        Self {
            multi,
            overall,
            task_bars: HashMap::new(),
            enabled: true,
        }
    }

    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            overall: ProgressBar::hidden(),
            task_bars: HashMap::new(),
            enabled: false,
        }
    }

    /// Grow the total when a streamed task arrives.
    pub fn add_total(&self, n: u64) {
        if self.enabled {
            self.overall.inc_length(n);
        }
    }

    pub fn start_task(&mut self, idx: u32, action: &str) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.set_message(format!("⏳ {}. {}", idx, action));
        bar.enable_steady_tick(Duration::from_millis(100));

        self.task_bars.insert(idx, bar);
    }

    pub fn complete_task(&mut self, idx: u32, success: bool, duration_ms: u64) {
        if !self.enabled {
            return;
        }

        if let Some(bar) = self.task_bars.remove(&idx) {
            let icon = if success { "✅" } else { "❌" };
            bar.finish_with_message(format!("{} task {} ({}ms)", icon, idx, duration_ms));
        }
        self.overall.inc(1);
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }

        let msg = if success {
            "✅ All tasks resolved"
        } else {
            "❌ Execution failed"
        };
        self.overall.finish_with_message(msg);
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_monitor_disabled() {
        let mut monitor = ProgressMonitor::new(3, false);
        monitor.start_task(1, "search(\"x\")");
        monitor.complete_task(1, true, 100);
        monitor.add_total(1);
        monitor.finish(true);
    }

    #[test]
    fn test_progress_monitor_enabled() {
        let mut monitor = ProgressMonitor::new(2, true);
        monitor.start_task(1, "search(\"a\")");
        monitor.start_task(2, "search(\"b\")");
        monitor.complete_task(1, true, 100);
        monitor.complete_task(2, false, 200);
        monitor.add_total(1);
        monitor.finish(false);
    }
}
