use crate::mutation::MutationOutcome;
use crate::ui::icons::{CHECK, CROSS, FILE_KEPT, FILE_MOD, SPARKLE};
use crate::workflow::{Phase, RunRecord};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Phases that do work, i.e. every phase except `Complete`.
const WORKING_PHASES: u64 = 7;

/// Terminal UI for a run, rendered via `indicatif` progress bars.
///
/// Two bars are stacked vertically:
/// - Phase bar: spinner naming the current phase, with a phase counter
/// - Target bar: files mutated so far out of the planned targets
pub struct RunUI {
    multi: MultiProgress,
    phase_bar: ProgressBar,
    target_bar: ProgressBar,
    verbose: bool,
}

impl RunUI {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let phase_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} [{pos}/{len}] {msg}")
            .expect("progress bar template is a valid static string");

        let phase_bar = multi.add(ProgressBar::new(WORKING_PHASES));
        phase_bar.set_style(phase_style);
        phase_bar.set_prefix(" Phase");
        phase_bar.enable_steady_tick(Duration::from_millis(100));

        let target_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let target_bar = multi.add(ProgressBar::new(0));
        target_bar.set_style(target_style);
        target_bar.set_prefix(" Files");

        Self {
            multi,
            phase_bar,
            target_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Show the phase about to run. `Mutate` repeats, so only its first step
    /// advances the counter.
    pub fn start_phase(&self, phase: Phase) {
        let position = phase as u64 + 1;
        if position > self.phase_bar.position() {
            self.phase_bar.set_position(position.min(WORKING_PHASES));
        }
        self.phase_bar.set_message(format!(
            "{}: {}",
            style(phase).yellow(),
            phase.description()
        ));
    }

    /// Size the target bar once the plan is known.
    pub fn start_targets(&self, total: usize) {
        self.target_bar.set_length(total as u64);
        self.target_bar.set_position(0);
    }

    pub fn target_started(&self, path: &Path) {
        self.target_bar
            .set_message(format!("{}", style(path.display()).cyan()));
    }

    pub fn target_finished(&self, outcome: &MutationOutcome) {
        self.target_bar.inc(1);
        let line = match (&outcome.error, outcome.content_discarded) {
            (Some(kind), _) => format!(
                "    {} {} {}",
                CROSS,
                style(outcome.path.display()).red(),
                style(format!("({})", kind)).dim()
            ),
            (None, true) => format!(
                "    {} {} {}",
                FILE_KEPT,
                style(outcome.path.display()).yellow(),
                style("(kept original)").dim()
            ),
            (None, false) => format!(
                "    {} {}",
                FILE_MOD,
                style(outcome.path.display()).green()
            ),
        };
        self.print_line(line);
        if self.verbose
            && let Some(detail) = &outcome.detail
        {
            self.print_line(format!("      {}", style(detail).dim()));
        }
    }

    /// Stop both bars and print the closing line.
    pub fn finish(&self, record: &RunRecord) {
        self.target_bar.finish_and_clear();
        match &record.error {
            Some(err) => {
                self.phase_bar
                    .finish_with_message(format!("{} {}", CROSS, style(err).red()));
            }
            None => {
                self.phase_bar.set_position(WORKING_PHASES);
                self.phase_bar
                    .finish_with_message(format!("{} Run complete", CHECK));
                self.print_line(format!(
                    "\n{} Run {} finished\n",
                    SPARKLE,
                    style(record.short_id()).green().bold()
                ));
            }
        }
    }
}
