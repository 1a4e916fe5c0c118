use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::{Level, OutputFormat, emit, get_output_format};

pub fn create_spinner(message: String) -> ProgressBar {
    // Spinner frames would corrupt line-delimited JSON output
    if matches!(get_output_format(), OutputFormat::Json) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠉⠙⠚⠒⠂⠂⠒⠲⠴⠤⠄⠄⠤⠠⠠⠤⠦⠖⠒⠐⠐⠒⠓⠋ ");
    pb.set_style(style);
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Emit a message without tearing the spinner line.
pub fn emit_above(pb: &ProgressBar, level: Level, code: &str, message: &str) {
    pb.suspend(|| emit(level, code, message, None));
}

/// Finish a spinner and print a success message with a checkmark
/// This clears the spinner line entirely and prints a clean message
pub fn finish_spinner_with_success(pb: ProgressBar, message: impl Into<String>) {
    pb.finish_and_clear();
    emit(
        Level::Success,
        "progress.done",
        &format!("✓ {}", message.into()),
        None,
    );
}
