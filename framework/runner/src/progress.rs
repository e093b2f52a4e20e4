use crate::driver::UserCompletion;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints one line per finished user, above a progress bar when one is being shown.
pub(crate) struct CompletionProgress {
    bar: Option<ProgressBar>,
}

impl CompletionProgress {
    pub(crate) fn new(total_users: usize, no_progress: bool) -> Self {
        if no_progress {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total_users as u64);
        match ProgressStyle::with_template(
            "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} users [{elapsed_precise}]",
        ) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => log::warn!("Failed to set progress style: {e:?}"),
        }

        // A hidden bar swallows `println`, so fall back to plain output when not on a terminal
        Self {
            bar: (!bar.is_hidden()).then_some(bar),
        }
    }

    pub(crate) fn report(&self, completion: &UserCompletion) {
        let line = completion_line(completion);

        match &self.bar {
            Some(bar) => {
                bar.println(line);
                bar.inc(1);
            }
            None => println!("{line}"),
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// The line printed when a user's scenario ends.
pub fn completion_line(completion: &UserCompletion) -> String {
    match completion {
        UserCompletion::Completed { user_id, requests } => {
            format!("User {user_id} completed {requests} requests")
        }
        UserCompletion::Failed { user_id, reason } => {
            format!("Error with user {user_id}: {reason}")
        }
    }
}
