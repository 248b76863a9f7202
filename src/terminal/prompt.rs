use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;

use super::render::{render_notice, render_prompt};
use crate::view::{Confirmer, Decision, Notice, Notifier, Prompt};

/// Input lines shared by the command loop and the confirmation prompt.
pub type SharedInput<R> = Arc<Mutex<Lines<R>>>;

/// Asks on stdout, reads the answer from the shared input. Anything but an
/// explicit yes declines, including end of input.
pub struct TerminalConfirmer<R> {
    input: SharedInput<R>,
}

impl<R> TerminalConfirmer<R> {
    pub fn new(input: SharedInput<R>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl<R> Confirmer for TerminalConfirmer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn confirm(&self, prompt: &Prompt) -> Decision {
        println!("{}", render_prompt(prompt));
        let mut lines = self.input.lock().await;
        match lines.next_line().await {
            Ok(Some(answer)) if is_yes(&answer) => Decision::Accept,
            _ => Decision::Decline,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", render_notice(&notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn prompt() -> Prompt {
        Prompt {
            title: "Are you sure?".into(),
            text: "You won't be able to revert this!".into(),
            confirm_label: "Yes, delete it!".into(),
        }
    }

    fn confirmer(input: &'static str) -> TerminalConfirmer<BufReader<&'static [u8]>> {
        let lines = BufReader::new(input.as_bytes()).lines();
        TerminalConfirmer::new(Arc::new(Mutex::new(lines)))
    }

    #[tokio::test]
    async fn only_yes_accepts() {
        assert_eq!(confirmer("y\n").confirm(&prompt()).await, Decision::Accept);
        assert_eq!(confirmer(" YES \n").confirm(&prompt()).await, Decision::Accept);
        assert_eq!(confirmer("n\n").confirm(&prompt()).await, Decision::Decline);
        assert_eq!(confirmer("\n").confirm(&prompt()).await, Decision::Decline);
        assert_eq!(confirmer("").confirm(&prompt()).await, Decision::Decline);
    }
}
