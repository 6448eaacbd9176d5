//! Conversation command: one turn or an interactive loop over a session.

use podify_config::Config;
use podify_conversation::{Orchestrator, Sender, TurnListener, TurnOutcome, TurnRecord};
use podify_core::PodcastResult;
use std::io::Write;
use tracing::info;
use uuid::Uuid;

use super::build_orchestrator;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session key; turns under the same key share recommender history
    pub session_id: String,
    /// Ignore `session_id` and mint a fresh key
    pub new_session: bool,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let session_id = if input.new_session {
            Uuid::now_v7().to_string()
        } else {
            input.session_id
        };
        info!("Using session: {session_id}");

        let mut orchestrator = build_orchestrator(&config)?.with_listener(ConsoleListener);

        if let Some(msg) = input.message {
            let outcome = orchestrator.handle_turn(&session_id, &msg).await;
            if outcome == TurnOutcome::Failed {
                anyhow::bail!("Turn failed");
            }
        } else {
            run_interactive(&mut orchestrator, &session_id).await?;
        }

        Ok(())
    }
}

/// Prints system and assistant records as the orchestrator appends them,
/// and each new podcast set as soon as the search returns.
struct ConsoleListener;

impl TurnListener for ConsoleListener {
    fn on_record(&self, record: &TurnRecord) {
        match record.sender {
            Sender::User => {}
            Sender::System => println!("{}", record.text),
            Sender::Assistant => println!("\n{}\n", record.text),
        }
    }

    fn on_podcasts(&self, podcasts: &[PodcastResult]) {
        if podcasts.is_empty() {
            println!("No podcasts found.");
            return;
        }
        println!("Podcasts:");
        for (i, podcast) in podcasts.iter().enumerate() {
            match &podcast.web_url {
                Some(url) => println!("  {}. {} <{url}>", i + 1, podcast.title),
                None => println!("  {}. {}", i + 1, podcast.title),
            }
        }
    }
}

async fn run_interactive(orchestrator: &mut Orchestrator, session_id: &str) -> anyhow::Result<()> {
    println!("=== Podcast chat: {session_id} ===");
    println!("Tell me what you're in the mood for. Type 'exit', 'quit', or Ctrl+C to end.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }

        orchestrator.handle_turn(session_id, input).await;
    }

    let exchanges = orchestrator
        .records()
        .iter()
        .filter(|r| r.sender == Sender::Assistant)
        .count();
    println!("\nSession ended. Recommendations given: {exchanges}");
    Ok(())
}
