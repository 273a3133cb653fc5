use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use llm_pipeline_runner::{
    CaptionEngine, ChatEngine, Config, Pipeline, RetrievalEngine, RetrievalStore, SessionStore,
    SourceRef, SpeechEngine, StoryNarrator,
};

const HISTORIAN_TEMPLATE: &str = "You're a very knowledgeable historian who provides accurate \
and eloquent answers to historical questions.\n{question}";

const ASSISTANT_TEMPLATE: &str = "You are a helpful AI Assistant that makes stories by \
completing the query provided by the user\n{query}\n";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat with the historian assistant
    Chat,
    /// One-shot story completion for a prompt
    Complete {
        /// Prompt to complete
        #[arg(default_value = "Once upon a time")]
        prompt: String,
    },
    /// Turn an image into a narrated audio story
    Narrate {
        /// Path to the input image (JPEG)
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Add sources to the retrieval service and ask questions about them
    Ask,
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

async fn run_chat(config: &Config) -> Result<()> {
    let capability = Arc::new(ChatEngine::new(config.chat.clone()));

    let mut sessions = SessionStore::new();
    let session_id = sessions.create();
    let pipeline = Pipeline::bind(HISTORIAN_TEMPLATE, ["question"], capability)?;
    sessions.bind(&session_id, pipeline);

    println!("Chat started (session {}). Empty message ends the chat.", session_id);

    loop {
        let message = read_line("\nYou: ")?;
        if message.is_empty() {
            break;
        }

        let pipeline = sessions
            .get(&session_id)
            .expect("active session has a bound pipeline");

        let mut values = HashMap::new();
        values.insert("question".to_string(), message);

        match pipeline.run(&values).await {
            Ok(reply) => println!("\nAssistant: {}", reply),
            Err(e) => println!("Error: {}", e),
        }
    }

    sessions.end(&session_id);
    println!("Chat ended.");
    Ok(())
}

async fn run_complete(config: &Config, prompt: &str) -> Result<()> {
    let capability = Arc::new(ChatEngine::new(config.chat.clone()));
    let pipeline = Pipeline::bind(ASSISTANT_TEMPLATE, ["query"], capability)?;

    let story = pipeline.run_with("query", prompt).await?;
    println!("{}", story);
    Ok(())
}

async fn run_narrate(config: &Config, image: &Path) -> Result<()> {
    std::fs::create_dir_all(&config.output.output_dir)?;
    let audio_path = PathBuf::from(&config.output.output_dir).join(&config.output.audio_file);

    let narrator = StoryNarrator::new(
        Arc::new(CaptionEngine::new(config.caption.clone())),
        Arc::new(ChatEngine::new(config.chat.clone())),
        Arc::new(SpeechEngine::new(config.speech.clone())),
    )?;

    println!("Narrating {:?}...", image);
    let result = narrator.narrate(image, &audio_path).await?;

    println!("\nScenario: {}", result.scenario);
    println!("\nStory: {}", result.story);
    println!(
        "\nAudio ({}) saved to: {:?}",
        result.audio.content_type(),
        result.audio_path
    );
    Ok(())
}

fn parse_source(input: &str) -> Option<SourceRef> {
    if let Some((question, answer)) = input.split_once("::") {
        return Some(SourceRef::QnaPair {
            question: question.trim().to_string(),
            answer: answer.trim().to_string(),
        });
    }

    if !input.starts_with("http://") && !input.starts_with("https://") {
        return None;
    }

    if input.contains("youtube.com/") || input.contains("youtu.be/") {
        Some(SourceRef::YoutubeVideo(input.to_string()))
    } else if input.to_lowercase().ends_with(".pdf") {
        Some(SourceRef::PdfFile(input.to_string()))
    } else {
        Some(SourceRef::WebPage(input.to_string()))
    }
}

async fn run_ask(config: &Config) -> Result<()> {
    let store = RetrievalEngine::new(config.retrieval.clone());

    println!("Add your sources. Supported types:");
    println!("- Web page URL (e.g., https://nav.al/feedback)");
    println!("- YouTube URL (e.g., https://www.youtube.com/watch?v=...)");
    println!("- PDF URL (e.g., https://example.com/book.pdf)");
    println!("- Question/answer pair (question::answer)");

    loop {
        let input = read_line("\nEnter a source (press Enter to finish):\n> ")?;
        if input.is_empty() {
            break;
        }

        match parse_source(&input) {
            Some(source) => match store.add(&source).await {
                Ok(()) => println!("Successfully added {} source", source.data_type()),
                Err(e) => println!("Error adding source: {}", e),
            },
            None => {
                println!("Invalid input. Please enter a URL or a question::answer pair.");
            }
        }
    }

    println!("\nStart questioning! Empty question ends the session.");
    loop {
        let question = read_line("\nQuestion: ")?;
        if question.is_empty() {
            break;
        }

        match store.query(&question).await {
            Ok(answer) => println!("\n{}", answer),
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let level: tracing::Level = config.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    match &args.command {
        Command::Chat => run_chat(&config).await,
        Command::Complete { prompt } => run_complete(&config, prompt).await,
        Command::Narrate { image } => run_narrate(&config, image).await,
        Command::Ask => run_ask(&config).await,
    }
}
