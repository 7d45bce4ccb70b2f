mod config;
mod console;
mod telemetry;

use std::sync::Arc;

use services::{JsonFileQuestionProvider, LoadOutcome, QuizLoader, QuizRequest};
use tracing::info;

use crate::config::{Args, print_usage};
use crate::console::{Console, Input, PlayEnd};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())?
    else {
        print_usage();
        return Ok(());
    };

    let provider = Arc::new(JsonFileQuestionProvider::new(&args.bank).with_shuffle(args.shuffle));
    let mut console = Console::new();
    let subject = match args.subject {
        Some(subject) => subject,
        None => {
            // Picking the default subject needs the bank; a broken file surfaces here.
            let bank = provider.read_bank().await?;
            bank.subject_names()
                .first()
                .map(|name| (*name).to_string())
                .ok_or("question bank has no subjects")?
        }
    };

    let mut request = QuizRequest::new(subject, args.count);
    let loader = QuizLoader::new(provider.clone(), args.settings);

    loop {
        info!(subject = %request.subject, count = request.count, "starting quiz");
        match loader.load(&request).await {
            LoadOutcome::Ready(quiz) => {
                println!("{} ({} questions)", request.subject, quiz.snapshot().total_questions());
                let end = console.play(&quiz).await?;
                quiz.shutdown().await;
                if end == PlayEnd::Quit {
                    return Ok(());
                }
            }
            LoadOutcome::Failed(_) => {
                println!("Failed to load questions. r: retry   c: choose subject   q: quit");
                let Some(line) = console.read_line().await? else {
                    return Ok(());
                };
                match Input::parse(&line) {
                    Input::Retry => continue,
                    Input::Subjects => {}
                    _ => return Ok(()),
                }
            }
        }

        let bank = provider.read_bank().await?;
        let Some(subject) = console.choose_subject(&bank.subject_names()).await? else {
            return Ok(());
        };
        request.subject = subject;
    }
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
