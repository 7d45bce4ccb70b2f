//! Line-oriented terminal front end for a `QuizController`.
//!
//! Renders from controller snapshots only; every decision is made by the
//! controller.

use std::io;

use quiz_core::model::{AnswerStatus, Session};
use services::{QuizController, QuizProgress, QuizSummary, format_clock};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// One line of user input, already interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Select(usize),
    Submit,
    Retry,
    Next,
    Reset,
    Subjects,
    Show,
    Quit,
    Unknown(String),
}

/// Why `Console::play` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayEnd {
    Quit,
    ChangeSubject,
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Ok(number) = line.parse::<usize>() {
            return Input::Select(number);
        }
        match line.to_ascii_lowercase().as_str() {
            "s" | "submit" => Input::Submit,
            "r" | "retry" => Input::Retry,
            "n" | "next" => Input::Next,
            "x" | "reset" => Input::Reset,
            "c" | "subjects" => Input::Subjects,
            "" | "t" | "show" => Input::Show,
            "q" | "quit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Read one line; `None` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates stdin read failures.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    /// List `names` and read a choice by number or name.
    ///
    /// Returns `None` on quit or end of input.
    ///
    /// # Errors
    ///
    /// Propagates stdin read failures.
    pub async fn choose_subject(&mut self, names: &[&str]) -> io::Result<Option<String>> {
        if names.is_empty() {
            println!("The question bank has no subjects.");
            return Ok(None);
        }
        println!();
        println!("Subjects:");
        for (i, name) in names.iter().enumerate() {
            println!("  {}. {name}", i + 1);
        }
        loop {
            println!("Pick a subject by number or name (q: quit).");
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            if Input::parse(&line) == Input::Quit {
                return Ok(None);
            }
            if let Some(subject) = subject_from_choice(names, &line) {
                return Ok(Some(subject));
            }
            println!("No subject {:?}.", line.trim());
        }
    }

    /// Play until the user quits, asks for another subject, or stdin closes.
    ///
    /// # Errors
    ///
    /// Propagates stdin failures and a shut-down controller.
    pub async fn play(&mut self, quiz: &QuizController) -> Result<PlayEnd, Box<dyn std::error::Error>> {
        let mut updates = quiz.subscribe();
        render(&quiz.snapshot());

        loop {
            tokio::select! {
                line = self.lines.next_line() => {
                    let Some(line) = line? else { return Ok(PlayEnd::Quit) };
                    let before = quiz.snapshot();
                    let input = Input::parse(&line);
                    let after = match input.clone() {
                        Input::Select(number) => {
                            let Some(option) = option_text(&before, number) else {
                                println!("No option {number}.");
                                continue;
                            };
                            quiz.select_option(option).await?
                        }
                        Input::Submit => quiz.submit().await?,
                        Input::Retry => quiz.retry().await?,
                        Input::Next => quiz.next_question().await?,
                        Input::Reset => quiz.reset().await?,
                        Input::Show => before.clone(),
                        Input::Subjects => return Ok(PlayEnd::ChangeSubject),
                        Input::Quit => return Ok(PlayEnd::Quit),
                        Input::Unknown(raw) => {
                            println!("Unknown command {raw:?}. Use a number, s, r, n, x, c or q.");
                            continue;
                        }
                    };
                    let _ = updates.borrow_and_update();

                    if after.is_completed() {
                        if let Some(summary) = quiz.summary() {
                            render_summary(&summary);
                        }
                        println!("x: play again   c: choose subject   q: quit");
                    } else {
                        if after == before && input != Input::Show {
                            println!("Not available right now.");
                        }
                        render(&after);
                    }
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        return Ok(PlayEnd::Quit);
                    }
                    // Ticks are silent; only a forced expiry needs attention.
                    let snapshot = updates.borrow_and_update().clone();
                    if snapshot.status() == AnswerStatus::Expired {
                        println!("Time's up!");
                        render(&snapshot);
                    }
                }
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn subject_from_choice(names: &[&str], line: &str) -> Option<String> {
    let line = line.trim();
    let found = match line.parse::<usize>() {
        Ok(number) => number.checked_sub(1).and_then(|i| names.get(i)).copied(),
        Err(_) => names.iter().copied().find(|name| name.eq_ignore_ascii_case(line)),
    };
    found.map(str::to_string)
}

fn option_text(session: &Session, number: usize) -> Option<String> {
    let question = session.current_question()?;
    number
        .checked_sub(1)
        .and_then(|index| question.options().get(index))
        .cloned()
}

fn render(session: &Session) {
    let Some(question) = session.current_question() else {
        println!("This quiz has no questions.");
        return;
    };
    let progress = QuizProgress::from_session(session);
    let clock = match session.time_remaining() {
        Some(left) => format!("{} left", format_clock(left)),
        None => format_clock(session.time_elapsed()),
    };

    println!();
    println!(
        "Question {}/{} ({}%)   score {}   time {}",
        progress.position,
        progress.total,
        progress.completion_percent,
        session.score(),
        clock
    );
    println!("{}", question.prompt());
    for (i, option) in question.options().iter().enumerate() {
        let marker = if session.selected_answer() == Some(option.as_str()) {
            '>'
        } else {
            ' '
        };
        println!(" {marker} {}. {option}", i + 1);
    }

    match session.status() {
        AnswerStatus::Idle => println!("Pick a number, then s to submit."),
        AnswerStatus::Correct => {
            println!("Correct!");
            if !question.solution().is_empty() {
                println!("{}", question.solution());
            }
            println!("n: next question");
        }
        AnswerStatus::Wrong => println!("Wrong answer. r: retry"),
        AnswerStatus::Expired => println!("Out of time. r: retry   n: next question"),
    }
}

fn render_summary(summary: &QuizSummary) {
    println!();
    println!("Quiz complete!");
    println!("  score     {}/{}", summary.score, summary.total_questions);
    println!("  accuracy  {}%", summary.accuracy_percent);
    println!("  mistakes  {}", summary.incorrect_attempts);
    println!("  time      {}", format_clock(summary.total_time_secs));
}
