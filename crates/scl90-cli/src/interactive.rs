//! Line-oriented questionnaire loop.
//!
//! Reads one command per line from any `BufRead` and writes prompts to any
//! `Write`, so the whole flow can be driven from a script in tests.

use std::io::{BufRead, Write};

use anyhow::Result;
use scl90_core::{AssessmentError, AssessmentSession, KvStore, Score, ScoreReport};

/// How the loop ended.
#[derive(Debug)]
pub enum Outcome {
    Submitted(ScoreReport),
    /// Input closed or the respondent quit; progress stays persisted.
    Paused { answered: usize, total: usize },
}

enum Command {
    Answer(i64),
    Next,
    Back,
    Submit,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if let Ok(value) = line.parse::<i64>() {
        return Command::Answer(value);
    }
    match line.to_ascii_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "b" | "back" => Command::Back,
        "s" | "submit" => Command::Submit,
        "q" | "quit" => Command::Quit,
        _ => Command::Help,
    }
}

fn print_help<W: Write>(out: &mut W) -> Result<()> {
    let scale = Score::scale()
        .map(|s| format!("{}={}", s.value(), s.label()))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "  answer with {scale}")?;
    writeln!(out, "  n next, b back, s submit, q quit (progress is kept)")?;
    Ok(())
}

fn print_item<S: KvStore, W: Write>(session: &AssessmentSession<'_, S>, out: &mut W) -> Result<()> {
    let view = session.view();
    let item = session.current_item();
    writeln!(out)?;
    write!(out, "[{}/{}] {}", view.cursor + 1, view.total, item.text)?;
    if let Some(score) = view.answered {
        write!(out, " (current: {score})")?;
    }
    writeln!(out)?;
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Drive `session` from `input` until it is submitted or the input ends.
pub fn run_session<S, R, W>(
    session: &mut AssessmentSession<'_, S>,
    input: R,
    out: &mut W,
) -> Result<Outcome>
where
    S: KvStore,
    R: BufRead,
    W: Write,
{
    let total = session.catalog().len();
    writeln!(
        out,
        "{} items, {} already answered. Rate how much each problem distressed you over the past week.",
        total,
        session.answers().len()
    )?;
    print_help(out)?;

    let mut lines = input.lines();
    loop {
        print_item(session, out)?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;

        match parse_command(&line) {
            Command::Answer(value) => match session.answer_current(value) {
                Ok(view) if view.is_last => {
                    writeln!(out, "Last item recorded. Enter s to submit.")?;
                }
                Ok(_) => {
                    session.advance()?;
                }
                Err(AssessmentError::InvalidAnswerValue { value }) => {
                    writeln!(out, "{value} is not on the scale.")?;
                    print_help(out)?;
                }
                Err(e) => return Err(e.into()),
            },
            Command::Next => match session.advance() {
                Ok(view) if view.is_last && view.answered.is_some() => {
                    writeln!(out, "This is the last item. Enter s to submit.")?;
                }
                Ok(_) => {}
                Err(AssessmentError::CurrentItemUnanswered { .. }) => {
                    writeln!(out, "Answer this item before moving on.")?;
                }
                Err(e) => return Err(e.into()),
            },
            Command::Back => {
                session.retreat()?;
            }
            Command::Submit => match session.submit() {
                Ok(report) => return Ok(Outcome::Submitted(report)),
                Err(AssessmentError::IncompleteSubmission {
                    missing,
                    first_unanswered,
                }) => {
                    writeln!(
                        out,
                        "{missing} item(s) still unanswered; jumping to item {}.",
                        first_unanswered + 1
                    )?;
                }
                Err(e) => return Err(e.into()),
            },
            Command::Quit => break,
            Command::Help => print_help(out)?,
        }
    }

    Ok(Outcome::Paused {
        answered: session.answers().len(),
        total,
    })
}
