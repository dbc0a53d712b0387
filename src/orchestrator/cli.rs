//! Terminal Front End
//!
//! Line-based wizard and plain-text views used by the binary. Everything
//! takes explicit reader/writer handles so it can be driven from tests.

use anyhow::Result;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use super::progress::{FlowState, ProgressSnapshot, StageStatus};
use crate::analysis::{AnalysisResult, ScoreBand};
use crate::intake::request::{MAX_DESCRIPTION_CHARS, MIN_DESCRIPTION_CHARS};
use crate::intake::{
    AnalysisRequest, BusinessModel, BusinessStage, DocumentAttachment, TargetMarket, Wizard,
    WizardStep,
};

const BAR_WIDTH: usize = 30;

enum Choice<T> {
    Picked(T),
    Back,
    Invalid,
    Quit,
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Numbered menu. Accepts the number, the slug, or "b" for back.
fn choose<T, R, W>(input: &mut R, out: &mut W, options: &[T], describe: impl Fn(&T) -> String) -> Result<Choice<T>>
where
    T: Copy + FromStr,
    R: BufRead,
    W: Write,
{
    for (i, option) in options.iter().enumerate() {
        writeln!(out, "  {}) {}", i + 1, describe(option))?;
    }
    write!(out, "Choose 1-{} (b = back): ", options.len())?;
    out.flush()?;

    let Some(answer) = read_line(input)? else {
        return Ok(Choice::Quit);
    };
    if answer.eq_ignore_ascii_case("b") {
        return Ok(Choice::Back);
    }
    if let Ok(n) = answer.parse::<usize>() {
        if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return Ok(Choice::Picked(*option));
        }
    } else if let Ok(option) = answer.parse::<T>() {
        return Ok(Choice::Picked(option));
    }
    writeln!(out, "'{}' is not one of the options.", answer)?;
    Ok(Choice::Invalid)
}

/// Walks the four intake steps. `None` when the input ends before the form is complete.
pub fn run_wizard<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<AnalysisRequest>> {
    let mut wizard = Wizard::new();

    loop {
        let step = wizard.step();
        writeln!(out, "\nStep {} of {}: {}", step.number(), WizardStep::ALL.len(), step.title())?;

        let choice = match step {
            WizardStep::BusinessDetails => {
                writeln!(
                    out,
                    "Describe your business idea ({}-{} characters):",
                    MIN_DESCRIPTION_CHARS, MAX_DESCRIPTION_CHARS
                )?;
                let Some(text) = read_line(input)? else {
                    return Ok(None);
                };
                wizard.set_description(&text);
                if !wizard.is_step_valid() {
                    writeln!(
                        out,
                        "{} characters entered, at least {} needed.",
                        wizard.description_len(),
                        MIN_DESCRIPTION_CHARS
                    )?;
                    continue;
                }

                writeln!(out, "Supporting document (PDF, DOC, DOCX or TXT up to 10MB, Enter to skip):")?;
                let Some(path) = read_line(input)? else {
                    return Ok(None);
                };
                if !path.is_empty() {
                    match DocumentAttachment::from_path(Path::new(&path)) {
                        Ok(doc) => wizard.attach_document(doc),
                        Err(e) => writeln!(out, "Document not attached: {}", e)?,
                    }
                }
                Choice::Picked(())
            }
            WizardStep::MarketSelection => {
                match choose(input, out, TargetMarket::ALL, |m| m.label().to_string())? {
                    Choice::Picked(market) => {
                        wizard.select_market(market);
                        Choice::Picked(())
                    }
                    other => discard(other),
                }
            }
            WizardStep::BusinessStage => {
                match choose(input, out, BusinessStage::ALL, |s| s.label().to_string())? {
                    Choice::Picked(stage) => {
                        wizard.select_stage(stage);
                        Choice::Picked(())
                    }
                    other => discard(other),
                }
            }
            WizardStep::BusinessModel => {
                match choose(input, out, BusinessModel::ALL, |m| m.label().to_string())? {
                    Choice::Picked(model) => {
                        wizard.select_model(model);
                        Choice::Picked(())
                    }
                    other => discard(other),
                }
            }
        };

        match choice {
            Choice::Quit => return Ok(None),
            Choice::Back => {
                wizard.back();
            }
            Choice::Invalid => {}
            Choice::Picked(()) if wizard.is_last_step() => return Ok(wizard.finish()),
            Choice::Picked(()) => {
                wizard.next();
            }
        }
    }
}

fn discard<T>(choice: Choice<T>) -> Choice<()> {
    match choice {
        Choice::Picked(_) => Choice::Picked(()),
        Choice::Back => Choice::Back,
        Choice::Invalid => Choice::Invalid,
        Choice::Quit => Choice::Quit,
    }
}

fn push_list(text: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(text, "\n{}", title);
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(text, "  {}. {}", i + 1, item);
    }
}

pub fn render_results(result: &AnalysisResult) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Overall Feasibility Score: {}/100 ({})",
        result.overall_score, result.interpretation
    );
    let _ = writeln!(text, "\nDetailed Scores");
    for (dimension, score) in result.scores.iter() {
        let _ = writeln!(
            text,
            "  {:<24} {:>3}/100  {}",
            dimension.label(),
            score,
            ScoreBand::from_score(score).label()
        );
    }
    push_list(&mut text, "Key Strengths", &result.strengths);
    push_list(&mut text, "Critical Concerns", &result.concerns);
    push_list(&mut text, "Priority Recommendations", &result.recommendations);

    if !result.agent_responses.is_empty() {
        let _ = write!(text, "\nAgents consulted: {}", result.agent_responses.len());
        if let Some(session) = &result.session_id {
            let _ = write!(text, " (session {})", session);
        }
        text.push('\n');
    }
    text
}

fn status_marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => " ",
        StageStatus::Running => ">",
        StageStatus::Completed => "x",
        StageStatus::Error => "!",
    }
}

/// One-line progress bar
pub fn render_progress_line(snapshot: &ProgressSnapshot) -> String {
    let filled = BAR_WIDTH * usize::from(snapshot.percent.min(100)) / 100;
    let label = match snapshot.state {
        FlowState::Running => snapshot.current_stage().unwrap_or("Waiting for results"),
        FlowState::Completed => "Analysis complete",
        FlowState::Failed => "Analysis failed",
    };
    format!(
        "[{}{}] {:>3}%  {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        snapshot.percent,
        label
    )
}

pub fn render_progress(snapshot: &ProgressSnapshot) -> String {
    let mut text = render_progress_line(snapshot);
    text.push('\n');
    for stage in &snapshot.stages {
        let _ = writeln!(text, "  [{}] {}", status_marker(stage.status), stage.name);
    }
    text
}
