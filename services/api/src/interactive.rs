use crate::infra::{load_catalog, load_strategies};
use chrono::Utc;
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use strainpoint::assessment::{
    AssessmentService, CompatibilityPoint, JsonFileSessionStore, QuestionKind, ReportFormat,
    ServiceError, SessionId, SessionStore, SessionView,
};
use strainpoint::config::AppConfig;
use strainpoint::error::AppError;
use strainpoint::telemetry::{self, LogOutput};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Name of the saved session to resume or create
    #[arg(long, default_value = "default")]
    pub(crate) session: String,
    /// Directory holding saved sessions (defaults to APP_SESSION_DIR)
    #[arg(long)]
    pub(crate) dir: Option<PathBuf>,
    /// Fix the stage-1 question order
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Report format printed when the assessment finishes
    #[arg(long, default_value = "text")]
    pub(crate) format: ReportFormat,
    /// Discard any saved progress for this session first
    #[arg(long)]
    pub(crate) fresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Score(i64),
    Next,
    Back,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Some(Input::Next),
        "b" | "back" => Some(Input::Back),
        "q" | "quit" | "exit" => Some(Input::Quit),
        other => other.parse::<i64>().ok().map(Input::Score),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Finished,
    Paused,
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogOutput::Stderr)?;

    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| config.assessment.session_dir.clone());
    let service = AssessmentService::new(
        Arc::new(load_catalog(config.assessment.catalog_path.as_deref())?),
        Arc::new(load_strategies(config.assessment.strategy_path.as_deref())?),
        Arc::new(JsonFileSessionStore::new(&dir)),
        config.assessment.policy(),
    )
    .with_fixed_seed(args.seed.or(config.assessment.shuffle_seed));

    let id = SessionId(args.session.clone());
    if args.fresh {
        service.reset(&id)?;
    }

    let (_, resumed) = service.resume_or_start(id.clone())?;
    info!(session = %id, dir = %dir.display(), resumed, "assessment session opened");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if resumed {
        writeln!(stdout, "Resuming saved session '{id}'.")?;
    }
    writeln!(
        stdout,
        "Rate each statement from 0 (not at all) to 10 (completely). Enter to continue, 'b' to go back, 'q' to pause."
    )?;

    match drive(&service, &id, stdin.lock(), &mut stdout)? {
        Outcome::Finished => {
            let report = service.report(&id, Utc::now())?;
            writeln!(stdout)?;
            writeln!(stdout, "{}", args.format.render(&report)?)?;
        }
        Outcome::Paused => {
            writeln!(
                stdout,
                "Progress saved. Run `strainpoint assess --session {id}` to continue."
            )?;
        }
    }
    Ok(())
}

/// Question loop over any line source. Every answer is persisted by the service.
pub(crate) fn drive<S, R, W>(
    service: &AssessmentService<CompatibilityPoint, S>,
    id: &SessionId,
    mut input: R,
    output: &mut W,
) -> Result<Outcome, AppError>
where
    S: SessionStore + 'static,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        let view = service.view(id)?;
        let Some(question) = view.question.as_ref() else {
            return Ok(Outcome::Finished);
        };

        writeln!(output)?;
        writeln!(
            output,
            "[{}] {}/{}  {}",
            view.stage_label,
            view.position,
            view.total,
            question.prompt
        )?;
        if question.kind == QuestionKind::Scenario {
            if let Some(example) = &question.example {
                writeln!(output, "    {example}")?;
            }
        }
        if let Some(current) = view.current_answer {
            writeln!(output, "    current answer: {current}")?;
        }
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(Outcome::Paused);
        }

        let step = match parse_input(&line) {
            Some(Input::Quit) => return Ok(Outcome::Paused),
            Some(Input::Score(value)) => service
                .answer(id, value)
                .and_then(|_| service.advance(id)),
            Some(Input::Next) => service.advance(id),
            Some(Input::Back) => service.back(id),
            None => {
                writeln!(output, "Enter a number from 0 to 10, 'b' or 'q'.")?;
                continue;
            }
        };

        match step {
            Ok(next) => announce(&next, output)?,
            Err(ServiceError::Session(err)) => writeln!(output, "{err}")?,
            Err(err) => return Err(err.into()),
        }
    }
}

fn announce<W: Write>(view: &SessionView<CompatibilityPoint>, output: &mut W) -> io::Result<()> {
    if let Some(completed) = view.completed_stage {
        writeln!(output, "{} complete. Now: {}.", completed.label(), view.stage_label)?;
    }
    Ok(())
}
