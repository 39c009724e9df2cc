use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use study_scale::{Preset, optimize};
use symbiotic_study::capture::{LogAlerter, Scanner, StillCamera};
use symbiotic_study::error::classify;
use symbiotic_study::render::{self, ProfessorView};
use symbiotic_study::session::ANALYSIS_ALERT;
use symbiotic_study::{AppConfig, HasRecoverySuggestion, StudyError, StudySession, Subject};
use tracing_subscriber::EnvFilter;

/// Study assistant: send a problem to the inference proxy and keep a diary of answers.
#[derive(Parser, Debug)]
#[command(name = "symbiotic")]
#[command(about = "📚 Solve homework problems from text or a photo")]
struct Args {
    /// Analysis endpoint (overrides SYMBIOTIC_PROXY_URL)
    #[arg(long, global = true)]
    proxy_url: Option<String>,

    /// Diary directory (overrides SYMBIOTIC_DIARY_DIR)
    #[arg(long, global = true)]
    diary_dir: Option<PathBuf>,

    /// Upload size preset
    #[arg(long, global = true, value_enum, default_value_t = Preset::Budget)]
    preset: Preset,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a typed question, optionally with a photo
    Ask {
        #[arg(short, long, value_enum, default_value_t = Subject::Math)]
        subject: Subject,

        /// Photo of the problem; sent immediately
        #[arg(short, long)]
        image: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = ProfessorView::All)]
        view: ProfessorView,

        /// Question text
        prompt: Vec<String>,
    },
    /// Countdown capture from a camera source, crop, then ask
    Scan {
        /// Image file served as the camera feed
        #[arg(short, long)]
        camera: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Subject::Math)]
        subject: Subject,

        /// Crop zoom, 1 to 3
        #[arg(short, long, default_value_t = 1.0)]
        zoom: f64,

        /// Crop pan in frame pixels, as DX,DY
        #[arg(long, value_parser = parse_pan, allow_hyphen_values = true)]
        pan: Option<(f64, f64)>,

        /// Also write the confirmed crop to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Stop after cropping, without sending
        #[arg(long)]
        no_send: bool,

        #[arg(short, long, value_enum, default_value_t = ProfessorView::All)]
        view: ProfessorView,
    },
    /// Browse or clear past answers
    Diary {
        #[command(subcommand)]
        action: DiaryAction,
    },
    /// Shrink an image the way uploads are shrunk
    Optimize {
        input: PathBuf,

        #[arg(short, long, default_value = "optimized.jpg")]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum DiaryAction {
    /// List entries, newest first
    List,
    /// Show one entry
    Show {
        index: usize,
        #[arg(short, long, value_enum, default_value_t = ProfessorView::All)]
        view: ProfessorView,
    },
    /// Delete every entry
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(url) = args.proxy_url {
        config.proxy_url = url;
    }
    if let Some(dir) = args.diary_dir {
        config.diary_dir = dir;
    }
    config.optimize = args.preset.config();
    config.validate().map_err(anyhow::Error::msg)?;

    match args.command {
        Command::Ask {
            subject,
            image,
            view,
            prompt,
        } => {
            let mut session = symbiotic_study::open_session(&config).map_err(explain)?;
            session.set_subject(subject);
            session.set_input(prompt.join(" "));
            ask(&mut session, image, view).await
        }
        Command::Scan {
            camera,
            subject,
            zoom,
            pan,
            save,
            no_send,
            view,
        } => {
            let mut scanner = Scanner::new(
                Box::new(StillCamera::new(camera)),
                Arc::new(LogAlerter),
                config.scanner,
            );
            scanner.open().await.map_err(explain)?;
            println!("Hold still, capturing in {}s...", config.scanner.countdown_secs);
            scanner.run_countdown().await.map_err(explain)?;

            scanner.set_zoom(zoom).map_err(explain)?;
            if let Some((dx, dy)) = pan {
                scanner.pan(dx, dy).map_err(explain)?;
            }
            let crop = scanner.confirm().map_err(explain)?;
            println!("Cropped {}x{} ({} bytes)", crop.width, crop.height, crop.bytes.len());

            if let Some(path) = save {
                std::fs::write(&path, &crop.bytes)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            if no_send {
                return Ok(());
            }

            let mut session = symbiotic_study::open_session(&config).map_err(explain)?;
            session.set_subject(subject);
            let answer = session.submit_capture(&crop).await.map_err(analysis_failed)?;
            println!("{}", render::render(answer, view));
            Ok(())
        }
        Command::Diary { action } => {
            let mut session = symbiotic_study::open_session(&config).map_err(explain)?;
            diary(&mut session, action)
        }
        Command::Optimize { input, output } => {
            let bytes = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let optimized = optimize(&bytes, &config.optimize)?;
            std::fs::write(&output, &optimized.bytes)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "{} -> {} ({}x{}, {} -> {} bytes)",
                input.display(),
                output.display(),
                optimized.width,
                optimized.height,
                bytes.len(),
                optimized.bytes.len()
            );
            Ok(())
        }
    }
}

async fn ask(session: &mut StudySession, image: Option<PathBuf>, view: ProfessorView) -> Result<()> {
    let answer = match image {
        Some(path) => {
            let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            session.submit_image(&bytes).await.map_err(analysis_failed)?
        }
        None => match session.submit().await.map_err(analysis_failed)? {
            Some(answer) => answer,
            None => {
                println!("Nothing to send: type a question or attach an image.");
                return Ok(());
            }
        },
    };
    println!("{}", render::render(answer, view));
    Ok(())
}

fn diary(session: &mut StudySession, action: DiaryAction) -> Result<()> {
    match action {
        DiaryAction::List => {
            if session.diary().is_empty() {
                println!("The diary is empty.");
            }
            for (i, entry) in session.diary().entries().enumerate() {
                println!("{}", render::diary_line(i, entry));
            }
        }
        DiaryAction::Show { index, view } => {
            let entry = session
                .diary()
                .get(index)
                .with_context(|| format!("no diary entry #{}", index))?;
            println!("{}", render::diary_line(index, entry));
            println!("{}", render::render(&entry.results, view));
        }
        DiaryAction::Clear { yes } => {
            if session.diary_mut().clear(yes).map_err(explain)? {
                println!("Diary cleared.");
            } else {
                println!("Pass --yes to delete every diary entry.");
            }
        }
    }
    Ok(())
}

/// Attach the recovery suggestion, if any, to a library error.
fn explain(err: StudyError) -> anyhow::Error {
    let hint = err.recovery_suggestion().map(str::to_string);
    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => anyhow::Error::new(err),
    }
}

/// Failed analyses show the generic retry alert on top of the cause.
fn analysis_failed(err: StudyError) -> anyhow::Error {
    if classify::is_user_facing(&err) {
        explain(err).context(ANALYSIS_ALERT)
    } else {
        explain(err)
    }
}

fn parse_pan(s: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{}'", s))?;
    let dx = dx.trim().parse().map_err(|_| format!("invalid DX '{}'", dx))?;
    let dy = dy.trim().parse().map_err(|_| format!("invalid DY '{}'", dy))?;
    Ok((dx, dy))
}
