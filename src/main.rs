use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use video_tutor_rust::api::models::{ProcessVideoResponse, VideoUpload};
use video_tutor_rust::dialogue::{DialogueRelay, Role, SurfaceAdapter, Transcript};
use video_tutor_rust::export::{ExportKind, Exporter};
use video_tutor_rust::knowledge::{active_index, KnowledgeRegistry, Language};
use video_tutor_rust::practice::{Phase, PracticeDriver, SubmitOutcome};
use video_tutor_rust::timestamp::format_position;
use video_tutor_rust::{Backend, Config, HttpBackend, VideoWorkspace};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Video Tutor (Rust)")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Knowledge-point timeline, practice quizzes and tutor chat for lecture videos")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (defaults to the standard search paths)")
                .global(true)
        )
        .arg(
            Arg::new("backend")
                .short('b')
                .long("backend")
                .value_name("URL")
                .help("Backend base URL")
                .global(true)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true)
        )
        .subcommand(
            Command::new("process")
                .about("Upload a video and list its knowledge points")
                .arg(Arg::new("file").value_name("VIDEO").required(true))
                .arg(Arg::new("title").short('t').long("title").value_name("TITLE"))
                .arg(Arg::new("language").short('l').long("language").value_name("LANG"))
                .arg(
                    Arg::new("save")
                        .short('s')
                        .long("save")
                        .value_name("JSON")
                        .help("Save the processing response for the offline commands")
                )
        )
        .subcommand(
            Command::new("timeline")
                .about("Show the knowledge point active at a playback position")
                .arg(Arg::new("response").value_name("JSON").required(true))
                .arg(
                    Arg::new("position")
                        .short('p')
                        .long("position")
                        .value_name("SECONDS")
                        .required(true)
                )
        )
        .subcommand(
            Command::new("practice")
                .about("Interactive practice quiz for a knowledge point")
                .arg(Arg::new("knowledge-point").value_name("TITLE").required(true))
        )
        .subcommand(
            Command::new("chat")
                .about("Interactive chat about one knowledge point")
                .arg(Arg::new("response").value_name("JSON").required(true))
                .arg(
                    Arg::new("index")
                        .short('i')
                        .long("index")
                        .value_name("N")
                        .default_value("0")
                )
                .arg(Arg::new("title").short('t').long("title").value_name("TITLE"))
        )
        .subcommand(
            Command::new("export")
                .about("Export timestamps or notes through the backend")
                .arg(Arg::new("response").value_name("JSON").required(true))
                .arg(
                    Arg::new("kind")
                        .short('k')
                        .long("kind")
                        .value_name("KIND")
                        .help("timestamps or notes")
                        .default_value("timestamps")
                )
                .arg(Arg::new("title").short('t').long("title").value_name("TITLE"))
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");

    // Config loading logs before the configured level is known
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(if verbose { "video_tutor_rust=debug,warn" } else { "video_tutor_rust=info,warn" })
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || -> Result<Config> {
        Ok(match matches.get_one::<String>("config") {
            Some(path) => Config::load_from(Path::new(path))?,
            None => Config::load().unwrap_or_else(|e| {
                warn!("Failed to load config, using defaults: {}", e);
                Config::default()
            }),
        })
    })?;
    if let Some(url) = matches.get_one::<String>("backend") {
        config.backend.base_url = url.clone();
    }
    config.validate()?;

    let level = if verbose {
        "debug".to_string()
    } else {
        config.output.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("video_tutor_rust={},video_tutor={},warn", level, level))
        .init();

    info!("🚀 Video Tutor (Rust) starting...");
    info!("{}", config.summary());

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.backend)?);

    match matches.subcommand() {
        Some(("process", sub)) => run_process(sub, &config, backend).await,
        Some(("timeline", sub)) => run_timeline(sub, &config),
        Some(("practice", sub)) => run_practice(sub, &config, backend).await,
        Some(("chat", sub)) => run_chat(sub, &config, backend).await,
        Some(("export", sub)) => run_export(sub, &config, backend).await,
        _ => Err(anyhow!("Unknown command")),
    }
}

async fn run_process(matches: &ArgMatches, config: &Config, backend: Arc<dyn Backend>) -> Result<()> {
    let file = PathBuf::from(matches.get_one::<String>("file").context("video file required")?);
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let title = matches
        .get_one::<String>("title")
        .cloned()
        .or_else(|| file.file_stem().map(|s| s.to_string_lossy().to_string()))
        .unwrap_or_else(|| "video".to_string());
    let language = matches
        .get_one::<String>("language")
        .cloned()
        .unwrap_or_else(|| config.dialogue.language.clone());

    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read video: {}", file.display()))?;

    let upload = VideoUpload {
        file_name,
        bytes,
        title: title.clone(),
        language,
        output_type: "analysis".to_string(),
    };

    let start_time = std::time::Instant::now();
    let response = backend.process_video(upload).await?;
    info!("🎉 Processing completed in {:.2}s", start_time.elapsed().as_secs_f64());

    let mut workspace = VideoWorkspace::new(Arc::clone(&backend), config);
    let registry = workspace.apply_response(title, &response);

    println!("📚 {} knowledge points", registry.len());
    for (index, point) in registry.points().iter().enumerate() {
        println!(
            "{:>3}. [{} - {}] {} ({}, {})",
            index, point.start_time_text, point.end_time_text, point.title, point.category, point.difficulty
        );
    }
    if !workspace.summary().is_empty() {
        println!("\n{}", workspace.summary());
    }

    if let Some(path) = matches.get_one::<String>("save") {
        let json = serde_json::to_string_pretty(&response)?;
        tokio::fs::write(path, json).await?;
        info!("💾 Response saved to: {}", path);
    }

    Ok(())
}

fn run_timeline(matches: &ArgMatches, config: &Config) -> Result<()> {
    let response = read_response(matches)?;
    let position: f64 = matches
        .get_one::<String>("position")
        .context("position required")?
        .parse()
        .context("position must be a number of seconds")?;

    let registry = KnowledgeRegistry::build(&response, Language::from_name(&config.dialogue.language));
    match active_index(registry.points(), position) {
        Some(index) => {
            let point = &registry.points()[index];
            println!(
                "{} → #{} {} [{} - {}]",
                format_position(position),
                index,
                point.title,
                point.start_time_text,
                point.end_time_text
            );
        }
        None => println!("No knowledge points in this response"),
    }
    Ok(())
}

async fn run_practice(matches: &ArgMatches, config: &Config, backend: Arc<dyn Backend>) -> Result<()> {
    let knowledge_point = matches
        .get_one::<String>("knowledge-point")
        .context("knowledge point required")?;

    let mut driver = PracticeDriver::new(backend, knowledge_point.as_str(), config);
    if let Err(e) = driver.open().await {
        error!("❌ {}", e);
    }
    let mut printed = print_new(driver.transcript(), 0);
    print_question(&driver);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !matches!(driver.phase(), Phase::Complete | Phase::NoQuestions) {
        println!("\n[A-E] answer · skip · retry · chat <message> · regen <n> · focus · quit");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let generation = driver.session().generation();

        let result = match line {
            "quit" | "exit" => break,
            "skip" => driver.skip().map(|_| ()),
            "retry" => driver.retry().await.map(|_| ()),
            "focus" => driver.back_to_focus().map(|_| ()),
            _ if line.starts_with("chat ") => driver.send_message(&line[5..]).await.map(|_| ()),
            _ if line.starts_with("regen ") => match line[6..].trim().parse() {
                Ok(index) => driver.regenerate(index).await.map(|_| ()),
                Err(_) => {
                    warn!("regen expects a transcript index");
                    Ok(())
                }
            },
            _ if line.chars().count() == 1 => {
                let letter = line.chars().next().unwrap_or(' ');
                match driver.select(letter) {
                    Ok(()) => match driver.submit().await {
                        Ok(SubmitOutcome::Correct) => {
                            printed = print_new(driver.transcript(), printed);
                            driver.await_auto_advance().await;
                            Ok(())
                        }
                        Ok(_) => Ok(()),
                        Err(e) => Err(e),
                    },
                    Err(e) => Err(e),
                }
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            warn!("{}", e);
        }

        printed = print_new(driver.transcript(), printed);
        if driver.session().generation() != generation {
            print_question(&driver);
        }
    }

    driver.close();
    Ok(())
}

async fn run_chat(matches: &ArgMatches, config: &Config, backend: Arc<dyn Backend>) -> Result<()> {
    let response = read_response(matches)?;
    let index: usize = matches
        .get_one::<String>("index")
        .context("index required")?
        .parse()
        .context("index must be a number")?;
    let title = matches.get_one::<String>("title").cloned().unwrap_or_default();

    let mut workspace = VideoWorkspace::new(backend, config);
    workspace.apply_response(title, &response);
    let mut relay = workspace.knowledge_point_chat(index)?;

    println!("💬 Chatting about \"{}\"", relay.adapter().point().title);
    print_suggestions(&relay);

    let mut printed = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let result = match line {
            "/quit" | "/exit" => break,
            "/focus" => {
                relay.back_to_focus();
                Ok(())
            }
            "/reset" => {
                relay.reset();
                printed = 0;
                Ok(())
            }
            _ if line.starts_with("/regen ") => match line[7..].trim().parse() {
                Ok(index) => relay.regenerate(index).await.map(|_| ()),
                Err(_) => {
                    warn!("/regen expects a transcript index");
                    Ok(())
                }
            },
            "" => Ok(()),
            _ => relay.send(line).await.map(|_| ()),
        };

        if let Err(e) = result {
            warn!("{}", e);
        }
        printed = print_new(relay.transcript(), printed);

        let status = relay.status();
        println!(
            "   round {} · understanding {}%{}",
            status.round,
            status.understanding_progress,
            if status.focus_deviated { " · off topic" } else { "" }
        );
        print_suggestions(&relay);
    }

    Ok(())
}

async fn run_export(matches: &ArgMatches, config: &Config, backend: Arc<dyn Backend>) -> Result<()> {
    let response = read_response(matches)?;
    let kind: ExportKind = matches
        .get_one::<String>("kind")
        .context("kind required")?
        .parse()?;
    let title = matches.get_one::<String>("title").cloned().unwrap_or_default();

    let registry = KnowledgeRegistry::build(&response, Language::from_name(&config.dialogue.language));
    let Some(content) = kind.content(&registry, &response.summary_text()) else {
        return Err(anyhow!("Nothing to export"));
    };

    let exporter = Exporter::new(backend, config.output.download_dir.clone());
    let path = exporter.export(kind, &title, content).await?;
    println!("💾 {}", path.display());
    Ok(())
}

fn read_response(matches: &ArgMatches) -> Result<ProcessVideoResponse> {
    let path = matches.get_one::<String>("response").context("response file required")?;
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    Ok(serde_json::from_str(&json)?)
}

/// Print transcript entries added since `printed`, returning the new count
fn print_new(transcript: &Transcript, printed: usize) -> usize {
    for (index, entry) in transcript.entries().iter().enumerate().skip(printed) {
        let marker = match entry.role {
            Role::User => "🧑",
            Role::Assistant => "🤖",
            Role::Notice => "⚠️",
        };
        println!("[{}] {} {} {}", index, entry.timestamp, marker, entry.content);
    }
    transcript.len()
}

fn print_question(driver: &PracticeDriver) {
    let Some(question) = driver.current_question() else {
        return;
    };
    let session = driver.session();
    println!(
        "\n❓ Question {}/{}: {}  [{} · {}]",
        session.cursor() + 1,
        session.total(),
        question.title,
        question.difficulty_label(),
        question.relevance_label()
    );
    println!("{}", question.text);
    for (letter, text) in &question.options {
        println!("  {}. {}", letter, text);
    }
}

fn print_suggestions<A: SurfaceAdapter>(relay: &DialogueRelay<A>) {
    for suggestion in relay.suggestions() {
        println!("   💡 {}", suggestion);
    }
}
