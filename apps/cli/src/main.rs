mod config;

use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    CommandError, FileTokenStore, HttpInterviewService, InterviewService, Session,
    SessionController, View,
};
use shared::{
    domain::{ExperienceLevel, InterviewId, InterviewType},
    protocol::InterviewRecord,
};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "interview-cli",
    about = "Terminal client for the AI mock-interview service"
)]
struct Args {
    /// Base URL of the interview service.
    #[arg(long)]
    server_url: Option<String>,
    /// Path of the persisted session file.
    #[arg(long)]
    session_file: Option<PathBuf>,
}

enum Flow {
    Continue,
    Quit,
}

type Controller = SessionController<HttpInterviewService, FileTokenStore>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);
    url::Url::parse(&server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
    let session_file = args
        .session_file
        .or(settings.session_file)
        .unwrap_or_else(|| FileTokenStore::default_path("interview-cli"));

    let service = HttpInterviewService::new(server_url.clone());
    // Advisory connectivity probe; the session proceeds either way.
    if let Err(err) = service.health().await {
        warn!(error = %err, server_url, "interview service is not reachable");
    }

    let mut controller = SessionController::new(service, FileTokenStore::new(session_file));
    controller.rehydrate().await;

    println!("AI Interview Practice (connected to {server_url})");
    render(controller.session());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            render(controller.session());
            continue;
        }
        match handle_line(&mut controller, line).await {
            Flow::Quit => break,
            Flow::Continue => render(controller.session()),
        }
    }

    Ok(())
}

async fn handle_line(controller: &mut Controller, line: &str) -> Flow {
    // Meta commands work from every view.
    match line {
        "/quit" | "/exit" => return Flow::Quit,
        "/logout" => {
            controller.logout();
            return Flow::Continue;
        }
        // Catch slash-typos so they never get submitted as answers.
        other if other.starts_with('/') => {
            println!("! unknown command {other}");
            return Flow::Continue;
        }
        _ => {}
    }

    let result = match controller.session().view {
        View::Login => handle_login(controller, line).await,
        View::Register => handle_register(controller, line).await,
        View::Dashboard => handle_dashboard(controller, line).await,
        View::Interview => {
            controller.set_current_answer(line);
            controller.submit_answer().await
        }
        View::FeedbackReview => handle_feedback(controller, line),
    };

    // Service failures are already surfaced through the session alert;
    // guard rejections are printed directly.
    if let Err(err @ (CommandError::Validation(_) | CommandError::RequestInFlight)) = result {
        println!("! {err}");
    }
    Flow::Continue
}

async fn handle_login(controller: &mut Controller, line: &str) -> Result<(), CommandError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["login", email, password] => {
            controller.set_login_form(*email, *password);
            controller.submit_login().await
        }
        ["register"] => {
            controller.show_register();
            Ok(())
        }
        _ => {
            println!("commands: login <email> <password> | register | /quit");
            Ok(())
        }
    }
}

async fn handle_register(controller: &mut Controller, line: &str) -> Result<(), CommandError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["register", name, email, password] => {
            controller.set_register_form(*name, *email, *password);
            controller.submit_registration().await
        }
        ["login"] => {
            controller.show_login();
            Ok(())
        }
        _ => {
            println!("commands: register <name> <email> <password> | login | /quit");
            Ok(())
        }
    }
}

async fn handle_dashboard(controller: &mut Controller, line: &str) -> Result<(), CommandError> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    match command {
        "upload" => {
            let path = Path::new(rest);
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    println!("! could not read '{rest}': {err}");
                    return Ok(());
                }
            };
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| rest.to_string());
            controller.select_resume(filename, bytes);
            controller.upload_resume().await
        }
        "role" => {
            controller.set_job_role(rest);
            Ok(())
        }
        "level" => {
            let level = match rest {
                "entry" => ExperienceLevel::Entry,
                "mid" => ExperienceLevel::Mid,
                "senior" => ExperienceLevel::Senior,
                other => {
                    println!("! unknown level '{other}' (entry|mid|senior)");
                    return Ok(());
                }
            };
            controller.set_experience_level(level);
            Ok(())
        }
        "type" => {
            let interview_type = match rest {
                "text" => InterviewType::Text,
                "voice" => InterviewType::Voice,
                other => {
                    println!("! unknown type '{other}' (text|voice)");
                    return Ok(());
                }
            };
            controller.set_interview_type(interview_type);
            Ok(())
        }
        "start" => controller.start_interview().await,
        "history" => controller.refresh_history().await,
        "review" => {
            let record = controller
                .review_past_interview(&InterviewId(rest.to_string()))
                .await?;
            print_record(&record);
            Ok(())
        }
        _ => {
            println!(
                "commands: upload <pdf> | role <text> | level <entry|mid|senior> | \
                 type <text|voice> | start | history | review <id> | /logout | /quit"
            );
            Ok(())
        }
    }
}

fn handle_feedback(controller: &mut Controller, line: &str) -> Result<(), CommandError> {
    match line {
        "done" => {
            controller.finish_review();
            Ok(())
        }
        "again" => {
            controller.practice_again();
            Ok(())
        }
        _ => {
            println!("commands: done | again | /logout | /quit");
            Ok(())
        }
    }
}

fn render(session: &Session) {
    println!();
    if let Some(alert) = &session.alert {
        println!("! {alert}");
    }
    match session.view {
        View::Login => println!("[sign in] login <email> <password> | register"),
        View::Register => println!("[create account] register <name> <email> <password> | login"),
        View::Dashboard => render_dashboard(session),
        View::Interview => render_interview(session),
        View::FeedbackReview => {
            println!("[interview complete]");
            match &session.feedback {
                Some(feedback) => println!("{feedback}"),
                None => println!("(no feedback returned)"),
            }
            println!("done | again");
        }
    }
}

fn render_dashboard(session: &Session) {
    match &session.current_user {
        Some(user) => println!("[dashboard] signed in as {}", user.name),
        None => println!("[dashboard]"),
    }
    if session.resume_uploaded {
        println!("resume: uploaded");
        if let Some(preview) = &session.resume_preview {
            println!("  {preview}");
        }
    } else {
        println!("resume: none on file (upload <pdf>)");
    }
    let setup = &session.setup;
    let role = if setup.job_role.is_empty() {
        "(unset)"
    } else {
        setup.job_role.as_str()
    };
    println!(
        "setup: role={role} level={:?} type={:?}",
        setup.experience_level, setup.interview_type
    );
    if !session.history.is_empty() {
        println!("history:");
        for entry in &session.history {
            println!(
                "  {} - {} ({:?}, {})",
                entry.id,
                entry.job_role,
                entry.status,
                entry.created_at.format("%Y-%m-%d")
            );
        }
    }
}

fn render_interview(session: &Session) {
    let Some(interview) = &session.interview else {
        return;
    };
    let (current, total) = interview.progress();
    match interview.current_question() {
        Some(question) => {
            println!("[interview] question {current}/{total} ({})", question.kind);
            println!("{}", question.question);
            println!("(type your answer and press Enter)");
        }
        None => println!("[interview] question {current}/{total}"),
    }
}

fn print_record(record: &InterviewRecord) {
    println!(
        "interview {} - {} ({:?})",
        record.id, record.job_role, record.status
    );
    for (i, question) in record.questions.iter().enumerate() {
        println!("Q{}: {}", i + 1, question.question);
        if let Some(answer) = record.responses.get(i) {
            println!("A{}: {}", i + 1, answer.answer);
        }
    }
    if let Some(feedback) = &record.feedback {
        println!("feedback:\n{feedback}");
    }
}
