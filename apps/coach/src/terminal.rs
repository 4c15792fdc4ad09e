//! Interactive terminal front-end. Screen selection is driven entirely by the
//! controller's state, so any error simply leaves the user on the same screen.

use std::io::Write;

use anyhow::Result;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::controller::{Controller, FlowStep, LoginOutcome, Module, ProfileForm};
use crate::errors::AppError;
use crate::interview::turn_label;
use crate::models::session::{Phase, Speaker};
use crate::report::ReportSummary;

enum Screen {
    Auth,
    Onboarding,
    Dashboard,
    Upload,
    Quiz,
    Interview,
    Report,
}

pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
    /// Conversation entries already printed.
    shown: usize,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            shown: 0,
        }
    }

    /// Prompts and reads one trimmed line; `None` on end of input.
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    fn print_conversation(&mut self, controller: &Controller) {
        let conversation = &controller.session().conversation;
        if conversation.len() < self.shown {
            self.shown = 0;
        }
        for entry in &conversation[self.shown..] {
            let who = match entry.speaker {
                Speaker::Bot => "Interviewer",
                Speaker::User => "You",
            };
            println!("{who}: {}", entry.text);
        }
        self.shown = conversation.len();
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

fn show_error(e: &AppError) {
    println!("! {}", e.user_message());
}

pub async fn run(controller: &mut Controller, term: &mut Terminal) -> Result<()> {
    loop {
        let screen = match controller.user() {
            None => Screen::Auth,
            Some(user) if !user.onboarded => Screen::Onboarding,
            Some(_) => match controller.session().phase {
                Phase::Idle => Screen::Dashboard,
                Phase::ResumeUpload => Screen::Upload,
                Phase::AssessmentMcq => Screen::Quiz,
                Phase::Interview => Screen::Interview,
                Phase::Report => Screen::Report,
            },
        };

        let keep_going = match screen {
            Screen::Auth => auth(controller, term).await?,
            Screen::Onboarding => onboarding(controller, term).await?,
            Screen::Dashboard => dashboard(controller, term).await?,
            Screen::Upload => upload(controller, term).await?,
            Screen::Quiz => quiz(controller, term).await?,
            Screen::Interview => interview(controller, term).await?,
            Screen::Report => report(controller, term).await?,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

async fn auth(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    println!("\nWelcome Back. [l]ogin, [r]egister, [q]uit");
    let Some(choice) = term.ask("> ").await? else {
        return Ok(false);
    };
    if choice == "q" {
        return Ok(false);
    }
    let Some(email) = term.ask("Email: ").await? else {
        return Ok(false);
    };
    let Some(password) = term.ask("Password: ").await? else {
        return Ok(false);
    };

    match choice.as_str() {
        "r" => match controller.register(&email, &password).await {
            Ok(message) => println!("{message}. Please sign in."),
            Err(e) => show_error(&e),
        },
        _ => match controller.login(&email, &password).await {
            Ok(LoginOutcome::Ready) => {
                if let Some(user) = controller.user() {
                    println!("Signed in as {}.", user.name);
                }
            }
            Ok(LoginOutcome::NeedsOnboarding) => println!("Let's set up your profile."),
            Err(e) => show_error(&e),
        },
    }
    Ok(true)
}

async fn read_profile(term: &mut Terminal) -> Result<Option<ProfileForm>> {
    let mut form = ProfileForm::default();
    for (label, field) in [
        ("Name: ", &mut form.name),
        ("Phone: ", &mut form.phone),
        ("College: ", &mut form.college),
        ("Graduation year: ", &mut form.year),
        ("Skills (comma separated): ", &mut form.skills),
    ] {
        match term.ask(label).await? {
            Some(value) => *field = value,
            None => return Ok(None),
        }
    }
    Ok(Some(form))
}

async fn onboarding(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    let Some(path) = term.ask("Resume PDF to prefill skills (blank to skip): ").await? else {
        return Ok(false);
    };
    if !path.is_empty() {
        if let Some(analysis) = upload_file(controller, &path).await {
            println!("Detected skills: {}", analysis.join(", "));
        }
    }
    let Some(form) = read_profile(term).await? else {
        return Ok(false);
    };
    if let Err(e) = controller.save_profile(form).await {
        show_error(&e);
    }
    Ok(true)
}

async fn upload_file(controller: &mut Controller, path: &str) -> Option<Vec<String>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("! Could not read {path}: {e}");
            return None;
        }
    };
    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume.pdf".to_string());
    match controller.upload_resume(&file_name, Bytes::from(bytes)).await {
        Ok(analysis) => Some(analysis.skills),
        Err(e) => {
            println!("! Upload failed: {}", e.user_message());
            None
        }
    }
}

async fn dashboard(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    term.shown = 0;
    println!("\nDashboard");
    println!("  1) Resume based interview");
    println!("  2) Domain interview");
    println!("  3) HR & behavioral interview");
    println!("  4) Past results");
    println!("  5) Edit profile");
    println!("  6) Logout");
    println!("  q) Quit");
    let Some(choice) = term.ask("> ").await? else {
        return Ok(false);
    };

    let result = match choice.as_str() {
        "1" => controller.start_module(Module::Resume).await.map(|_| ()),
        "2" => {
            let domains = controller.domains().join(", ");
            let Some(domain) = term.ask(&format!("Domain ({domains}): ")).await? else {
                return Ok(false);
            };
            controller
                .start_module(Module::Domain(domain))
                .await
                .map(|_| ())
        }
        "3" => {
            println!("Common questions to prepare for:");
            for prompt in controller.behavioral_prompts() {
                println!("  - {} (key points: {})", prompt.prompt(), prompt.keywords().join(", "));
            }
            controller.start_module(Module::Common).await.map(|_| ())
        }
        "4" => controller.history().await.map(|results| {
            if results.is_empty() {
                println!("No results yet.");
            }
            for r in results {
                println!("{} {}", r.date.unwrap_or_default(), r.scores);
            }
        }),
        "5" => match read_profile(term).await? {
            Some(form) => controller.save_profile(form).await,
            None => return Ok(false),
        },
        "6" => {
            let confirm = term.ask("Are you sure you want to logout? [y/N] ").await?;
            if confirm.as_deref() == Some("y") {
                controller.logout().await;
            }
            Ok(())
        }
        "q" => return Ok(false),
        _ => Ok(()),
    };
    if let Err(e) = result {
        show_error(&e);
    }
    Ok(true)
}

async fn upload(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    if let Some(analysis) = controller.session().analysis.clone() {
        println!(
            "ATS score: {}/100, skills found: {}",
            analysis.score,
            analysis.skills.len()
        );
        let Some(choice) = term.ask("[c]ontinue to assessment, [b]ack: ").await? else {
            return Ok(false);
        };
        if choice == "b" {
            controller.return_to_dashboard();
        } else if let Err(e) = controller.continue_after_upload().await {
            show_error(&e);
        }
        return Ok(true);
    }

    let Some(path) = term.ask("Path to your resume PDF ('back' to leave): ").await? else {
        return Ok(false);
    };
    if path == "back" {
        controller.return_to_dashboard();
    } else if !path.is_empty() {
        upload_file(controller, &path).await;
    }
    Ok(true)
}

/// Zero-based option index for a 1-based menu entry, `None` unless within 1..=len.
fn parse_option(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

async fn quiz(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    let Some(question) = controller.session().current_mcq().cloned() else {
        controller.return_to_dashboard();
        return Ok(true);
    };
    println!("\n{}", question.prompt());
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
    let Some(input) = term.ask("Answer ('back' to leave): ").await? else {
        return Ok(false);
    };
    if input == "back" {
        controller.return_to_dashboard();
        return Ok(true);
    }
    let Some(choice) = parse_option(&input, question.options().len()) else {
        println!("! Enter an option number.");
        return Ok(true);
    };

    match controller.answer_mcq(choice).await {
        Ok(FlowStep::CategoryChanged(category)) => {
            println!("\nNext section: {}", category.pool_key());
        }
        Ok(_) => {}
        Err(e) => {
            term.print_conversation(controller);
            show_error(&e);
        }
    }
    Ok(true)
}

async fn interview(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    term.print_conversation(controller);

    if controller.interview_needs_start() {
        let Some(input) = term.ask("[enter] retry, 'back' to leave: ").await? else {
            return Ok(false);
        };
        if input == "back" {
            controller.return_to_dashboard();
        } else if let Err(e) = controller.start_interview().await {
            term.print_conversation(controller);
            show_error(&e);
        }
        return Ok(true);
    }

    println!("[{}]", turn_label(controller.session()));
    let Some(input) = term.ask("Your answer ('/voice', '/back'): ").await? else {
        return Ok(false);
    };
    let result = match input.as_str() {
        "/back" => {
            controller.return_to_dashboard();
            return Ok(true);
        }
        "/voice" => controller.answer_by_voice().await,
        text => controller.answer_interview(text).await,
    };
    if let Err(e) = result {
        term.print_conversation(controller);
        show_error(&e);
    }
    Ok(true)
}

fn print_report(summary: &ReportSummary) {
    println!("\nPerformance Report ({})", summary.context);
    println!("  Interview rating: {}/10", summary.interview_score);
    println!("  MCQ performance:  {}", summary.mcq_score);
    println!("  Feedback:");
    for line in summary.feedback_lines() {
        println!("   - {line}");
    }
    println!("  Suggested resources:");
    for r in &summary.recommendations {
        println!("   - [{}] {} {}", r.kind, r.title, r.link);
    }
}

async fn report(controller: &mut Controller, term: &mut Terminal) -> Result<bool> {
    term.print_conversation(controller);
    match controller.report() {
        Ok(summary) => print_report(&summary),
        Err(e) => show_error(&e),
    }

    let Some(choice) = term
        .ask("[e]xport PDF, [s]ave results, [d]ashboard: ")
        .await?
    else {
        return Ok(false);
    };
    match choice.as_str() {
        "e" => match controller.export_report().await {
            Ok(path) => println!("Saved {}", path.display()),
            Err(e) => show_error(&e),
        },
        "s" => match controller.save_results().await {
            Ok(()) => println!("Results saved."),
            Err(e) => show_error(&e),
        },
        "d" => controller.return_to_dashboard(),
        _ => {}
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option_maps_menu_entries_to_indices() {
        assert_eq!(parse_option("1", 4), Some(0));
        assert_eq!(parse_option(" 4 ", 4), Some(3));
    }

    #[test]
    fn test_parse_option_rejects_out_of_range_and_garbage() {
        assert_eq!(parse_option("0", 4), None);
        assert_eq!(parse_option("5", 4), None);
        assert_eq!(parse_option("-1", 4), None);
        assert_eq!(parse_option("b", 4), None);
        assert_eq!(parse_option("", 4), None);
    }
}
