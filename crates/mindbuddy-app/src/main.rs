//! MindBuddy - wellness mentorship app core
//!
//! Demo binary running scripted scenarios against the in-memory mock
//! backends, so the whole core can be exercised without a server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mindbuddy_app::{App, Config};
use mindbuddy_core::{
    Catalog, Credentials, DeliveryStatus, MockIdentityProvider, MockMessageLog, Role,
};
use mindbuddy_messaging::MessageKey;
use mindbuddy_session::{Overlay, Tab};

#[derive(Parser)]
#[command(
    name = "mindbuddy",
    about = "Wellness mentorship app core - scripted demo scenarios",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted student day: login, tasks, chat, a quiz, the store
    Demo,

    /// Print the built-in content catalog as JSON
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Demo => run_demo().await?,
        Commands::Catalog => {
            println!("{}", serde_json::to_string_pretty(&Catalog::default())?);
        }
    }

    Ok(())
}

async fn run_demo() -> anyhow::Result<()> {
    let provider = Arc::new(
        MockIdentityProvider::new()
            .with_profile("alex@example.com", "hunter2", Role::Student, "Alex")
            .with_profile("sarah@example.com", "mentor-pw", Role::Mentor, "Sarah Chen"),
    );
    let log = Arc::new(MockMessageLog::new());

    let mut app = App::new(Config::default(), provider, log.clone());

    // -- login --
    let identity = app
        .login(
            Role::Student,
            &Credentials::new("alex@example.com", "hunter2"),
        )
        .await?;
    println!("logged in as {} ({})", identity.display_name, identity.role);
    println!(
        "starting out: {} XP, pet happiness {}",
        app.xp().unwrap_or(0),
        app.happiness().unwrap_or(0)
    );

    // -- daily tasks --
    for task_id in ["t2", "t3", "t4"] {
        match app.complete_task(task_id) {
            Ok(event) => println!("completed {task_id}: +{} XP", event.xp()),
            Err(err) => println!("task {task_id}: {err}"),
        }
    }

    // -- chat with the mentor --
    app.navigate(Tab::Chat)?;
    app.open_overlay(Overlay::Chat)?;

    let key = app.send_message("Hi Sarah! I finished my breathing exercise.").await?;
    log.post_remote("That's wonderful, Alex! How did it feel?", Role::Mentor);
    if let MessageKey::Remote(id) = key {
        log.set_status(id, DeliveryStatus::Read);
    }
    app.pump_chat()?;

    println!("\nconversation:");
    for message in app.messages()? {
        println!("  [{:?}] {}: {}", message.status, message.sender, message.text);
    }
    app.close_overlay()?;

    // -- a quiz --
    app.navigate(Tab::Learn)?;
    app.start_lesson("l3")?;
    app.answer("q1", 1)?;
    app.answer("q2", 2)?;
    app.answer("q3", 2)?;
    let outcome = loop {
        match app.advance_lesson()? {
            mindbuddy_learning::LessonOutcome::NextQuestion { index, total } => {
                println!("quiz: question {}/{}", index + 1, total);
            }
            outcome => break outcome,
        }
    };
    println!("quiz outcome: {outcome:?}");

    // -- the store --
    app.open_overlay(Overlay::Store)?;
    app.purchase("apple")?;
    let happiness = app.feed("apple")?;
    println!("fed the pet an apple, happiness now {happiness}");
    app.close_overlay()?;

    println!(
        "\nend of day: {} XP, pet {} ({:?}), mod1 progress {}%",
        app.xp().unwrap_or(0),
        app.happiness().unwrap_or(0),
        app.pet_mood().unwrap_or(mindbuddy_app::PetMood::NeedsCare),
        app.module_progress("mod1").map(|p| p.percent).unwrap_or(0),
    );

    app.logout().await;
    Ok(())
}
