use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use casewise_core::cases::{CaseView, SolutionStep};
use casewise_core::graph::GraphReader;
use casewise_core::report::{save_report, ReportRequest};
use casewise_core::{CaseFilter, CaseStore, Config, Difficulty, Fetched};

mod app;
mod serve;

use app::App;
use serve::ServeConfig;

#[derive(Parser)]
#[command(name = "casewise")]
#[command(about = "Management case library, course knowledge graph and AI learning reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the packaged case library
    Cases {
        #[command(subcommand)]
        command: CaseCommand,
    },
    /// Query the course knowledge graph
    Graph {
        #[command(subcommand)]
        command: GraphCommand,
    },
    /// Draft an AI learning report
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Start the JSON API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum CaseCommand {
    /// List cases, optionally filtered
    List {
        #[arg(long)]
        category: Option<String>,
        /// low, medium or high
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Show one case in full
    Show { id: String },
    /// List case categories
    Categories,
}

#[derive(Subcommand)]
enum GraphCommand {
    /// All case nodes
    Cases,
    /// One case node with its related chapters and knowledge points
    Case { id: String },
    /// Module, chapter and knowledge point tree
    Tree,
    /// Modules with chapter and knowledge point counts
    Modules,
    /// Knowledge points whose name contains a keyword
    Search { keyword: String },
    /// Students with learning records
    Students,
    /// Modules in the learning records
    LearningModules,
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Report for one student
    Personal {
        student_id: String,
        /// Write the report to the report directory
        #[arg(long)]
        save: bool,
    },
    /// Report for one module
    Module {
        module_id: String,
        #[arg(long)]
        save: bool,
    },
    /// Report for the whole course
    Overall {
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Cases { command } => run_cases(&config, command),
        Commands::Graph { command } => {
            let graph = GraphReader::connect(&config.graph).await;
            run_graph(&graph, command).await?;
        }
        Commands::Report { command } => {
            let app = App::build(config).await?;
            run_report(&app, command).await?;
        }
        Commands::Serve { host, port } => {
            let serve_config = ServeConfig::from_config(&config, host, port);
            let app = App::build(config).await?;
            serve::start_server(app, serve_config).await?;
        }
        Commands::Config => {
            print!("{}", config.render());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,casewise=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// =============================================================================
// Cases
// =============================================================================

fn run_cases(config: &Config, command: CaseCommand) {
    let store = CaseStore::load(config.content.cases_path());
    if store.is_placeholder() {
        eprintln!("Case file unavailable; showing the built-in sample case.\n");
    }

    match command {
        CaseCommand::List {
            category,
            difficulty,
        } => {
            let mut filters = Vec::new();
            if let Some(category) = category {
                filters.push(CaseFilter::Category(category));
            }
            if let Some(difficulty) = difficulty {
                filters.push(CaseFilter::Difficulty(difficulty));
            }

            let cases: Vec<_> = store
                .list_all()
                .iter()
                .filter(|c| filters.iter().all(|f| f.matches(c)))
                .collect();

            if cases.is_empty() {
                println!("No matching cases.");
                return;
            }
            for case in cases {
                println!(
                    "{:<8} {:<7} {:<28} {}",
                    case.id,
                    case.difficulty.as_str(),
                    case.category,
                    case.title
                );
            }
        }
        CaseCommand::Show { id } => match store.get_by_id(&id) {
            Some(case) => print_case(&case.view()),
            None => eprintln!("No case with id '{}'.", id),
        },
        CaseCommand::Categories => {
            for category in store.categories() {
                println!("{}", category);
            }
        }
    }
}

fn print_case(view: &CaseView) {
    println!("# {} ({})", view.title, view.id);
    println!("{} | difficulty: {}\n", view.heading, view.difficulty);

    if !view.situation.is_empty() {
        println!("{}\n", view.situation);
    }
    if let Some(background) = &view.background {
        println!("Background: {}\n", background);
    }
    if !view.keywords.is_empty() {
        println!("Keywords: {}\n", view.keywords.join(", "));
    }

    for section in &view.sections {
        println!("## {}", section.title);
        for item in &section.items {
            println!("- {}", item);
        }
        println!();
    }

    println!("## Solution");
    for step in &view.solution {
        match step {
            SolutionStep::Phase(text) => println!("\n{}", text),
            SolutionStep::Step(text) => println!("- {}", text),
        }
    }

    if !view.questions.is_empty() {
        println!("\n## Questions");
        for (i, question) in view.questions.iter().enumerate() {
            println!("{}. {}", i + 1, question);
        }
    }

    println!("\n## Key points");
    for point in &view.key_points {
        println!("- {}", point);
    }
}

// =============================================================================
// Graph
// =============================================================================

async fn run_graph(graph: &GraphReader, command: GraphCommand) -> Result<(), serde_json::Error> {
    match command {
        GraphCommand::Cases => print_fetched(graph.graph_cases().await),
        GraphCommand::Case { id } => print_fetched(graph.graph_case(&id).await),
        GraphCommand::Tree => print_fetched(graph.knowledge_graph().await),
        GraphCommand::Modules => print_fetched(graph.knowledge_modules().await),
        GraphCommand::Search { keyword } => {
            print_fetched(graph.search_knowledge_points(&keyword).await)
        }
        GraphCommand::Students => print_fetched(graph.students().await),
        GraphCommand::LearningModules => print_fetched(graph.learning_modules().await),
    }
}

fn print_fetched<T: Serialize>(fetched: Fetched<T>) -> Result<(), serde_json::Error> {
    match fetched {
        Fetched::Found(data) => println!("{}", serde_json::to_string_pretty(&data)?),
        Fetched::Empty => eprintln!("No results."),
        Fetched::Unavailable => {
            eprintln!("Knowledge graph unavailable. Set NEO4J_URI and NEO4J_PASSWORD to enable it.")
        }
    }
    Ok(())
}

// =============================================================================
// Reports
// =============================================================================

async fn run_report(app: &App, command: ReportCommand) -> Result<(), Box<dyn std::error::Error>> {
    let (request, save) = match command {
        ReportCommand::Personal { student_id, save } => {
            (ReportRequest::Personal { student_id }, save)
        }
        ReportCommand::Module { module_id, save } => (ReportRequest::Module { module_id }, save),
        ReportCommand::Overall { save } => (ReportRequest::Overall, save),
    };

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Drafting {} report...", request.kind()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = app.drafter.draft_from_graph(&app.graph, &request).await;
    spinner.finish_and_clear();

    match result {
        Fetched::Found(draft) => {
            println!("{}", draft.text);
            if save && draft.is_generated() {
                let date = Local::now().date_naive();
                let path = save_report(&app.config.report.output_dir, &draft, date)?;
                eprintln!("\nSaved to {}", path.display());
            }
        }
        Fetched::Empty => eprintln!("No learning data found for this {} report.", request.kind()),
        Fetched::Unavailable => {
            eprintln!("Knowledge graph unavailable; cannot draft a learning report.")
        }
    }

    Ok(())
}
