use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::fs;
use std::sync::Arc;
use tokio::sync::Mutex;
use weft_rs::agent::AgentLoop;
use weft_rs::llm::anthropic::AnthropicGateway;
use weft_rs::llm::{Gateway, Role};
use weft_rs::patterns;
use weft_rs::store::InvoiceStore;
use weft_rs::tools::{invoice, ToolRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The model to use
    #[arg(
        short,
        long,
        global = true,
        default_value = "claude-3-7-sonnet-20250219"
    )]
    model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a structured search query from a question
    Structured {
        #[arg(short, long, default_value = "What is the capital of Israel?")]
        question: String,
    },
    /// Advertise arithmetic tools and show the requested calls
    ToolCalling {
        #[arg(short, long, default_value = "What is 2 times 3 and 9 plus 8?")]
        prompt: String,
    },
    /// Sequential joke chain with a quality gate
    Chain {
        #[arg(short, long, default_value = "cats")]
        topic: String,
    },
    /// Fan out joke/story/poem writers, aggregate their outputs
    Parallel {
        #[arg(short, long, default_value = "rugelach")]
        topic: String,
    },
    /// Classify a request and dispatch it to one handler
    Route {
        #[arg(short, long, default_value = "I want to hear a joke.")]
        input: String,
    },
    /// Plan report sections and fan out one worker per section
    Orchestrate {
        #[arg(short, long)]
        topic: String,
    },
    /// Generate/evaluate cycle until the evaluator is satisfied
    Optimize {
        #[arg(short, long, default_value = "How can I stay hydrated all day long?")]
        topic: String,
    },
    /// Tool-using financial assistant over the invoice store
    Agent {
        /// Path of the flat-file invoice database
        #[arg(short, long, default_value = "db.json")]
        db: String,

        #[arg(short, long)]
        prompt: Option<String>,
    },
}

const AGENT_PROMPT: &str = "
Can you please:

1. List all of my invoices this month.
2. Tell me which outgoing invoice has the highest amount.
3. Also, show me which incoming invoice has the highest amount.
4. Calculate the total amount of all invoices.
5. Oh, almost forgot. I bought a new MacBook Pro for the office today and it cost 2,500$. Create me an invoice for that!

Thanks!
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let gateway: Arc<dyn Gateway> = Arc::new(AnthropicGateway::new(args.model)?);

    match args.command {
        Commands::Structured { question } => {
            let query = patterns::augmented::structured_output(gateway.as_ref(), &question).await?;
            println!("{}", serde_json::to_string_pretty(&query)?);
        }
        Commands::ToolCalling { prompt } => {
            let calls = patterns::augmented::tool_calling(gateway.as_ref(), &prompt).await?;
            for call in calls {
                println!("{}({})", call.name, call.args);
            }
        }
        Commands::Chain { topic } => {
            let state = patterns::chain::run(gateway, &topic).await?;
            if state.final_joke.is_empty() {
                println!("{}\n\n(not funny enough to refine)", state.joke);
            } else {
                println!("{}", state.final_joke);
            }
        }
        Commands::Parallel { topic } => {
            let state = patterns::parallel::run(gateway, &topic).await?;
            println!("{}", state.aggregated);
        }
        Commands::Route { input } => {
            let state = patterns::routing::run(gateway, &input).await?;
            println!("{}", state.output);
        }
        Commands::Orchestrate { topic } => {
            let state = patterns::orchestrator::run(gateway, &topic).await?;
            fs::write("final_report.md", &state.final_report)?;
            println!(
                "wrote final_report.md ({} sections)",
                state.completed_sections.len()
            );
        }
        Commands::Optimize { topic } => {
            let state = patterns::optimizer::run(gateway, &topic).await?;
            fs::write(
                "suggestion.md",
                state.suggestion.as_deref().unwrap_or_default(),
            )?;
            fs::write("state.json", serde_json::to_string_pretty(&state)?)?;
            println!("wrote suggestion.md and state.json");
        }
        Commands::Agent { db, prompt } => {
            let store = Arc::new(Mutex::new(InvoiceStore::open(&db)?));
            let mut builder = ToolRegistry::builder();
            for tool in invoice::create_tools(store) {
                log::info!("registered tool: {}", tool.name());
                builder = builder.register(tool);
            }
            let registry = Arc::new(builder.build());

            let agent = AgentLoop::new(
                "invoice-assistant",
                "You are a helpful financial business assistant that can answer questions and perform actions with tools.",
                gateway,
                registry,
            )?;

            let prompt = prompt.unwrap_or_else(|| AGENT_PROMPT.to_string());
            let turns = agent.run(prompt).await?;
            for turn in &turns {
                let role = match turn.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::ToolResult => "tool",
                };
                println!("=== {} ===", role);
                if !turn.content.is_empty() {
                    println!("{}", turn.content);
                }
                for call in &turn.tool_calls {
                    println!("-> {}({})", call.name, call.args);
                }
                println!();
            }
        }
    }

    Ok(())
}
