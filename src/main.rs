//! graphplane CLI
//!
//! Thin imperative driver over the resource adapters: one subcommand per
//! lifecycle operation, printing the resulting state record as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use graphplane::config::Config;
use graphplane::provider::{
    branch::BranchState, graph::GraphState, subgraph::SubgraphState, ManagedResource, Provider,
    ReadOutcome,
};
use serde::Serialize;
use tracing::Level;

/// Version injected at compile time via GRAPHPLANE_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("GRAPHPLANE_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Manage Graphplane graphs, branches, and subgraphs
#[derive(Parser, Debug)]
#[command(name = "graphplane", version = VERSION, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage graphs
    #[command(subcommand)]
    Graph(GraphCommand),
    /// Manage branches
    #[command(subcommand)]
    Branch(BranchCommand),
    /// Manage subgraphs
    #[command(subcommand)]
    Subgraph(SubgraphCommand),
}

#[derive(Subcommand, Debug)]
enum GraphCommand {
    /// Create a graph under an account
    Create {
        /// Account slug the graph belongs to
        #[arg(long)]
        account_slug: String,
        /// Graph slug, unique within the account
        #[arg(long)]
        slug: String,
    },
    /// Fetch a graph by account slug and graph slug
    Get {
        #[arg(long)]
        account_slug: String,
        #[arg(long)]
        slug: String,
    },
    /// Fetch a graph by its raw remote identifier
    GetById {
        #[arg(long)]
        id: String,
    },
    /// Delete a graph
    Delete {
        #[arg(long)]
        account_slug: String,
        #[arg(long)]
        slug: String,
    },
    /// Adopt an existing graph from an `account_slug/graph_slug` key
    Import { id: String },
}

#[derive(Subcommand, Debug)]
enum BranchCommand {
    /// Create a branch on a graph
    Create {
        #[arg(long)]
        account_slug: String,
        #[arg(long)]
        graph_slug: String,
        /// Branch name, unique within the graph
        #[arg(long)]
        name: String,
    },
    /// Fetch a branch
    Get {
        #[arg(long)]
        account_slug: String,
        #[arg(long)]
        graph_slug: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a branch (production branches are refused by the platform)
    Delete {
        #[arg(long)]
        account_slug: String,
        #[arg(long)]
        graph_slug: String,
        #[arg(long)]
        name: String,
    },
    /// Adopt an existing branch from an
    /// `account_slug/graph_slug/branch_name` key
    Import { id: String },
}

#[derive(Subcommand, Debug)]
enum SubgraphCommand {
    /// Register a subgraph on a branch
    Create {
        #[arg(long)]
        branch_id: String,
        /// Subgraph name, unique within the branch
        #[arg(long)]
        name: String,
        /// URL of the composable service
        #[arg(long)]
        url: String,
    },
    /// Fetch a subgraph
    Get {
        #[arg(long)]
        branch_id: String,
        #[arg(long)]
        name: String,
    },
    /// Point a subgraph at a new URL (in-place update)
    SetUrl {
        #[arg(long)]
        branch_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
    },
    /// Delete a subgraph
    Delete {
        #[arg(long)]
        branch_id: String,
        #[arg(long)]
        name: String,
    },
    /// Adopt an existing subgraph from a `branch_id/subgraph_name` key
    Import { id: String },
}

fn setup_logging(level: LogLevel) {
    let Some(tracing_level) = level.to_tracing_level() else {
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    tracing::info!("graphplane {} started with log level: {:?}", VERSION, level);
}

fn print_state<S: Serialize>(state: &S) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

/// Read a record and fail loudly if the remote no longer has it. The CLI has
/// no state store to prune, so `Gone` becomes an error here.
async fn read_or_bail<R: ManagedResource>(resource: &R, state: &mut R::State) -> Result<()>
where
    R::State: Serialize,
{
    match resource.read(state).await? {
        ReadOutcome::Current => print_state(state),
        ReadOutcome::Gone => anyhow::bail!("{} not found", R::TYPE_NAME),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.log_level);

    let config = Config::load();
    let provider = Provider::new(&config)?;

    match args.command {
        Command::Graph(cmd) => run_graph(&provider, cmd).await,
        Command::Branch(cmd) => run_branch(&provider, cmd).await,
        Command::Subgraph(cmd) => run_subgraph(&provider, cmd).await,
    }
}

async fn run_graph(provider: &Provider, cmd: GraphCommand) -> Result<()> {
    let graphs = provider.graphs();
    match cmd {
        GraphCommand::Create { account_slug, slug } => {
            let mut state = GraphState::new(account_slug, slug);
            graphs.create(&mut state).await?;
            print_state(&state)
        }
        GraphCommand::Get { account_slug, slug } => {
            let mut state = GraphState::new(account_slug, slug);
            read_or_bail(&graphs, &mut state).await
        }
        GraphCommand::GetById { id } => {
            let state = graphs.read_by_id(&id).await?;
            print_state(&state)
        }
        GraphCommand::Delete { account_slug, slug } => {
            let mut state = GraphState::new(account_slug, slug);
            // Deletion is keyed by remote id, so resolve the record first.
            match graphs.read(&mut state).await? {
                ReadOutcome::Current => graphs.delete(&state).await?,
                ReadOutcome::Gone => {}
            }
            eprintln!("graph deleted");
            Ok(())
        }
        GraphCommand::Import { id } => {
            let state = graphs.import(&id).await?;
            print_state(&state)
        }
    }
}

async fn run_branch(provider: &Provider, cmd: BranchCommand) -> Result<()> {
    let branches = provider.branches();
    match cmd {
        BranchCommand::Create {
            account_slug,
            graph_slug,
            name,
        } => {
            let mut state = BranchState::new(account_slug, graph_slug, name);
            branches.create(&mut state).await?;
            print_state(&state)
        }
        BranchCommand::Get {
            account_slug,
            graph_slug,
            name,
        } => {
            let mut state = BranchState::new(account_slug, graph_slug, name);
            read_or_bail(&branches, &mut state).await
        }
        BranchCommand::Delete {
            account_slug,
            graph_slug,
            name,
        } => {
            let state = BranchState::new(account_slug, graph_slug, name);
            branches.delete(&state).await?;
            eprintln!("branch deleted");
            Ok(())
        }
        BranchCommand::Import { id } => {
            let state = branches.import(&id).await?;
            print_state(&state)
        }
    }
}

async fn run_subgraph(provider: &Provider, cmd: SubgraphCommand) -> Result<()> {
    let subgraphs = provider.subgraphs();
    match cmd {
        SubgraphCommand::Create {
            branch_id,
            name,
            url,
        } => {
            let mut state = SubgraphState::new(branch_id, name, url);
            subgraphs.create(&mut state).await?;
            print_state(&state)
        }
        SubgraphCommand::Get { branch_id, name } => {
            let mut state = SubgraphState::new(branch_id, name, "");
            read_or_bail(&subgraphs, &mut state).await
        }
        SubgraphCommand::SetUrl {
            branch_id,
            name,
            url,
        } => {
            // Resolve the remote id first; the update mutation is keyed by it.
            let mut state = subgraphs.import(&format!("{branch_id}/{name}")).await?;
            state.url = url;
            subgraphs.update(&mut state).await?;
            print_state(&state)
        }
        SubgraphCommand::Delete { branch_id, name } => {
            let mut state = SubgraphState::new(branch_id, name, "");
            match subgraphs.read(&mut state).await? {
                ReadOutcome::Current => subgraphs.delete(&state).await?,
                ReadOutcome::Gone => {}
            }
            eprintln!("subgraph deleted");
            Ok(())
        }
        SubgraphCommand::Import { id } => {
            let state = subgraphs.import(&id).await?;
            print_state(&state)
        }
    }
}
