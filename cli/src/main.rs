//! Command-line client for memos.
//!
//! Commands:
//! - signin / signup: obtain an access token
//! - me: show the signed-in user
//! - list / show: read memos
//! - create / edit / delete: write memos
//! - tags: list your tags with memo counts
//! - render: parse a Markdown file locally and show its nodes
//!
//! Configuration via environment:
//! - MEMOS_URL: Base URL of the memos server (default: http://localhost:3000)
//! - MEMOS_TOKEN: Bearer token for authentication

mod commands;
mod view;

use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs, delete::DeleteArgs, edit::EditArgs, list::ListArgs, me::MeArgs,
    render::RenderArgs, show::ShowArgs, signin::SigninArgs, signup::SignupArgs, tags::TagsArgs,
};

/// memos CLI
///
/// JSON output by default; pass --human for formatted text.
#[derive(Parser)]
#[command(name = "memos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Memos server URL
    #[arg(
        long,
        env = "MEMOS_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// Bearer token for authentication
    #[arg(long, env = "MEMOS_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print an access token
    Signin(SigninArgs),

    /// Create the host account on a fresh instance
    Signup(SignupArgs),

    /// Show the signed-in user
    Me(MeArgs),

    /// List memos visible to you
    List(ListArgs),

    /// Show a single memo
    Show(ShowArgs),

    /// Create a memo
    Create(CreateArgs),

    /// Edit a memo
    Edit(EditArgs),

    /// Archive a memo
    Delete(DeleteArgs),

    /// List your tags
    Tags(TagsArgs),

    /// Parse a Markdown file locally
    Render(RenderArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client(cli.token.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let url = cli.url.trim_end_matches('/');

    let result = match cli.command {
        Commands::Signin(args) => commands::signin::execute(&client, url, cli.human, args).await,
        Commands::Signup(args) => commands::signup::execute(&client, url, cli.human, args).await,
        Commands::Me(args) => commands::me::execute(&client, url, cli.human, args).await,
        Commands::List(args) => commands::list::execute(&client, url, cli.human, args).await,
        Commands::Show(args) => commands::show::execute(&client, url, cli.human, args).await,
        Commands::Create(args) => commands::create::execute(&client, url, cli.human, args).await,
        Commands::Edit(args) => commands::edit::execute(&client, url, cli.human, args).await,
        Commands::Delete(args) => commands::delete::execute(&client, url, cli.human, args).await,
        Commands::Tags(args) => commands::tags::execute(&client, url, cli.human, args).await,
        Commands::Render(args) => commands::render::execute(cli.human, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
