use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use yatube_auth::NewAccount;
use yatube_config::{load as load_config, AppConfig};
use yatube_database::{CreateGroupRequest, GroupRepository, Post, PostRepository};
use yatube_runtime::{shutdown_signal, telemetry, BackendServices};
use yatube_web::{build_router, AppState};

#[derive(Parser)]
#[command(name = "yatube")]
#[command(about = "Yatube blog server and management commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create a community group posts can be filed under
    CreateGroup {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Register an account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Print every post with its author and group
    DumpPosts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing()?;

    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config, services).await,
        Commands::CreateGroup {
            title,
            slug,
            description,
        } => {
            let group = GroupRepository::new(services.db_pool.clone())
                .create(&CreateGroupRequest {
                    title,
                    slug,
                    description,
                })
                .await
                .context("failed to create group")?;
            println!("Created group {} ({})", group.slug, group.id);
            Ok(())
        }
        Commands::CreateUser { username, password } => {
            let user = services
                .authenticator
                .register(&NewAccount {
                    username,
                    password,
                    ..NewAccount::default()
                })
                .await
                .context("failed to create user")?;
            println!("Created user {} ({})", user.username, user.id);
            Ok(())
        }
        Commands::DumpPosts => {
            let posts = PostRepository::new(services.db_pool.clone())
                .list_all()
                .await
                .context("failed to load posts")?;
            print!("{}", format_posts(&posts));
            Ok(())
        }
    }
}

async fn run_server(config: &AppConfig, services: BackendServices) -> Result<()> {
    let state = AppState::new(services.db_pool.clone(), services.authenticator.clone(), config);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("server shut down");
    Ok(())
}

const TEXT_PREVIEW: usize = 40;

fn format_posts(posts: &[Post]) -> String {
    let mut out = format!(
        "{:<6} {:<20} {:<20} {:<20} {}\n",
        "ID", "DATE", "AUTHOR", "GROUP", "TEXT"
    );

    for post in posts {
        let group = post
            .group
            .as_ref()
            .map(|group| group.slug.as_str())
            .unwrap_or("-");
        let mut text: String = post
            .text
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(TEXT_PREVIEW)
            .collect();
        if post.text.chars().count() > TEXT_PREVIEW {
            text.push_str("...");
        }

        out.push_str(&format!(
            "{:<6} {:<20} {:<20} {:<20} {}\n",
            post.id,
            post.pub_date.format("%Y-%m-%d %H:%M"),
            post.author.username,
            group,
            text
        ));
    }

    out
}
