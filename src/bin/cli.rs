use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use tollgate::cli::{create_admin, purge_expired_sessions, set_role};
use tollgate_config::DatabaseConfig;
use tollgate_core::Role;
use tollgate_db::{PgPool, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "tollgate-cli")]
#[command(about = "Tollgate CLI - Administrative tools for Tollgate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Full name of the administrator
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Change the role of an existing account
    SetRole {
        /// Email address of the account
        #[arg(short = 'e', long)]
        email: String,

        /// New role: user, editor or admin
        #[arg(short = 'r', long)]
        role: Role,
    },
    /// Delete refresh sessions whose expiry has passed
    PurgeSessions,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::CreateAdmin {
            email,
            full_name,
            password,
        } => handle_create_admin(&pool, email, full_name, password).await,
        Commands::SetRole { email, role } => handle_set_role(&pool, &email, role).await,
        Commands::PurgeSessions => handle_purge_sessions(&pool).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn handle_create_admin(
    pool: &PgPool,
    email: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    // Use provided values or prompt interactively
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let full_name = match full_name {
        Some(full_name) => full_name,
        None => Input::new().with_prompt("Full name").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let user = create_admin(pool, &email, &full_name, &password).await?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {}", user.id);
    println!("   Email: {}", user.email);
    println!("   Name: {}", user.full_name);
    Ok(())
}

async fn handle_set_role(pool: &PgPool, email: &str, role: Role) -> anyhow::Result<()> {
    let user = set_role(pool, email, role).await?;

    println!("✅ {} is now {}", user.email, user.role);
    println!("   The new role applies from the user's next login.");
    Ok(())
}

async fn handle_purge_sessions(pool: &PgPool) -> anyhow::Result<()> {
    let purged = purge_expired_sessions(pool).await?;
    println!("✅ Purged {} expired refresh session(s)", purged);
    Ok(())
}
