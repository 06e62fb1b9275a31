use std::path::PathBuf;

use bank::{Database, database::DEFAULT_BUSY_TIMEOUT};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "DATABASE_PATH", default_value = "food.db")]
    database: PathBuf,

    /// Only create the schema and categories.
    #[arg(long)]
    no_test_users: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let database = Database::open(args.database.clone(), DEFAULT_BUSY_TIMEOUT).await?;
    let report = seed::seed_database(&database, !args.no_test_users).await?;

    println!("New Categories: {}", report.new_categories);
    println!("New Users: {}", report.new_users);

    Ok(())
}
