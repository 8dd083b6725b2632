use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use contacts_server::config::ImportConfig;
use contacts_server::db::run_migrations;
use contacts_server::import::{ContactImporter, ImportOptions, parse_delimiter};

#[derive(Parser, Debug)]
#[command(
    name = "import_contacts",
    about = "Import contacts from a CSV file into the address book"
)]
struct Args {
    /// CSV file with a `name,email,phone` header (plus optional `address`, `photo_url`, `tags`).
    #[arg(long)]
    file: PathBuf,

    /// Single-character field delimiter.
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Overwrite contacts whose email already exists instead of skipping them.
    #[arg(long)]
    update_existing: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let delimiter = match parse_delimiter(Some(&args.delimiter)) {
        Ok(delimiter) => delimiter,
        Err(err) => {
            writeln!(io::stderr(), "error: {err}")?;
            std::process::exit(1);
        }
    };

    let bytes = match tokio::fs::read(&args.file).await {
        Ok(bytes) => bytes,
        Err(err) => {
            writeln!(io::stderr(), "error: cannot read {}: {err}", args.file.display())?;
            std::process::exit(1);
        }
    };

    let config = ImportConfig::from_env();
    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;
    run_migrations(&pool).await?;

    let options = ImportOptions {
        update_existing: args.update_existing,
        delimiter,
    };
    let summary = match ContactImporter::new(pool.clone()).import(&bytes, &options).await {
        Ok(summary) => summary,
        Err(err) => {
            writeln!(io::stderr(), "error: {err}")?;
            std::process::exit(1);
        }
    };
    pool.close().await;

    writeln!(io::stdout(), "{}", summary.report(config.error_preview_limit))?;

    Ok(())
}
