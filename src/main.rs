#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use gingham::{config::RosterConfig, roster::fetch_students};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RosterConfig::from_env();

    match fetch_students(&config).await {
        Ok(students) => {
            info!(count = students.len(), "fetched roster");
            for student in &students {
                println!(
                    "{}\t{}\t{}\t{}",
                    student.id, student.full_name, student.class, student.phone_number
                );
            }
        }
        Err(e) => {
            error!(?e, "unable to fetch roster");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
