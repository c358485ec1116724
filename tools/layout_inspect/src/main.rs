use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roomlayout::{list_rooms, read_room_file};

#[derive(Parser, Debug)]
#[command(author, version, about = "Room layout file inspection utility", long_about = None)]
struct Args {
    /// Room file (.dat) to inspect, or a layout directory with --list
    path: PathBuf,

    /// List the rooms persisted in a layout directory instead of dumping one file
    #[arg(long)]
    list: bool,

    /// Emit records as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if args.list {
        let rooms = list_rooms(&args.path)
            .with_context(|| format!("failed to list rooms in {}", args.path.display()))?;
        for room in rooms {
            println!("{}", room);
        }
        return Ok(());
    }

    let records = read_room_file(&args.path)
        .with_context(|| format!("failed to read room file {}", args.path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!(
        "{}: {} record(s), format valid",
        args.path.display(),
        records.len()
    );
    for record in &records {
        println!(
            "  #{:<4} {:<30} pos ({:8.3}, {:8.3}, {:8.3})  rot ({:.3}, {:.3}, {:.3}, {:.3})",
            record.id,
            format!("{}/{}", record.asset_path, record.asset_name),
            record.position[0],
            record.position[1],
            record.position[2],
            record.orientation[0],
            record.orientation[1],
            record.orientation[2],
            record.orientation[3],
        );
    }

    Ok(())
}
