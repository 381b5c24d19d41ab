use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "garden-cli")]
#[command(about = "Command-line client for the Plant Database API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server liveness
    Health,
    /// List plants, optionally searching names and descriptions
    Plants {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one plant (by ID or name) with its locations and containers
    Plant { key: String },
    /// Simple filter over locations, containers and plant names
    Filter {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        plant_name: Option<String>,
        #[arg(long)]
        container_size: Option<String>,
        #[arg(long)]
        container_material: Option<String>,
        #[arg(long)]
        container_type: Option<String>,
        #[arg(long)]
        response_format: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Advanced query; pass a JSON body or @path to a JSON file
    Query { body: String },
    /// List queryable tables, fields, operators and formats
    Fields,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Plants { search } => {
            let mut request = client.get(format!("{}/api/plants", base));
            if let Some(q) = search {
                request = request.query(&[("q", q)]);
            }
            request.send().await?
        }
        Commands::Plant { key } => {
            let mut url = reqwest::Url::parse(&format!("{}/api/plants", base))?;
            url.path_segments_mut()
                .map_err(|_| format!("cannot use {} as a base URL", base))?
                .push(&key);
            client.get(url).send().await?
        }
        Commands::Filter {
            location,
            plant_name,
            container_size,
            container_material,
            container_type,
            response_format,
            limit,
        } => {
            let params: Vec<(&str, String)> = [
                ("location", location),
                ("plant_name", plant_name),
                ("container_size", container_size),
                ("container_material", container_material),
                ("container_type", container_type),
                ("response_format", response_format),
                ("limit", limit.map(|l| l.to_string())),
            ]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
            client
                .get(format!("{}/api/garden/filter", base))
                .query(&params)
                .send()
                .await?
        }
        Commands::Query { body } => {
            let text = match body.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)?,
                None => body,
            };
            let json: Value = serde_json::from_str(&text)?;
            client
                .post(format!("{}/api/garden/query", base))
                .json(&json)
                .send()
                .await?
        }
        Commands::Fields => client.get(format!("{}/api/garden/fields", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let pretty = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(text);

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        eprintln!("{}", pretty);
        std::process::exit(1);
    }
    println!("{}", pretty);
    Ok(())
}
