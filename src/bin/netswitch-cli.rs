use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "netswitch-cli")]
#[command(about = "Control CLI for the netswitch daemon", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer key, if the daemon has `api.api_key` set.
    #[arg(short, long, env = "NETSWITCH_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show settings and the last measurement
    Info,
    /// Replace thresholds and probe parameters
    Configure {
        /// RTT threshold in milliseconds
        #[arg(long)]
        rtt: f64,
        /// Packet loss threshold in percent
        #[arg(long)]
        loss: f64,
        /// Echo requests per round
        #[arg(long)]
        count: i64,
        /// Milliseconds between echo requests
        #[arg(long)]
        interval: i64,
        /// Rounds per measurement
        #[arg(long)]
        rounds: i64,
    },
    /// Switch operating mode (auto, main, reserve)
    Mode { mode: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let res = match cli.command {
        Commands::Info => {
            client
                .get(format!("{}/get_info", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Configure {
            rtt,
            loss,
            count,
            interval,
            rounds,
        } => {
            let body = json!({
                "rtt_settings_ms": rtt,
                "packet_loss_percent": loss,
                "pinger_count": count,
                "pinger_interval_ms": interval,
                "ping_blocks_num": rounds,
            });
            client
                .post(format!("{}/configure", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?
        }
        Commands::Mode { mode } => {
            client
                .post(format!("{}/set_network_mode", cli.url))
                .headers(headers)
                .json(&json!({ "network_switch_mode": mode }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
