use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for the tablet relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:6010")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a tablet address as master
    Register {
        /// IP or IP:PORT (or localhost[:PORT])
        ip: String,
    },
    /// Check whether a master is registered
    Status,
    /// Ping the relay
    Hello,
    /// Send a GET through the relay
    Send {
        /// Path on the target, e.g. /status
        path: String,

        /// Target alias or address
        #[arg(long, default_value = "master")]
        to: String,

        /// Identity reported to the relay
        #[arg(long, default_value = "relay-cli")]
        sender: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Register { ip } => {
            let res = client
                .post(format!("{}/api/master-tablet/register", cli.url))
                .json(&json!({ "payload": { "ip": ip } }))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/api/master-tablet/register", cli.url))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Hello => {
            let res = client.get(format!("{}/api/hello", cli.url)).send().await?;
            println!("{}", res.text().await?);
        }
        Commands::Send { path, to, sender } => {
            let path = path.trim_start_matches('/');
            let res = client
                .get(format!("{}/api/proxy/{}", cli.url, path))
                .header("send-to", to)
                .header("sender", sender)
                .send()
                .await?;
            let status = res.status();
            let body = res.bytes().await?;
            println!("Status: {}", status);
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
