use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use pc_repair_site::config::LocaleConfig;
use pc_repair_site::locale::{LocaleResolver, Resolution};

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Management CLI for the PC repair site", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Health,
    /// Price a set of repair options
    Quote {
        /// SSD upgrade size (240, 480 or 960)
        #[arg(long)]
        ssd: Option<String>,
        #[arg(long)]
        windows: bool,
        #[arg(long)]
        deep_clean: bool,
        #[arg(long)]
        gpu_service: bool,
        #[arg(long)]
        data_rescue: bool,
    },
    /// Show how a request path would be routed (offline)
    Resolve {
        path: String,
        #[arg(long)]
        cookie: Option<String>,
        #[arg(long)]
        accept_language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Quote {
            ssd,
            windows,
            deep_clean,
            gpu_service,
            data_rescue,
        } => {
            let body = json!({
                "ssd": ssd,
                "windows": windows,
                "deepClean": deep_clean,
                "gpuService": gpu_service,
                "dataRescue": data_rescue,
            });
            let res = client
                .post(format!("{}/api/quote", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Resolve {
            path,
            cookie,
            accept_language,
        } => {
            let resolver = LocaleResolver::from_config(&LocaleConfig::default());
            let resolution =
                resolver.resolve(&path, cookie.as_deref(), accept_language.as_deref());
            println!("{}", serde_json::to_string_pretty(&describe(&resolution))?);
        }
    }

    Ok(())
}

fn describe(resolution: &Resolution) -> Value {
    json!({
        "action": match resolution {
            Resolution::Bypass => "bypass",
            Resolution::Localized(_) => "pass",
            Resolution::Redirect { .. } => "redirect",
            Resolution::Legacy { .. } => "permanent-redirect",
        },
        "status": resolution.status().map(|s| s.as_u16()),
        "location": resolution.target_path(),
        "persist": resolution.locale_to_persist().map(|l| l.as_str()),
    })
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
