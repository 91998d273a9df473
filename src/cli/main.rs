use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use reqwest::{Client, RequestBuilder};
use serde_json::json;

#[derive(Parser)]
#[command(name = "incident-cli")]
#[command(about = "Incident lifecycle CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    /// Bearer token presented to the service
    #[arg(short = 'k', long, env = "INCIDENT_LIFECYCLE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new incident
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List incidents
    List,

    /// Get incident details
    Get {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// Move an incident to a new status
    Update {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(short, long, value_enum)]
        status: StatusArg,
    },

    /// Attach a log entry
    Log {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(short, long)]
        message: String,
    },

    /// Delete an incident
    Delete {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// Show the identity behind the token
    Whoami,

    /// Check server health
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    InProgress,
    Resolved,
    Closed,
}

impl StatusArg {
    fn wire(self) -> &'static str {
        match self {
            StatusArg::InProgress => "IN_PROGRESS",
            StatusArg::Resolved => "RESOLVED",
            StatusArg::Closed => "CLOSED",
        }
    }
}

struct ApiClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl ApiClient {
    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.endpoint.trim_end_matches('/'), path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> anyhow::Result<()> {
        let response = builder.send().await.context("request failed")?;
        let status = response.status();

        if status == reqwest::StatusCode::NO_CONTENT {
            println!("{}", status);
            return Ok(());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("unexpected response body (HTTP {})", status))?;
        println!("{}", serde_json::to_string_pretty(&body)?);

        if !status.is_success() {
            anyhow::bail!("server answered HTTP {}", status);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = ApiClient {
        client: Client::new(),
        endpoint: cli.endpoint,
        token: cli.token,
    };

    use reqwest::Method;

    let request = match cli.command {
        Commands::Create { title, description } => api
            .request(Method::POST, "/v1/incidents")
            .json(&json!({ "title": title, "description": description })),

        Commands::List => api.request(Method::GET, "/v1/incidents"),

        Commands::Get { id } => api.request(Method::GET, &format!("/v1/incidents/{}", id)),

        Commands::Update { id, status } => api
            .request(Method::PATCH, &format!("/v1/incidents/{}", id))
            .json(&json!({ "status": status.wire() })),

        Commands::Log { id, message } => api
            .request(Method::POST, &format!("/v1/incidents/{}/logs", id))
            .json(&json!({ "message": message })),

        Commands::Delete { id } => api.request(Method::DELETE, &format!("/v1/incidents/{}", id)),

        Commands::Whoami => api.request(Method::GET, "/auth-check"),

        Commands::Health => api.request(Method::GET, "/health"),
    };

    api.send(request).await
}
