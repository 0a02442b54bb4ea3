//! Accelerate CLI - Command-line client for the Accelerate daemon

mod output;
mod rpc;
mod session;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::{json, Value};
use std::path::PathBuf;

use output::{ChainRow, MentorRequestRow, ProfileRow, StreamRow, VentureRow};
use rpc::{with_token, RpcClient};
use session::StoredSession;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "accelerate")]
#[command(about = "Accelerate program CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "ACCELERATE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Where the signed-in session is kept
    #[arg(long, env = "ACCELERATE_SESSION_FILE", default_value = session::DEFAULT_SESSION_FILE)]
    session_file: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, sign in and out
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Application wizard
    #[command(subcommand)]
    Apply(ApplyCommand),

    /// Ventures
    #[command(subcommand)]
    Venture(VentureCommand),

    /// Triage a submitted application
    Triage {
        venture_id: String,
        /// self_serve, prime, core or select
        #[arg(short, long)]
        outcome: String,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show the latest screening review
    Review { venture_id: String },

    /// Approval chain
    #[command(subcommand)]
    Approval(ApprovalCommand),

    /// Agreement
    #[command(subcommand)]
    Agreement(AgreementCommand),

    /// Streams and deliverables
    #[command(subcommand)]
    Stream(StreamCommand),

    /// Sessions, mentor requests and engagement hours
    #[command(subcommand)]
    Engage(EngageCommand),

    /// Role dashboard
    Dashboard,

    /// Routes visible to the signed-in role
    Nav,

    /// Super-admin operations
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum AuthCommand {
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "entrepreneur")]
        role: String,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signout,
    /// Show the current session
    Whoami,
}

#[derive(Subcommand)]
enum ApplyCommand {
    /// Save one wizard step; data is a JSON object
    Step { step: String, data: String },
    /// Show the saved draft
    Draft,
    /// Submit the application; support needs is an optional JSON object
    Submit {
        #[arg(long)]
        support_needs: Option<String>,
    },
}

#[derive(Subcommand)]
enum VentureCommand {
    List {
        /// Filter by status (repeatable)
        #[arg(short, long)]
        status: Vec<String>,
    },
    Get { venture_id: String },
    Mine,
    Complete { venture_id: String },
}

#[derive(Subcommand)]
enum ApprovalCommand {
    Chain { venture_id: String },
    Pending,
    Approve(DecisionArgs),
    Reject(DecisionArgs),
}

#[derive(Args)]
struct DecisionArgs {
    item_id: String,
    #[arg(short, long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum AgreementCommand {
    Get { venture_id: String },
    Accept { agreement_id: String },
    Decline { agreement_id: String },
}

#[derive(Subcommand)]
enum StreamCommand {
    List { venture_id: String },
    Update {
        stream_id: String,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        quarter: Option<String>,
        #[arg(long)]
        deliverable: Option<String>,
        /// done, on_it or need_help
        #[arg(long)]
        self_status: Option<String>,
        /// learn, connect, do or other
        #[arg(long)]
        support: Option<String>,
        #[arg(long)]
        support_other: Option<String>,
        /// red, yellow, green or complete
        #[arg(long)]
        rag: Option<String>,
    },
    /// Set a deliverable's status
    Deliverable { deliverable_id: String, status: String },
}

#[derive(Subcommand)]
enum EngageCommand {
    RecordSession {
        venture_id: String,
        #[arg(long)]
        session_type: String,
        #[arg(long)]
        duration_minutes: Option<i64>,
        #[arg(long)]
        recording_url: Option<String>,
    },
    Sessions { venture_id: String },
    RequestMentor {
        stream_id: String,
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        details: Option<String>,
    },
    MentorRequests,
    RespondMentor { request_id: String, status: String },
    Log {
        venture_id: String,
        stream_id: String,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "0")]
        hours: i64,
    },
    Logs { venture_id: String },
    Hours { venture_id: String },
}

#[derive(Subcommand)]
enum AdminCommand {
    Profiles,
    Maintenance,
}

struct App {
    client: RpcClient,
    session_file: PathBuf,
}

impl App {
    /// Call an authenticated method with the stored token
    async fn authed(&self, method: &str, params: Value) -> Result<Value> {
        let stored = session::require(&self.session_file)?;
        self.client.call(method, with_token(&stored.token, params)).await
    }
}

fn parse_json(raw: &str, what: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{} must be valid JSON", what))
}

fn print_table<T>(value: Value) -> Result<()>
where
    T: tabled::Tabled + for<'de> serde::Deserialize<'de>,
{
    println!("{}", output::table::<T>(value)?);
    Ok(())
}

fn print_json(value: &Value) {
    println!("{}", output::pretty(value));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let app = App {
        client: RpcClient::new(cli.rpc_url),
        session_file: session::resolve_path(&cli.session_file),
    };

    match cli.command {
        Commands::Auth(cmd) => auth(&app, cmd).await,
        Commands::Apply(cmd) => apply(&app, cmd).await,
        Commands::Venture(cmd) => venture(&app, cmd).await,
        Commands::Triage { venture_id, outcome, notes } => {
            let result = app
                .authed(
                    "review.triage.v1",
                    json!({ "venture_id": venture_id, "outcome": outcome, "notes": notes }),
                )
                .await?;
            println!(
                "{} venture is now {}",
                "✓".green(),
                result["venture"]["status"].as_str().unwrap_or("?").bold()
            );
            print_table::<ChainRow>(result["chain"].clone())
        }
        Commands::Review { venture_id } => {
            print_json(&app.authed("review.get.v1", json!({ "venture_id": venture_id })).await?);
            Ok(())
        }
        Commands::Approval(cmd) => approval(&app, cmd).await,
        Commands::Agreement(cmd) => agreement(&app, cmd).await,
        Commands::Stream(cmd) => stream(&app, cmd).await,
        Commands::Engage(cmd) => engage(&app, cmd).await,
        Commands::Dashboard => {
            print_json(&app.authed("dashboard.get.v1", json!({})).await?);
            Ok(())
        }
        Commands::Nav => {
            let token = session::load(&app.session_file)?.map(|s| s.token);
            let nav = app
                .client
                .call("nav.routes.v1", json!({ "session_token": token }))
                .await?;
            print_json(&nav);
            Ok(())
        }
        Commands::Admin(AdminCommand::Profiles) => {
            print_table::<ProfileRow>(app.authed("admin.profiles.v1", json!({})).await?)
        }
        Commands::Admin(AdminCommand::Maintenance) => {
            let result = app.authed("admin.maintenance.v1", json!({})).await?;
            println!("{}", "✓ Maintenance completed".green());
            print_json(&result);
            Ok(())
        }
    }
}

async fn auth(app: &App, cmd: AuthCommand) -> Result<()> {
    match cmd {
        AuthCommand::Signup { email, password, name, role, organization, phone } => {
            let profile = app
                .client
                .call(
                    "auth.signup.v1",
                    json!({
                        "email": email,
                        "password": password,
                        "full_name": name,
                        "role": role,
                        "organization": organization,
                        "phone": phone,
                    }),
                )
                .await?;
            println!("{} Signed up as {}", "✓".green(), profile["id"].as_str().unwrap_or("?").bold());
        }
        AuthCommand::Signin { email, password } => {
            let result = app
                .client
                .call("auth.signin.v1", json!({ "email": email, "password": password }))
                .await?;
            let stored = StoredSession::from_rpc(&result["session"])?;
            session::save(&app.session_file, &stored)?;
            println!(
                "{} Signed in as {} ({})",
                "✓".green(),
                stored.full_name.bold(),
                stored.role.cyan()
            );
        }
        AuthCommand::Signout => {
            if session::load(&app.session_file)?.is_some() {
                // The local file goes even if the daemon already forgot the session
                if let Err(e) = app.authed("auth.signout.v1", json!({})).await {
                    eprintln!("{} {}", "warning:".yellow(), e);
                }
            }
            session::clear(&app.session_file)?;
            println!("{} Signed out", "✓".green());
        }
        AuthCommand::Whoami => {
            print_json(&app.authed("auth.session.v1", json!({})).await?);
        }
    }
    Ok(())
}

async fn apply(app: &App, cmd: ApplyCommand) -> Result<()> {
    match cmd {
        ApplyCommand::Step { step, data } => {
            let data = parse_json(&data, "Step data")?;
            app.authed("application.save_step.v1", json!({ "step": step, "data": data }))
                .await?;
            println!("{} Saved step {}", "✓".green(), step.bold());
        }
        ApplyCommand::Draft => print_json(&app.authed("application.draft.v1", json!({})).await?),
        ApplyCommand::Submit { support_needs } => {
            let support_needs = support_needs
                .map(|raw| parse_json(&raw, "Support needs"))
                .transpose()?;
            let venture = app
                .authed("application.submit.v1", json!({ "support_needs": support_needs }))
                .await?;
            println!(
                "{} Application submitted: {}",
                "✓".green(),
                venture["id"].as_str().unwrap_or("?").bold()
            );
        }
    }
    Ok(())
}

async fn venture(app: &App, cmd: VentureCommand) -> Result<()> {
    match cmd {
        VentureCommand::List { status } => {
            let ventures = app.authed("venture.list.v1", json!({ "statuses": status })).await?;
            print_table::<VentureRow>(ventures)?;
        }
        VentureCommand::Get { venture_id } => {
            print_json(&app.authed("venture.get.v1", json!({ "venture_id": venture_id })).await?);
        }
        VentureCommand::Mine => match app.authed("venture.mine.v1", json!({})).await? {
            Value::Null => println!("{}", "No venture yet".yellow()),
            venture => print_json(&venture),
        },
        VentureCommand::Complete { venture_id } => {
            app.authed("venture.complete.v1", json!({ "venture_id": venture_id }))
                .await?;
            println!("{} Venture {} completed", "✓".green(), venture_id.bold());
        }
    }
    Ok(())
}

async fn approval(app: &App, cmd: ApprovalCommand) -> Result<()> {
    let (args, decision) = match cmd {
        ApprovalCommand::Chain { venture_id } => {
            return print_table::<ChainRow>(
                app.authed("approval.chain.v1", json!({ "venture_id": venture_id })).await?,
            );
        }
        ApprovalCommand::Pending => {
            let pending = app.authed("approval.pending.v1", json!({})).await?;
            let items: Vec<Value> = pending
                .as_array()
                .map(|list| list.iter().map(|p| p["item"].clone()).collect())
                .unwrap_or_default();
            return print_table::<ChainRow>(Value::Array(items));
        }
        ApprovalCommand::Approve(args) => (args, "approved"),
        ApprovalCommand::Reject(args) => (args, "rejected"),
    };

    let outcome = app
        .authed(
            "approval.decide.v1",
            json!({ "item_id": args.item_id, "decision": decision, "notes": args.notes }),
        )
        .await?;
    println!(
        "{} Item {}; venture is {}",
        "✓".green(),
        decision.bold(),
        outcome["venture_status"].as_str().unwrap_or("?").bold()
    );
    if let Some(id) = outcome["agreement"]["id"].as_str() {
        println!("  Agreement {} created", id.cyan());
    }
    Ok(())
}

async fn agreement(app: &App, cmd: AgreementCommand) -> Result<()> {
    let (agreement_id, response) = match cmd {
        AgreementCommand::Get { venture_id } => {
            match app.authed("agreement.get.v1", json!({ "venture_id": venture_id })).await? {
                Value::Null => println!("{}", "No agreement yet".yellow()),
                found => print_json(&found),
            }
            return Ok(());
        }
        AgreementCommand::Accept { agreement_id } => (agreement_id, "accept"),
        AgreementCommand::Decline { agreement_id } => (agreement_id, "decline"),
    };

    let outcome = app
        .authed(
            "agreement.respond.v1",
            json!({ "agreement_id": agreement_id, "response": response }),
        )
        .await?;
    print_json(&outcome);
    Ok(())
}

async fn stream(app: &App, cmd: StreamCommand) -> Result<()> {
    match cmd {
        StreamCommand::List { venture_id } => {
            print_table::<StreamRow>(
                app.authed("stream.list.v1", json!({ "venture_id": venture_id })).await?,
            )?;
        }
        StreamCommand::Update {
            stream_id,
            owner,
            quarter,
            deliverable,
            self_status,
            support,
            support_other,
            rag,
        } => {
            let outcome = app
                .authed(
                    "stream.update.v1",
                    json!({
                        "stream_id": stream_id,
                        "owner_name": owner,
                        "target_quarter": quarter,
                        "end_deliverable": deliverable,
                        "self_status": self_status,
                        "support_type": support,
                        "support_type_other": support_other,
                        "rag_status": rag,
                    }),
                )
                .await?;
            println!(
                "{} Stream updated; overall RAG {}",
                "✓".green(),
                outcome["overall_rag"].as_str().unwrap_or("-").bold()
            );
        }
        StreamCommand::Deliverable { deliverable_id, status } => {
            app.authed(
                "deliverable.update.v1",
                json!({ "deliverable_id": deliverable_id, "status": status }),
            )
            .await?;
            println!("{} Deliverable {} is {}", "✓".green(), deliverable_id, status.bold());
        }
    }
    Ok(())
}

async fn engage(app: &App, cmd: EngageCommand) -> Result<()> {
    match cmd {
        EngageCommand::RecordSession { venture_id, session_type, duration_minutes, recording_url } => {
            let recorded = app
                .authed(
                    "session.record.v1",
                    json!({
                        "venture_id": venture_id,
                        "session_type": session_type,
                        "duration_minutes": duration_minutes,
                        "recording_url": recording_url,
                    }),
                )
                .await?;
            println!("{} Session {} recorded", "✓".green(), recorded["id"].as_str().unwrap_or("?"));
        }
        EngageCommand::Sessions { venture_id } => {
            print_json(&app.authed("session.list.v1", json!({ "venture_id": venture_id })).await?);
        }
        EngageCommand::RequestMentor { stream_id, mentor_id, details } => {
            let request = app
                .authed(
                    "mentor.request.v1",
                    json!({ "stream_id": stream_id, "mentor_id": mentor_id, "request_details": details }),
                )
                .await?;
            println!("{} Mentor request {} sent", "✓".green(), request["id"].as_str().unwrap_or("?"));
        }
        EngageCommand::MentorRequests => {
            print_table::<MentorRequestRow>(app.authed("mentor.list.v1", json!({})).await?)?;
        }
        EngageCommand::RespondMentor { request_id, status } => {
            app.authed("mentor.respond.v1", json!({ "request_id": request_id, "status": status }))
                .await?;
            println!("{} Request {} is {}", "✓".green(), request_id, status.bold());
        }
        EngageCommand::Log { venture_id, stream_id, action, hours } => {
            app.authed(
                "engagement.log.v1",
                json!({
                    "venture_id": venture_id,
                    "stream_id": stream_id,
                    "action_type": action,
                    "hours_consumed": hours,
                }),
            )
            .await?;
            println!("{} Logged {}h of {}", "✓".green(), hours, action.bold());
        }
        EngageCommand::Logs { venture_id } => {
            print_json(&app.authed("engagement.list.v1", json!({ "venture_id": venture_id })).await?);
        }
        EngageCommand::Hours { venture_id } => {
            print_json(&app.authed("engagement.hours.v1", json!({ "venture_id": venture_id })).await?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_repeatable_status_filter() {
        let cli = Cli::try_parse_from([
            "accelerate",
            "venture",
            "list",
            "--status",
            "submitted",
            "--status",
            "under_review",
        ])
        .unwrap();

        match cli.command {
            Commands::Venture(VentureCommand::List { status }) => {
                assert_eq!(status, vec!["submitted", "under_review"]);
            }
            _ => panic!("expected venture list"),
        }
        assert_eq!(cli.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_parse_reject_with_notes() {
        let cli = Cli::try_parse_from(["accelerate", "approval", "reject", "item-1", "-n", "not ready"])
            .unwrap();

        match cli.command {
            Commands::Approval(ApprovalCommand::Reject(args)) => {
                assert_eq!(args.item_id, "item-1");
                assert_eq!(args.notes.as_deref(), Some("not ready"));
            }
            _ => panic!("expected approval reject"),
        }
    }

    #[test]
    fn test_step_data_must_be_json() {
        assert!(parse_json("{\"current_product\": \"Pickles\"}", "Step data").is_ok());
        assert!(parse_json("not json", "Step data").is_err());
    }
}
