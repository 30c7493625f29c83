use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use devicescope::api::HttpApi;
use devicescope::config::AppConfig;
use devicescope::devices::{DeleteOutcome, DeviceActions, DeviceSearch, ROW_ATTRIBUTE};
use devicescope::dom::{Host, Page, Tag};
use devicescope::panel::{self, PanelAction, SilenceRulePanel, SubmitOutcome};
use devicescope::rules::SilenceRule;
use devicescope::terminal::TerminalHost;
use devicescope::{layout, modal};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "devicescope", version, about = "Silence rules and devices from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List silence rules
    Rules,
    /// Create a silence rule
    Add(RuleArgs),
    /// Update an existing silence rule
    Edit {
        rule_id: u64,
        #[command(flatten)]
        fields: RuleArgs,
    },
    /// Flip a rule between active and inactive
    Toggle { rule_id: u64 },
    /// Delete a silence rule
    DeleteRule {
        rule_id: u64,
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a device and all its reports
    DeleteDevice {
        device_id: u64,
        hostname: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Show which device names match a search term
    Filter { term: String, names: Vec<String> },
}

#[derive(Args)]
struct RuleArgs {
    #[arg(long)]
    key_pattern: Option<String>,
    /// all, added, changed or removed
    #[arg(long)]
    event_type: Option<String>,
    #[arg(long)]
    host_pattern: Option<String>,
    #[arg(long, conflicts_with = "inactive")]
    active: bool,
    #[arg(long)]
    inactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Command::Filter { term, names } => filter(&names, &term),
        Command::Rules => list_rules(&config).await,
        Command::Add(fields) => save_rule(&config, None, &fields).await,
        Command::Edit { rule_id, fields } => save_rule(&config, Some(rule_id), &fields).await,
        Command::Toggle { rule_id } => toggle_rule(&config, rule_id).await,
        Command::DeleteRule { rule_id, yes } => delete_rule(&config, rule_id, yes).await,
        Command::DeleteDevice {
            device_id,
            hostname,
            yes,
        } => delete_device(&config, device_id, &hostname, yes).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn page(config: &AppConfig, device_names: &[&str], assume_yes: bool) -> Page<TerminalHost> {
    let mut doc = layout::dashboard(device_names, config.csrf_token.as_deref());
    if let Some(cookie) = &config.cookie {
        doc.set_cookie(cookie);
    }
    Page::new(doc, TerminalHost::new(assume_yes))
}

async fn open_panel(
    config: &AppConfig,
    assume_yes: bool,
) -> Result<(SilenceRulePanel, Page<TerminalHost>, HttpApi)> {
    let api = HttpApi::new(config)?;
    let mut page = page(config, &[], assume_yes);
    let mut panel = SilenceRulePanel::new();
    if !panel.open(&mut page, &api).await {
        bail!("Error loading rules from {}", config.base_url);
    }
    Ok((panel, page, api))
}

fn print_rule(rule: &SilenceRule) {
    let state = if rule.is_active { "active" } else { "inactive" };
    println!(
        "{:>5}  {:<8}  {:<8}  {}  (host: {})",
        rule.id,
        state,
        rule.event_type.label(),
        rule.key_pattern,
        rule.host_pattern
    );
}

async fn list_rules(config: &AppConfig) -> Result<()> {
    let (panel, _, _) = open_panel(config, true).await?;
    if panel.rules().is_empty() {
        println!("No silence rules configured.");
    }
    for rule in panel.rules() {
        print_rule(rule);
    }
    Ok(())
}

async fn save_rule(config: &AppConfig, rule_id: Option<u64>, fields: &RuleArgs) -> Result<()> {
    let (mut panel, mut page, api) = open_panel(config, true).await?;
    if let Some(rule_id) = rule_id {
        if !panel.edit(&mut page.doc, rule_id) {
            bail!("Rule {rule_id} not found");
        }
    }

    let doc = &mut page.doc;
    if let Some(key_pattern) = &fields.key_pattern {
        doc.set_value(panel::FIELD_KEY_PATTERN, key_pattern);
    }
    if let Some(event_type) = &fields.event_type {
        doc.set_value(panel::FIELD_EVENT_TYPE, event_type);
    }
    if let Some(host_pattern) = &fields.host_pattern {
        doc.set_value(panel::FIELD_HOST_PATTERN, host_pattern);
    }
    if fields.active || fields.inactive {
        doc.set_checked(panel::FIELD_IS_ACTIVE, fields.active);
    }

    match panel.submit(&mut page, &api).await {
        SubmitOutcome::Saved => {
            for rule in panel.rules() {
                print_rule(rule);
            }
            Ok(())
        }
        SubmitOutcome::Invalid(messages) => {
            for message in &messages {
                eprintln!("  {message}");
            }
            bail!("Rule was not saved");
        }
        SubmitOutcome::Failed => bail!("An error occurred while saving."),
    }
}

async fn toggle_rule(config: &AppConfig, rule_id: u64) -> Result<()> {
    let (mut panel, mut page, api) = open_panel(config, true).await?;
    if panel.rule(rule_id).is_none() {
        bail!("Rule {rule_id} not found");
    }
    panel
        .dispatch(&mut page, &api, PanelAction::Toggle(rule_id))
        .await;
    if page.host.alerts() > 0 {
        bail!("Rule {rule_id} was not toggled");
    }
    if let Some(rule) = panel.rule(rule_id) {
        print_rule(rule);
    }
    Ok(())
}

async fn delete_rule(config: &AppConfig, rule_id: u64, assume_yes: bool) -> Result<()> {
    let (mut panel, mut page, api) = open_panel(config, assume_yes).await?;
    let before = panel.rules().len();
    panel
        .dispatch(&mut page, &api, PanelAction::Delete(rule_id))
        .await;
    if page.host.alerts() > 0 {
        bail!("Rule {rule_id} was not deleted");
    }
    if panel.rules().len() < before {
        println!("Deleted rule {rule_id}");
    }
    Ok(())
}

async fn delete_device(
    config: &AppConfig,
    device_id: u64,
    hostname: &str,
    assume_yes: bool,
) -> Result<()> {
    let api = HttpApi::new(config)?;
    let mut page = page(config, &[], assume_yes);
    let mut actions = DeviceActions::new();

    actions.request_delete(&mut page.doc, device_id, hostname);
    if page.doc.text(modal::TITLE) == Some("Error") {
        bail!("{}", page.doc.inner_html(modal::MESSAGE).unwrap_or_default());
    }

    let prompt = format!(
        "Delete device \"{hostname}\"? This will permanently remove the device and all its reports."
    );
    if !page.host.confirm(&prompt) {
        actions.cancel(&mut page.doc);
        println!("Cancelled");
        return Ok(());
    }

    match actions.confirm(&mut page, &api).await {
        Some(DeleteOutcome::Deleted) => {
            println!("Deleted device {hostname}");
            Ok(())
        }
        Some(DeleteOutcome::Rejected | DeleteOutcome::Failed) => {
            bail!("{}", page.doc.inner_html(modal::MESSAGE).unwrap_or_default())
        }
        None => Ok(()),
    }
}

fn filter(names: &[String], term: &str) -> Result<()> {
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut doc = layout::dashboard(&names, None);
    let search = DeviceSearch::new();
    search.toggle(&mut doc);
    let visible = search.on_input(&mut doc, term);

    for row in doc.elements_with_tag(Tag::Row) {
        if !doc.has_class(&row, "hidden") {
            println!("{}", doc.attribute(&row, ROW_ATTRIBUTE).unwrap_or_default());
        }
    }
    tracing::info!(visible, total = names.len(), "Filtered devices");
    Ok(())
}
