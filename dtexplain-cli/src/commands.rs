//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::ExplainArgs;
use dtexplain_core::config::{ExplainConfig, load_config, workspace_config_path};
use dtexplain_core::{ExplanationReport, Explainer, ModelBundle, Record};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle a CLI subcommand.
pub(crate) async fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Explain(args) => handle_explain(args, workspace).await,
        Commands::Path { bundle, index } => handle_path(&bundle, index, workspace),
        Commands::Config { action } => handle_config(action, workspace),
    }
}

fn load_workspace_config(workspace: &Path) -> anyhow::Result<ExplainConfig> {
    load_config(Some(workspace), None).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut ExplainConfig, args: &ExplainArgs) {
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let Some(seed) = args.seed {
        config.questions.seed = Some(seed);
    }
    if args.no_sanity {
        config.questions.sanity_questions = false;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
}

/// `{root}/{prefix}/example_{index}.txt`, or `.json` for JSON reports.
pub(crate) fn report_path(root: &Path, prefix: &str, index: usize, json: bool) -> PathBuf {
    let extension = if json { "json" } else { "txt" };
    root.join(prefix).join(format!("example_{index}.{extension}"))
}

/// Write `report` under `root/prefix`, creating directories as needed.
pub(crate) fn write_report(
    report: &ExplanationReport,
    root: &Path,
    prefix: &str,
    json: bool,
) -> anyhow::Result<PathBuf> {
    let path = report_path(root, prefix, report.index, json);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = if json {
        serde_json::to_string_pretty(report)?
    } else {
        report.render()
    };
    std::fs::write(&path, content)?;
    Ok(path)
}

async fn handle_explain(args: ExplainArgs, workspace: &Path) -> anyhow::Result<()> {
    let mut config = load_workspace_config(workspace)?;
    apply_overrides(&mut config, &args);

    let bundle = ModelBundle::load(&workspace.join(&args.bundle))?;
    let output_root = workspace.join(&config.output.dir);
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| args.strategy.to_string());
    let explainer = Explainer::from_bundle(&bundle, config)?;

    let indices: Vec<usize> = match args.index {
        Some(index) => vec![index],
        None => (0..bundle.records.len()).collect(),
    };
    if indices.is_empty() {
        anyhow::bail!("Bundle {} contains no records", args.bundle.display());
    }

    for index in indices {
        let record = bundle.record(index)?;
        let report = explainer.explain(index, record, args.strategy).await?;
        let path = write_report(&report, &output_root, &prefix, args.json)?;
        info!(index, path = %path.display(), "Saved explanation");
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_path(bundle_path: &Path, index: usize, workspace: &Path) -> anyhow::Result<()> {
    let config = load_workspace_config(workspace)?;
    let bundle = ModelBundle::load(&workspace.join(bundle_path))?;
    let explainer = Explainer::from_bundle(&bundle, config)?;
    print!("{}", render_path(&explainer, bundle.record(index)?)?);
    Ok(())
}

/// Steps, the reached leaf, and the bounded feature ranges for `record`.
pub(crate) fn render_path(explainer: &Explainer, record: &Record) -> anyhow::Result<String> {
    let (path, ranges) = explainer.trace(record)?;
    let schema = explainer.schema();
    let mut out = String::new();

    for (i, step) in path.steps().iter().enumerate() {
        writeln!(
            out,
            "Step {}: {}",
            i + 1,
            step.describe_indexed(schema.encoded_name(step.feature))
        )?;
    }
    match explainer.tree().predict_class(path.leaf()) {
        Some(class) => writeln!(out, "Leaf {}: {}", path.leaf(), class)?,
        None => writeln!(out, "Leaf {}", path.leaf())?,
    }

    writeln!(out, "\nRanges:")?;
    for (feature, range) in ranges.bounded() {
        writeln!(out, "  {}: {}", schema.encoded_name(feature), range)?;
    }
    Ok(out)
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            let path = dtexplain_core::config::write_default_config(workspace)?;
            println!("Created default configuration at: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_workspace_config(workspace)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}
