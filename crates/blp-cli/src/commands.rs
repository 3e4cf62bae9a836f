use std::path::Path;

use anyhow::Context;
use blp_diff::{DiffOptions, DiffProvider, TreeDiffer};
use blp_edit::{EditAction, Patcher};
use blp_merge::{EntityOutcome, MergeReport, MergeSession, Merger};
use blp_module::{
    load_base, load_sources, CatalogExporter, ExportMetadata, LauncherData, MergeConfig, ModuleError,
    ModuleExporter,
};
use blp_xml::WriteOptions;
use colored::Colorize;

use crate::cli::*;

const EXIT_INVALID_BASE: u8 = 1;
const EXIT_MISSING_BASE_DOCUMENT: u8 = 2;
const EXIT_MISSING_LAUNCHER_DATA: u8 = 3;
const EXIT_FAILURE: u8 = 4;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Diff(args)) => cmd_diff(args, &cli.format),
        Some(Command::Apply(args)) => cmd_apply(args, &cli.format),
        None => cmd_merge(cli.merge, cli.verbose, &cli.format),
    }
}

/// Map a failed run to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ModuleError>() {
        Some(ModuleError::InvalidBaseDir(_)) => EXIT_INVALID_BASE,
        Some(ModuleError::MissingBaseDocument(_)) => EXIT_MISSING_BASE_DOCUMENT,
        Some(ModuleError::MissingLauncherData(_) | ModuleError::NoDocumentsDir) => EXIT_MISSING_LAUNCHER_DATA,
        _ => EXIT_FAILURE,
    }
}

/// File config first, then command-line overrides.
fn resolve_config(args: &MergeArgs) -> anyhow::Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::default(),
    };
    if let Some(base) = &args.base {
        config.base_dir = base.clone();
    }
    if let Some(path) = &args.launcher_data {
        config.launcher_data = Some(path.clone());
    }
    if let Some(name) = &args.patch_name {
        config.patch_name = name.clone();
    }
    Ok(config)
}

fn cmd_merge(args: MergeArgs, verbose: bool, format: &OutputFormat) -> anyhow::Result<()> {
    let text = matches!(format, OutputFormat::Text);
    let config = resolve_config(&args)?;
    config.validate()?;
    let modules_dir = config.modules_dir();

    if text {
        println!("Loading base items from {}", config.base_items_path().display().to_string().bold());
    }
    let base = load_base(&config)?;

    let needs_launcher = args.mods.is_empty() || !args.no_launcher_update;
    let mut launcher = if needs_launcher {
        Some(LauncherData::load(config.launcher_data_path()?)?)
    } else {
        None
    };
    let mods = match &launcher {
        Some(launcher) if args.mods.is_empty() => {
            if text {
                println!(
                    "No mod list specified, reading {} to determine mod list and order",
                    launcher.path().display()
                );
            }
            launcher.selected_sources(&modules_dir, &config.patch_name)?
        }
        _ => args.mods.clone(),
    };

    let sources = load_sources(&modules_dir, &mods, &config.entity_tag)?;
    let merger = Merger::new(TreeDiffer::new(DiffOptions {
        normalize_whitespace: config.normalize_whitespace,
    }));
    let mut session = MergeSession::new(base);
    let report = merger.run(&mut session, &sources)?;
    if text {
        print_report(&report, verbose);
    }

    let (output, merged) = session.finish();
    let dependencies: Vec<String> = config.base_modules.iter().cloned().chain(merged).collect();
    let metadata = ExportMetadata::new(&config.patch_name, dependencies);
    let out = ModuleExporter::new(&modules_dir).export(&output, &metadata)?;

    if let Some(launcher) = launcher.as_mut().filter(|_| !args.no_launcher_update) {
        launcher.register(&config.patch_name)?;
        launcher.save()?;
        if text {
            println!("Updated {}", launcher.path().display());
        }
    }

    match format {
        OutputFormat::Text => {
            println!(
                "{} Wrote {} ({} entities, {} skipped actions) to {}",
                "✓".green().bold(),
                metadata.name.yellow(),
                output.len(),
                report.skipped_actions(),
                out.display()
            );
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "module": metadata.name,
                "path": out,
                "dependencies": metadata.dependencies,
                "entities": output.len(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn print_report(report: &MergeReport, verbose: bool) {
    for line in report_lines(report, verbose) {
        println!("{line}");
    }
}

/// Per-entity progress lines. Scripts and skipped actions only appear when
/// `verbose`; the summary carries the skip count either way.
fn report_lines(report: &MergeReport, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for source in &report.sources {
        lines.push(format!("Patching items from {}:", source.source.bold()));
        for entity in &source.entities {
            match &entity.outcome {
                EntityOutcome::Added => lines.push(format!("  {} ... {}", entity.id, "added".green())),
                EntityOutcome::Merged { script, skipped } => {
                    lines.push(format!("  {} ... {}", entity.id, "merged".cyan()));
                    if verbose {
                        lines.extend(script_lines(script));
                        for skip in skipped {
                            lines.push(format!("    {} {} ({})", "skipped".yellow(), skip.action, skip.reason));
                        }
                    }
                }
                EntityOutcome::Removed { script } => {
                    lines.push(format!("  {} ... {}", entity.id, "removed".red()));
                    if verbose {
                        lines.extend(script_lines(script));
                    }
                }
            }
        }
    }
    lines
}

fn script_lines(script: &[EditAction]) -> impl Iterator<Item = String> + '_ {
    script.iter().map(|action| format!("    {}", action.to_string().dimmed()))
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let base = read_document(&args.base)?;
    let modified = read_document(&args.modified)?;
    let differ = TreeDiffer::new(DiffOptions {
        normalize_whitespace: !args.strict_whitespace,
    });
    let script = differ.diff(&base, &modified);

    match format {
        OutputFormat::Text if script.is_empty() => println!("No differences."),
        OutputFormat::Text => {
            for action in &script {
                println!("{action}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&script)?),
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let script: Vec<EditAction> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", args.script.display()))?;
    let mut target = read_document(&args.target)?;

    let report = Patcher::new().patch_in_place(&script, &mut target);
    match &args.output {
        Some(path) => blp_xml::write_file(path, &target, &WriteOptions::default())?,
        None => print!("{}", blp_xml::to_string(&target, &WriteOptions::default())?),
    }

    // The document may be on stdout, so the summary goes to stderr.
    match format {
        OutputFormat::Text => {
            eprintln!("{} Applied {} of {} actions", "✓".green(), report.applied(), script.len());
            for (index, reason) in report.skipped() {
                eprintln!("  {} {} ({})", "skipped".yellow(), script[index], reason);
            }
        }
        OutputFormat::Json => {
            let skipped: Vec<_> = report
                .skipped()
                .map(|(index, reason)| serde_json::json!({ "index": index, "action": &script[index], "reason": reason }))
                .collect();
            let summary = serde_json::json!({
                "applied": report.applied(),
                "total": script.len(),
                "skipped": skipped,
            });
            eprintln!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<blp_tree::Element> {
    blp_xml::parse_file(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blpatch.toml");
        std::fs::write(&path, "base_dir = \"/from/file\"\npatch_name = \"FilePatch\"\n").unwrap();

        let args = MergeArgs {
            config: Some(path),
            patch_name: Some("FlagPatch".into()),
            ..MergeArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/from/file"));
        assert_eq!(config.patch_name, "FlagPatch");
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let err = anyhow::Error::new(ModuleError::InvalidBaseDir("x".into()));
        assert_eq!(exit_code(&err), 1);
        let err = anyhow::Error::new(ModuleError::MissingBaseDocument("x".into())).context("loading");
        assert_eq!(exit_code(&err), 2);
        let err = anyhow::Error::new(ModuleError::MissingLauncherData("x".into()));
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 4);
    }

    #[test]
    fn merge_run_writes_module_and_updates_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let modules = dir.path().join("Modules");
        let write = |rel: &str, contents: &str| {
            let path = modules.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        };
        write(
            "SandBoxCore/ModuleData/spitems.xml",
            r#"<Items><Item id="sword_01" price="100"/></Items>"#,
        );
        write(
            "ModA/SubModule.xml",
            r#"<Module><Id value="ModA"/><Xmls><XmlNode><XmlName id="Items" path="items"/></XmlNode></Xmls></Module>"#,
        );
        write("ModA/ModuleData/items.xml", r#"<Items><Item id="sword_01" price="150"/></Items>"#);
        let launcher_path = dir.path().join("LauncherData.xml");
        std::fs::write(
            &launcher_path,
            "<UserData><SingleplayerData><ModDatas>\
             <UserModData><Id>ModA</Id><IsSelected>true</IsSelected></UserModData>\
             </ModDatas></SingleplayerData></UserData>",
        )
        .unwrap();

        let args = MergeArgs {
            base: Some(dir.path().to_path_buf()),
            launcher_data: Some(launcher_path.clone()),
            ..MergeArgs::default()
        };
        cmd_merge(args, false, &OutputFormat::Text).unwrap();

        let patched = blp_xml::read_catalog(
            modules.join("zzzzMergedPatch").join("ModuleData").join("patchitems.xml"),
            "Item",
        )
        .unwrap();
        assert_eq!(patched.get("sword_01").unwrap().attr("price"), Some("150"));

        let launcher = LauncherData::load(&launcher_path).unwrap();
        let ids: Vec<_> = launcher.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["ModA", "zzzzMergedPatch"]);
    }

    #[test]
    fn merge_without_launcher_data_fails_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let items = dir.path().join("Modules/SandBoxCore/ModuleData/spitems.xml");
        std::fs::create_dir_all(items.parent().unwrap()).unwrap();
        std::fs::write(&items, "<Items/>").unwrap();

        let args = MergeArgs {
            base: Some(dir.path().to_path_buf()),
            launcher_data: Some(dir.path().join("absent.xml")),
            ..MergeArgs::default()
        };
        let err = cmd_merge(args, false, &OutputFormat::Text).unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn skipped_actions_only_listed_when_verbose() {
        let node = blp_tree::Address::root("Items").child("Item", 3);
        let action = EditAction::DeleteNode { node: node.clone() };
        let report = MergeReport {
            sources: vec![blp_merge::SourceReport {
                source: "BetterSwords".into(),
                rank: 0,
                entities: vec![blp_merge::EntityReport {
                    id: "sword_01".into(),
                    outcome: EntityOutcome::Merged {
                        script: vec![action.clone()],
                        skipped: vec![blp_merge::SkippedAction {
                            action,
                            reason: blp_edit::SkipReason::Unresolved { address: node },
                        }],
                    },
                }],
            }],
        };

        let quiet = report_lines(&report, false);
        assert_eq!(quiet.len(), 2);
        assert!(quiet.iter().all(|line| !line.contains("skipped")));
        assert!(quiet[1].contains("sword_01"));

        let verbose = report_lines(&report, true);
        assert_eq!(verbose.len(), 4);
        assert!(verbose[3].contains("skipped"));
    }
}
