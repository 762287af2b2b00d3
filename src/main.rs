use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use smb_stage_config::convert::background::{import_background, load_background};
use smb_stage_config::stage::edit::{add_object, edit_collision_grid, GridEdit, DEFAULT_FIT_MARGIN};
use smb_stage_config::tools::{export_gma_tpl, export_stagedef, ConverterOutput};
use smb_stage_config::{export_background, export_stage_config, ExportConfig, SceneDocument};

const HELP: &str = "\
smb_stage_config

USAGE:
  smb_stage_config config <scene.json> [-o <out.xml>] [--settings <export.json>]
  smb_stage_config background <scene.json> [-o <out.xml>] [--settings <export.json>]
  smb_stage_config import-background <scene.json> <background.xml> [-o <scene-out.json>]
  smb_stage_config add <scene.json> <name> [--parent <object>] [-o <scene-out.json>]
  smb_stage_config grid <scene.json> <subdivide|unsubdivide|fit|copy> <item-group>
                   [--margin <percent>] [--from <item-group>] [-o <scene-out.json>]
  smb_stage_config stagedef <scene.json> [--raw] [--settings <export.json>]
  smb_stage_config gmatpl <scene.json> [--settings <export.json>]

Paths in the export settings starting with // are relative to the scene file.
add creates an empty with the defaults of the kind its name is tagged with, e.g. [IG] Platform.
grid fit uses a 50% margin unless --margin is given; grid copy takes the grid of --from.
Set RUST_LOG=debug for per-object output.
";

struct Scene {
    doc: SceneDocument,
    path: PathBuf,
    base_dir: PathBuf,
    config: ExportConfig,
}

impl Scene {
    fn load(path: PathBuf, settings: Option<PathBuf>) -> Result<Self> {
        let doc = SceneDocument::from_json_file(&path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        let config = match settings {
            Some(settings) => ExportConfig::from_json_file(&settings)
                .with_context(|| format!("Failed to read export settings {}", settings.display()))?,
            None => doc.export.clone(),
        };
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Ok(Self {
            doc,
            path,
            base_dir,
            config,
        })
    }

    /// Write the scene back to its own file unless `output` names another one.
    fn save(&self, output: Option<PathBuf>) -> Result<PathBuf> {
        let destination = output.unwrap_or_else(|| self.path.clone());
        self.doc
            .save(&destination)
            .with_context(|| format!("Failed to write scene {}", destination.display()))?;
        Ok(destination)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }

    let command = args
        .subcommand()?
        .ok_or_else(|| anyhow!("Missing command\n\n{}", HELP))?;
    let output: Option<PathBuf> = args.opt_value_from_str(["-o", "--output"])?;
    let settings: Option<PathBuf> = args.opt_value_from_str("--settings")?;
    let raw = args.contains("--raw");
    let parent: Option<String> = args.opt_value_from_str("--parent")?;
    let margin: Option<f64> = args.opt_value_from_str("--margin")?;
    let from: Option<String> = args.opt_value_from_str("--from")?;

    match command.as_str() {
        "config" => {
            let mut scene = Scene::load(args.free_from_str()?, settings)?;
            finish(args);
            if let Some(output) = output {
                scene.config.config_path = output.to_string_lossy().into_owned();
            }
            let path = export_stage_config(&mut scene.doc, &scene.config, &scene.base_dir)?;
            println!("{}", path.display());
        }
        "background" => {
            let mut scene = Scene::load(args.free_from_str()?, settings)?;
            finish(args);
            if let Some(output) = output {
                scene.config.background_path = output.to_string_lossy().into_owned();
            }
            let path = export_background(&mut scene.doc, &scene.config, &scene.base_dir)?;
            println!("{}", path.display());
        }
        "import-background" => {
            let mut scene = Scene::load(args.free_from_str()?, None)?;
            let background: PathBuf = args.free_from_str()?;
            finish(args);

            let root = load_background(&background)?;
            let count = import_background(&mut scene.doc, &root)?;
            // Later exports merge the same file
            scene.doc.export.background_import_path = Some(background.to_string_lossy().into_owned());

            let destination = scene.save(output)?;
            println!("Imported {} proxies into {}", count, destination.display());
        }
        "add" => {
            let mut scene = Scene::load(args.free_from_str()?, None)?;
            let name: String = args.free_from_str()?;
            finish(args);

            let kind = add_object(&mut scene.doc, &name, parent.as_deref())?;
            let destination = scene.save(output)?;
            println!("Added {} '{}' to {}", kind, name, destination.display());
        }
        "grid" => {
            let mut scene = Scene::load(args.free_from_str()?, None)?;
            let action: String = args.free_from_str()?;
            let group: String = args.free_from_str()?;
            finish(args);

            let edit = match action.as_str() {
                "subdivide" => GridEdit::Subdivide,
                "unsubdivide" => GridEdit::Unsubdivide,
                "fit" => GridEdit::Fit {
                    margin_percent: margin.unwrap_or(DEFAULT_FIT_MARGIN),
                },
                "copy" => GridEdit::CopyFrom(
                    from.as_deref()
                        .ok_or_else(|| anyhow!("grid copy needs --from <item-group>"))?,
                ),
                other => return Err(anyhow!("Unknown grid action '{}'\n\n{}", other, HELP)),
            };
            let grid = edit_collision_grid(&mut scene.doc, &group, edit)?;
            let destination = scene.save(output)?;
            println!(
                "Collision grid of '{}' in {}: start {} {}, step {} {}, count {} {}",
                group,
                destination.display(),
                grid.start.x,
                grid.start.y,
                grid.step.x,
                grid.step.y,
                grid.count[0],
                grid.count[1]
            );
        }
        "stagedef" => {
            let mut scene = Scene::load(args.free_from_str()?, settings)?;
            finish(args);
            export_stage_config(&mut scene.doc, &scene.config, &scene.base_dir)?;
            let result = export_stagedef(&scene.config, &scene.base_dir, raw)?;
            report(&result)?;
        }
        "gmatpl" => {
            let scene = Scene::load(args.free_from_str()?, settings)?;
            finish(args);
            let result = export_gma_tpl(&scene.config, &scene.base_dir)?;
            report(&result)?;
        }
        other => return Err(anyhow!("Unknown command '{}'\n\n{}", other, HELP)),
    }
    Ok(())
}

fn finish(args: pico_args::Arguments) {
    let remaining = args.finish();
    if !remaining.is_empty() {
        log::warn!("Ignoring unused arguments: {:?}", remaining);
    }
}

fn report(result: &ConverterOutput) -> Result<()> {
    for line in &result.lines {
        println!("{}", line);
    }
    if result.has_diagnostics() {
        log::warn!(
            "{} reported {} warnings/errors:\n{}",
            result.converter.display_name(),
            result.diagnostics.len(),
            result.diagnostics.join("\n")
        );
    }
    if !result.success {
        return Err(anyhow!("{} exited with an error", result.converter.display_name()));
    }
    Ok(())
}
