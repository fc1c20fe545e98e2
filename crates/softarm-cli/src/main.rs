//! softarm CLI - inspect and edit soft-robot joint chains
//!
//! Works on XML joints files and JSON documents (chosen by extension).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::debug;
use softarm_editor::{EditorSettings, MacroScript, Session};
use softarm_ir::{AnchorSpec, Vec3};
use softarm_math::Point3;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "softarm")]
#[command(about = "Soft-robot kinematic chain tools", long_about = None)]
struct Cli {
    /// Editor settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the joints of a chain file
    Info {
        /// Chain file (.xml or .json)
        file: PathBuf,
    },
    /// Print global poses as 4x4 matrices
    Pose {
        /// Chain file
        file: PathBuf,
        /// Only this joint (0 = base)
        #[arg(short, long)]
        index: Option<usize>,
        /// Anchor: translation then XYZ rotation in degrees
        #[arg(
            long,
            num_args = 6,
            allow_negative_numbers = true,
            value_names = ["TX", "TY", "TZ", "RX", "RY", "RZ"]
        )]
        anchor: Option<Vec<f64>>,
    },
    /// Write a chain of straight default joints
    New {
        /// Output file
        output: PathBuf,
        /// Number of joints
        #[arg(short, long, default_value_t = 1)]
        joints: usize,
    },
    /// Bend one joint
    Bend {
        /// Chain file
        file: PathBuf,
        /// Joint index
        #[arg(short, long)]
        index: usize,
        /// Bend about x
        #[arg(long, allow_negative_numbers = true)]
        u: f64,
        /// Bend about y
        #[arg(long, allow_negative_numbers = true)]
        v: f64,
        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove one joint
    Remove {
        /// Chain file
        file: PathBuf,
        /// Joint index
        #[arg(short, long)]
        index: usize,
        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert between XML and JSON (format determined by extension)
    Convert {
        /// Input chain file
        input: PathBuf,
        /// Output chain file
        output: PathBuf,
    },
    /// Replay a bend macro and print the final tip pose
    Play {
        /// Chain file
        file: PathBuf,
        /// Macro file, one `index u v` step per line
        script: PathBuf,
        /// Save the bent chain here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the effective settings as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => EditorSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => EditorSettings::default(),
    };
    debug!("settings: {settings:?}");

    match cli.command {
        Commands::Info { file } => show_info(settings, &file)?,
        Commands::Pose {
            file,
            index,
            anchor,
        } => show_poses(settings, &file, index, anchor.as_deref())?,
        Commands::New { output, joints } => new_chain(settings, &output, joints)?,
        Commands::Bend {
            file,
            index,
            u,
            v,
            output,
        } => {
            let mut session = open(settings, &file)?;
            session.bend(index, u, v)?;
            save(&mut session, output.as_deref().unwrap_or(&file))?;
        }
        Commands::Remove {
            file,
            index,
            output,
        } => {
            let mut session = open(settings, &file)?;
            let id = session
                .chain()
                .joint(index)
                .map(|joint| joint.id())
                .with_context(|| {
                    format!(
                        "no joint at index {index} ({} joints)",
                        session.chain().len()
                    )
                })?;
            session.delete(id)?;
            save(&mut session, output.as_deref().unwrap_or(&file))?;
        }
        Commands::Convert { input, output } => {
            let mut session = open(settings, &input)?;
            save(&mut session, &output)?;
        }
        Commands::Play {
            file,
            script,
            output,
        } => play_macro(settings, &file, &script, output.as_deref())?,
        Commands::Config => print!("{}", settings.to_toml_string()?),
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn open(settings: EditorSettings, path: &Path) -> Result<Session> {
    let mut session = Session::new(settings)?;
    session
        .open(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(session)
}

fn save(session: &mut Session, path: &Path) -> Result<()> {
    session
        .save_as(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} joint(s) to {}", session.chain().len(), path.display());
    Ok(())
}

fn show_info(settings: EditorSettings, file: &Path) -> Result<()> {
    let session = open(settings, file)?;
    let chain = session.chain();

    println!("softarm chain: {}", file.display());
    println!("  Joints: {}", chain.len());
    if chain.is_empty() {
        return Ok(());
    }

    println!(
        "\n  {:>3}  {:>6}  {:>8}  {:>8}  {:>8}  {:>8}  {:>7}  color",
        "#", "id", "height", "radius", "u", "v", "markers"
    );
    for (i, joint) in chain.joints().iter().enumerate() {
        let size = joint.size();
        let axis = joint.axis();
        let color = joint
            .color()
            .map(|c| format!("({}, {}, {})", c.red, c.green, c.blue))
            .unwrap_or_else(|| "unset".to_string());
        println!(
            "  {:>3}  {:>6}  {:>8.3}  {:>8.3}  {:>8.3}  {:>8.3}  {:>7}  {}",
            i,
            joint.id(),
            size.height,
            size.radius,
            axis.u,
            axis.v,
            joint.sphere_count(),
            color
        );
    }

    let tip = chain
        .global_pose(chain.len() - 1)?
        .apply_point(&Point3::origin());
    println!("\n  Tip: ({:.3}, {:.3}, {:.3})", tip.x, tip.y, tip.z);
    Ok(())
}

fn show_poses(
    settings: EditorSettings,
    file: &Path,
    index: Option<usize>,
    anchor: Option<&[f64]>,
) -> Result<()> {
    let mut session = open(settings, file)?;
    if let Some(&[tx, ty, tz, rx, ry, rz]) = anchor {
        session.set_anchor(&AnchorSpec {
            translation: Vec3::new(tx, ty, tz),
            rotation: Vec3::new(rx, ry, rz),
        });
    }

    let chain = session.chain();
    let indices: Vec<usize> = match index {
        Some(i) => vec![i],
        None => (0..chain.len()).collect(),
    };
    for i in indices {
        println!("{}", chain.query(i)?);
    }
    Ok(())
}

fn new_chain(settings: EditorSettings, output: &Path, joints: usize) -> Result<()> {
    let mut session = Session::new(settings)?;
    for _ in 0..joints {
        session.add_joint();
    }
    save(&mut session, output)
}

fn play_macro(
    settings: EditorSettings,
    file: &Path,
    script: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mut session = open(settings, file)?;
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("reading {}", script.display()))?;
    let script = MacroScript::parse(&text)?;

    session.play(&script, std::thread::sleep)?;

    let chain = session.chain();
    if chain.is_empty() {
        println!("Chain is empty");
    } else {
        println!("{}", chain.query(chain.len() - 1)?);
    }

    if let Some(path) = output {
        save(&mut session, path)?;
    }
    Ok(())
}
