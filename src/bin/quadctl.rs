use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand};
use quadruped_servo_panel::{Delivery, PanelConfig, ServoId, ServoPanel, SERVO_COUNT};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quadctl", version, about = "Quadruped servo panel from the command line")]
struct Cli {
    /// JSON config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port of the microcontroller.
    #[arg(long)]
    port: Option<String>,

    #[arg(long)]
    baud: Option<u32>,

    /// Pose file.
    #[arg(long)]
    states: Option<PathBuf>,

    /// Log debug output; otherwise `RUST_LOG` applies, defaulting to info.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved pose names.
    List,
    /// Print each leg's servos with their panel grid cell and range.
    Layout,
    /// Print a saved pose in wire order.
    Show { name: String },
    /// Save explicit angles (FLH FLA FRH FRA BLH BLA BRH BRA) under a name.
    Save {
        name: String,
        #[arg(required = true, num_args = SERVO_COUNT, allow_negative_numbers = true)]
        angles: Vec<i64>,
    },
    /// Send a saved pose or explicit angles to the robot.
    Send(SendArgs),
    /// Send all servos to zero.
    Reset,
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Saved pose to send.
    #[arg(long, conflicts_with = "angles")]
    pose: Option<String>,

    /// Angles in wire order.
    #[arg(num_args = SERVO_COUNT, allow_negative_numbers = true)]
    angles: Vec<i64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = resolve_config(&cli)?;
    let mut panel = ServoPanel::from_config(&cfg)?;

    match cli.cmd {
        Command::List => {
            let names = panel.pose_names();
            if names.is_empty() {
                println!("no poses in {}", panel.store().path().display());
            }
            for name in names {
                println!("{name}");
            }
        }
        Command::Layout => print_layout(&panel),
        Command::Show { name } => {
            panel.load_pose(&name)?;
            print_angles(&panel);
        }
        Command::Save { name, angles } => {
            apply_angles(&mut panel, &angles)?;
            panel
                .save_current_as_pose(&name)
                .with_context(|| format!("saving pose '{name}'"))?;
            print_angles(&panel);
        }
        Command::Send(args) => {
            match (&args.pose, args.angles.is_empty()) {
                (Some(name), _) => {
                    panel.load_pose(name)?;
                }
                (None, false) => apply_angles(&mut panel, &args.angles)?,
                (None, true) => bail!("give either --pose or {SERVO_COUNT} angles"),
            }
            send(&mut panel, &cfg.serial_port)?;
        }
        Command::Reset => {
            panel.reset();
            send(&mut panel, &cfg.serial_port)?;
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<PanelConfig> {
    let mut cfg = match &cli.config {
        Some(path) => PanelConfig::load(path)?,
        None => PanelConfig::default(),
    };
    if let Some(port) = &cli.port {
        cfg.serial_port = port.clone();
    }
    if let Some(baud) = cli.baud {
        cfg.baud_rate = baud;
    }
    if let Some(states) = &cli.states {
        cfg.states_path = states.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn apply_angles(panel: &mut ServoPanel, angles: &[i64]) -> anyhow::Result<()> {
    if angles.len() != SERVO_COUNT {
        bail!("expected {SERVO_COUNT} angles, got {}", angles.len());
    }
    for (id, &value) in ServoId::ALL.iter().zip(angles) {
        let applied = panel.set_angle(*id, value);
        if i64::from(applied.value()) != value {
            tracing::warn!("{id}: {value} clamped to {applied}");
        }
    }
    Ok(())
}

fn send(panel: &mut ServoPanel, port: &str) -> anyhow::Result<()> {
    match panel.send_current_angles_to_device()? {
        Delivery::Sent(_) => {
            print_angles(panel);
            if let Some(reply) = panel.poll_reply()? {
                println!("reply: {reply}");
            }
        }
        Delivery::Offline => bail!("serial port {port} is not connected"),
    }
    Ok(())
}

fn print_angles(panel: &ServoPanel) {
    let line = ServoId::ALL
        .iter()
        .map(|id| format!("{id}={}", panel.get_angle(*id)))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
}

fn print_layout(panel: &ServoPanel) {
    for leg in panel.topology().legs() {
        println!("leg {} ({})", leg.leg.number(), leg.leg.label());
        for servo in leg.servos() {
            let cell = servo.grid_cell();
            println!(
                "  {:<24} row {} col {}  range {}..={}",
                servo.label(),
                cell.row,
                cell.column,
                servo.range.min(),
                servo.range.max()
            );
        }
    }
}
