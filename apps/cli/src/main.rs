use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fwdl_core::device::DeviceProfile;
use fwdl_core::protocol::TransportStatus;
use fwdl_core::session::{DownloadReport, FwdlSession, SessionConfig};
use fwdl_core::transport::{MockSession, WriteFault};
use fwdl_core::{BlockPlan, DeviceMetadata, FirmwareImage};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Meter firmware download (FWDL) tool", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the header fields of a firmware image
    Info {
        /// Path to the firmware image
        image: PathBuf,
    },

    /// Show how an image splits into blocks
    Plan {
        /// Path to the firmware image
        image: PathBuf,

        /// Block size negotiated with the device
        #[arg(long, default_value_t = fwdl_core::device::STANDARD_BLOCK_SIZE)]
        block_size: usize,
    },

    /// Run a download against a simulated meter
    DryRun {
        /// Path to the firmware image
        image: PathBuf,

        /// Device profile (TOML)
        #[arg(long)]
        device: Option<PathBuf>,

        /// Session settings (TOML); command-line flags override them
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fail the write of this block (1-based) once
        #[arg(long)]
        fail_at: Option<usize>,

        /// Injected failure is a dropped link instead of a busy status
        #[arg(long, requires = "fail_at")]
        link_down: bool,

        /// Report link failures during block writes as resumable
        #[arg(long)]
        retry: bool,

        /// Number of blocks already committed
        #[arg(long)]
        resume: Option<usize>,

        /// Stage the image without activating it
        #[arg(long)]
        no_activate: bool,

        /// Only write blocks START..=END (1-based)
        #[arg(long, num_args = 2, value_names = ["START", "END"], conflicts_with_all = ["resume", "no_activate"])]
        range: Option<Vec<usize>>,
    },
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match run(args.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Info { image } => {
            show_info(&image)?;
            Ok(true)
        }
        Command::Plan { image, block_size } => {
            show_plan(&image, block_size)?;
            Ok(true)
        }
        Command::DryRun {
            image,
            device,
            config,
            fail_at,
            link_down,
            retry,
            resume,
            no_activate,
            range,
        } => {
            let profile = match device {
                Some(path) => DeviceProfile::load_from_file(&path)
                    .with_context(|| format!("loading device profile {}", path.display()))?,
                None => DeviceProfile::default(),
            };
            let mut config = match config {
                Some(path) => SessionConfig::load_from_file(&path)
                    .with_context(|| format!("loading session config {}", path.display()))?,
                None => SessionConfig::default(),
            };
            config.image_path = Some(image.display().to_string());
            config.allow_retry |= retry;
            if let Some(resume) = resume {
                config.resume_block = resume;
            }
            if no_activate {
                config.activate = false;
            }

            let device = profile.build();
            let block_size = device.fwdl_block_size();
            let mock = MockSession::new();
            if let Some(block) = fail_at {
                if block == 0 {
                    bail!("--fail-at takes a 1-based block number");
                }
                let fault = if link_down {
                    WriteFault::LinkDown
                } else {
                    WriteFault::Status(TransportStatus::Busy)
                };
                let offset = u32::try_from((block - 1) * block_size)
                    .context("--fail-at is beyond any addressable block")?;
                mock.fail_write_at(offset, fault);
            }

            info!(
                image = %image.display(),
                family = ?profile.family,
                block_size,
                "Starting dry run against simulated meter"
            );

            let session = FwdlSession::new(mock.clone(), device);
            let report = match range.as_deref() {
                Some(&[start, end]) => session.download_block_range(&image, start, end)?,
                Some(_) => bail!("--range takes exactly two block numbers"),
                None => session.run(&config)?,
            };

            print_report(&report, mock.get_writes().len());
            Ok(report.is_success())
        }
    }
}

fn show_info(path: &Path) -> Result<()> {
    let image = FirmwareImage::load(path)?;

    println!("File:            {}", path.display());
    println!("Length:          {} bytes", image.len());
    println!("CRC:             0x{:04X}", image.crc());
    println!("Firmware type:   {} (tag {})", image.firmware_type(), image.firmware_type().tag());
    println!("Version:         {}", image.version());
    println!(
        "Hardware range:  {} .. {}",
        image.hardware_range_low(),
        image.hardware_range_high()
    );
    println!("Device class:    0x{:08X}", image.device_class());
    Ok(())
}

fn show_plan(path: &Path, block_size: usize) -> Result<()> {
    let image = FirmwareImage::load(path)?;
    let Some(plan) = BlockPlan::new(image.len(), block_size) else {
        bail!("invalid block size {}", block_size);
    };

    println!(
        "{} bytes in {} blocks of {} bytes",
        image.len(),
        plan.total_blocks(),
        plan.block_size()
    );
    for index in 0..plan.total_blocks() {
        println!(
            "  block {:>5}  offset {:>8}  len {:>5}",
            index + 1,
            plan.block_offset(index),
            plan.block_len(index)
        );
    }
    Ok(())
}

fn print_report(report: &DownloadReport, writes: usize) {
    println!("Outcome:         {}", report.outcome);
    println!(
        "Blocks:          {} of {} committed ({} writes sent)",
        report.resume_block, report.total_blocks, writes
    );
    if let Some(point) = report.failure {
        println!("Stopped at:      {}", point);
    }
    if report.is_resumable() {
        println!("Resume with:     --resume {}", report.resume_block);
    }
}
