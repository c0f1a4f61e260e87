use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use marsplay::capture::CaptureOutcome;
use marsplay::config::MarsPlayConfig;
use marsplay::constants::PERMISSION_REQUEST_CODE;
use marsplay::orchestrator::{ScreenController, ScreenState};
use marsplay::permissions::REQUIRED_PERMISSIONS;
use marsplay::platform::{DeviceServices, Host};
use marsplay::storage::default_pictures_dir;
use marsplay::surface::PreviewOutcome;
use marsplay::testing::SyntheticHost;
use marsplay::types::SurfaceHandle;
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "marsplay")]
#[command(about = "Camera preview and still capture")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use the local webcam instead of the synthetic camera
    #[arg(long, global = true)]
    native: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take one photo and print where it was saved
    Capture {
        /// Pictures directory (the MarsPlay folder is created inside it)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the live preview until Ctrl-C
    Preview,

    /// Print the effective configuration
    Config,
}

#[derive(serde::Serialize)]
struct CaptureReport {
    path: PathBuf,
    bytes: u64,
    preview_restarted: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    marsplay::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MarsPlayConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MarsPlayConfig::load_or_default(),
    };

    match cli.command {
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Capture { output_dir, json } => {
            if let Some(dir) = output_dir {
                config.storage.pictures_directory = Some(dir);
            }
            if cli.native {
                capture_native(config, json).await
            } else {
                let host = SyntheticHost::new(default_pictures_dir());
                run_capture(ScreenController::new(host, config), json).await
            }
        }
        Commands::Preview => {
            if cli.native {
                preview_native(config)
            } else {
                let host = SyntheticHost::new(default_pictures_dir());
                run_preview(ScreenController::new(host, config))
            }
        }
    }
}

#[cfg(feature = "native")]
async fn capture_native(config: MarsPlayConfig, json: bool) -> anyhow::Result<()> {
    let host = marsplay::platform::native::NativeHost::new(default_pictures_dir());
    run_capture(ScreenController::new(host, config), json).await
}

#[cfg(not(feature = "native"))]
async fn capture_native(_config: MarsPlayConfig, _json: bool) -> anyhow::Result<()> {
    bail!("marsplay was built without the `native` feature")
}

#[cfg(feature = "native")]
fn preview_native(config: MarsPlayConfig) -> anyhow::Result<()> {
    let host = marsplay::platform::native::NativeHost::new(default_pictures_dir());
    run_preview(ScreenController::new(host, config))
}

#[cfg(not(feature = "native"))]
fn preview_native(_config: MarsPlayConfig) -> anyhow::Result<()> {
    bail!("marsplay was built without the `native` feature")
}

/// Play the host's part: make the screen visible, answer the permission
/// request and deliver the surface callbacks.
fn show_screen<H: Host>(screen: &mut ScreenController<H>) -> anyhow::Result<()> {
    screen.on_visible();

    if screen.state() == ScreenState::AwaitingPermission {
        // No dialog in a terminal: answer with what the host reports.
        let results: Vec<_> = REQUIRED_PERMISSIONS
            .iter()
            .map(|p| screen.host().permission_status(*p))
            .collect();
        screen.on_permissions_result(PERMISSION_REQUEST_CODE, &results);
    }

    if screen.state() != ScreenState::PreviewActive {
        bail!("camera preview could not be set up");
    }

    let size = screen
        .surface()
        .map(|surface| surface.size())
        .context("preview surface missing")?;
    let handle = SurfaceHandle(1);
    if let PreviewOutcome::HostFault(e) = screen.on_surface_created(handle) {
        bail!("preview failed to start: {}", e);
    }
    if let PreviewOutcome::HostFault(e) =
        screen.on_surface_changed(Some(handle), 0, size.width, size.height)
    {
        bail!("preview failed to restart: {}", e);
    }
    Ok(())
}

async fn run_capture<H: Host>(mut screen: ScreenController<H>, json: bool) -> anyhow::Result<()> {
    show_screen(&mut screen)?;

    let outcome = screen.capture().await?;
    screen.on_surface_destroyed();
    screen.on_hidden();

    match outcome {
        CaptureOutcome::Saved { path, preview } => {
            let bytes = std::fs::metadata(&path)?.len();
            if json {
                let report = CaptureReport {
                    path,
                    bytes,
                    preview_restarted: preview.is_started(),
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("Saved {} ({} bytes)", path.display(), bytes);
            }
            Ok(())
        }
        CaptureOutcome::StorageUnavailable => bail!(
            "could not create {}",
            screen.media_directory().path().display()
        ),
        CaptureOutcome::WriteFailed(e) => Err(e.into()),
    }
}

fn run_preview<H: Host>(mut screen: ScreenController<H>) -> anyhow::Result<()> {
    show_screen(&mut screen)?;

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    println!("Preview running, press Ctrl-C to stop");
    rx.recv().context("signal handler dropped")?;

    screen.on_surface_destroyed();
    screen.on_hidden();
    println!("Camera released");
    Ok(())
}
