//! Catguard - home security controller command line.
//!
//! Each invocation opens the store, applies one command through the
//! controller, and prints the resulting system state as JSON. The last cat
//! scan result lives only for the duration of one invocation.

use std::path::PathBuf;
use std::sync::Arc;

use catguard_control::{
    AlarmDowngrade, ArmingStatus, LoggingListener, SecurityConfig, SecurityService, Sensor,
    SensorId, SensorType,
};
use catguard_core::CoreError;
use catguard_image::{CameraImage, FakeImageClassifier, FixedClassifier, ImageClassifier};
use catguard_store::RocksStore;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Service = SecurityService<RocksStore, Box<dyn ImageClassifier>>;

#[derive(Debug, Parser)]
#[command(name = "catguard", version, about = "Home security controller")]
struct Cli {
    /// Directory holding the controller database.
    #[arg(long, env = "DATA_DIR", default_value = "./catguard-data")]
    data_dir: PathBuf,

    /// What happens to a sounding alarm when every sensor clears.
    #[arg(long, env = "CATGUARD_ALARM_DOWNGRADE", default_value_t = AlarmDowngrade::Sticky)]
    alarm_downgrade: AlarmDowngrade,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current state.
    Status,
    /// Arm the system.
    Arm {
        /// Arming mode.
        #[arg(value_enum)]
        mode: ArmMode,
    },
    /// Disarm the system and clear any alarm.
    Disarm,
    /// Manage sensors.
    Sensor {
        #[command(subcommand)]
        action: SensorAction,
    },
    /// Classify a camera image and update the alarm.
    Scan {
        /// Image file to classify.
        image: PathBuf,
        /// Classifier used for the scan.
        #[arg(long, value_enum, default_value_t = ClassifierKind::Fake)]
        classifier: ClassifierKind,
    },
}

#[derive(Debug, Subcommand)]
enum SensorAction {
    /// Register a new sensor.
    Add {
        /// Display name.
        name: String,
        /// Sensor type.
        #[arg(value_enum)]
        kind: SensorKind,
    },
    /// Remove a sensor by ID or name.
    Remove {
        /// Sensor ID or name.
        sensor: String,
    },
    /// List sensors.
    List,
    /// Mark a sensor as tripped.
    Activate {
        /// Sensor ID or name.
        sensor: String,
    },
    /// Mark a sensor as clear.
    Deactivate {
        /// Sensor ID or name.
        sensor: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ArmMode {
    Home,
    Away,
}

impl From<ArmMode> for ArmingStatus {
    fn from(mode: ArmMode) -> Self {
        match mode {
            ArmMode::Home => Self::ArmedHome,
            ArmMode::Away => Self::ArmedAway,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SensorKind {
    Door,
    Window,
    Motion,
}

impl From<SensorKind> for SensorType {
    fn from(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Door => Self::Door,
            SensorKind::Window => Self::Window,
            SensorKind::Motion => Self::Motion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassifierKind {
    /// Random answer.
    Fake,
    /// Always a cat.
    Cat,
    /// Never a cat.
    NoCat,
}

impl ClassifierKind {
    fn build(self) -> Box<dyn ImageClassifier> {
        match self {
            Self::Fake => Box::new(FakeImageClassifier::new()),
            Self::Cat => Box::new(FixedClassifier::new(true)),
            Self::NoCat => Box::new(FixedClassifier::new(false)),
        }
    }
}

/// Resolve a sensor reference: a UUID, or else an exact sensor name.
fn resolve_sensor(service: &Service, reference: &str) -> catguard_core::Result<SensorId> {
    if let Ok(sensor_id) = reference.parse::<SensorId>() {
        return Ok(sensor_id);
    }
    service
        .tracked_sensors()
        .find(|s| s.name == reference)
        .map(|s| s.sensor_id)
        .ok_or_else(|| CoreError::SensorNotFound(reference.to_string()))
}

fn run(service: &mut Service, command: Command) -> catguard_control::Result<()> {
    match command {
        Command::Status => {}
        Command::Arm { mode } => service.set_arming_status(mode.into())?,
        Command::Disarm => service.set_arming_status(ArmingStatus::Disarmed)?,
        Command::Sensor { action } => match action {
            SensorAction::Add { name, kind } => service.add_sensor(Sensor::new(name, kind.into()))?,
            SensorAction::Remove { sensor } => {
                let sensor_id = resolve_sensor(service, &sensor)?;
                service.remove_sensor(&sensor_id)?;
            }
            SensorAction::List => {}
            SensorAction::Activate { sensor } => {
                let sensor_id = resolve_sensor(service, &sensor)?;
                service.change_sensor_activation(&sensor_id, true)?;
            }
            SensorAction::Deactivate { sensor } => {
                let sensor_id = resolve_sensor(service, &sensor)?;
                service.change_sensor_activation(&sensor_id, false)?;
            }
        },
        Command::Scan { image, .. } => {
            let image = CameraImage::load(&image)?;
            service.process_image(&image)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catguard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let store = Arc::new(RocksStore::open(&cli.data_dir)?);
    tracing::debug!(data_dir = %cli.data_dir.display(), "Opened RocksDB store");

    let classifier = match &cli.command {
        Command::Scan { classifier, .. } => *classifier,
        _ => ClassifierKind::Fake,
    };
    let config = SecurityConfig {
        alarm_downgrade: cli.alarm_downgrade,
    };

    let mut service: Service = SecurityService::new(store, classifier.build(), config)?;
    service.add_status_listener(Arc::new(LoggingListener));

    run(&mut service, cli.command)?;

    let snapshot = service.snapshot()?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
