use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use datalogger::{
    bring_up, CaptureControl, FileName, LoggerContext, TriggerAction, TriggerDebouncer,
};
use driver::{Mpu6050, Mpu6050Config};
use hal::Clock;
use sitl::commands::HELP;
use sitl::console::format_sample;
use sitl::{
    Command, ConsoleReporter, FsStorage, Options, SimMotion, SimulatedMpu6050, SystemClock,
    TokioDelay,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Latest-sample refresh cadence while idle
const REFRESH_PERIOD: Duration = Duration::from_millis(100);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = Options::parse(std::env::args().skip(1))?;

    let storage = FsStorage::open(&options.dir)
        .await
        .with_context(|| format!("Cannot use capture directory {:?}", options.dir))?;
    log::info!("Writing captures to {:?}", storage.dir());

    let mut reporter = ConsoleReporter::new();
    let bus = SimulatedMpu6050::new(SimMotion::default());
    let mut imu = Mpu6050::new(bus, TokioDelay, Mpu6050Config::default());
    bring_up(&mut imu, &mut reporter, &options.startup)
        .await
        .map_err(|e| anyhow!("IMU bring-up failed: {}", e))?;

    let control = Arc::new(CaptureControl::new());
    let clock = SystemClock::new();
    let (command_tx, mut commands) = mpsc::unbounded_channel();
    tokio::spawn(read_console(control.clone(), clock, command_tx));

    let mut ctx = LoggerContext::new(
        imu,
        storage,
        reporter,
        clock,
        TokioDelay,
        &control,
        options.capture.clone(),
    );
    let mut last_file: Option<FileName> = None;
    let mut refresh = tokio::time::interval(REFRESH_PERIOD);
    // A capture blocks the loop; do not replay the ticks it swallowed
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    println!("{}", HELP);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Capture => {
                        if let Some(report) = ctx.run_session().await {
                            log::info!(
                                "{}: {} samples, {:?}",
                                report.file,
                                report.samples,
                                report.outcome
                            );
                            last_file = Some(report.file);
                        }
                    }
                    Command::ShowLatest => println!("{}", format_sample(ctx.latest())),
                    Command::DumpLast => match &last_file {
                        Some(name) => match ctx.storage().read_to_string(name).await {
                            Ok(content) => {
                                println!("Content of {}:", name);
                                print!("{}", content);
                            }
                            Err(e) => log::error!("Cannot read {}: {}", name, e),
                        },
                        None => println!("No capture yet"),
                    },
                    Command::ListFiles => match ctx.storage().list().await {
                        Ok(files) => {
                            for (name, size) in files {
                                println!("{} [size={}]", name, size);
                            }
                        }
                        Err(e) => log::error!("Cannot list {:?}: {}", ctx.storage().dir(), e),
                    },
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                }
            }
            _ = refresh.tick() => {
                if let Err(e) = ctx.refresh_latest().await {
                    log::warn!("IMU refresh failed: {:?}", e);
                }
            }
        }
    }

    log::info!("Stopping");
    Ok(())
}

/// Forward console keys to the main loop
///
/// The capture key plays the role of the hardware button: it is debounced
/// and goes straight to `CaptureControl::trigger`, so it can stop a session
/// while the main loop is busy running it.
async fn read_console(
    control: Arc<CaptureControl>,
    clock: SystemClock,
    commands: mpsc::UnboundedSender<Command>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut debouncer = TriggerDebouncer::default();

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                println!("Unknown command, h for help");
            }
            continue;
        };

        if command == Command::Capture {
            if !debouncer.accept(clock.now_ms()) {
                log::debug!("Trigger ignored");
                continue;
            }
            if control.trigger() == TriggerAction::StopRequested {
                log::info!("Stop requested");
                continue;
            }
        }

        if commands.send(command).is_err() {
            return;
        }
    }

    let _ = commands.send(Command::Quit);
}
