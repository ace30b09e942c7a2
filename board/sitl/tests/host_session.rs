use datalogger::{
    bring_up, CaptureConfig, CaptureControl, LoggerContext, SessionOutcome, StartupConfig,
};
use driver::{BiasMode, Mpu6050, Mpu6050Config};
use sitl::analysis::{load_capture, summarize};
use sitl::{ConsoleReporter, FsStorage, SimMotion, SimulatedMpu6050, SystemClock, TokioDelay};

#[tokio::test]
async fn test_capture_to_disk_and_analyze() {
    let dir = std::env::temp_dir().join(format!("sitl-host-session-{}", std::process::id()));
    let storage = FsStorage::open(&dir).await.unwrap();

    let motion = SimMotion {
        sway_g: 0.0,
        rate_dps: 0.0,
        ..Default::default()
    };
    let mut imu = Mpu6050::new(
        SimulatedMpu6050::new(motion),
        TokioDelay,
        Mpu6050Config::default(),
    );
    let mut reporter = ConsoleReporter::new();
    let startup = StartupConfig {
        calibration_samples: 5,
        bias_mode: BiasMode::Subtract,
        ..Default::default()
    };
    bring_up(&mut imu, &mut reporter, &startup).await.unwrap();

    let control = CaptureControl::new();
    let config = CaptureConfig::default()
        .with_sample_count(5)
        .with_sample_period_ms(10)
        .with_file_base("host_")
        .unwrap();
    let mut ctx = LoggerContext::new(
        imu,
        storage,
        reporter,
        SystemClock::new(),
        TokioDelay,
        &control,
        config,
    );

    let report = ctx.start_capture().await.expect("session ran");
    assert!(matches!(report.outcome, SessionOutcome::Completed));
    assert_eq!(report.file.as_str(), "host_1.csv");
    assert_eq!(ctx.reporter().last_status(), Some("Data Saved: host_1.csv"));

    let rows = load_capture(ctx.storage().path_of("host_1.csv")).unwrap();
    let summary = summarize(&rows).unwrap();
    assert_eq!(summary.samples, 5);
    assert_eq!(rows[4].index, 5);
    assert!(summary.duration_s >= 0.04);

    // Offsets are removed by the installed bias, gravity stays
    let accel_z = summary.channels[2];
    assert!((accel_z.mean - 1.0).abs() < 0.01, "accel z mean {}", accel_z.mean);
    let gyro_z = summary.channels[5];
    assert!(gyro_z.mean.abs() < 0.05, "gyro z mean {}", gyro_z.mean);

    std::fs::remove_dir_all(dir).unwrap();
}
