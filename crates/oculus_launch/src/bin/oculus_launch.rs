//! Oculus Launch CLI
//!
//! Usage:
//!   oculus_launch
//!   oculus_launch --dry-run
//!   oculus_launch -p /opt/ros/jazzy:/opt/install

use oculus_launch::{default_description, Executor, ExecutorConfig, LaunchArgs};
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    let args: LaunchArgs = argh::from_env();

    let env = env_logger::Env::default().default_filter_or(args.log_level.to_lowercase());
    env_logger::init_from_env(env);

    let locator = args.locator();

    // Build the launch description
    let description = match default_description(&locator) {
        Ok(d) => d,
        Err(e) => {
            log::error!("Failed to build launch description: {}", e);
            std::process::exit(1);
        }
    };

    if args.export_yaml {
        match serde_yaml::to_string(&description) {
            Ok(yaml) => print!("{}", yaml),
            Err(e) => {
                log::error!("Failed to serialize launch description: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let executor_config = ExecutorConfig {
        shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
    };

    let mut executor = match Executor::new(&description, &locator, executor_config) {
        Ok(e) => e,
        Err(e) => {
            log::error!("Failed to create executor: {}", e);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        println!("{}", executor.plan());
        return;
    }

    // Create shutdown channel and Ctrl+C handler
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    {
        let shutdown_tx = shutdown_tx.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, initiating shutdown...");
            let _ = shutdown_tx.send(());
        })
        .expect("Error setting Ctrl+C handler");
    }

    // Launch all nodes in description order
    if let Err(e) = executor.launch(&shutdown_rx) {
        log::error!("Launch failed: {}", e);
        executor.shutdown().await;
        std::process::exit(1);
    }

    // Wait for shutdown signal or all processes to exit
    executor.wait(shutdown_rx).await;

    // Shutdown all processes in reverse order
    executor.shutdown().await;

    log::info!("Oculus launcher exiting");
}
