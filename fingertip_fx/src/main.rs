//! fingertip_fx — interactive entry point.
//!
//! ```text
//! fingertip_fx [config.toml]    # default: ./fingertip_fx.toml
//! fingertip_fx --quick          # built-in defaults, no config file
//! ```

use env_logger::Env;

use fingertip_fx::app::run;
use fingertip_fx::config::AppConfig;

const DEFAULT_CONFIG: &str = "fingertip_fx.toml";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = if args.iter().any(|a| a == "--quick") {
        log::info!("quick start: built-in defaults");
        AppConfig::default()
    } else {
        let path = args
            .iter()
            .find(|a| !a.starts_with("--"))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFIG);
        AppConfig::load_or_default(path)
    };

    #[cfg(feature = "camera")]
    log::info!("camera: webcam {}", cfg.window.camera_index);
    #[cfg(not(feature = "camera"))]
    log::info!("camera: synthetic (build with --features camera for a webcam)");
    log::info!(
        "mode: {}  model: {}  window: {}x{}",
        cfg.gesture.mode,
        cfg.model.variant.name(),
        cfg.window.width,
        cfg.window.height,
    );

    if let Err(e) = run(cfg) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
