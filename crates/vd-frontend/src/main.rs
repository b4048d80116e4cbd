//! Voodoo viewer entry point

use vd_frontend::{AppState, VoodooApp, config, state};
use vd_physics::WorldConfig;
use vd_renderer::RendererConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vd_frontend=debug,vd_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting voodoo");

    let renderer_config = RendererConfig::default();
    let config = config::load_config()?;
    let app_state = AppState::new(config, WorldConfig::default(), &renderer_config)
        .inspect_err(|e| tracing::error!("Failed to set up the session: {}", e))?;
    let app_state = state::create_shared_state(app_state);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Voodoo"),
        ..Default::default()
    };

    eframe::run_native(
        "vd",
        native_options,
        Box::new(move |cc| Ok(Box::new(VoodooApp::new(cc, app_state, renderer_config)))),
    )?;
    Ok(())
}
