use tracing::Level;

/// Install the global subscriber. Calling it twice is harmless.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: Level) {
    static INIT: std::sync::Once = std::sync::Once::new();

    INIT.call_once(|| {
        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(level)
                .build(),
        );
    });
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(level: Level) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    // already initialised by an earlier caller
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
