use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Does nothing unless `MRC_LOG` holds an `EnvFilter` directive, e.g.
/// `MRC_LOG=mrc_eval=debug,mrc_jit=trace`. `MRC_LOG_TREE=1` renders spans
/// as an indented tree. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(directives) = std::env::var("MRC_LOG") else {
            return;
        };
        let registry = tracing_subscriber::registry().with(EnvFilter::new(directives));
        let tree = std::env::var_os("MRC_LOG_TREE").is_some_and(|v| v == "1");
        // a subscriber installed by an embedding application wins
        let _ = if tree {
            registry
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        };
    });
}
