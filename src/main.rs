use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = family_tree_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
