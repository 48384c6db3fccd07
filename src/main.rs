use pick_viewer::ViewerConfig;

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::from_env()?;
    pick_viewer::run(config)
}
