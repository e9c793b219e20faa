use h5_to_tfjs::{configs::ConvertConfig, convert};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ConvertConfig::from_env()?;
    convert(&config);

    Ok(())
}
