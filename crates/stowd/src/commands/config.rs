use stow_core::StowConfig;

pub fn init(config: &StowConfig) -> anyhow::Result<()> {
    let scaffold = StowConfig::scaffold(&config.data_dir);
    print!("{}", scaffold.to_toml_string()?);
    Ok(())
}
