use crate::cli::{Cli, ConfigInitArgs};
use crate::config::{load_config, resolve_config_path, write_config, KeystretchConfig};

pub fn handle_config_init(cli: &Cli, args: &ConfigInitArgs) -> anyhow::Result<()> {
    let path = resolve_config_path(cli)?;
    if path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {}\nHint: pass --force to overwrite it.",
            path.display()
        ));
    }
    write_config(&path, &KeystretchConfig::default())?;
    if !cli.quiet {
        println!("Wrote default config to {}", path.display());
    }
    Ok(())
}

pub fn handle_config_show(cli: &Cli) -> anyhow::Result<()> {
    let path = resolve_config_path(cli)?;
    let config = load_config(&path)?;
    if !cli.quiet {
        let source = if path.exists() { "" } else { " (not found, using defaults)" };
        println!("# {}{}", path.display(), source);
    }
    let rendered =
        toml::to_string_pretty(&config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    print!("{}", rendered);
    Ok(())
}
