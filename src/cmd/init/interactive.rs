//! Interactive wizard for step-by-step config generation.
//!
//! Also used by `run` when it starts without any configuration and a
//! terminal is attached.

use std::path::{Path, PathBuf};

use console::style;
use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigFormat, InitArgs};
use crate::config::model::{
    Config, DEFAULT_CREATE_PATH, DEFAULT_ERROR_REPORT_PATH, DEFAULT_PORT, DEFAULT_TIMEOUT_MS,
    DEFAULT_WAIT_PAGE,
};
use crate::config::validation::{validate, validate_endpoint_path, validate_service_url};
use crate::error::ProxyError;

use super::serialize::{format_for_path, serialize_config};

fn map_prompt_err(e: dialoguer::Error) -> ProxyError {
    ProxyError::Prompt(e.to_string())
}

/// Whether a human is on the other end: both stdin and stdout are terminals.
#[must_use]
pub fn can_prompt() -> bool {
    console::Term::stdout().is_term() && std::io::IsTerminal::is_terminal(&std::io::stdin())
}

pub fn run(args: &InitArgs) -> Result<(), ProxyError> {
    if !can_prompt() {
        return Err(ProxyError::Prompt(
            "interactive mode requires a terminal (TTY). Use ceno-proxy init without -i for non-interactive mode.".into(),
        ));
    }

    println!(
        "\n  {} Config Wizard\n  {}\n",
        style("ceno-proxy").cyan().bold(),
        style("─────────────────────────").dim()
    );

    println!("  {}\n", style("Step 1: Output").bold());
    let format = prompt_format(args)?;
    let output = prompt_output(args, &format)?;

    let config = prompt_config(2)?;

    println!("\n  {}\n", style("Step 5: Review").bold());
    print_summary(&config, Some((&format, &output)));

    let confirm = Confirm::new()
        .with_prompt(format!("Write config to {}?", output.display()))
        .default(true)
        .interact()
        .map_err(map_prompt_err)?;
    if !confirm {
        println!("  Aborted.");
        return Ok(());
    }

    if output.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", output.display()))
            .default(false)
            .interact()
            .map_err(map_prompt_err)?;
        if !overwrite {
            println!("  Aborted.");
            return Ok(());
        }
    }

    write_config(&config, &format, &output)
}

/// Ask for a configuration on the terminal, then offer to save it to
/// `path` so the next start does not ask again.
pub fn collect_for_run(path: &Path) -> Result<Config, ProxyError> {
    println!(
        "\n  {} No configuration found, let's create one.\n",
        style("ceno-proxy").cyan().bold()
    );

    let config = prompt_config(1)?;
    print_summary(&config, None);

    let save = Confirm::new()
        .with_prompt(format!("Save this config to {}?", path.display()))
        .default(!path.exists())
        .interact()
        .map_err(map_prompt_err)?;

    if save {
        let format = format_for_path(path).unwrap_or(ConfigFormat::Json);
        write_config(&config, &format, path)?;
    }

    Ok(config)
}

/// The shared prompts: upstream services, wait page, listener, advanced
/// endpoint paths. `first_step` numbers the section headings.
fn prompt_config(first_step: usize) -> Result<Config, ProxyError> {
    println!(
        "  {}\n",
        style(format!("Step {first_step}: Upstream services")).bold()
    );
    let cache_service = prompt_service("Local cache server address", "http://localhost:3091")?;
    let request_service = prompt_service("Request server address", "http://localhost:3092")?;

    println!(
        "\n  {}\n",
        style(format!("Step {}: Proxy", first_step + 1)).bold()
    );
    let wait_page: String = Input::new()
        .with_prompt("Wait page template")
        .default(DEFAULT_WAIT_PAGE.into())
        .interact_text()
        .map_err(map_prompt_err)?;

    let port: u16 = Input::new()
        .with_prompt("Listen port")
        .default(DEFAULT_PORT)
        .validate_with(|input: &u16| -> Result<(), String> {
            if *input == 0 {
                Err("port must be between 1 and 65535".into())
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(map_prompt_err)?;

    let timeout: u64 = Input::new()
        .with_prompt("Upstream timeout per request (ms)")
        .default(DEFAULT_TIMEOUT_MS)
        .validate_with(|input: &u64| -> Result<(), String> {
            if *input == 0 {
                Err("timeout must be greater than 0".into())
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(map_prompt_err)?;

    println!(
        "\n  {}\n",
        style(format!("Step {}: Advanced", first_step + 2)).bold()
    );
    let customize = Confirm::new()
        .with_prompt("Customize the upstream endpoint paths?")
        .default(false)
        .interact()
        .map_err(map_prompt_err)?;

    let (error_report_path, create_path) = if customize {
        (
            prompt_endpoint("Decode error report path", DEFAULT_ERROR_REPORT_PATH)?,
            prompt_endpoint("Bundle creation path", DEFAULT_CREATE_PATH)?,
        )
    } else {
        (DEFAULT_ERROR_REPORT_PATH.into(), DEFAULT_CREATE_PATH.into())
    };

    let config = Config {
        cache_service,
        request_service,
        error_report_path,
        create_path,
        wait_page: PathBuf::from(wait_page),
        port,
        timeout,
    };

    if let Err(errors) = validate(&config) {
        eprintln!(
            "\n  {} Config has validation errors:",
            style("!").red().bold()
        );
        for e in &errors {
            eprintln!("    {e}");
        }
        return Err(ProxyError::ConfigValidation { errors });
    }

    Ok(config)
}

fn prompt_service(prompt: &str, default: &str) -> Result<String, ProxyError> {
    Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|input: &String| -> Result<(), String> { validate_service_url(input) })
        .interact_text()
        .map_err(map_prompt_err)
}

fn prompt_endpoint(prompt: &str, default: &str) -> Result<String, ProxyError> {
    Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|input: &String| -> Result<(), String> { validate_endpoint_path(input) })
        .interact_text()
        .map_err(map_prompt_err)
}

fn prompt_format(args: &InitArgs) -> Result<ConfigFormat, ProxyError> {
    let formats = &["json", "yaml", "toml"];
    let default_idx = match args.format {
        ConfigFormat::Json => 0,
        ConfigFormat::Yaml => 1,
        ConfigFormat::Toml => 2,
    };

    let selection = Select::new()
        .with_prompt("Config format")
        .items(formats)
        .default(default_idx)
        .interact()
        .map_err(map_prompt_err)?;

    Ok(match selection {
        1 => ConfigFormat::Yaml,
        2 => ConfigFormat::Toml,
        _ => ConfigFormat::Json,
    })
}

fn prompt_output(args: &InitArgs, format: &ConfigFormat) -> Result<PathBuf, ProxyError> {
    let default_path = args.output.as_ref().map_or_else(
        || format!("ceno.{}", format.extension()),
        |p| p.display().to_string(),
    );

    let path_str: String = Input::new()
        .with_prompt("Output file path")
        .default(default_path)
        .interact_text()
        .map_err(map_prompt_err)?;

    Ok(PathBuf::from(path_str))
}

fn write_config(config: &Config, format: &ConfigFormat, output: &Path) -> Result<(), ProxyError> {
    let content = serialize_config(config, format)?;
    std::fs::write(output, content)?;
    println!(
        "\n  {} Created {}",
        style("✓").green().bold(),
        output.display()
    );
    Ok(())
}

fn print_summary(config: &Config, target: Option<(&ConfigFormat, &PathBuf)>) {
    if let Some((format, output)) = target {
        println!(
            "  {} {} ({})",
            style("Output:").dim(),
            output.display(),
            format.extension()
        );
    }
    println!("  {} {}", style("Cache server:").dim(), config.cache_service);
    println!(
        "  {} {}",
        style("Request server:").dim(),
        config.request_service
    );
    println!(
        "  {} {} / {}",
        style("Endpoints:").dim(),
        config.error_report_path,
        config.create_path
    );
    println!(
        "  {} {}",
        style("Wait page:").dim(),
        config.wait_page.display()
    );
    println!(
        "  {} {} ({}ms timeout)\n",
        style("Port:").dim(),
        config.port,
        config.timeout
    );
}
