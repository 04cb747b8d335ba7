//! Interactive mode for the dashboard.
//!
//! Prompts for the bind address, port and backend URL before starting the
//! server.

use dialoguer::{Confirm, Input};

use crate::ServerError;
use crate::config::{ConfigArgs, DashboardConfig};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Prompts start from the configuration built from `args`. The answers
/// are exported as `BIND_ADDR`, `PORT` and `BACKEND_URL` and the
/// configuration is reloaded before delegating to [`super::run_server`].
///
/// # Errors
///
/// Returns [`ServerError`] if the configuration is invalid or the server
/// fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(args: &ConfigArgs) -> Result<(), ServerError> {
    println!("Green Cover Dashboard");
    println!();

    let current = DashboardConfig::load(args)?;

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(current.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| current.bind_addr.clone());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default(current.port.to_string())
        .interact_text()
        .unwrap_or_else(|_| current.port.to_string());

    let backend_url: String = Input::new()
        .with_prompt("Backend URL")
        .default(current.backend_url.clone())
        .interact_text()
        .unwrap_or_else(|_| current.backend_url.clone());

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during configuration loading.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        std::env::set_var("BACKEND_URL", &backend_url);
    }

    if !Confirm::new()
        .with_prompt(format!(
            "Start dashboard on {bind_addr}:{port_str} using {backend_url}?"
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    // Flags would override the answers, so only keep the file and token.
    let answers = ConfigArgs {
        config: args.config.clone(),
        mapbox_token: args.mapbox_token.clone(),
        ..ConfigArgs::default()
    };
    super::run_server(DashboardConfig::load(&answers)?).await
}
