mod api;
mod config;
mod filter;
mod pagination;
mod session;
#[cfg(test)]
mod testutil;
mod timeutil;
mod ui;

use log::info;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cfg = config::Config::load();
    if let Err(err) = cfg.validate() {
        eprintln!("configuration problem: {err}");
        std::process::exit(1);
    }

    if let Some(path) = cfg.logo_path.as_deref() {
        if let Ok(banner) = std::fs::read_to_string(path) {
            println!("{banner}");
        }
    }

    if !ui::password_gate(&cfg) {
        eprintln!("too many failed password attempts");
        std::process::exit(1);
    }

    let client = match api::client::ApiClient::new(&cfg) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("could not build http client: {err}");
            std::process::exit(1);
        }
    };

    info!("dashboard connected to {}", cfg.backend_url);
    let mut session = session::Session::new(cfg.page_size);
    ui::run(&client, &mut session).await;
}
