//! Line-oriented terminal front end for the dashboard controller.

use chrono::Local;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use skycast_core::{Config, Dashboard, DashboardView, Event, Favorites, ProxyClient};

const HELP: &str = "\
Type a city name to search. Commands:
  /pick N     open search result N
  /blur       leave the search box
  /refresh    reload the current location
  /save       save the current location as a favorite
  /open N     open favorite N
  /forget N   remove favorite N
  /quit       exit";

/// Map one input line to a controller event. `None` means the line was handled here.
fn parse_line(line: &str) -> Result<Option<Event>, String> {
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(Event::SearchInput(line.to_string())));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    let position = || {
        arg.and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| format!("/{name} needs a position starting at 1"))
    };

    let event = match name {
        "pick" => Event::SelectResult(position()?),
        "blur" => Event::SearchBlur,
        "refresh" => Event::Refresh,
        "save" => Event::SaveFavorite,
        "open" => Event::OpenFavorite(position()?),
        "forget" => Event::RemoveFavorite(position()?),
        "quit" | "q" => Event::Quit,
        "help" | "" => return Ok(None),
        other => return Err(format!("Unknown command /{other}")),
    };

    Ok(Some(event))
}

async fn read_input(tx: UnboundedSender<Event>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::error!("Failed to read input: {err}");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Some(event)) => {
                if tx.send(event).is_err() {
                    return;
                }
            }
            Ok(None) => println!("{HELP}"),
            Err(msg) => eprintln!("{msg}"),
        }
    }

    let _ = tx.send(Event::Quit);
}

pub async fn run(config: &Config, favorites: Favorites) -> anyhow::Result<()> {
    let source = Arc::new(ProxyClient::new(&config.dashboard.proxy_url));
    let (dashboard, events) = Dashboard::new(&config.dashboard, source, favorites);

    println!("{HELP}\n");
    tokio::spawn(read_input(dashboard.sender()));

    dashboard
        .run(events, |state| {
            println!("{}", DashboardView::build(state, &Local));
        })
        .await;

    Ok(())
}
