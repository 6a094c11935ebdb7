mod app;
mod audio;
mod config;
mod logging;
mod player;
mod runtime;
mod subsonic;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
