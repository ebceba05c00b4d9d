use crate::gui::app::App;

pub fn run() -> anyhow::Result<()> {
    eframe::run_native(
        "Action Potential",
        eframe::NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
    .map_err(|err| anyhow::anyhow!("viewer exited with an error: {err}"))
}
