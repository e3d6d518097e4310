use weather_core::{Notice, Presenter, ViewModel};

/// Plain-text rendering for the terminal.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    /// Print a line on stderr while a fetch is running.
    pub show_progress: bool,
}

impl TerminalPresenter {
    pub fn interactive() -> Self {
        Self { show_progress: true }
    }
}

pub fn render_text(view: &ViewModel) -> String {
    let temp = view.units.temperature_symbol();
    let wind = view.units.wind_speed_unit();
    let current = &view.current;

    let mut lines = vec![
        view.location.clone(),
        format!("{} · {}", view.date, view.updated),
        format!("{}{temp}  {} [{}]", current.temperature, current.description, view.theme.token()),
        format!(
            "Wind {} {wind} · Humidity {}% · Pressure {} hPa",
            current.wind_speed, current.humidity, current.pressure
        ),
    ];

    if let Some(uv) = &view.uv {
        lines.push(format!("UV {:.1} ({})", uv.index, uv.risk.label));
    }
    if let Some(vis) = &view.visibility {
        lines.push(format!("Visibility {:.1} km ({})", vis.km, vis.description));
    }
    if let (Some(rise), Some(set)) = (&view.sunrise, &view.sunset) {
        lines.push(format!("Sunrise {rise} · Sunset {set}"));
    }

    if !view.hourly.is_empty() {
        lines.push(String::new());
        lines.push("Next hours".to_string());
        lines.extend(view.hourly.iter().map(|slot| {
            format!("  {:>5}  {:>4}°  {}", slot.hour, slot.temperature, slot.description)
        }));
    }

    if !view.daily.is_empty() {
        lines.push(String::new());
        lines.push("Next days".to_string());
        lines.extend(view.daily.iter().map(|day| {
            format!(
                "  {:<3}  {:>4}° / {:>4}°  {}",
                day.day, day.max_temperature, day.min_temperature, day.description
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

impl Presenter for TerminalPresenter {
    fn render(&self, view: &ViewModel) {
        println!("{}", render_text(view));
    }

    fn notify(&self, notice: &Notice) {
        eprintln!("! {}", notice.message);
    }

    fn set_loading(&self, loading: bool) {
        if self.show_progress && loading {
            eprintln!("Fetching weather...");
        }
    }
}

/// Pretty-printed JSON of the whole view model.
#[derive(Debug, Default)]
pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn render(&self, view: &ViewModel) {
        match serde_json::to_string_pretty(view) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!(error = %err, "failed to serialize view model"),
        }
    }

    fn notify(&self, notice: &Notice) {
        eprintln!("! {}", notice.message);
    }
}
