//! Plain-text rendering of session state.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use weatherboard_core::{FavoritesSet, SessionState};

pub fn state(state: &SessionState, favorites: &FavoritesSet) -> Result<String, fmt::Error> {
    let mut out = String::new();

    match state {
        SessionState::Idle => out.push_str("Nothing to show yet.\n"),
        SessionState::Loading(query) => writeln!(out, "Loading {query}...")?,
        SessionState::Failed { query, kind } => {
            writeln!(out, "Could not load weather for {query}: {kind}.")?
        }
        SessionState::Ready { snapshot, forecast, alerts } => {
            let star = if favorites.contains(&snapshot.city) { " *" } else { "" };
            writeln!(out, "{}, {}{star}", snapshot.city, snapshot.country)?;
            writeln!(
                out,
                "{}°C, {}",
                snapshot.temperature_display(),
                snapshot.condition.description
            )?;
            writeln!(
                out,
                "Feels like {}°C  Min {}°C  Max {}°C",
                snapshot.feels_like_display(),
                snapshot.min_display(),
                snapshot.max_display()
            )?;
            writeln!(
                out,
                "Humidity {}%  Pressure {} hPa  Clouds {}%",
                snapshot.humidity_pct, snapshot.pressure_hpa, snapshot.clouds_pct
            )?;
            if let Some(km) = snapshot.visibility_km() {
                writeln!(out, "Visibility {km:.1} km")?;
            }

            write!(
                out,
                "Wind {} m/s from {}°",
                snapshot.wind.speed, snapshot.wind.direction_deg
            )?;
            if let Some(gust) = snapshot.wind.gust {
                write!(out, ", gusts {gust} m/s")?;
            }
            out.push('\n');

            writeln!(
                out,
                "Sunrise {}  Sunset {}",
                clock(snapshot.sunrise),
                clock(snapshot.sunset)
            )?;

            if !forecast.is_empty() {
                out.push_str("\nForecast\n");
                for point in forecast {
                    let day = point.date.format("%a %d %b");
                    writeln!(out, "  {day}  {}°C", point.temperature_c)?;
                }
            }

            if !alerts.is_empty() {
                out.push_str("\nAlerts\n");
                for alert in alerts {
                    writeln!(
                        out,
                        "  {} ({} to {})",
                        alert.event,
                        clock(alert.start),
                        clock(alert.end)
                    )?;
                }
            }
        }
    }

    Ok(out)
}

pub fn favorites(favorites: &FavoritesSet) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }

    favorites.iter().map(|city| format!("  {city}\n")).collect()
}

fn clock(at: DateTime<Utc>) -> String {
    at.format("%H:%M UTC").to_string()
}
