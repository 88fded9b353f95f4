//! Minimal HTML rendering and the localized user-visible strings.
//!
//! Everything user-supplied goes through [`escape_html`] before landing in
//! markup.

use wxlook_config::AppConfig;
use wxlook_core::{Language, Units, WeatherRecord};

/// Cities offered as one-click searches on the form page
pub(crate) const QUICK_CITIES: &[&str] = &["Madrid", "Sidney", "Tokyo", "Ottawa"];

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Form-style encoding for redirect targets (spaces become `+`).
pub(crate) fn form_encode(input: &str) -> String {
    url::form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

pub(crate) fn no_city_msg(lang: Language) -> &'static str {
    match lang {
        Language::En => "No city specified.",
        Language::Es => "No se ha indicado ninguna ciudad.",
    }
}

pub(crate) fn no_data_msg(lang: Language, city: &str) -> String {
    let city = escape_html(city);
    match lang {
        Language::En => format!("Could not get weather information for \"{city}\""),
        Language::Es => format!("No se pudo obtener el tiempo para \"{city}\""),
    }
}

pub(crate) fn enter_city_msg(lang: Language) -> &'static str {
    match lang {
        Language::En => "Please enter a city name.",
        Language::Es => "Introduce el nombre de una ciudad.",
    }
}

pub(crate) fn invalid_city_msg(lang: Language) -> &'static str {
    match lang {
        Language::En => "Please enter a valid city name.",
        Language::Es => "Introduce un nombre de ciudad válido.",
    }
}

pub(crate) fn settings_saved_msg(lang: Language) -> &'static str {
    match lang {
        Language::En => "Weather configuration has been saved.",
        Language::Es => "La configuración del tiempo se ha guardado.",
    }
}

pub(crate) fn save_failed_msg(lang: Language) -> &'static str {
    match lang {
        Language::En => "Could not write the configuration file.",
        Language::Es => "No se pudo escribir el fichero de configuración.",
    }
}

struct Labels {
    title: &'static str,
    temperature: &'static str,
    feels_like: &'static str,
    humidity: &'static str,
    pressure: &'static str,
    wind: &'static str,
    visibility: &'static str,
    observed: &'static str,
    quick: &'static str,
    find: &'static str,
    search: &'static str,
}

fn labels(lang: Language) -> Labels {
    match lang {
        Language::En => Labels {
            title: "Weather",
            temperature: "Temperature",
            feels_like: "Feels like",
            humidity: "Humidity",
            pressure: "Pressure",
            wind: "Wind",
            visibility: "Visibility",
            observed: "Observed",
            quick: "Quick search:",
            find: "Find a forecast",
            search: "Search",
        },
        Language::Es => Labels {
            title: "El tiempo",
            temperature: "Temperatura",
            feels_like: "Sensación",
            humidity: "Humedad",
            pressure: "Presión",
            wind: "Viento",
            visibility: "Visibilidad",
            observed: "Observado",
            quick: "Búsqueda rápida:",
            find: "Busca un pronóstico",
            search: "Buscar",
        },
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub(crate) fn error_page(msg: &str, lang: Language) -> String {
    page(
        labels(lang).title,
        &format!("<div class=\"weather-error\">{msg}</div>"),
    )
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => "—".to_string(),
    }
}

pub(crate) fn weather_page(record: &WeatherRecord, units: Units, lang: Language) -> String {
    let l = labels(lang);
    let (temp_unit, speed_unit) = match units {
        Units::Metric => ("°C", "m/s"),
        Units::Imperial => ("°F", "mph"),
    };

    let mut heading = escape_html(&record.city);
    if let Some(country) = &record.country {
        heading.push_str(", ");
        heading.push_str(&escape_html(country));
    }

    let observed = chrono::DateTime::from_timestamp(record.observation_time, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();

    let wind = match (record.wind_speed, record.wind_direction) {
        (Some(speed), Some(deg)) => format!("{speed:.1} {speed_unit} ({deg:.0}°)"),
        (Some(speed), None) => format!("{speed:.1} {speed_unit}"),
        _ => "—".to_string(),
    };

    let visibility = record
        .visibility
        .map(|v| format!("{v} m"))
        .unwrap_or_else(|| "—".to_string());

    let body = format!(
        "<div class=\"weather-display\">\n\
         <h1>{heading}</h1>\n\
         <p class=\"weather-condition\">{condition}</p>\n\
         <ul>\n\
         <li>{temperature}: {temp}</li>\n\
         <li>{feels_like}: {feels}</li>\n\
         <li>{humidity}: {hum}</li>\n\
         <li>{pressure}: {pres}</li>\n\
         <li>{wind_label}: {wind}</li>\n\
         <li>{visibility_label}: {visibility}</li>\n\
         <li>{observed_label}: {observed}</li>\n\
         </ul>\n\
         </div>",
        heading = heading,
        condition = escape_html(&record.condition),
        temperature = l.temperature,
        temp = fmt_opt(record.temperature, temp_unit),
        feels_like = l.feels_like,
        feels = fmt_opt(record.feels_like, temp_unit),
        humidity = l.humidity,
        hum = fmt_opt(record.humidity, "%"),
        pressure = l.pressure,
        pres = fmt_opt(record.pressure, "hPa"),
        wind_label = l.wind,
        wind = wind,
        visibility_label = l.visibility,
        visibility = visibility,
        observed_label = l.observed,
        observed = observed,
    );

    page(&format!("{} — {}", l.title, record.city), &body)
}

pub(crate) fn search_page(lang: Language, error: Option<&str>, prefill: &str) -> String {
    let l = labels(lang);
    let error_html = error
        .map(|e| format!("<div class=\"weather-error\">{e}</div>\n"))
        .unwrap_or_default();

    let quick = QUICK_CITIES
        .iter()
        .map(|city| {
            format!(
                "<a class=\"quick-btn\" href=\"/weather/{}\">{}</a>",
                form_encode(city),
                city
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "<form class=\"weather-search-form\" method=\"post\" action=\"/search\">\n\
         <h2>{find}</h2>\n\
         {error_html}\
         <input class=\"search-input\" type=\"text\" name=\"city\" value=\"{prefill}\">\n\
         <button class=\"search-btn\" type=\"submit\">{search}</button>\n\
         </form>\n\
         <div class=\"quick-cities\">\n\
         <div class=\"quick-cities-title\">{quick_title}</div>\n\
         {quick}\n\
         </div>",
        find = l.find,
        error_html = error_html,
        prefill = escape_html(prefill),
        search = l.search,
        quick_title = l.quick,
        quick = quick,
    );

    page(l.find, &body)
}

pub(crate) fn settings_page(
    cfg: &AppConfig,
    lang: Language,
    notice: Option<&str>,
    error: Option<&str>,
) -> String {
    let notice_html = notice
        .map(|n| format!("<div class=\"settings-notice\">{n}</div>\n"))
        .unwrap_or_default();
    let error_html = error
        .map(|e| format!("<div class=\"weather-error\">{}</div>\n", escape_html(e)))
        .unwrap_or_default();

    let unit_options = Units::all()
        .iter()
        .map(|u| {
            let selected = if *u == cfg.units() { " selected" } else { "" };
            format!("<option value=\"{u}\"{selected}>{u}</option>")
        })
        .collect::<Vec<_>>()
        .join("");

    let language_options = Language::all()
        .iter()
        .map(|l| {
            let selected = if *l == cfg.language() { " selected" } else { "" };
            format!("<option value=\"{l}\"{selected}>{l}</option>")
        })
        .collect::<Vec<_>>()
        .join("");

    let body = format!(
        "{notice_html}{error_html}\
         <form class=\"weather-settings-form\" method=\"post\" action=\"/settings\">\n\
         <label>API key <input type=\"text\" name=\"api_key\" value=\"{key}\"></label>\n\
         <label>Units <select name=\"units\">{unit_options}</select></label>\n\
         <label>Language <select name=\"language\">{language_options}</select></label>\n\
         <button type=\"submit\">Save</button>\n\
         </form>",
        notice_html = notice_html,
        error_html = error_html,
        key = escape_html(cfg.api_key().unwrap_or("")),
        unit_options = unit_options,
        language_options = language_options,
    );

    page("Weather settings", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_chars() {
        assert_eq!(
            escape_html("<b>\"O'Fallon\" & Sons</b>"),
            "&lt;b&gt;&quot;O&#39;Fallon&quot; &amp; Sons&lt;/b&gt;"
        );
    }

    #[test]
    fn form_encode_uses_plus_for_spaces() {
        assert_eq!(form_encode("New York"), "New+York");
        assert_eq!(form_encode("Saint-Étienne"), "Saint-%C3%89tienne");
    }

    #[test]
    fn error_page_is_localized() {
        assert!(no_data_msg(Language::En, "Madrid").contains("Could not get"));
        assert!(no_data_msg(Language::Es, "Madrid").contains("No se pudo"));
    }

    #[test]
    fn no_data_msg_escapes_the_city() {
        let msg = no_data_msg(Language::En, "<script>");
        assert!(!msg.contains("<script>"));
        assert!(msg.contains("&lt;script&gt;"));
    }

    #[test]
    fn search_page_lists_quick_cities() {
        let html = search_page(Language::En, None, "");
        for city in QUICK_CITIES {
            assert!(html.contains(city));
        }
        assert!(html.contains("/weather/Madrid"));
    }
}
