use glam::Vec3;

use crate::{config::ViewForm, params::ViewParameters};

pub const INDEX_PAGE: &str = "index.html";
pub const VIEW_HISTORY_STATE: &str = "ViewSplat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: String,
}

fn format_vec3(v: Vec3) -> String {
    format!("{},{},{}", v.x, v.y, v.z)
}

/// Query string describing a view, e.g. `art=0&cu=0,0,1&...&sh=2`.
pub fn view_query(params: &ViewParameters) -> String {
    format!(
        "art={}&cu={}&cp={}&cla={}&aa={}&2d={}&sh={}",
        params.alpha_removal_threshold,
        format_vec3(params.camera_up),
        format_vec3(params.camera_position),
        format_vec3(params.camera_look_at),
        params.antialiased,
        params.two_d,
        params.sh_degree
    )
}

/// The page to go back to: the index page, with the last view encoded if there was one.
pub fn page_url(current: Option<&ViewParameters>) -> String {
    match current {
        Some(params) => format!("{INDEX_PAGE}?{}", view_query(params)),
        None => INDEX_PAGE.to_owned(),
    }
}

fn parse_flag(key: &str, value: &str, default: bool) -> bool {
    value.parse().unwrap_or_else(|_| {
        log::warn!("Ignoring {key}={value:?} in page url, expected true or false.");
        default
    })
}

/// Recovers the form text from a page url or bare query string.
///
/// Keys that are missing or unknown leave the defaults in place. Values are not
/// validated here; that happens when the form is used.
pub fn form_from_query(url: &str) -> ViewForm {
    let query = url.split_once('?').map_or(url, |(_, query)| query);
    let mut form = ViewForm::default();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "art" => value.clone_into(&mut form.alpha_removal_threshold),
            "cu" => value.clone_into(&mut form.camera_up),
            "cp" => value.clone_into(&mut form.camera_position),
            "cla" => value.clone_into(&mut form.camera_look_at),
            "sh" => value.clone_into(&mut form.sh_degree),
            "aa" => form.antialiased = parse_flag(key, value, form.antialiased),
            "2d" => form.two_d = parse_flag(key, value, form.two_d),
            _ => log::debug!("Unknown page url key {key}"),
        }
    }
    form
}
