//! Line commands accepted on stdin in headless mode
//!
//! ```text
//! tap <lat> <lng>            tap empty map
//! poi <place_id> <lat> <lng> tap a point of interest
//! type <text>                search input keystroke
//! search [text]              submit a full search
//! select <n>                 pick row n of the visible search list
//! clear-search
//! save | unselect
//! saved <id> | forget <id> | forget-all
//! locate | zoom in|out | reset-heading
//! key [value] | map-id [value] | location on|off
//! q | quit
//! ```

use lmap_core::MapLocation;

#[derive(Debug, Clone, PartialEq)]
pub enum StdinCommand {
    Tap(MapLocation),
    Poi {
        place_id: String,
        location: MapLocation,
    },
    Type(String),
    /// Submit, optionally replacing the query first
    Search(Option<String>),
    Select(usize),
    ClearSearch,
    Save,
    Unselect,
    OpenSaved(String),
    Forget(String),
    ForgetAll,
    Locate,
    ZoomIn,
    ZoomOut,
    ResetHeading,
    /// `None` deletes the stored key
    ApiKey(Option<String>),
    MapId(Option<String>),
    LocationEnabled(bool),
    Quit,
}

/// Parse one stdin line. Empty lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<StdinCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let optional = || (!rest.is_empty()).then(|| rest.to_string());

    let command = match verb {
        "tap" => StdinCommand::Tap(parse_location(rest)?),
        "poi" => {
            let (place_id, coords) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: poi <place_id> <lat> <lng>".to_string())?;
            StdinCommand::Poi {
                place_id: place_id.to_string(),
                location: parse_location(coords)?,
            }
        }
        "type" => StdinCommand::Type(rest.to_string()),
        "search" => StdinCommand::Search(optional()),
        "select" => StdinCommand::Select(
            rest.parse()
                .map_err(|_| format!("invalid index: {:?}", rest))?,
        ),
        "clear-search" => StdinCommand::ClearSearch,
        "save" => StdinCommand::Save,
        "unselect" => StdinCommand::Unselect,
        "saved" if !rest.is_empty() => StdinCommand::OpenSaved(rest.to_string()),
        "forget" if !rest.is_empty() => StdinCommand::Forget(rest.to_string()),
        "forget-all" => StdinCommand::ForgetAll,
        "locate" => StdinCommand::Locate,
        "zoom" => match rest {
            "in" | "+" => StdinCommand::ZoomIn,
            "out" | "-" => StdinCommand::ZoomOut,
            _ => return Err("usage: zoom in|out".to_string()),
        },
        "reset-heading" => StdinCommand::ResetHeading,
        "key" => StdinCommand::ApiKey(optional()),
        "map-id" => StdinCommand::MapId(optional()),
        "location" => match rest {
            "on" => StdinCommand::LocationEnabled(true),
            "off" => StdinCommand::LocationEnabled(false),
            _ => return Err("usage: location on|off".to_string()),
        },
        "q" | "quit" => StdinCommand::Quit,
        _ => return Err(format!("unknown command: {}", line)),
    };
    Ok(Some(command))
}

fn parse_location(text: &str) -> Result<MapLocation, String> {
    let mut parts = text.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(latitude)), Some(Ok(longitude)), None) => {
            Ok(MapLocation::new(latitude, longitude))
        }
        _ => Err(format!("expected <lat> <lng>, got {:?}", text)),
    }
}
