use serde_json::{Map, Value};

use crate::editor::EditorAction;
use crate::types::ContainerBounds;

#[derive(Debug)]
pub enum ParsedClientMessage {
    Open {
        tactic_id: String,
    },
    Duplicate {
        tactic_id: String,
    },
    Next,
    Prev,
    Restart,
    TogglePlay,
    SetZones {
        value: bool,
    },
    SetArrows {
        value: bool,
    },
    SetSpeed {
        percent: f64,
    },
    Tap {
        client_x: f64,
        client_y: f64,
        bounds: ContainerBounds,
    },
    Edit {
        action: EditorAction,
    },
    Preview,
    Import {
        text: String,
    },
    Export,
    Ping {
        t: f64,
    },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "open" => Some(ParsedClientMessage::Open {
            tactic_id: object.get("tacticId")?.as_str()?.to_string(),
        }),
        "duplicate" => Some(ParsedClientMessage::Duplicate {
            tactic_id: object.get("tacticId")?.as_str()?.to_string(),
        }),
        "next" => Some(ParsedClientMessage::Next),
        "prev" => Some(ParsedClientMessage::Prev),
        "restart" => Some(ParsedClientMessage::Restart),
        "toggle_play" => Some(ParsedClientMessage::TogglePlay),
        "set_zones" => Some(ParsedClientMessage::SetZones {
            value: object.get("value")?.as_bool()?,
        }),
        "set_arrows" => Some(ParsedClientMessage::SetArrows {
            value: object.get("value")?.as_bool()?,
        }),
        "set_speed" => Some(ParsedClientMessage::SetSpeed {
            percent: finite_number(object, "percent")?,
        }),
        "tap" => {
            let client_x = finite_number(object, "clientX")?;
            let client_y = finite_number(object, "clientY")?;
            let bounds: ContainerBounds =
                serde_json::from_value(object.get("bounds")?.clone()).ok()?;
            Some(ParsedClientMessage::Tap {
                client_x,
                client_y,
                bounds,
            })
        }
        "edit" => {
            let action: EditorAction = serde_json::from_value(object.get("action")?.clone()).ok()?;
            Some(ParsedClientMessage::Edit { action })
        }
        "preview" => Some(ParsedClientMessage::Preview),
        "import" => Some(ParsedClientMessage::Import {
            text: object.get("text")?.as_str()?.to_string(),
        }),
        "export" => Some(ParsedClientMessage::Export),
        "ping" => Some(ParsedClientMessage::Ping {
            t: finite_number(object, "t")?,
        }),
        _ => None,
    }
}

fn finite_number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key)?.as_f64().filter(|number| number.is_finite())
}
