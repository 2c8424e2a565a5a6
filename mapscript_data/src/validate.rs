use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed links or inconsistent records in a `MapEventsDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DanglingLink { from: usize, to: u16, context: &'static str },
    TypeMismatch { node: usize, declared: u8, payload: u8 },
    DuplicateTile { x: u8, y: u8 },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DanglingLink { from, to, context } => {
                write!(f, "node #{from} links to missing node #{to} ({context})")
            },
            ValidationError::TypeMismatch {
                node,
                declared,
                payload,
            } => {
                write!(
                    f,
                    "node #{node} declares type {declared} but carries a type {payload} payload"
                )
            },
            ValidationError::DuplicateTile { x, y } => write!(f, "tile ({x}, {y}) has more than one event"),
            ValidationError::InvalidValue { context } => write!(f, "invalid value ({context})"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate links and basic invariants of a map's event table.
///
/// ```
/// use mapscript_data::{EventDef, MapEventsDef, NO_LINK, PayloadDef, TileEventDef, codes, validate_map};
///
/// let map = MapEventsDef {
///     map_index: 1,
///     width: 8,
///     height: 8,
///     events: vec![EventDef {
///         event_type: codes::SPINNER,
///         next: NO_LINK,
///         payload: PayloadDef::Spinner { direction: Some(2) },
///     }],
///     chain_heads: vec![0],
///     tiles: vec![TileEventDef { x: 1, y: 1, event_id: 1 }],
///     ..MapEventsDef::default()
/// };
/// assert!(validate_map(&map).is_empty());
/// ```
pub fn validate_map(map: &MapEventsDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let node_count = map.events.len();

    if map.map_index == 0 {
        errors.push(ValidationError::InvalidValue {
            context: "map index 0 is reserved for \"current map\"".to_string(),
        });
    }

    for (index, event) in map.events.iter().enumerate() {
        if let Some(payload_code) = event.payload.type_code()
            && payload_code != event.event_type
        {
            errors.push(ValidationError::TypeMismatch {
                node: index,
                declared: event.event_type,
                payload: payload_code,
            });
        }
        check_link(index, event.next, node_count, "next", &mut errors);
        for link in event.payload.extra_links() {
            check_link(index, link, node_count, "branch", &mut errors);
        }
        check_payload_values(index, &event.payload, &mut errors);
    }

    if map.chain_heads.len() > EVENT_BITS_PER_MAP {
        errors.push(ValidationError::InvalidValue {
            context: format!(
                "{} event chains exceed the {EVENT_BITS_PER_MAP} event bits of a map",
                map.chain_heads.len()
            ),
        });
    }

    for (slot, head) in map.chain_heads.iter().enumerate() {
        if usize::from(*head) >= node_count {
            errors.push(ValidationError::InvalidValue {
                context: format!("event id {} starts at missing node #{head}", slot + 1),
            });
        }
    }

    let mut seen = HashSet::new();
    for tile in &map.tiles {
        if !seen.insert((tile.x, tile.y)) {
            errors.push(ValidationError::DuplicateTile { x: tile.x, y: tile.y });
        }
        if tile.x >= map.width || tile.y >= map.height {
            errors.push(ValidationError::InvalidValue {
                context: format!("tile ({}, {}) outside {}x{} map", tile.x, tile.y, map.width, map.height),
            });
        }
        if tile.event_id == 0 || usize::from(tile.event_id) > map.chain_heads.len() {
            errors.push(ValidationError::InvalidValue {
                context: format!("tile ({}, {}) references unknown event id {}", tile.x, tile.y, tile.event_id),
            });
        }
    }

    errors
}

fn check_link(from: usize, to: u16, node_count: usize, context: &'static str, errors: &mut Vec<ValidationError>) {
    if to != NO_LINK && usize::from(to) >= node_count {
        errors.push(ValidationError::DanglingLink { from, to, context });
    }
}

fn check_payload_values(index: usize, payload: &PayloadDef, errors: &mut Vec<ValidationError>) {
    match payload {
        PayloadDef::Dice100Roll { chance, .. } if *chance > 100 => {
            errors.push(ValidationError::InvalidValue {
                context: format!("node #{index} rolls with chance {chance} (max 100)"),
            });
        },
        PayloadDef::EnterPlace {
            opening_hour,
            closing_hour,
            ..
        } if *opening_hour > 23 || *closing_hour > 24 => {
            errors.push(ValidationError::InvalidValue {
                context: format!("node #{index} has opening hours {opening_hour}-{closing_hour}"),
            });
        },
        _ => {},
    }
}
