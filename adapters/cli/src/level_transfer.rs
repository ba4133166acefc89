use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use ship_lanes_core::{GridPosition, LevelDefinition, LevelId, ShipSpawn};

const CODE_DOMAIN: &str = "lanes";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "lanes:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a level definition into a single-line share code.
pub(crate) fn encode(definition: &LevelDefinition) -> Result<String, LevelTransferError> {
    let payload = SerializableLevel {
        id: definition.id,
        name: definition.name.clone(),
        cell_size: definition.cell_size,
        ships: definition.ships.clone(),
        intersections: definition.intersections.clone(),
        obstacles: definition.obstacles.clone(),
    };
    let json = serde_json::to_vec(&payload).map_err(LevelTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_HEADER}:{}x{}:{encoded}",
        definition.columns, definition.rows
    ))
}

/// Decodes a level definition from its share code.
pub(crate) fn decode(value: &str) -> Result<LevelDefinition, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyCode);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LevelTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;
    let trailing = parts.count();
    if trailing > 0 {
        return Err(LevelTransferError::TrailingSegments(trailing));
    }

    if domain != CODE_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelTransferError::InvalidEncoding)?;
    let decoded: SerializableLevel =
        serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;

    Ok(LevelDefinition {
        id: decoded.id,
        name: decoded.name,
        columns,
        rows,
        cell_size: decoded.cell_size,
        ships: decoded.ships,
        intersections: decoded.intersections,
        obstacles: decoded.obstacles,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLevel {
    id: LevelId,
    name: String,
    cell_size: f32,
    ships: Vec<ShipSpawn>,
    #[serde(default)]
    intersections: Vec<GridPosition>,
    #[serde(default)]
    obstacles: Vec<GridPosition>,
}

/// Errors that can occur while decoding share codes.
#[derive(Debug)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyCode,
    /// The prefix segment was missing from the code.
    MissingPrefix,
    /// The code did not contain a version segment.
    MissingVersion,
    /// The code did not include grid dimensions.
    MissingDimensions,
    /// The code did not include the payload segment.
    MissingPayload,
    /// The code carried segments after the payload.
    TrailingSegments(usize),
    /// The code used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the code.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LevelTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "level code was empty"),
            Self::MissingPrefix => write!(f, "level code is missing the prefix"),
            Self::MissingVersion => write!(f, "level code is missing the version"),
            Self::MissingDimensions => write!(f, "level code is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "level code is missing the payload"),
            Self::TrailingSegments(count) => {
                write!(f, "level code has {count} unexpected trailing segments")
            }
            Self::InvalidPrefix(prefix) => {
                write!(f, "level code prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "level code version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode level payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process level payload: {error}")
            }
        }
    }
}

impl Error for LevelTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LevelTransferError> {
    let invalid = || LevelTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}
