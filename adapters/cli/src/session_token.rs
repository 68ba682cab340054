//! Single-line tokens that reproduce a driver run.
//!
//! A token looks like `snake:v1:20x20:<payload>` where the payload is the
//! unpadded base64 encoding of a JSON object holding the remaining settings.

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use snake_autopilot_world::CalibrationMode;

use crate::settings::{format_script, SessionMode, SessionSettings, SettingsLayer};

const TOKEN_DOMAIN: &str = "snake";
const TOKEN_VERSION: &str = "v1";

/// Identifier prefix emitted before the grid dimensions and payload.
pub(crate) const TOKEN_HEADER: &str = "snake:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Everything needed to replay a run deterministically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SessionToken {
    width: u32,
    height: u32,
    payload: TokenPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct TokenPayload {
    seed: u64,
    max_ticks: u64,
    mode: SessionMode,
    calibration: CalibrationMode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    moves: String,
}

impl SessionToken {
    /// Captures the settings of a run that used `seed`.
    pub(crate) fn capture(settings: &SessionSettings, seed: u64) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            payload: TokenPayload {
                seed,
                max_ticks: settings.max_ticks,
                mode: settings.mode,
                calibration: settings.calibration,
                moves: format_script(&settings.script),
            },
        }
    }

    /// Encodes the token into a single line.
    pub(crate) fn encode(&self) -> Result<String, SessionTokenError> {
        let json = serde_json::to_vec(&self.payload).map_err(SessionTokenError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{TOKEN_HEADER}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
            self.width, self.height
        ))
    }

    /// Decodes a token from its single-line representation.
    pub(crate) fn decode(value: &str) -> Result<Self, SessionTokenError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SessionTokenError::EmptyToken);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(SessionTokenError::MissingPrefix)?;
        let version = parts.next().ok_or(SessionTokenError::MissingVersion)?;
        let dimensions = parts.next().ok_or(SessionTokenError::MissingDimensions)?;
        let payload = parts.next().ok_or(SessionTokenError::MissingPayload)?;

        if domain != TOKEN_DOMAIN {
            return Err(SessionTokenError::InvalidPrefix(domain.to_owned()));
        }
        if version != TOKEN_VERSION {
            return Err(SessionTokenError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SessionTokenError::InvalidEncoding)?;
        let payload: TokenPayload =
            serde_json::from_slice(&bytes).map_err(SessionTokenError::InvalidPayload)?;

        Ok(Self {
            width,
            height,
            payload,
        })
    }

    /// Settings layer that reproduces the captured run.
    pub(crate) fn into_layer(self) -> SettingsLayer {
        let moves = (!self.payload.moves.is_empty()).then_some(self.payload.moves);
        SettingsLayer {
            width: Some(self.width),
            height: Some(self.height),
            seed: Some(self.payload.seed),
            max_ticks: Some(self.payload.max_ticks),
            mode: Some(self.payload.mode),
            calibration: Some(self.payload.calibration),
            moves,
            render: None,
            json: None,
        }
    }
}

/// Errors that can occur while encoding or decoding session tokens.
#[derive(Debug)]
pub(crate) enum SessionTokenError {
    /// The provided string was empty or contained only whitespace.
    EmptyToken,
    /// The prefix segment was missing from the token.
    MissingPrefix,
    /// The token did not contain a version segment.
    MissingVersion,
    /// The token did not include grid dimensions.
    MissingDimensions,
    /// The token did not include the payload segment.
    MissingPayload,
    /// The token used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The token used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the token.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for SessionTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "replay token was empty"),
            Self::MissingPrefix => write!(f, "replay token is missing the prefix"),
            Self::MissingVersion => write!(f, "replay token is missing the version"),
            Self::MissingDimensions => write!(f, "replay token is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "replay token is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "token prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "token version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode token payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process token payload: {error}")
            }
        }
    }
}

impl Error for SessionTokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SessionTokenError> {
    let invalid = || SessionTokenError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_autopilot_core::Direction;

    #[test]
    fn autopilot_session_survives_the_token() {
        let settings = SessionSettings {
            width: 12,
            height: 8,
            calibration: CalibrationMode::Faithful,
            ..SessionSettings::default()
        };
        let token = SessionToken::capture(&settings, 42);

        let encoded = token.encode().expect("token encodes");
        assert!(encoded.starts_with(&format!("{TOKEN_HEADER}:12x8:")));

        let decoded = SessionToken::decode(&encoded).expect("token decodes");
        assert_eq!(decoded, token);
        let replayed = SessionSettings::default()
            .apply(decoded.into_layer())
            .expect("layer applies");
        assert_eq!(replayed.seed, Some(42));
        assert_eq!(replayed.calibration, CalibrationMode::Faithful);
        assert_eq!(replayed.mode, SessionMode::Auto);
        assert!(replayed.script.is_empty());
    }

    #[test]
    fn manual_script_is_carried_along() {
        let settings = SessionSettings {
            mode: SessionMode::Manual,
            script: vec![Direction::Up, Direction::None, Direction::Left],
            ..SessionSettings::default()
        };
        let encoded = SessionToken::capture(&settings, 7)
            .encode()
            .expect("token encodes");

        let replayed = SessionSettings::default()
            .apply(SessionToken::decode(&encoded).expect("decodes").into_layer())
            .expect("layer applies");

        assert_eq!(replayed.script, settings.script);
        assert_eq!(replayed.mode, SessionMode::Manual);
    }

    #[test]
    fn malformed_tokens_are_reported() {
        assert!(matches!(
            SessionToken::decode("   "),
            Err(SessionTokenError::EmptyToken)
        ));
        assert!(matches!(
            SessionToken::decode("maze:v1:3x3:e30"),
            Err(SessionTokenError::InvalidPrefix(_))
        ));
        assert!(matches!(
            SessionToken::decode("snake:v9:3x3:e30"),
            Err(SessionTokenError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            SessionToken::decode("snake:v1:0x3:e30"),
            Err(SessionTokenError::InvalidDimensions(_))
        ));
        assert!(matches!(
            SessionToken::decode("snake:v1:3x3"),
            Err(SessionTokenError::MissingPayload)
        ));
        assert!(matches!(
            SessionToken::decode("snake:v1:3x3:!!"),
            Err(SessionTokenError::InvalidEncoding(_))
        ));
    }
}
