//! Terminal QR-code rendering for salts.
//!
//! Purely for display: lets a user photograph a vault's salt instead
//! of copying it by hand.

use std::fmt;
use std::str::FromStr;

use qrcode::render::unicode::Dense1x2;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SaltVaultError};

/// QR error-correction level, lowest (`L`) to highest (`H`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QrLevel {
    #[default]
    L,
    M,
    Q,
    H,
}

impl From<QrLevel> for EcLevel {
    fn from(level: QrLevel) -> Self {
        match level {
            QrLevel::L => EcLevel::L,
            QrLevel::M => EcLevel::M,
            QrLevel::Q => EcLevel::Q,
            QrLevel::H => EcLevel::H,
        }
    }
}

impl FromStr for QrLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "L" => Ok(QrLevel::L),
            "M" => Ok(QrLevel::M),
            "Q" => Ok(QrLevel::Q),
            "H" => Ok(QrLevel::H),
            other => Err(format!("unknown QR level '{other}' — use L, M, Q or H")),
        }
    }
}

impl fmt::Display for QrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QrLevel::L => "L",
            QrLevel::M => "M",
            QrLevel::Q => "Q",
            QrLevel::H => "H",
        };
        f.write_str(s)
    }
}

/// Render `data` as a QR code made of Unicode half-blocks.
///
/// Colours are inverted (light modules on dark background) so the code
/// scans from a typical dark terminal.
pub fn render_salt_qr(data: &[u8], level: QrLevel) -> Result<String> {
    let code = QrCode::with_error_correction_level(data, level.into())
        .map_err(|e| SaltVaultError::QrCodeError(e.to_string()))?;

    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_multiline_block_text() {
        let qr = render_salt_qr(b"bofa-kitureso-mel-zaporu", QrLevel::L).unwrap();
        assert!(qr.lines().count() > 10);
        assert!(qr.contains('\u{2588}') || qr.contains('\u{2580}') || qr.contains('\u{2584}'));
    }

    #[test]
    fn higher_level_never_shrinks_the_code() {
        let data = b"bofa-kitureso-mel-zaporu-tikal";
        let low = render_salt_qr(data, QrLevel::L).unwrap();
        let high = render_salt_qr(data, QrLevel::H).unwrap();
        assert!(high.lines().count() >= low.lines().count());
    }

    #[test]
    fn oversized_data_is_an_error() {
        let data = vec![b'a'; 4000];
        let result = render_salt_qr(&data, QrLevel::H);
        assert!(matches!(result, Err(SaltVaultError::QrCodeError(_))));
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("m".parse::<QrLevel>().unwrap(), QrLevel::M);
        assert_eq!("H".parse::<QrLevel>().unwrap(), QrLevel::H);
        assert!("x".parse::<QrLevel>().is_err());
    }
}
