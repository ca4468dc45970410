//! QR code rendering for deeplinks.

use base64::Engine;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use crate::error::RequestError;

/// Render the deeplink as an SVG QR code wrapped in a data URL, ready
/// to drop into an `<img>` tag.
pub fn qr_data_url(deeplink: &str) -> Result<String, RequestError> {
    let code = QrCode::with_error_correction_level(deeplink.as_bytes(), EcLevel::M)
        .map_err(|e| RequestError::Qr(e.to_string()))?;
    let rendered = code.render::<svg::Color>().build();
    let encoded = base64::engine::general_purpose::STANDARD.encode(rendered.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_svg_data_url() {
        let url = qr_data_url("verus://x-callback-url/generic-request/?request=abc").unwrap();
        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let svg = String::from_utf8(svg).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_oversized_payload_is_an_error() {
        // QR version 40 tops out around 2953 bytes at EC level M.
        let deeplink = "v".repeat(8_000);
        assert!(matches!(qr_data_url(&deeplink), Err(RequestError::Qr(_))));
    }
}
