//! Startup banner: "NUTRIBOT" in figlet with a green-to-amber gradient, then
//! the effective schedule so the operator can see what the bot will do.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Leaf green (#3fbf5f).
const LEAF_GREEN: (u8, u8, u8) = (0x3f, 0xbf, 0x5f);
/// Amber (#ffb300).
const AMBER: (u8, u8, u8) = (0xff, 0xb3, 0x00);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Figlet art for the banner; plain text when the font cannot render.
fn art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("NUTRIBOT").map(|f| f.to_string()))
        .unwrap_or_else(|| "NUTRIBOT\n".to_string())
}

/// Print the banner followed by `key: value` lines describing the setup.
/// Terminal errors are ignored; the banner is cosmetic.
pub fn print_welcome(summary: &[(&str, String)]) {
    let mut out = stdout();
    let art = art();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let _ = out.execute(SetForegroundColor(rgb(lerp_rgb(LEAF_GREEN, AMBER, t))));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let _ = out.execute(SetForegroundColor(rgb(AMBER)));
    let _ = out.execute(Print(format!("v{}\r\n", env!("CARGO_PKG_VERSION"))));
    let _ = out.execute(ResetColor);
    for (key, value) in summary {
        let _ = out.execute(SetForegroundColor(rgb(LEAF_GREEN)));
        let _ = out.execute(Print(format!("{:>10}", key)));
        let _ = out.execute(ResetColor);
        let _ = out.execute(Print(format!("  {}\r\n", value)));
    }
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(lerp_rgb(LEAF_GREEN, AMBER, 0.0), LEAF_GREEN);
        assert_eq!(lerp_rgb(LEAF_GREEN, AMBER, 1.0), AMBER);
    }

    #[test]
    fn test_art_is_multiline() {
        assert!(art().lines().count() > 1);
    }
}
