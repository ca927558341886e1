// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Color literal normalization

use super::{ColorValue, Rgb, SourceFormat};

/// Named colors recognized by the engine, with their CSS sRGB values
pub const NAMED_COLORS: &[(&str, &str)] = &[
    ("white", "#FFFFFF"),
    ("black", "#000000"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("red", "#FF0000"),
    ("blue", "#0000FF"),
    ("green", "#008000"),
    ("yellow", "#FFFF00"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
    ("pink", "#FFC0CB"),
    ("brown", "#A52A2A"),
];

/// Look up a named color (case-insensitive)
pub fn named_hex(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
}

/// Normalize a color literal.
///
/// Accepts `#rgb`, `#rrggbb` (the `#` is optional), `rgb()`/`rgba()` with
/// integer channels, `hsl()`/`hsla()`, `var(--name)` and the fixed named set.
/// Whitespace is ignored. Returns `None` when the literal is not a color.
pub fn normalize(literal: &str) -> Option<ColorValue> {
    let compact: String = literal
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    if compact.is_empty() {
        return None;
    }

    if let Some(digits) = compact.strip_prefix('#') {
        return parse_hex(digits);
    }
    if compact.starts_with("rgb") {
        return parse_rgb(&compact);
    }
    if compact.starts_with("hsl") {
        return parse_hsl(&compact);
    }
    if compact.starts_with("var(") {
        return parse_var(&compact);
    }
    if let Some(hex) = named_hex(&compact) {
        let rgb = ColorValue::parse(hex)?.rgb()?;
        return Some(ColorValue::from_rgb(rgb, SourceFormat::Named));
    }

    parse_hex(&compact)
}

fn parse_hex(digits: &str) -> Option<ColorValue> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };
    Some(ColorValue::from_normalized(
        format!("#{}", expanded.to_ascii_uppercase()),
        SourceFormat::Hex,
    ))
}

fn function_args<'a>(compact: &'a str, names: &[&str]) -> Option<Vec<&'a str>> {
    let inner = names
        .iter()
        .find_map(|name| compact.strip_prefix(*name)?.strip_prefix('('))?
        .strip_suffix(')')?;
    Some(inner.split(',').collect())
}

fn parse_rgb(compact: &str) -> Option<ColorValue> {
    let args = function_args(compact, &["rgba", "rgb"])?;
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let r: u8 = args[0].parse().ok()?;
    let g: u8 = args[1].parse().ok()?;
    let b: u8 = args[2].parse().ok()?;
    Some(ColorValue::from_rgb(Rgb::new(r, g, b), SourceFormat::Rgb))
}

fn parse_hsl(compact: &str) -> Option<ColorValue> {
    let args = function_args(compact, &["hsla", "hsl"])?;
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let hue = args[0].strip_suffix("deg").unwrap_or(args[0]);
    hue.parse::<f64>().ok()?;
    for pct in &args[1..3] {
        pct.strip_suffix('%')?.parse::<f64>().ok()?;
    }
    Some(ColorValue::from_normalized(compact.to_string(), SourceFormat::Hsl))
}

fn parse_var(compact: &str) -> Option<ColorValue> {
    let inner = compact.strip_prefix("var(")?.strip_suffix(')')?;
    let name = inner.split(',').next()?;
    if !name.starts_with("--") || name.len() <= 2 {
        return None;
    }
    Some(ColorValue::from_normalized(compact.to_string(), SourceFormat::CssVariable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_long_hex_equal() {
        assert_eq!(normalize("#ABC"), normalize("#AABBCC"));
        assert_eq!(normalize("#abc").unwrap().as_str(), "#AABBCC");
    }

    #[test]
    fn test_hex_without_hash() {
        assert_eq!(normalize("fff").unwrap().as_str(), "#FFFFFF");
        assert_eq!(normalize("1e3a8a").unwrap().as_str(), "#1E3A8A");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(normalize("#ffff").is_none());
        assert!(normalize("#ggg").is_none());
        assert!(normalize("#").is_none());
    }

    #[test]
    fn test_rgb_reencoded_alpha_ignored() {
        assert_eq!(normalize("rgb(255, 0, 0)").unwrap().as_str(), "#FF0000");
        assert_eq!(normalize("rgba(0, 128, 0, 0.5)").unwrap().as_str(), "#008000");
        assert_eq!(normalize("RGB( 15 , 23 , 42 )").unwrap().as_str(), "#0F172A");
    }

    #[test]
    fn test_rgb_out_of_range_is_not_a_color() {
        assert!(normalize("rgb(256, 0, 0)").is_none());
        assert!(normalize("rgb(0, 0)").is_none());
        assert!(normalize("rgb(1.5, 0, 0)").is_none());
    }

    #[test]
    fn test_named() {
        let white = normalize("White").unwrap();
        assert_eq!(white.as_str(), "#FFFFFF");
        assert_eq!(white.source_format(), SourceFormat::Named);
        assert_eq!(normalize("grey"), normalize("gray"));
        assert!(normalize("rebeccapurple").is_none());
        assert!(normalize("inherit").is_none());
    }

    #[test]
    fn test_hsl_preserved_unresolved() {
        let hsl = normalize("hsl(210, 50%, 40%)").unwrap();
        assert_eq!(hsl.as_str(), "hsl(210,50%,40%)");
        assert_eq!(hsl.source_format(), SourceFormat::Hsl);
        assert!(!hsl.is_resolvable());
        assert!(normalize("hsl(210, 50, 40)").is_none());
    }

    #[test]
    fn test_var_reference() {
        let v = normalize("var(--color-trust-800)").unwrap();
        assert_eq!(v.source_format(), SourceFormat::CssVariable);
        assert!(!v.is_resolvable());
        assert!(normalize("var(color)").is_none());
    }

    #[test]
    fn test_normalize_idempotent() {
        let literals = [
            "#abc",
            "#A1B2C3",
            "fff",
            "rgb(10, 20, 30)",
            "rgba(10,20,30,0.4)",
            "hsla(120, 100%, 25%, 0.3)",
            "var(--color-sand-50, #fff)",
            "Brown",
        ];
        for literal in literals {
            let once = normalize(literal).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "{}", literal);
            assert_eq!(once.as_str(), twice.as_str());
        }
    }

    #[test]
    fn test_unrecognized() {
        assert!(normalize("").is_none());
        assert!(normalize("transparent").is_none());
        assert!(normalize("currentColor").is_none());
    }
}
