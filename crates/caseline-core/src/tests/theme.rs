use crate::*;

#[test]
fn parses_six_digit_hex() {
    assert_eq!(Color::parse_hex("#731528"), Some(Color::rgb(115, 21, 40)));
    assert_eq!(Color::parse_hex("dc3232"), Some(Color::rgb(220, 50, 50)));
}

#[test]
fn parses_three_digit_hex() {
    assert_eq!(Color::parse_hex("#fff"), Some(Color::rgb(255, 255, 255)));
    assert_eq!(Color::parse_hex("#a3c"), Some(Color::rgb(170, 51, 204)));
}

#[test]
fn rejects_malformed_hex() {
    assert_eq!(Color::parse_hex(""), None);
    assert_eq!(Color::parse_hex("#12345"), None);
    assert_eq!(Color::parse_hex("#gggggg"), None);
}

#[test]
fn rejects_non_ascii_without_panicking() {
    // Multi-byte chars can land on byte lengths 3 and 6; slicing must not
    // split a char boundary.
    assert_eq!(Color::parse_hex("éa"), None);
    assert_eq!(Color::parse_hex("#éa女"), None);
    assert_eq!(Color::parse_hex("颜色"), None);
}

#[test]
fn hex_round_trips_lowercase() {
    let c = Color::rgb(46, 139, 87);
    assert_eq!(c.to_hex(), "#2e8b57");
    assert_eq!(Color::parse_hex(&c.to_hex()), Some(c));
}

#[test]
fn default_palette_matches_the_deck_brand() {
    let p = Palette::default();
    assert_eq!(p.primary.to_hex(), "#731528");
    assert_eq!(p.alert.to_hex(), "#dc3232");
    assert_eq!(p.favorable.to_hex(), "#2e8b57");
}
