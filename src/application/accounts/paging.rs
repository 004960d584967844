/// Rows per page for a reported screen width in pixels.
pub fn per_page_for_screen_size(width: u32) -> u32 {
    match width {
        0..=1024 => 25,
        1025..=1280 => 50,
        1281..=1440 => 75,
        1441..=1680 => 100,
        1681..=1920 => 125,
        _ => 200,
    }
}
