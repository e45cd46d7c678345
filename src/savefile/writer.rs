//! SKB save file writer

use crate::core::Level;
use crate::savefile::format::{LEVEL_MARKER, MAP_SET_MARKER};
use crate::Result;
use std::fmt::Write as FmtWrite;
use std::io::Write;

/// Render a session as save file text
///
/// Grids are written through the composed view, so goals survive the trip
/// (crates on goals as `O`, empty goals as `D`).
pub fn render_save(map_set_name: &str, levels: &[Level]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "{MAP_SET_MARKER}: {map_set_name}");
    for level in levels {
        let _ = writeln!(out, "{LEVEL_MARKER}: {}", level.name());
        let _ = writeln!(out, "{}", level.composed_grid());
    }
    out
}

/// Write a session to any writer, flushing at the end
pub fn write_save<W: Write>(mut writer: W, map_set_name: &str, levels: &[Level]) -> Result<()> {
    writer.write_all(render_save(map_set_name, levels).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, GridObject};

    #[test]
    fn test_render_layout() {
        let level = Level::new("Hello", 0, &["WWWWW", "WSCDW", "WWWWW"]).unwrap();
        let text = render_save("Set", std::slice::from_ref(&level));
        assert_eq!(
            text,
            "MapSetName: Set\nLevelName: Hello\nWWWWW\nWSCDW\nWWWWW\n\n"
        );
    }

    #[test]
    fn test_render_composes_crate_on_goal() {
        let mut level = Level::new("Push", 0, &["WWWWW", "WSCDW", "WWWWW"]).unwrap();
        let keeper = level.keeper_position();
        let delta = Direction::Right.delta();
        let crate_pos = keeper.translate(delta);
        level.move_object_by(GridObject::Crate, crate_pos, delta).unwrap();
        level.move_object_by(GridObject::Keeper, keeper, delta).unwrap();

        let text = render_save("Set", std::slice::from_ref(&level));
        assert!(text.contains("W SOW\n"));
    }

    #[test]
    fn test_write_to_vec() {
        let level = Level::new("A", 0, &["WWW", "WSW", "WWW"]).unwrap();
        let mut buf = Vec::new();
        write_save(&mut buf, "Set", &[level]).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("MapSetName: Set\n"));
    }
}
